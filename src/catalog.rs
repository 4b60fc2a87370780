//! Loads the tool directory from the project's data directory and answers
//! the one question tag pages ask of it: which tools are listed under a tag,
//! best-voted first ([`Catalog::tools_for`]).
//!
//! The data directory is laid out as follows:
//!
//! ```text
//! data/tools/*.yml          one tool per file; the file stem is the tool id
//! data/tags.yml             list of { name, tag, logo? }
//! data/votes.yml            optional list of { key, sum, upVotes, downVotes }
//! data/descriptions/*.md    optional tag descriptions (frontmatter: tag, source)
//! ```

use std::collections::{HashMap, HashSet};
use std::fs::{read_dir, read_to_string};
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::markdown;
use crate::tag::{Tag, TagRecord};
use crate::tool::{Tool, VoteRecord};

/// The number of characters in a tag description excerpt when the
/// description has no fold.
pub const DESCRIPTION_EXCERPT_LENGTH: usize = 500;

/// The descriptive text shown above a tag's tool listing.
#[derive(Clone, Debug, PartialEq)]
pub struct Description {
    /// The excerpt, rendered to HTML.
    pub excerpt: String,

    /// Where the full description comes from, e.g. a Wikipedia article.
    pub source: Option<String>,
}

#[derive(Deserialize)]
struct DescriptionFrontmatter {
    tag: String,

    #[serde(default)]
    source: Option<String>,
}

/// The loaded tool directory.
#[derive(Debug, Default)]
pub struct Catalog {
    /// Every tool, ordered by id.
    pub tools: Vec<Tool>,

    /// Every tag, in the order of the tags file.
    pub tags: Vec<Tag>,

    /// Tag descriptions keyed by [`Tag::tag`].
    descriptions: HashMap<String, Description>,
}

impl Catalog {
    /// Loads the catalog from `data_directory`. `tags_url` and `static_url`
    /// are used to resolve tag page and logo URLs (see [`Tag::resolve`]).
    pub fn load(
        data_directory: &Path,
        tags_url: &Url,
        static_url: &Url,
    ) -> Result<Catalog> {
        let mut tools = load_tools(&data_directory.join("tools"))?;
        apply_votes(&mut tools, &data_directory.join("votes.yml"))?;
        let tags =
            load_tags(&data_directory.join("tags.yml"), tags_url, static_url)?;
        let descriptions =
            load_descriptions(&data_directory.join("descriptions"))?;

        let catalog = Catalog {
            tools,
            tags,
            descriptions,
        };
        catalog.check_references();
        Ok(catalog)
    }

    /// Builds a catalog from already-loaded parts.
    pub fn new(tools: Vec<Tool>, tags: Vec<Tag>) -> Catalog {
        Catalog {
            tools,
            tags,
            descriptions: HashMap::new(),
        }
    }

    /// Returns the tools listing `tag`, sorted by vote sum (descending).
    /// Tools with equal sums keep the catalog's order.
    pub fn tools_for(&self, tag: &Tag) -> Vec<Tool> {
        let mut tools: Vec<Tool> = self
            .tools
            .iter()
            .filter(|t| t.has_tag(&tag.tag))
            .cloned()
            .collect();
        tools.sort_by(|a, b| b.votes.sum.cmp(&a.votes.sum));
        tools
    }

    /// Looks a tag up by its `tag` value or its slug.
    pub fn tag(&self, key: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.tag == key || t.slug == key)
    }

    pub fn description(&self, tag: &Tag) -> Option<&Description> {
        self.descriptions.get(&tag.tag)
    }

    /// Warns about tools and descriptions which reference tags missing from
    /// the tags file. Neither is fatal: the tool simply isn't listed under
    /// that tag, and the description is never shown.
    fn check_references(&self) {
        let known: HashSet<&str> =
            self.tags.iter().map(|t| t.tag.as_str()).collect();
        let mut reported: HashSet<&str> = HashSet::new();
        for tool in &self.tools {
            for tag in &tool.tags {
                if !known.contains(tag.as_str()) && reported.insert(tag) {
                    warn!("tool `{}` references unknown tag `{}`", tool.id, tag);
                }
            }
        }
        for tag in self.descriptions.keys() {
            if !known.contains(tag.as_str()) {
                warn!("description for unknown tag `{}`", tag);
            }
        }
    }
}

fn load_tools(dir: &Path) -> Result<Vec<Tool>> {
    let mut tools = Vec::new();
    for path in files_with_extension(dir, &["yml", "yaml"])? {
        let id = stem(&path)?;
        let mut tool: Tool = serde_yaml::from_str(&read(&path)?)
            .map_err(|err| Error::Yaml { path: path.clone(), err })?;
        tool.id = id;
        tools.push(tool);
    }
    tools.sort_by(|a, b| a.id.cmp(&b.id));
    debug!("loaded {} tools from `{}`", tools.len(), dir.display());
    Ok(tools)
}

fn apply_votes(tools: &mut [Tool], path: &Path) -> Result<()> {
    if !path.is_file() {
        debug!("no votes file at `{}`", path.display());
        return Ok(());
    }
    let records: Vec<VoteRecord> = serde_yaml::from_str(&read(path)?)
        .map_err(|err| Error::Yaml { path: path.to_owned(), err })?;

    let mut by_id: HashMap<&str, usize> = HashMap::new();
    for (i, tool) in tools.iter().enumerate() {
        by_id.insert(tool.id.as_str(), i);
    }
    let mut updates = Vec::with_capacity(records.len());
    for record in &records {
        match by_id.get(record.key.as_str()) {
            Some(&i) => updates.push((i, record.votes())),
            None => warn!("votes for unknown tool `{}`", record.key),
        }
    }
    for (i, votes) in updates {
        tools[i].votes = votes;
    }
    Ok(())
}

fn load_tags(path: &Path, tags_url: &Url, static_url: &Url) -> Result<Vec<Tag>> {
    let records: Vec<TagRecord> = serde_yaml::from_str(&read(path)?)
        .map_err(|err| Error::Yaml { path: path.to_owned(), err })?;

    let mut seen: HashSet<String> = HashSet::new();
    let mut tags = Vec::with_capacity(records.len());
    for record in records {
        // An empty slug would put the tag's pages directly in `tag/`.
        if slug::slugify(&record.tag).is_empty() {
            return Err(Error::EmptyTagSlug(record.tag));
        }
        let tag = Tag::resolve(record, tags_url, static_url)?;
        if !seen.insert(tag.slug.clone()) {
            return Err(Error::DuplicateTag(tag.slug));
        }
        tags.push(tag);
    }
    debug!("loaded {} tags from `{}`", tags.len(), path.display());
    Ok(tags)
}

fn load_descriptions(dir: &Path) -> Result<HashMap<String, Description>> {
    let mut descriptions = HashMap::new();
    if !dir.is_dir() {
        debug!("no descriptions directory at `{}`", dir.display());
        return Ok(descriptions);
    }
    for path in files_with_extension(dir, &["md"])? {
        let annotate = |err: markdown::Error| Error::Markdown {
            path: path.clone(),
            err,
        };
        let contents = read(&path)?;
        let (yaml, body) =
            markdown::split_frontmatter(&contents).map_err(annotate)?;
        let frontmatter: DescriptionFrontmatter = serde_yaml::from_str(yaml)
            .map_err(|err| Error::Yaml { path: path.clone(), err })?;
        let (excerpt, _) = markdown::excerpt(body, DESCRIPTION_EXCERPT_LENGTH, None)
            .map_err(annotate)?;
        descriptions.insert(
            frontmatter.tag,
            Description {
                excerpt,
                source: frontmatter.source,
            },
        );
    }
    Ok(descriptions)
}

/// Lists the files directly inside `dir` with one of `extensions`, sorted by
/// path so loading is deterministic.
fn files_with_extension(dir: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>> {
    let entries = read_dir(dir).map_err(|err| Error::Io {
        path: dir.to_owned(),
        err,
    })?;
    let mut paths = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|err| Error::Io {
                path: dir.to_owned(),
                err,
            })?
            .path();
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| extensions.contains(&ext));
        if matches && path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn read(path: &Path) -> Result<String> {
    read_to_string(path).map_err(|err| Error::Io {
        path: path.to_owned(),
        err,
    })
}

fn stem(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_owned)
        .ok_or_else(|| Error::InvalidFileName(path.to_owned()))
}

/// Represents the result of loading the catalog.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading the catalog.
#[derive(Debug, Error)]
pub enum Error {
    /// Returned when a data file or directory can't be read.
    #[error("reading `{}`: {err}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// Returned when a data file isn't valid YAML for its record type.
    #[error("parsing `{}`: {err}", .path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        err: serde_yaml::Error,
    },

    /// Returned when a description file's frontmatter can't be split out.
    #[error("parsing `{}`: {err}", .path.display())]
    Markdown {
        path: PathBuf,
        #[source]
        err: markdown::Error,
    },

    /// Returned when a tag URL can't be built.
    #[error(transparent)]
    UrlParse(#[from] url::ParseError),

    /// Returned when a tag has no characters usable in a URL, e.g. `+++`.
    #[error("tag `{0}` has an empty slug")]
    EmptyTagSlug(String),

    /// Returned when two tags in the tags file share a slug.
    #[error("duplicate tag `{0}`")]
    DuplicateTag(String),

    /// Returned when a data file name isn't valid UTF-8.
    #[error("invalid file name: {0:?}")]
    InvalidFileName(PathBuf),
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    fn write(dir: &Path, relative: &str, contents: &str) -> std::io::Result<()> {
        let path = dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)
    }

    fn fixture() -> std::io::Result<TempDir> {
        let data = TempDir::new()?;
        let dir = data.path();
        write(
            dir,
            "tools/flake8.yml",
            "name: Flake8\nlicense: MIT\ncategories: [linter]\ntags: [python]\n",
        )?;
        write(
            dir,
            "tools/pylint.yml",
            "name: Pylint\nlicense: GPL\ncategories: [linter]\ntags: [python]\n",
        )?;
        write(
            dir,
            "tools/black.yaml",
            "name: Black\nlicense: MIT\ncategories: [formatter]\ntags: [python]\n",
        )?;
        write(
            dir,
            "tools/gofmt.yml",
            "name: gofmt\nlicense: BSD\ncategories: [formatter]\ntags: [go, golang]\n",
        )?;
        write(dir, "tools/README.txt", "not a tool")?;
        write(
            dir,
            "tags.yml",
            "- name: Python\n  tag: python\n  logo: python.svg\n- name: Go\n  tag: go\n",
        )?;
        write(
            dir,
            "votes.yml",
            "- key: pylint\n  sum: 10\n  upVotes: 12\n  downVotes: 2\n\
             - key: black\n  sum: 3\n\
             - key: ghost\n  sum: 99\n",
        )?;
        write(
            dir,
            "descriptions/python.md",
            "---\ntag: python\nsource: https://en.wikipedia.org/wiki/Python\n---\n\
             Python is a language.\n",
        )?;
        Ok(data)
    }

    fn load(dir: &Path) -> Result<Catalog> {
        let tags_url = Url::parse("https://example.org/tag/")?;
        let static_url = Url::parse("https://example.org/static/")?;
        Catalog::load(dir, &tags_url, &static_url)
    }

    #[test]
    fn test_load() -> TestResult {
        let data = fixture()?;
        let catalog = load(data.path())?;

        let ids: Vec<&str> = catalog.tools.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(vec!["black", "flake8", "gofmt", "pylint"], ids);
        assert_eq!(2, catalog.tags.len());

        let pylint = catalog.tools.iter().find(|t| t.id == "pylint").ok_or("pylint")?;
        assert_eq!(10, pylint.votes.sum);
        assert_eq!(12, pylint.votes.upvotes);
        Ok(())
    }

    #[test]
    fn test_tools_for_sorts_by_votes() -> TestResult {
        let data = fixture()?;
        let catalog = load(data.path())?;
        let python = catalog.tag("python").ok_or("python")?;

        let names: Vec<String> =
            catalog.tools_for(python).into_iter().map(|t| t.name).collect();
        assert_eq!(vec!["Pylint", "Black", "Flake8"], names);

        let go = catalog.tag("go").ok_or("go")?;
        assert_eq!(1, catalog.tools_for(go).len());
        Ok(())
    }

    #[test]
    fn test_descriptions() -> TestResult {
        let data = fixture()?;
        let catalog = load(data.path())?;
        let python = catalog.tag("python").ok_or("python")?;
        let go = catalog.tag("go").ok_or("go")?;

        let description = catalog.description(python).ok_or("description")?;
        assert_eq!("<p>Python is a language.</p>", description.excerpt);
        assert_eq!(
            Some("https://en.wikipedia.org/wiki/Python".to_owned()),
            description.source
        );
        assert!(catalog.description(go).is_none());
        Ok(())
    }

    #[test]
    fn test_optional_files() -> TestResult {
        let data = TempDir::new()?;
        write(data.path(), "tools/a.yml", "name: A\nlicense: MIT\n")?;
        write(data.path(), "tags.yml", "[]")?;
        let catalog = load(data.path())?;
        assert_eq!(0, catalog.tools[0].votes.sum);
        Ok(())
    }

    #[test]
    fn test_bad_tool_file() -> TestResult {
        let data = TempDir::new()?;
        write(data.path(), "tools/broken.yml", "name: [unterminated\n")?;
        write(data.path(), "tags.yml", "[]")?;
        let err = load(data.path()).err().ok_or("expected an error")?;
        assert!(err.to_string().contains("broken.yml"), "{}", err);
        Ok(())
    }

    #[test]
    fn test_duplicate_tags() -> TestResult {
        let data = TempDir::new()?;
        write(data.path(), "tools/a.yml", "name: A\nlicense: MIT\n")?;
        write(
            data.path(),
            "tags.yml",
            "- name: C++\n  tag: cpp\n- name: CPP\n  tag: CPP\n",
        )?;
        assert!(matches!(
            load(data.path()),
            Err(Error::DuplicateTag(slug)) if slug == "cpp"
        ));
        Ok(())
    }

    #[test]
    fn test_empty_tag_slug() -> TestResult {
        let data = TempDir::new()?;
        write(data.path(), "tools/a.yml", "name: A\nlicense: MIT\n")?;
        write(data.path(), "tags.yml", "- name: Plus\n  tag: \"+++\"\n")?;
        assert!(matches!(
            load(data.path()),
            Err(Error::EmptyTagSlug(tag)) if tag == "+++"
        ));
        Ok(())
    }
}
