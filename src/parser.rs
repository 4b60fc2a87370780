//! Defines the [`Parser`] type, which reads blog [`Post`]s from the posts
//! source directory, and the [`Error`] type for that operation.

use std::fs::{read_dir, read_to_string};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::debug;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::markdown;
use crate::post::Post;

/// The number of characters in a blog excerpt when the post has no fold.
pub const EXCERPT_LENGTH: usize = 140;

const MARKDOWN_EXTENSION: &str = ".md";
const BUNDLE_INDEX: &str = "index.md";

/// Parses [`Post`] objects from source files.
pub struct Parser<'a> {
    /// `posts_url` is the base URL for post pages. It's used to prefix post
    /// page URLs (i.e., the URL for a post is `{posts_url}/{post_id}.html`).
    posts_url: &'a Url,

    /// `posts_directory` is the directory in which post pages will be
    /// rendered.
    posts_directory: &'a Path,
}

impl<'a> Parser<'a> {
    /// Constructs a new parser. See fields on [`Parser`] for argument
    /// descriptions.
    pub fn new(posts_url: &'a Url, posts_directory: &'a Path) -> Parser<'a> {
        Parser {
            posts_url,
            posts_directory,
        }
    }

    /// Searches `source_directory` for posts and returns them sorted by date
    /// (most recent first; posts with the same date keep the order of their
    /// ids). A post is either a `.md` file or a bundle: a directory holding
    /// an `index.md` plus assets. Bundle assets are returned as
    /// [`StaticFile`]s to be copied next to the post page. Each post file is
    /// structured as follows:
    ///
    /// 1. Initial frontmatter fence (`---`)
    /// 2. YAML frontmatter with fields `date` and optionally `title` and `tags`
    /// 3. Terminal frontmatter fence (`---`)
    /// 4. Post body
    ///
    /// For example:
    ///
    /// ```md
    /// ---
    /// title: Hello, world!
    /// date: 2021-04-16
    /// tags: [announcement]
    /// ---
    /// # Hello
    ///
    /// World
    /// ```
    pub fn parse_posts(&self, source_directory: &Path) -> Result<Posts> {
        let mut posts = Vec::new();
        let mut static_files = Vec::new();
        for result in read_dir(source_directory)? {
            let entry = result?;
            let path = entry.path();
            if entry.file_type()?.is_dir() && path.join(BUNDLE_INDEX).is_file() {
                posts.push(self.parse_post_bundle(&path, &mut static_files)?);
            } else if entry
                .file_name()
                .to_string_lossy()
                .ends_with(MARKDOWN_EXTENSION)
            {
                let id = file_stem(&path)?;
                posts.push(self.parse_post(&path, &id, self.posts_url)?);
            }
        }

        posts.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
        debug!(
            "parsed {} posts and {} bundle assets from `{}`",
            posts.len(),
            static_files.len(),
            source_directory.display()
        );
        Ok((posts, static_files))
    }

    fn parse_post_bundle(
        &self,
        bundle: &Path,
        static_files: &mut Vec<StaticFile>,
    ) -> Result<Post> {
        let id = file_name(bundle)?;

        // Relative links in a bundle point at its assets, which are copied
        // to `{posts_directory}/{id}/`.
        let base = self.posts_url.join(&format!("{}/", id))?;

        // Make sure the post parses before touching `static_files`.
        let post = self.parse_post(&bundle.join(BUNDLE_INDEX), &id, &base)?;

        use walkdir::WalkDir;
        for result in WalkDir::new(bundle) {
            let entry = result?;
            if entry.file_type().is_file() && entry.file_name() != BUNDLE_INDEX {
                // `bundle` is always an ancestor of the entry.
                let relative = entry
                    .path()
                    .strip_prefix(bundle)
                    .map_err(|_| Error::InvalidFileName(entry.path().to_owned()))?;
                static_files.push((
                    entry.path().to_owned(),
                    self.posts_directory.join(&id).join(relative),
                ));
            }
        }

        Ok(post)
    }

    /// Parses a single [`Post`] from the file at `path`, annotating any
    /// error with the path. Relative links in the body are resolved against
    /// `base`.
    fn parse_post(&self, path: &Path, id: &str, base: &Url) -> Result<Post> {
        self.parse_post_inner(path, id, base).map_err(|err| Error::Annotated {
            annotation: format!("parsing post `{}`", path.display()),
            err: Box::new(err),
        })
    }

    fn parse_post_inner(&self, path: &Path, id: &str, base: &Url) -> Result<Post> {
        let contents = read_to_string(path)?;
        let (yaml, body) = markdown::split_frontmatter(&contents)?;
        let frontmatter: Frontmatter = serde_yaml::from_str(yaml)?;
        let date = NaiveDate::parse_from_str(frontmatter.date.trim(), "%Y-%m-%d")?;

        let file_name = format!("{}.html", id);
        let (excerpt, summarized) = markdown::excerpt(body, EXCERPT_LENGTH, Some(base))?;
        let mut post = Post {
            id: id.to_owned(),
            title: frontmatter
                .title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| slug::slugify(id)),
            date,
            file_path: self.posts_directory.join(&file_name),
            url: self.posts_url.join(&file_name)?,
            tags: frontmatter.tags,
            body: String::new(),
            excerpt,
            summarized,
        };
        markdown::to_html(&mut post.body, body, Some(base))?;
        Ok(post)
    }
}

fn file_name(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_owned)
        .ok_or_else(|| Error::InvalidFileName(path.to_owned()))
}

fn file_stem(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_owned)
        .ok_or_else(|| Error::InvalidFileName(path.to_owned()))
}

#[derive(Deserialize)]
struct Frontmatter {
    /// The title of the post.
    #[serde(default)]
    title: Option<String>,

    /// The date of the post, as `YYYY-MM-DD`.
    date: String,

    #[serde(default)]
    tags: Vec<String>,
}

/// The parsed posts and the bundle assets to copy alongside them.
pub type Posts = (Vec<Post>, Vec<StaticFile>);

/// A file to copy: `(source, destination)`.
pub type StaticFile = (PathBuf, PathBuf);

/// Represents the result of a [`Post`]-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing a [`Post`] object.
#[derive(Debug, Error)]
pub enum Error {
    /// Returned when the frontmatter can't be split from the body.
    #[error(transparent)]
    Markdown(#[from] markdown::Error),

    /// Returned when there was an error parsing the frontmatter as YAML.
    #[error(transparent)]
    DeserializeYaml(#[from] serde_yaml::Error),

    /// Returned when the frontmatter's `date` isn't `YYYY-MM-DD`.
    #[error("invalid date: {0}")]
    Date(#[from] chrono::ParseError),

    /// Returned when there is a problem parsing URLs.
    #[error(transparent)]
    UrlParse(#[from] url::ParseError),

    /// Returned for other I/O errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Returned for WalkDir I/O errors.
    #[error(transparent)]
    WalkDir(#[from] walkdir::Error),

    /// Returned when a source file name isn't valid UTF-8.
    #[error("invalid file name: {0:?}")]
    InvalidFileName(PathBuf),

    /// An error with an annotation.
    #[error("{annotation}: {err}")]
    Annotated {
        annotation: String,
        #[source]
        err: Box<Error>,
    },
}
