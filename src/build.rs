//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the output static site: parsing the blog posts
//! ([`crate::parser`]), loading the tool catalog ([`crate::catalog`]),
//! rendering blog and tag pages ([`crate::write`]), and copying the static
//! source directory and bundle assets into the output directory.

use crate::catalog::{Catalog, Error as CatalogError};
use crate::config::Config;
use crate::parser::{Error as ParseError, Parser as PostParser};
use crate::write::{Error as WriteError, Writer};
use gtmpl::Template;
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// What a build produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub posts: usize,
    pub tools: usize,
    pub tags: usize,
    pub pages: usize,
}

/// Builds the site from a [`Config`] object. This calls into
/// [`PostParser::parse_posts`], [`Catalog::load`], [`Writer::write_posts`],
/// and [`Writer::write_tags`] which do the heavy-lifting. This function also
/// copies the static assets from the source directory to the output
/// directory.
pub fn build_site(config: &Config) -> Result<Summary> {
    let post_parser =
        PostParser::new(&config.posts_url, &config.posts_output_directory);

    // collect all posts; a project without a blog is fine
    let (posts, static_files) = if config.posts_source_directory.is_dir() {
        post_parser.parse_posts(&config.posts_source_directory)?
    } else {
        debug!(
            "no posts directory at `{}`",
            config.posts_source_directory.display()
        );
        (Vec::new(), Vec::new())
    };
    info!("parsed {} posts", posts.len());

    let catalog =
        Catalog::load(&config.data_directory, &config.tags_url, &config.static_url)?;
    info!(
        "loaded {} tools under {} tags",
        catalog.tools.len(),
        catalog.tags.len()
    );

    // Parse the template files.
    let index_template = parse_template(config.index_template.iter())?;
    let posts_template = parse_template(config.posts_template.iter())?;
    let tag_template = parse_template(config.tag_template.iter())?;

    // Only the directories the build owns are removed; the root output
    // directory may hold files put there by other tools.
    rmdir(&config.index_output_directory)?;
    rmdir(&config.posts_output_directory)?;
    rmdir(&config.tags_output_directory)?;
    rmdir(&config.static_output_directory)?;

    let writer = Writer {
        posts_template: &posts_template,
        index_template: &index_template,
        tag_template: &tag_template,
        index_base_url: &config.index_url,
        index_output_directory: &config.index_output_directory,
        index_page_size: config.index_page_size,
        tags_output_directory: &config.tags_output_directory,
        home_page: &config.home_page,
        static_url: &config.static_url,
        site_title: &config.title,
    };
    let mut pages = writer.write_posts(&posts)?;
    pages += writer.write_tags(&catalog)?;
    info!("wrote {} pages", pages);

    // copy post bundle assets next to their posts
    for (src, dst) in &static_files {
        if let Some(dir) = dst.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::copy(src, dst)?;
    }

    // copy static directory
    if config.static_source_directory.is_dir() {
        copy_dir(
            &config.static_source_directory,
            &config.static_output_directory,
        )?;
    }

    Ok(Summary {
        posts: posts.len(),
        tools: catalog.tools.len(),
        tags: catalog.tags.len(),
        pages,
    })
}

fn copy_dir(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            copy_dir(&entry.path(), &dst.join(entry.file_name()))?;
        } else {
            fs::copy(entry.path(), dst.join(entry.file_name()))?;
        }
    }

    Ok(())
}

/// Loads the template file contents, concatenates them, and parses the result
/// into a template.
pub fn parse_template<P: AsRef<Path>>(
    template_files: impl Iterator<Item = P>,
) -> Result<Template> {
    let mut contents = String::new();
    for template_file in template_files {
        let template_file = template_file.as_ref();
        let text = fs::read_to_string(template_file).map_err(|err| {
            Error::OpenTemplateFile {
                path: template_file.to_owned(),
                err,
            }
        })?;
        contents.push_str(&text);
        contents.push(' ');
    }

    let mut template = Template::default();
    template.parse(&contents).map_err(Error::ParseTemplate)?;
    Ok(template)
}

/// The result of a fallible build operation.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be during parsing, loading
/// the catalog, writing, cleaning output directories, parsing template files,
/// and other I/O.
#[derive(Debug, Error)]
pub enum Error {
    /// Returned for errors parsing blog posts.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Returned for errors loading the tool catalog.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Returned for errors writing pages to disk.
    #[error(transparent)]
    Write(#[from] WriteError),

    /// Returned for I/O problems while cleaning output directories.
    #[error("cleaning directory `{}`: {err}", .path.display())]
    Clean {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// Returned for I/O problems while opening template files.
    #[error("opening template file `{}`: {err}", .path.display())]
    OpenTemplateFile {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// Returned for errors parsing template files.
    #[error("parsing templates: {0}")]
    ParseTemplate(String),

    /// Returned for other I/O errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn rmdir(dir: &Path) -> Result<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) => match e.kind() {
            std::io::ErrorKind::NotFound => Ok(()),
            _ => Err(Error::Clean {
                path: dir.to_owned(),
                err: e,
            }),
        },
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tempfile::TempDir;

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn test_parse_template_concatenates_files() -> TestResult {
        let dir = TempDir::new()?;
        fs::write(dir.path().join("base.html"), r#"{{define "title"}}T{{end}}"#)?;
        fs::write(dir.path().join("page.html"), r#"[{{template "title"}}]"#)?;
        let template = parse_template(
            ["base.html", "page.html"].iter().map(|f| dir.path().join(f)),
        )?;

        let mut out: Vec<u8> = Vec::new();
        template.execute(&mut out, &gtmpl::Context::empty())?;
        assert_eq!(" [T] ", String::from_utf8(out)?);
        Ok(())
    }

    #[test]
    fn test_parse_template_missing_file() {
        let result = parse_template(["/definitely/not/here.html"].iter());
        assert!(matches!(result, Err(Error::OpenTemplateFile { .. })));
    }

    #[test]
    fn test_rmdir_missing_is_ok() -> TestResult {
        let dir = TempDir::new()?;
        rmdir(&dir.path().join("absent"))?;
        Ok(())
    }
}
