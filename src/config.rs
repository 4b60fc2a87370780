//! Loads the project configuration: the `toolsite.yaml` project file and the
//! theme's `theme.yaml`, resolved into the absolute directories and URLs a
//! build needs ([`Config`]).

use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

/// The name of the project file. Its directory is the project root.
pub const PROJECT_FILE: &str = "toolsite.yaml";

#[derive(Deserialize)]
#[serde(transparent)]
struct PageSize(usize);

impl Default for PageSize {
    fn default() -> Self {
        PageSize(10)
    }
}

fn default_title() -> String {
    String::from("Analysis Tools")
}

#[derive(Deserialize)]
struct Project {
    site_root: Url,

    #[serde(default = "default_title")]
    title: String,

    #[serde(default)]
    index_page_size: PageSize,
}

#[derive(Deserialize)]
struct Theme {
    index_template: Vec<PathBuf>,
    posts_template: Vec<PathBuf>,
    tag_template: Vec<PathBuf>,
}

/// Everything a build needs to know, with every path and URL resolved.
#[derive(Clone, Debug)]
pub struct Config {
    /// The site title, exposed to every template.
    pub title: String,

    /// The URL of the site's home page (the site root).
    pub home_page: Url,

    /// The base URL for blog index pages, `{site_root}/blog/`.
    pub index_url: Url,

    /// The base URL for blog post pages, `{site_root}/posts/`.
    pub posts_url: Url,

    /// The base URL for tag listing pages, `{site_root}/tag/`.
    pub tags_url: Url,

    /// The base URL for static assets, `{site_root}/static/`.
    pub static_url: Url,

    pub posts_source_directory: PathBuf,
    pub data_directory: PathBuf,
    pub static_source_directory: PathBuf,

    pub index_template: Vec<PathBuf>,
    pub posts_template: Vec<PathBuf>,
    pub tag_template: Vec<PathBuf>,

    pub root_output_directory: PathBuf,
    pub index_output_directory: PathBuf,
    pub posts_output_directory: PathBuf,
    pub tags_output_directory: PathBuf,
    pub static_output_directory: PathBuf,

    /// The number of posts per blog index page. Never zero.
    pub index_page_size: usize,
}

impl Config {
    /// Searches `dir` and its ancestors for [`PROJECT_FILE`] and loads the
    /// first one found.
    pub fn from_directory(dir: &Path, output_directory: &Path) -> Result<Config> {
        let mut current = Some(dir);
        while let Some(dir) = current {
            let path = dir.join(PROJECT_FILE);
            if path.is_file() {
                return Config::from_project_file(&path, output_directory);
            }
            current = dir.parent();
        }
        Err(Error::ProjectFileNotFound(dir.to_owned()))
    }

    /// Loads the project file at `path` and the theme file at
    /// `{project_root}/theme/theme.yaml`.
    pub fn from_project_file(path: &Path, output_directory: &Path) -> Result<Config> {
        let project: Project = load_yaml(path)?;
        let project_root = path
            .parent()
            .ok_or_else(|| Error::NoParentDirectory(path.to_owned()))?;
        let theme_dir = project_root.join("theme");
        let theme: Theme = load_yaml(&theme_dir.join("theme.yaml"))?;

        if project.index_page_size.0 < 1 {
            return Err(Error::InvalidPageSize);
        }

        let site_root = directory_url(project.site_root);
        let resolve = |relpaths: Vec<PathBuf>| -> Vec<PathBuf> {
            relpaths.iter().map(|relpath| theme_dir.join(relpath)).collect()
        };

        Ok(Config {
            title: project.title,
            index_url: site_root.join("blog/")?,
            posts_url: site_root.join("posts/")?,
            tags_url: site_root.join("tag/")?,
            static_url: site_root.join("static/")?,
            home_page: site_root,
            posts_source_directory: project_root.join("blog"),
            data_directory: project_root.join("data"),
            static_source_directory: project_root.join("static"),
            index_template: resolve(theme.index_template),
            posts_template: resolve(theme.posts_template),
            tag_template: resolve(theme.tag_template),
            root_output_directory: output_directory.to_owned(),
            index_output_directory: output_directory.join("blog"),
            posts_output_directory: output_directory.join("posts"),
            tags_output_directory: output_directory.join("tag"),
            static_output_directory: output_directory.join("static"),
            index_page_size: project.index_page_size.0,
        })
    }
}

/// Adds a trailing slash to `url`'s path if it's missing, so that
/// [`Url::join`] treats the last segment as a directory rather than a file.
fn directory_url(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).map_err(|err| Error::Open {
        path: path.to_owned(),
        err,
    })?;
    serde_yaml::from_reader(file).map_err(|err| Error::Yaml {
        path: path.to_owned(),
        err,
    })
}

/// Represents the result of loading configuration.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading configuration.
#[derive(Debug, Error)]
pub enum Error {
    /// Returned when no project file exists in the directory or any parent.
    #[error("could not find `{}` in `{}` or any parent directory", PROJECT_FILE, .0.display())]
    ProjectFileNotFound(PathBuf),

    /// Returned when the project or theme file can't be opened.
    #[error("opening `{}`: {err}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// Returned when the project or theme file isn't valid.
    #[error("loading `{}`: {err}", .path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        err: serde_yaml::Error,
    },

    /// Returned when the project file path has no parent directory.
    #[error("can't get parent directory for project file `{}`", .0.display())]
    NoParentDirectory(PathBuf),

    /// Returned when `index_page_size` is zero.
    #[error("`index_page_size` must be at least 1")]
    InvalidPageSize,

    /// Returned when a derived URL can't be built.
    #[error(transparent)]
    UrlParse(#[from] url::ParseError),
}
