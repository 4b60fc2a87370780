//! Templates and writes every output page: the paginated blog index, one
//! page per blog post, and one listing page per tag and category selection.

use crate::catalog::{Catalog, Description};
use crate::listing::{self, CategoryFilter, Listing, ListingView};
use crate::post::Post;
use crate::tag::Tag;
use crate::tool::Tool;
use gtmpl::{Template, Value};
use log::debug;
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

/// Responsible for templating and writing HTML pages to disk.
pub struct Writer<'a> {
    /// The template for post pages.
    pub posts_template: &'a Template,

    /// The template for blog index pages.
    pub index_template: &'a Template,

    /// The template for tag listing pages.
    pub tag_template: &'a Template,

    /// The base URL for blog index pages. The index pages will be located at
    /// `{index_base_url}/index.html`, `{index_base_url}/1.html`, etc.
    pub index_base_url: &'a Url,

    /// The directory in which the blog index HTML files will be written.
    pub index_output_directory: &'a Path,

    /// The number of posts per index page. Must be at least 1.
    pub index_page_size: usize,

    /// The directory in which tag listing pages will be written. A tag's
    /// pages are located at `{tags_output_directory}/{slug}/index.html`,
    /// `{tags_output_directory}/{slug}/formatter.html`, and
    /// `{tags_output_directory}/{slug}/linter.html`.
    pub tags_output_directory: &'a Path,

    /// The URL for the site's home page. This is made available to every
    /// template, typically as the destination for the site-header link.
    pub home_page: &'a Url,

    /// The URL for the static assets. This is made available to every
    /// template, typically for the theme's stylesheet.
    pub static_url: &'a Url,

    /// The site title, made available to every template.
    pub site_title: &'a str,
}

impl Writer<'_> {
    /// Takes a single [`Page`], templates it, and writes it to disk.
    fn write_page(&self, page: &Page) -> Result<()> {
        let mut value = page.to_value();
        if let Value::Object(obj) = &mut value {
            obj.insert(
                "home_page".to_owned(),
                Value::String(self.home_page.to_string()),
            );
            obj.insert(
                "static_url".to_owned(),
                Value::String(self.static_url.to_string()),
            );
            obj.insert(
                "site_title".to_owned(),
                Value::String(self.site_title.to_owned()),
            );
        }
        let render = || -> std::result::Result<(), String> {
            let context = gtmpl::Context::from(value)?;
            let mut file = std::fs::File::create(&page.file_path)
                .map_err(|e| e.to_string())?;
            page.template.execute(&mut file, &context)
        };
        render().map_err(|message| Error::Render {
            path: page.file_path.clone(),
            message,
        })
    }

    fn write_pages<'t>(&self, pages: impl Iterator<Item = Page<'t>>) -> Result<usize> {
        let mut seen_dirs: HashSet<PathBuf> = HashSet::new();
        let mut written = 0;
        for page in pages {
            if let Some(dir) = page.file_path.parent() {
                if seen_dirs.insert(dir.to_owned()) {
                    std::fs::create_dir_all(dir)?;
                }
            }
            self.write_page(&page)?;
            debug!("wrote `{}`", page.file_path.display());
            written += 1;
        }
        Ok(written)
    }

    /// Writes the blog index pages and one page per post. Returns the number
    /// of pages written.
    pub fn write_posts(&self, posts: &[Post]) -> Result<usize> {
        let index = Index {
            url: self.index_base_url,
            output_directory: self.index_output_directory,
            posts,
        };
        let pages = index
            .to_pages(self.index_page_size, self.index_template)?
            .into_iter()
            .chain(post_pages(posts, self.posts_template));
        self.write_pages(pages)
    }

    /// Writes the listing pages of every tag in `catalog`, one per
    /// [`CategoryFilter`]. Returns the number of pages written.
    pub fn write_tags(&self, catalog: &Catalog) -> Result<usize> {
        let mut pages = Vec::with_capacity(catalog.tags.len() * CategoryFilter::ALL.len());
        for tag in &catalog.tags {
            let tools = catalog.tools_for(tag);
            let page = TagPage::new(tag, &tools, catalog.description(tag));
            for selection in CategoryFilter::ALL.iter().copied() {
                pages.push(Page {
                    item: page.to_value(selection)?,
                    file_path: self
                        .tags_output_directory
                        .join(&tag.slug)
                        .join(&*selection.file_name()),
                    prev: None,
                    next: None,
                    template: self.tag_template,
                });
            }
        }
        self.write_pages(pages.into_iter())
    }
}

/// An object representing an output HTML file. A [`Page`] can be converted to a
/// [`Value`] and thus rendered in a template via [`Page::to_value`].
struct Page<'a> {
    /// The main item for the page.
    item: Value,

    /// The target location on disk for the output file.
    file_path: PathBuf,

    /// The URL for the previous page, if any.
    prev: Option<Url>,

    /// The URL for the next page, if any.
    next: Option<Url>,

    /// The template with which the page will be rendered.
    template: &'a Template,
}

impl Page<'_> {
    /// Converts a [`Page`] into a [`Value`]. The result is a [`Value::Object`]
    /// with fields `item`, `prev`, and `next` (see [`Page`] for descriptions).
    fn to_value(&self) -> Value {
        let option_to_value = |opt: &Option<Url>| match opt {
            Some(url) => Value::String(url.to_string()),
            None => Value::Nil,
        };

        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("item".to_owned(), self.item.clone());
        m.insert("prev".to_owned(), option_to_value(&self.prev));
        m.insert("next".to_owned(), option_to_value(&self.next));
        Value::Object(m)
    }
}

/// Creates all of the post [`Page`]s for a set of [`Post`]s. Posts are
/// expected newest first, so `prev` links to the newer neighbour.
fn post_pages<'a>(posts: &'a [Post], template: &'a Template) -> impl Iterator<Item = Page<'a>> {
    posts.iter().enumerate().map(move |(i, post)| Page {
        item: post.to_value(),
        file_path: post.file_path.clone(),
        prev: i.checked_sub(1).map(|prev| posts[prev].url.clone()),
        next: posts.get(i + 1).map(|next| next.url.clone()),
        template,
    })
}

/// `Index` represents the collection of [`Post`]s shown on the blog index.
struct Index<'a> {
    /// The base URL for the index pages.
    url: &'a Url,

    /// The output directory for the index pages.
    output_directory: &'a Path,

    /// The posts on the index, newest first.
    posts: &'a [Post],
}

impl Index<'_> {
    /// Converts the index to a list of index pages. An index with no posts
    /// still gets a single, empty first page.
    fn to_pages<'t>(
        &self,
        index_page_size: usize,
        index_template: &'t Template,
    ) -> Result<Vec<Page<'t>>> {
        if self.posts.is_empty() {
            return Ok(vec![Page {
                item: Value::Array(Vec::new()),
                file_path: self.output_directory.join(page_file_name(0)),
                prev: None,
                next: None,
                template: index_template,
            }]);
        }

        let chunks: Vec<&[Post]> = self.posts.chunks(index_page_size).collect();
        let total_pages = chunks.len();
        let mut pages = Vec::with_capacity(total_pages);
        for (i, chunk) in chunks.into_iter().enumerate() {
            pages.push(Page {
                item: Value::Array(chunk.iter().map(Post::summarize).collect()),
                file_path: self.output_directory.join(page_file_name(i)),
                prev: match i {
                    0 => None,
                    _ => Some(self.url.join(&page_file_name(i - 1))?),
                },
                next: match i + 1 < total_pages {
                    false => None,
                    true => Some(self.url.join(&page_file_name(i + 1))?),
                },
                template: index_template,
            });
        }
        Ok(pages)
    }
}

/// The first index page is `index.html`; later ones are numbered.
fn page_file_name(i: usize) -> String {
    match i {
        0 => String::from("index.html"),
        _ => format!("{}.html", i),
    }
}

/// Everything a tag's listing pages show, derived once per tag. Each
/// selection's page is a projection of [`TagPage::listing`].
struct TagPage<'a> {
    tag: &'a Tag,
    title: String,
    description: String,
    listing: Listing,
    about: Option<&'a Description>,
}

impl<'a> TagPage<'a> {
    fn new(tag: &'a Tag, tools: &[Tool], about: Option<&'a Description>) -> TagPage<'a> {
        TagPage {
            tag,
            title: listing::page_title(tag, tools),
            description: listing::meta_description(tag, tools),
            listing: Listing::partition(tools),
            about,
        }
    }

    /// Converts the page for `selection` into a [`Value`] with the fields
    /// `tag`, `title`, `description`, `heading`, `count`, `category`,
    /// `categories`, `maintained`, `deprecated`, `has_deprecated`, and
    /// `about`.
    fn to_value(&self, selection: CategoryFilter) -> Result<Value> {
        let view = self.listing.project(selection);
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("tag".to_owned(), Value::from(self.tag));
        m.insert("title".to_owned(), Value::String(self.title.clone()));
        m.insert(
            "description".to_owned(),
            Value::String(self.description.clone()),
        );
        m.insert("heading".to_owned(), Value::String(heading(self.tag, &view)));
        m.insert("count".to_owned(), Value::from(view.len() as u64));
        m.insert(
            "category".to_owned(),
            Value::String(selection.value().to_owned()),
        );
        m.insert("categories".to_owned(), self.categories(selection)?);
        m.insert("maintained".to_owned(), tools(&view.maintained));
        m.insert("deprecated".to_owned(), tools(&view.deprecated));
        m.insert(
            "has_deprecated".to_owned(),
            Value::Bool(!view.deprecated.is_empty()),
        );
        m.insert(
            "about".to_owned(),
            match self.about {
                Some(about) => {
                    let mut a: HashMap<String, Value> = HashMap::new();
                    a.insert("excerpt".to_owned(), Value::String(about.excerpt.clone()));
                    a.insert(
                        "source".to_owned(),
                        match &about.source {
                            Some(source) => Value::String(source.clone()),
                            None => Value::Nil,
                        },
                    );
                    Value::Object(a)
                }
                None => Value::Nil,
            },
        );
        Ok(Value::Object(m))
    }

    /// The select control's options, each with the URL of its page.
    fn categories(&self, selected: CategoryFilter) -> Result<Value> {
        let mut options = Vec::with_capacity(CategoryFilter::ALL.len());
        for option in CategoryFilter::ALL.iter().copied() {
            let mut m: HashMap<String, Value> = HashMap::new();
            m.insert("value".to_owned(), Value::String(option.value().to_owned()));
            m.insert("label".to_owned(), Value::String(option.label().to_owned()));
            m.insert(
                "url".to_owned(),
                Value::String(self.tag.page_url(&option.file_name())?.to_string()),
            );
            m.insert("selected".to_owned(), Value::Bool(option == selected));
            options.push(Value::Object(m));
        }
        Ok(Value::Array(options))
    }
}

/// The page heading, e.g. `12 Python Static Analysis Tools`. The count is
/// the number of tools displayed for the current selection.
fn heading(tag: &Tag, view: &ListingView) -> String {
    format!("{} {} Static Analysis Tools", view.len(), tag.name)
}

fn tools(tools: &[&Tool]) -> Value {
    Value::Array(tools.iter().map(|t| t.to_value()).collect())
}

/// The result of a fallible page-writing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug, Error)]
pub enum Error {
    /// An error templating a page.
    #[error("rendering `{}`: {message}", .path.display())]
    Render { path: PathBuf, message: String },

    /// An error building a page URL.
    #[error(transparent)]
    UrlParse(#[from] url::ParseError),

    /// An error writing the output files.
    #[error(transparent)]
    Io(#[from] io::Error),
}
