//! Defines the [`Post`] type, a blog post, and its conversion into template
//! values. See [`crate::parser`] for how posts are read from disk.

use chrono::NaiveDate;
use gtmpl::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use url::Url;

/// The format dates are displayed in, e.g. `April 16, 2021`.
pub const DISPLAY_DATE_FORMAT: &str = "%B %d, %Y";

/// Represents a blog post.
#[derive(Clone, Debug, PartialEq)]
pub struct Post {
    /// The post's identifier: the source file's stem (or the bundle
    /// directory's name).
    pub id: String,

    /// The title from the frontmatter, or the post's slug if the frontmatter
    /// has none.
    pub title: String,

    pub date: NaiveDate,

    /// The location on disk of the rendered post page.
    pub file_path: PathBuf,

    /// The URL of the rendered post page.
    pub url: Url,

    pub tags: Vec<String>,

    /// The full body, rendered to HTML.
    pub body: String,

    /// The excerpt shown on index pages, rendered to HTML.
    pub excerpt: String,

    /// Whether [`Post::excerpt`] leaves out part of the body.
    pub summarized: bool,
}

impl Post {
    fn common_fields(&self) -> HashMap<String, Value> {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("id".to_owned(), Value::String(self.id.clone()));
        m.insert("url".to_owned(), Value::String(self.url.to_string()));
        m.insert("title".to_owned(), Value::String(self.title.clone()));
        m.insert(
            "date".to_owned(),
            Value::String(self.date.format(DISPLAY_DATE_FORMAT).to_string()),
        );
        m.insert(
            "tags".to_owned(),
            Value::Array(
                self.tags.iter().map(|t| Value::String(t.clone())).collect(),
            ),
        );
        m
    }

    /// Converts a [`Post`] into a template [`Value`] for a post page. The
    /// result has the fields `id`, `url`, `title`, `date`, `tags`, and
    /// `body`.
    pub fn to_value(&self) -> Value {
        let mut m = self.common_fields();
        m.insert("body".to_owned(), Value::String(self.body.clone()));
        Value::Object(m)
    }

    /// Converts a [`Post`] into a template [`Value`] for an index page. It's
    /// the same as [`Post::to_value`] except that `body` is replaced by
    /// `summary` (the excerpt) and `summarized` (whether the excerpt leaves
    /// anything out).
    pub fn summarize(&self) -> Value {
        let mut m = self.common_fields();
        m.insert("summary".to_owned(), Value::String(self.excerpt.clone()));
        m.insert("summarized".to_owned(), Value::Bool(self.summarized));
        Value::Object(m)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn post() -> Post {
        Post {
            id: "hello".to_owned(),
            title: "Hello".to_owned(),
            date: NaiveDate::from_ymd_opt(2021, 4, 6).unwrap(),
            file_path: PathBuf::from("/tmp/posts/hello.html"),
            url: Url::parse("https://example.org/posts/hello.html").unwrap(),
            tags: vec!["news".to_owned()],
            body: "<p>Body</p>".to_owned(),
            excerpt: "<p>Bo…</p>".to_owned(),
            summarized: true,
        }
    }

    fn field<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
        match value {
            Value::Object(m) => m.get(key),
            _ => None,
        }
    }

    fn string<'a>(value: &'a Value, key: &str) -> &'a str {
        match field(value, key) {
            Some(Value::String(s)) => s,
            _ => panic!("`{}` is not a string", key),
        }
    }

    #[test]
    fn test_to_value_formats_date() {
        let value = post().to_value();
        assert_eq!("April 06, 2021", string(&value, "date"));
        assert_eq!("<p>Body</p>", string(&value, "body"));
        assert_eq!("https://example.org/posts/hello.html", string(&value, "url"));
    }

    #[test]
    fn test_summarize_replaces_body() {
        let value = post().summarize();
        assert!(matches!(field(&value, "summarized"), Some(Value::Bool(true))));
        assert_eq!("<p>Bo…</p>", string(&value, "summary"));
        assert!(field(&value, "body").is_none());
    }
}
