//! Defines the [`Tag`] type, which represents a topic (usually a language)
//! under which tools are grouped, and [`TagRecord`], its on-disk form.

use gtmpl::Value;
use serde::Deserialize;
use std::hash::{Hash, Hasher};
use url::Url;

/// A tag as it appears in the tags file. Only `name` and `tag` are required.
#[derive(Clone, Debug, Deserialize)]
pub struct TagRecord {
    /// The display name, e.g. `C++`.
    pub name: String,

    /// The value tools list in their `tags`, e.g. `cpp`.
    pub tag: String,

    /// The logo, either an absolute URL or a path relative to the static
    /// assets URL.
    #[serde(default)]
    pub logo: Option<String>,
}

/// Represents a resolved tag. Unlike [`TagRecord`], a [`Tag`] knows its slug
/// and the URL of its listing page.
#[derive(Clone, Debug)]
pub struct Tag {
    pub name: String,

    /// The value tools list in their `tags`.
    pub tag: String,

    /// The URL-safe identifier, slugified from `tag` so e.g. `C++` and `c++`
    /// resolve to the same value, and so the field can be dropped into a
    /// [`Url`].
    pub slug: String,

    pub logo: Option<Url>,

    /// The URL for the tag's listing page with no category selected. Given a
    /// `tags_url`, this looks like `{tags_url}/{slug}/index.html`.
    pub url: Url,
}

impl Tag {
    /// Resolves a [`TagRecord`] against the tag listing and static asset base
    /// URLs. Both base URLs should end in a trailing slash.
    pub fn resolve(
        record: TagRecord,
        tags_url: &Url,
        static_url: &Url,
    ) -> Result<Tag, url::ParseError> {
        let slug = slug::slugify(&record.tag);
        // `{slug}/` rather than `{slug}`: without the trailing slash
        // `Url::join` treats the slug as a file name and replaces it.
        let url = tags_url.join(&format!("{}/", slug))?.join("index.html")?;
        let logo = match &record.logo {
            Some(logo) => Some(static_url.join(logo)?),
            None => None,
        };
        Ok(Tag {
            name: record.name,
            tag: record.tag,
            slug,
            logo,
            url,
        })
    }

    /// The URL of the listing page for a given file name in this tag's
    /// directory, e.g. `linter.html`.
    pub fn page_url(&self, file_name: &str) -> Result<Url, url::ParseError> {
        self.url.join(file_name)
    }
}

impl Hash for Tag {
    /// Implements [`Hash`] for [`Tag`] by delegating directly to the `slug`
    /// field.
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.slug.hash(state)
    }
}

impl PartialEq for Tag {
    /// Implements [`PartialEq`] and [`Eq`] for [`Tag`] by delegating directly
    /// to the `slug` field.
    fn eq(&self, other: &Self) -> bool {
        self.slug == other.slug
    }
}
impl Eq for Tag {}

impl From<&Tag> for Value {
    /// Converts [`Tag`]s into [`Value`]s for templating.
    fn from(t: &Tag) -> Value {
        use std::collections::HashMap;
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("name".to_owned(), Value::String(t.name.clone()));
        m.insert("tag".to_owned(), Value::String(t.tag.clone()));
        m.insert("slug".to_owned(), Value::String(t.slug.clone()));
        m.insert(
            "logo".to_owned(),
            match &t.logo {
                Some(logo) => Value::String(logo.to_string()),
                None => Value::Nil,
            },
        );
        m.insert("url".to_owned(), Value::String(t.url.to_string()));
        Value::Object(m)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn record(name: &str, tag: &str, logo: Option<&str>) -> TagRecord {
        TagRecord {
            name: name.to_owned(),
            tag: tag.to_owned(),
            logo: logo.map(str::to_owned),
        }
    }

    #[test]
    fn test_resolve() -> Result<(), url::ParseError> {
        let tags_url = Url::parse("https://example.org/tag/")?;
        let static_url = Url::parse("https://example.org/static/")?;
        let tag = Tag::resolve(
            record("Python", "python", Some("logos/python.svg")),
            &tags_url,
            &static_url,
        )?;
        assert_eq!("python", tag.slug);
        assert_eq!("https://example.org/tag/python/index.html", tag.url.as_str());
        assert_eq!(
            Some("https://example.org/static/logos/python.svg"),
            tag.logo.as_ref().map(Url::as_str),
        );
        assert_eq!(
            "https://example.org/tag/python/linter.html",
            tag.page_url("linter.html")?.as_str(),
        );
        Ok(())
    }

    #[test]
    fn test_resolve_slugifies_and_keeps_absolute_logo() -> Result<(), url::ParseError> {
        let tags_url = Url::parse("https://example.org/tag/")?;
        let static_url = Url::parse("https://example.org/static/")?;
        let tag = Tag::resolve(
            record("Shell", "Bash Script", Some("https://cdn.example.com/sh.png")),
            &tags_url,
            &static_url,
        )?;
        assert_eq!("bash-script", tag.slug);
        assert_eq!(
            Some("https://cdn.example.com/sh.png"),
            tag.logo.as_ref().map(Url::as_str),
        );
        Ok(())
    }

    #[test]
    fn test_deserialize_tags_file() -> Result<(), serde_yaml::Error> {
        let records: Vec<TagRecord> = serde_yaml::from_str(
            "- name: Go\n  tag: go\n- name: C++\n  tag: cpp\n  logo: cpp.svg\n",
        )?;
        assert_eq!(2, records.len());
        assert_eq!(None, records[0].logo);
        assert_eq!(Some("cpp.svg".to_owned()), records[1].logo);
        Ok(())
    }
}
