//! Defines the [`Tool`] and [`Votes`] types, which represent a single entry
//! in the tool directory, and their conversion into template values.

use gtmpl::Value;
use serde::Deserialize;
use std::collections::HashMap;

/// The substring of a license string which marks a tool as non-free.
pub const PROPRIETARY: &str = "proprietary";

/// A cataloged static analysis tool (a linter, a formatter, or both). Tools
/// are loaded once per build and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Tool {
    /// The unique identifier for the tool. This isn't read from the YAML
    /// record; it's the stem of the record's file name.
    #[serde(skip)]
    pub id: String,

    /// The tool's display name.
    pub name: String,

    /// The tool's license, e.g. `MIT` or `proprietary`.
    pub license: String,

    /// The categories the tool belongs to, e.g. `linter` or `formatter`.
    #[serde(default)]
    pub categories: Vec<String>,

    /// Whether the tool is no longer maintained.
    #[serde(default)]
    pub deprecated: bool,

    #[serde(default)]
    pub description: String,

    /// Free-form tags. A tool is listed on the page of every tag named here.
    #[serde(default)]
    pub tags: Vec<String>,

    /// The kinds of artifact the tool ships as, e.g. `cli` or `service`.
    #[serde(default)]
    pub types: Vec<String>,

    #[serde(default)]
    pub homepage: Option<String>,

    #[serde(default)]
    pub source: Option<String>,

    /// The tool's vote aggregate. Filled in from the votes file after
    /// loading.
    #[serde(skip)]
    pub votes: Votes,
}

impl Tool {
    /// Returns `true` unless the license mentions [`PROPRIETARY`].
    pub fn is_free(&self) -> bool {
        !self.license.contains(PROPRIETARY)
    }

    /// Returns `true` if `category` is one of the tool's categories.
    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }

    /// Returns `true` if `tag` is one of the tool's tags.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn slug(&self) -> String {
        slug::slugify(&self.id)
    }

    /// Converts a [`Tool`] into a [`Value`] for templating.
    pub fn to_value(&self) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("id".to_owned(), Value::String(self.id.clone()));
        m.insert("slug".to_owned(), Value::String(self.slug()));
        m.insert("name".to_owned(), Value::String(self.name.clone()));
        m.insert("license".to_owned(), Value::String(self.license.clone()));
        m.insert("free".to_owned(), Value::Bool(self.is_free()));
        m.insert("categories".to_owned(), strings(&self.categories));
        m.insert("deprecated".to_owned(), Value::Bool(self.deprecated));
        m.insert(
            "description".to_owned(),
            Value::String(self.description.clone()),
        );
        m.insert("tags".to_owned(), strings(&self.tags));
        m.insert("types".to_owned(), strings(&self.types));
        m.insert("homepage".to_owned(), optional(&self.homepage));
        m.insert("source".to_owned(), optional(&self.source));
        m.insert("votes".to_owned(), self.votes.to_value());
        Value::Object(m)
    }
}

fn strings(items: &[String]) -> Value {
    Value::Array(items.iter().map(|s| Value::String(s.clone())).collect())
}

fn optional(s: &Option<String>) -> Value {
    match s {
        Some(s) => Value::String(s.clone()),
        None => Value::Nil,
    }
}

/// The vote aggregate for a [`Tool`]. Tools without any recorded votes have
/// the default (all zero) aggregate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Votes {
    pub sum: i64,
    pub upvotes: u64,
    pub downvotes: u64,
}

impl Votes {
    fn to_value(self) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("sum".to_owned(), Value::from(self.sum));
        m.insert("upVotes".to_owned(), Value::from(self.upvotes));
        m.insert("downVotes".to_owned(), Value::from(self.downvotes));
        Value::Object(m)
    }
}

/// A single record in the votes file. `key` is the [`Tool::id`] the votes
/// belong to.
#[derive(Clone, Debug, Deserialize)]
pub struct VoteRecord {
    pub key: String,

    #[serde(default)]
    pub sum: i64,

    #[serde(default, rename = "upVotes")]
    pub upvotes: u64,

    #[serde(default, rename = "downVotes")]
    pub downvotes: u64,
}

impl VoteRecord {
    pub fn votes(&self) -> Votes {
        Votes {
            sum: self.sum,
            upvotes: self.upvotes,
            downvotes: self.downvotes,
        }
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;

    /// Builds a tool with just enough fields set for listing tests.
    pub(crate) fn tool(name: &str, license: &str, categories: &[&str], deprecated: bool) -> Tool {
        Tool {
            id: name.to_lowercase(),
            name: name.to_owned(),
            license: license.to_owned(),
            categories: categories.iter().map(|c| (*c).to_owned()).collect(),
            deprecated,
            description: String::new(),
            tags: Vec::new(),
            types: Vec::new(),
            homepage: None,
            source: None,
            votes: Votes::default(),
        }
    }

    #[test]
    fn test_deserialize_defaults() -> Result<(), serde_yaml::Error> {
        let tool: Tool = serde_yaml::from_str("name: Flake8\nlicense: MIT\n")?;
        assert_eq!("Flake8", tool.name);
        assert!(tool.categories.is_empty());
        assert!(!tool.deprecated);
        assert_eq!(Votes::default(), tool.votes);
        Ok(())
    }

    #[test]
    fn test_deserialize_full_record() -> Result<(), serde_yaml::Error> {
        let tool: Tool = serde_yaml::from_str(
            r#"
name: Black
categories: [formatter]
tags: [python]
license: MIT
types: [cli]
source: https://github.com/psf/black
homepage: https://black.readthedocs.io
description: The uncompromising Python code formatter.
"#,
        )?;
        assert_eq!(vec!["formatter".to_owned()], tool.categories);
        assert!(tool.has_tag("python"));
        assert!(tool.has_category("formatter"));
        assert!(!tool.has_category("linter"));
        assert_eq!(Some("https://github.com/psf/black".to_owned()), tool.source);
        Ok(())
    }

    #[test]
    fn test_is_free() {
        assert!(tool("Pylint", "GPL", &[], false).is_free());
        assert!(!tool("Sonar", "proprietary", &[], false).is_free());
        assert!(!tool("Mixed", "MIT/proprietary", &[], false).is_free());
        // Only the lowercase spelling marks a tool as non-free.
        assert!(tool("Odd", "Proprietary", &[], false).is_free());
    }

    #[test]
    fn test_vote_record() -> Result<(), serde_yaml::Error> {
        let record: VoteRecord =
            serde_yaml::from_str("key: flake8\nsum: 7\nupVotes: 9\ndownVotes: 2\n")?;
        assert_eq!("flake8", record.key);
        assert_eq!(
            Votes {
                sum: 7,
                upvotes: 9,
                downvotes: 2
            },
            record.votes()
        );
        Ok(())
    }
}
