//! Summarises one tag page as plain text lines, for inspecting a catalog from
//! the command line without building the site.

use crate::catalog::Catalog;
use crate::listing::{self, CategoryFilter, Listing, ListingState};
use crate::tool::Tool;
use thiserror::Error;

/// Returns the lines describing the page of the tag matching `key` (a tag
/// value or slug) under `selection`: the page title, the meta description,
/// the selection, and the names of the maintained and deprecated tools it
/// displays.
pub fn describe(
    catalog: &Catalog,
    key: &str,
    selection: CategoryFilter,
) -> Result<Vec<String>> {
    let tag = catalog
        .tag(key)
        .ok_or_else(|| Error::UnknownTag(key.to_owned()))?;

    let tools = catalog.tools_for(tag);
    let listing = Listing::partition(&tools);
    let mut state = ListingState::new(&listing);
    let view = state.select(selection);

    Ok(vec![
        listing::page_title(tag, &tools),
        listing::meta_description(tag, &tools),
        format!("category:   {}", view.selection),
        format!("maintained: {}", names(&view.maintained)),
        format!("deprecated: {}", names(&view.deprecated)),
    ])
}

fn names(tools: &[&Tool]) -> String {
    tools
        .iter()
        .map(|t| t.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// The result of describing a tag page.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error describing a tag page.
#[derive(Debug, Error)]
pub enum Error {
    /// Returned when no tag has the requested value or slug.
    #[error("no tag `{0}`")]
    UnknownTag(String),
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::tag::{Tag, TagRecord};
    use crate::tool::test::tool;
    use url::Url;

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    fn catalog() -> std::result::Result<Catalog, url::ParseError> {
        let python = Tag::resolve(
            TagRecord {
                name: "Python".to_owned(),
                tag: "python".to_owned(),
                logo: None,
            },
            &Url::parse("https://example.org/tag/")?,
            &Url::parse("https://example.org/static/")?,
        )?;
        let mut tools = vec![
            tool("Black", "MIT", &["formatter"], false),
            tool("Pylint", "GPL", &["linter"], false),
            tool("pep8", "MIT", &["linter"], true),
        ];
        for t in &mut tools {
            t.tags = vec!["python".to_owned()];
        }
        Ok(Catalog::new(tools, vec![python]))
    }

    #[test]
    fn test_describe_linters() -> TestResult {
        let lines = describe(&catalog()?, "python", CategoryFilter::Linter)?;
        assert_eq!(
            vec![
                "Best 3 Python Static Analysis Tools And Linters",
                "3 great linters and formatters for Python: Black, Pylint, pep8 \
                 including three free tools. Improve your code quality with \
                 tools rated by fellow developers.",
                "category:   linter",
                "maintained: Pylint",
                "deprecated: pep8",
            ],
            lines,
        );
        Ok(())
    }

    #[test]
    fn test_describe_any() -> TestResult {
        let lines = describe(&catalog()?, "python", CategoryFilter::Any)?;
        assert_eq!("category:   any", lines[2]);
        assert_eq!("maintained: Black, Pylint", lines[3]);
        Ok(())
    }

    #[test]
    fn test_describe_unknown_tag() -> std::result::Result<(), url::ParseError> {
        assert!(matches!(
            describe(&catalog()?, "cobol", CategoryFilter::Any),
            Err(Error::UnknownTag(tag)) if tag == "cobol"
        ));
        Ok(())
    }
}
