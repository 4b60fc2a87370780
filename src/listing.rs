//! Derives what a tag's listing page shows from the tools under that tag:
//! the title phrase and meta description ([`title_phrase`],
//! [`meta_description`]) and the category-filtered maintained and deprecated
//! lists ([`apply_category_filter`]).
//!
//! Everything here is infallible and free of side effects. The maintained and
//! deprecated partitions are computed once ([`Listing::partition`]) and never
//! mutated; every selection is a fresh projection of them.

use crate::tag::Tag;
use crate::tool::Tool;
use log::debug;
use std::borrow::Cow;
use std::fmt;

/// The number of tools named in a meta description.
const EXAMPLE_TOOLS: usize = 3;

/// Listings with fewer tools than this get the generic title phrase.
const COUNTED_TITLE_MIN: usize = 3;

const CLOSING_SENTENCE: &str =
    ". Improve your code quality with tools rated by fellow developers.";

/// Returns the phrase that leads a tag page's title: `The best` for short
/// listings and `Best {count}` otherwise.
pub fn title_phrase(tools: &[Tool]) -> String {
    if tools.len() < COUNTED_TITLE_MIN {
        String::from("The best")
    } else {
        format!("Best {}", tools.len())
    }
}

/// Returns the full page title for a tag page, e.g. `Best 12 Python Static
/// Analysis Tools And Linters`.
pub fn page_title(tag: &Tag, tools: &[Tool]) -> String {
    format!(
        "{} {} Static Analysis Tools And Linters",
        title_phrase(tools),
        tag.name
    )
}

/// Builds the meta description for a tag page. It names up to three example
/// tools, counts the free ones, and always ends in the same closing sentence.
/// An empty `tools` gives a degenerate but well-formed sentence.
pub fn meta_description(tag: &Tag, tools: &[Tool]) -> String {
    let examples: Vec<&str> = tools
        .iter()
        .take(EXAMPLE_TOOLS)
        .map(|t| t.name.as_str())
        .collect();
    let free = tools.iter().filter(|t| t.is_free()).count();

    let mut desc = if tools.len() > 1 {
        format!("{} great linters and formatters", tools.len())
    } else {
        String::from("Great linter")
    };
    desc.push_str(" for ");
    desc.push_str(&tag.name);

    desc.push_str(if tools.len() > EXAMPLE_TOOLS { " like " } else { ": " });
    desc.push_str(&examples.join(", "));

    // The singular arm can't fire under `free > 1`. It's kept so the phrasing
    // for a single free tool doesn't change if the guard ever does.
    if free > 1 {
        desc.push_str(&format!(
            " including {} free {}",
            number_word(free),
            if free == 1 { "tool" } else { "tools" }
        ));
    }

    desc.push_str(CLOSING_SENTENCE);
    desc
}

/// Spells out one through five; everything else stays a numeral.
pub fn number_word(n: usize) -> Cow<'static, str> {
    match n {
        1 => Cow::Borrowed("one"),
        2 => Cow::Borrowed("two"),
        3 => Cow::Borrowed("three"),
        4 => Cow::Borrowed("four"),
        5 => Cow::Borrowed("five"),
        _ => Cow::Owned(n.to_string()),
    }
}

/// The category selection on a tag page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CategoryFilter {
    Any,
    Formatter,
    Linter,
}

impl CategoryFilter {
    /// Every selection, in the order the options are presented.
    pub const ALL: [CategoryFilter; 3] = [
        CategoryFilter::Any,
        CategoryFilter::Formatter,
        CategoryFilter::Linter,
    ];

    /// The option's value, e.g. `formatter`.
    pub fn value(self) -> &'static str {
        match self {
            CategoryFilter::Any => "any",
            CategoryFilter::Formatter => "formatter",
            CategoryFilter::Linter => "linter",
        }
    }

    /// The option's display label, e.g. `Formatter`.
    pub fn label(self) -> &'static str {
        match self {
            CategoryFilter::Any => "Any",
            CategoryFilter::Formatter => "Formatter",
            CategoryFilter::Linter => "Linter",
        }
    }

    /// The tool category a tool must carry to pass the filter, or `None`
    /// if every tool passes.
    pub fn category(self) -> Option<&'static str> {
        match self {
            CategoryFilter::Any => None,
            CategoryFilter::Formatter => Some("formatter"),
            CategoryFilter::Linter => Some("linter"),
        }
    }

    /// The file name of this selection's listing page within a tag's
    /// directory.
    pub fn file_name(self) -> Cow<'static, str> {
        match self {
            CategoryFilter::Any => Cow::Borrowed("index.html"),
            other => Cow::Owned(format!("{}.html", other.value())),
        }
    }

    /// Returns `true` if `tool` passes the filter.
    pub fn admits(self, tool: &Tool) -> bool {
        match self.category() {
            None => true,
            Some(category) => tool.has_category(category),
        }
    }
}

impl Default for CategoryFilter {
    fn default() -> Self {
        CategoryFilter::Any
    }
}

impl From<&str> for CategoryFilter {
    /// Converts an option value into a [`CategoryFilter`]. Values other than
    /// `formatter` and `linter` select [`CategoryFilter::Any`].
    fn from(value: &str) -> CategoryFilter {
        match value {
            "any" => CategoryFilter::Any,
            "formatter" => CategoryFilter::Formatter,
            "linter" => CategoryFilter::Linter,
            other => {
                debug!("unknown category `{}`; selecting `any`", other);
                CategoryFilter::Any
            }
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.value())
    }
}

/// Projects the maintained and deprecated partitions through `selection`.
/// Each partition is filtered independently and keeps its relative order;
/// no tool ever moves from one partition to the other.
pub fn apply_category_filter<'a>(
    selection: CategoryFilter,
    maintained: &'a [Tool],
    deprecated: &'a [Tool],
) -> (Vec<&'a Tool>, Vec<&'a Tool>) {
    let project = |tools: &'a [Tool]| -> Vec<&'a Tool> {
        tools.iter().filter(|t| selection.admits(t)).collect()
    };
    (project(maintained), project(deprecated))
}

/// The tools under a tag, split once by their `deprecated` flag.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Listing {
    maintained: Vec<Tool>,
    deprecated: Vec<Tool>,
}

impl Listing {
    /// Splits `tools` into maintained and deprecated partitions, keeping the
    /// input order within each.
    pub fn partition(tools: &[Tool]) -> Listing {
        let (deprecated, maintained): (Vec<Tool>, Vec<Tool>) =
            tools.iter().cloned().partition(|t| t.deprecated);
        Listing {
            maintained,
            deprecated,
        }
    }

    pub fn maintained(&self) -> &[Tool] {
        &self.maintained
    }

    pub fn deprecated(&self) -> &[Tool] {
        &self.deprecated
    }

    /// Returns the view for `selection`.
    pub fn project(&self, selection: CategoryFilter) -> ListingView<'_> {
        let (maintained, deprecated) =
            apply_category_filter(selection, &self.maintained, &self.deprecated);
        ListingView {
            selection,
            maintained,
            deprecated,
        }
    }
}

/// The tools displayed for one selection.
#[derive(Clone, Debug, PartialEq)]
pub struct ListingView<'a> {
    pub selection: CategoryFilter,
    pub maintained: Vec<&'a Tool>,
    pub deprecated: Vec<&'a Tool>,
}

impl ListingView<'_> {
    /// The number of tools displayed across both partitions.
    pub fn len(&self) -> usize {
        self.maintained.len() + self.deprecated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A live selection over a [`Listing`]. Starts at [`CategoryFilter::Any`];
/// every [`ListingState::select`] replaces the displayed view.
#[derive(Debug)]
pub struct ListingState<'a> {
    listing: &'a Listing,
    view: ListingView<'a>,
}

impl<'a> ListingState<'a> {
    pub fn new(listing: &'a Listing) -> ListingState<'a> {
        ListingState {
            listing,
            view: listing.project(CategoryFilter::default()),
        }
    }

    /// Changes the selection and recomputes the displayed view.
    pub fn select(&mut self, selection: CategoryFilter) -> &ListingView<'a> {
        self.view = self.listing.project(selection);
        &self.view
    }

    pub fn selection(&self) -> CategoryFilter {
        self.view.selection
    }

    pub fn view(&self) -> &ListingView<'a> {
        &self.view
    }
}
