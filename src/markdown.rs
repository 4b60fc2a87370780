//! Markdown handling shared by blog posts and tag descriptions: splitting
//! YAML frontmatter from the body ([`split_frontmatter`]), rendering the body
//! to HTML ([`to_html`]), and cutting excerpts ([`excerpt`]).

use pulldown_cmark::escape::escape_html;
use pulldown_cmark::{html, CowStr, Event, LinkType, Options, Parser, Tag};
use std::io;
use thiserror::Error;
use url::{ParseError, Url};

/// Separates an excerpt from the rest of a document. Everything above it is
/// the excerpt.
pub const FOLD_TAG: &str = "<!-- more -->";

/// The number of levels by which headings are demoted, so a `#` in a source
/// file sits below both the site title (h1) and the page title (h2).
const HEADING_OFFSET: u32 = 2;

/// Splits a source file into its frontmatter and body. The file must open
/// with a `---` fence, and the frontmatter ends at the next `---`.
pub fn split_frontmatter(input: &str) -> Result<(&str, &str)> {
    const FENCE: &str = "---";
    if !input.starts_with(FENCE) {
        return Err(Error::FrontmatterMissingStartFence);
    }
    let rest = &input[FENCE.len()..];
    match rest.find(FENCE) {
        None => Err(Error::FrontmatterMissingEndFence),
        Some(offset) => Ok((&rest[..offset], &rest[offset + FENCE.len()..])),
    }
}

fn options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

/// Converts markdown to HTML, appending the result to `out`. Headings are
/// demoted by two levels (capped at h6). When `base` is given, relative link
/// and image targets are resolved against it, so the HTML reads the same
/// wherever it's placed (a post page, a blog index page, etc).
pub fn to_html(out: &mut String, markdown: &str, base: Option<&Url>) -> Result<()> {
    let events = Parser::new_ext(markdown, options())
        .map(|ev| convert(ev, base))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    html::push_html(out, events.into_iter());
    Ok(())
}

fn convert<'a>(
    ev: Event<'a>,
    base: Option<&Url>,
) -> std::result::Result<Event<'a>, ParseError> {
    Ok(match ev {
        Event::Start(tag) => Event::Start(convert_tag(tag, base)?),
        Event::End(Tag::Heading(level)) => Event::End(Tag::Heading(demote(level))),
        _ => ev,
    })
}

fn convert_tag<'a>(
    tag: Tag<'a>,
    base: Option<&Url>,
) -> std::result::Result<Tag<'a>, ParseError> {
    Ok(match (tag, base) {
        (Tag::Heading(level), _) => Tag::Heading(demote(level)),
        // The renderer adds `mailto:` to email autolinks itself.
        (Tag::Link(LinkType::Email, target, title), _) => {
            Tag::Link(LinkType::Email, target, title)
        }
        (Tag::Link(kind, target, title), Some(base)) => {
            Tag::Link(kind, resolve(base, target)?, title)
        }
        (Tag::Image(kind, target, title), Some(base)) => {
            Tag::Image(kind, resolve(base, target)?, title)
        }
        (tag, _) => tag,
    })
}

/// Joins a relative `target` onto `base`. Absolute URLs and in-page anchors
/// are left alone.
fn resolve<'a>(
    base: &Url,
    target: CowStr<'a>,
) -> std::result::Result<CowStr<'a>, ParseError> {
    if target.is_empty() || target.starts_with('#') {
        return Ok(target);
    }
    match Url::parse(&target) {
        Ok(_) => Ok(target),
        Err(ParseError::RelativeUrlWithoutBase) => {
            let resolved = base.join(&target)?;
            Ok(CowStr::Boxed(resolved.to_string().into_boxed_str()))
        }
        Err(e) => Err(e),
    }
}

fn demote(level: u32) -> u32 {
    std::cmp::min(level + HEADING_OFFSET, 6)
}

/// Returns the HTML excerpt of a markdown document. If the document contains
/// [`FOLD_TAG`], the excerpt is the rendered markdown above it. Otherwise
/// it's the document's plain text, cut at a word boundary to at most
/// `prune_length` characters (plus a trailing ellipsis) and wrapped in a
/// paragraph.
///
/// The second element is `true` if the excerpt leaves anything out. `base`
/// is passed to [`to_html`] for the folded case.
pub fn excerpt(
    markdown: &str,
    prune_length: usize,
    base: Option<&Url>,
) -> Result<(String, bool)> {
    let mut out = String::new();
    if let Some(i) = markdown.find(FOLD_TAG) {
        to_html(&mut out, &markdown[..i], base)?;
        let rest = markdown[i + FOLD_TAG.len()..].trim();
        return Ok((out, !rest.is_empty()));
    }

    let text = plain_text(markdown);
    if text.is_empty() {
        return Ok((out, false));
    }
    let (pruned, truncated) = prune(&text, prune_length);
    out.push_str("<p>");
    escape_html(&mut out, pruned)?;
    if truncated {
        out.push('…');
    }
    out.push_str("</p>");
    Ok((out, truncated))
}

/// Collects the text of a markdown document, with block boundaries and line
/// breaks collapsed into single spaces.
fn plain_text(markdown: &str) -> String {
    let mut text = String::new();
    for ev in Parser::new_ext(markdown, options()) {
        match ev {
            Event::Text(s) | Event::Code(s) => text.push_str(&s),
            Event::SoftBreak
            | Event::HardBreak
            | Event::End(Tag::Paragraph)
            | Event::End(Tag::Heading(_))
            | Event::End(Tag::Item)
            | Event::End(Tag::BlockQuote)
            | Event::End(Tag::CodeBlock(_))
            | Event::End(Tag::TableCell) => {
                if !text.is_empty() && !text.ends_with(' ') {
                    text.push(' ');
                }
            }
            _ => {}
        }
    }
    text.trim_end().to_owned()
}

/// Cuts `text` to at most `max` characters, backing up to the last
/// whitespace if the cut falls inside a word. A single word longer than
/// `max` is cut mid-word.
fn prune(text: &str, max: usize) -> (&str, bool) {
    let end = match text.char_indices().nth(max) {
        None => return (text, false),
        Some((end, _)) => end,
    };
    let head = &text[..end];
    if text[end..].starts_with(char::is_whitespace) {
        return (head.trim_end(), true);
    }
    match head.rfind(char::is_whitespace) {
        Some(space) => (head[..space].trim_end(), true),
        None => (head, true),
    }
}

/// Represents the result of a markdown operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error handling a markdown source file.
#[derive(Debug, Error)]
pub enum Error {
    /// Returned when a source file is missing its starting frontmatter
    /// fence (`---`).
    #[error("source file must begin with `---`")]
    FrontmatterMissingStartFence,

    /// Returned when the starting fence was found but the closing one was
    /// missing.
    #[error("missing closing `---`")]
    FrontmatterMissingEndFence,

    /// Returned when a link target can't be resolved.
    #[error("resolving link: {0}")]
    UrlParse(#[from] ParseError),

    /// Returned when writing rendered output fails.
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod test {
    use super::*;

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn test_split_frontmatter() -> Result<()> {
        let (yaml, body) = split_frontmatter("---\ntitle: Hi\n---\n# Body\n")?;
        assert_eq!("\ntitle: Hi\n", yaml);
        assert_eq!("\n# Body\n", body);
        Ok(())
    }

    #[test]
    fn test_split_frontmatter_missing_fences() {
        assert!(matches!(
            split_frontmatter("title: Hi\n---\n"),
            Err(Error::FrontmatterMissingStartFence)
        ));
        assert!(matches!(
            split_frontmatter("---\ntitle: Hi\n"),
            Err(Error::FrontmatterMissingEndFence)
        ));
    }

    #[test]
    fn test_to_html_demotes_headings() -> Result<()> {
        let mut out = String::new();
        to_html(&mut out, "# Title\n\n#### Deep\n\ntext", None)?;
        assert!(out.contains("<h3>Title</h3>"), "{}", out);
        assert!(out.contains("<h6>Deep</h6>"), "{}", out);
        assert!(out.contains("<p>text</p>"), "{}", out);
        Ok(())
    }

    #[test]
    fn test_to_html_resolves_relative_links() -> TestResult {
        let base = Url::parse("https://example.org/posts/second/")?;
        let mut out = String::new();
        to_html(
            &mut out,
            "![chart](chart.svg) [up](../first.html) \
             [ext](https://rust-lang.org/) [here](#notes)",
            Some(&base),
        )?;
        let chart = r#"src="https://example.org/posts/second/chart.svg""#;
        assert!(out.contains(chart), "{}", out);
        let up = r#"href="https://example.org/posts/first.html""#;
        assert!(out.contains(up), "{}", out);
        assert!(out.contains(r#"href="https://rust-lang.org/""#), "{}", out);
        assert!(out.contains(r##"href="#notes""##), "{}", out);
        Ok(())
    }

    #[test]
    fn test_to_html_without_base_keeps_links() -> Result<()> {
        let mut out = String::new();
        to_html(&mut out, "![chart](chart.svg)", None)?;
        assert!(out.contains(r#"src="chart.svg""#), "{}", out);
        Ok(())
    }

    #[test]
    fn test_excerpt_uses_fold() -> Result<()> {
        let markdown = "Intro *text*.\n\n<!-- more -->\n\nRest.";
        let (html, more) = excerpt(markdown, 5, None)?;
        assert_eq!("<p>Intro <em>text</em>.</p>\n", html);
        assert!(more);
        Ok(())
    }

    #[test]
    fn test_excerpt_short_document_is_whole() -> Result<()> {
        let (html, more) = excerpt("Ruff is *fast*.", 140, None)?;
        assert_eq!("<p>Ruff is fast.</p>", html);
        assert!(!more);
        Ok(())
    }

    #[test]
    fn test_excerpt_prunes_at_word_boundary() -> Result<()> {
        let (html, more) = excerpt("one two three four", 10, None)?;
        assert_eq!("<p>one two…</p>", html);
        assert!(more);
        Ok(())
    }

    #[test]
    fn test_excerpt_escapes_and_joins_blocks() -> Result<()> {
        let (html, _) = excerpt("# Heading\n\nA < b & `code`", 140, None)?;
        assert_eq!("<p>Heading A &lt; b &amp; code</p>", html);
        Ok(())
    }

    #[test]
    fn test_prune() {
        assert_eq!(("abc", false), prune("abc", 3));
        assert_eq!(("abc", true), prune("abc def", 4));
        assert_eq!(("abc", true), prune("abc def", 3));
        assert_eq!(("abcde", true), prune("abcdefgh", 5));
        assert_eq!(("é", true), prune("é ü", 2));
    }
}
