//! The library code for the `toolsite` static site generator, which builds a
//! directory of static analysis tools (linters and formatters) plus a blog.
//! The architecture can be generally broken down into three steps:
//!
//! 1. Parsing blog posts from source files on disk ([`crate::parser`])
//! 2. Loading the tool catalog: tools, tags, votes, and tag descriptions
//!    ([`crate::catalog`])
//! 3. Converting both into output files on disk ([`crate::write`])
//!
//! The blog side of the third step is a paginated index plus one page per
//! post. The tag side is where the interesting derivation happens
//! ([`crate::listing`]): each tag's tools are split into maintained and
//! deprecated partitions, summarised into a page title and meta description,
//! and projected through each category selection (any, formatter, linter).
//! Every selection gets its own pre-rendered page, so a theme's category
//! control only has to link between them.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod catalog;
pub mod config;
pub mod describe;
pub mod listing;
pub mod markdown;
pub mod parser;
pub mod post;
pub mod tag;
pub mod tool;
pub mod write;
