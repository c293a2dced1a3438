//! Read-only glossary front-end for a remote term dictionary API.
//!
//! Each request fetches a fresh [`Directory`] through [`DirectoryClient`],
//! resolves names and aliases, renders Markdown fields and search snippets,
//! and projects the results into embedded HTML templates (see [`pages`]).

pub mod client;
pub mod directory;
pub mod error;
pub mod pages;
pub mod render;
pub mod snippet;
pub mod template;
pub mod term;
#[cfg(feature = "web")]
pub mod web;

pub use client::{DEFAULT_UPSTREAM, DirectoryClient};
pub use directory::{Directory, resolve};
pub use error::UpstreamError;
pub use render::{escape_html, render_highlighted, render_markdown};
pub use snippet::{build_snippet, render_snippet};
pub use template::project;
pub use term::{Identifier, SearchResult, Term};

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Everything except RFC 3986 unreserved characters, so a value always stays
/// a single path segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encodes `value` for use as one URL path segment.
pub fn encode_segment(value: &str) -> String {
    utf8_percent_encode(value, PATH_SEGMENT).to_string()
}
