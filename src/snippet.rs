//! Search result previews.
//!
//! The upstream search may return a `headline`: an excerpt of the description
//! with matches wrapped in `<b>` tags. The snippet is that excerpt (or the
//! whole description) with `...` added on each side where it does not line
//! up with the description. Alignment is judged by comparing the first and
//! last five characters only. That is a heuristic, not exact truncation
//! detection: an excerpt that happens to start with the same five characters
//! as the description gets no leading ellipsis.

use crate::render::render_highlighted;

const BOUNDARY_CHARS: usize = 5;
const ELLIPSIS: &str = "...";

/// Builds the snippet text for a search hit. A supplied headline is always
/// the base text, even when blank. Texts shorter than five characters are
/// compared whole.
pub fn build_snippet(description: &str, headline: Option<&str>) -> String {
    let base = headline.unwrap_or(description);
    let visible = strip_highlight_tags(base);

    let mut snippet = String::with_capacity(base.len() + 2 * ELLIPSIS.len());
    if head(&visible) != head(description) {
        snippet.push_str(ELLIPSIS);
    }
    snippet.push_str(base);
    if tail(&visible) != tail(description) {
        snippet.push_str(ELLIPSIS);
    }
    snippet
}

/// [`build_snippet`] rendered to HTML, with highlights as `<mark>`.
pub fn render_snippet(description: &str, headline: Option<&str>) -> String {
    render_highlighted(&build_snippet(description, headline))
}

fn strip_highlight_tags(text: &str) -> String {
    text.replace("<b>", "").replace("</b>", "")
}

fn head(text: &str) -> &str {
    text.char_indices()
        .nth(BOUNDARY_CHARS)
        .map_or(text, |(idx, _)| &text[..idx])
}

fn tail(text: &str) -> &str {
    text.char_indices()
        .rev()
        .nth(BOUNDARY_CHARS - 1)
        .map_or(text, |(idx, _)| &text[idx..])
}
