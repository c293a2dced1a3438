//! Markdown to HTML for term descriptions, sources and search snippets.
//!
//! Rendering goes through the `markdown` crate in GFM mode (strikethrough,
//! bare URL autolinks) with raw HTML escaped and unsafe link protocols
//! dropped, so the output can be embedded as-is. Two extensions are applied
//! before compilation:
//!
//! - a single newline inside a paragraph becomes a hard line break;
//! - `__text__` and `___text___` become `<u>text</u>`.
//!
//! Underline and search highlights are carried through the compiler as
//! private-use marker characters and swapped for tags afterwards, which keeps
//! raw HTML disabled. Any marker characters already present in the input are
//! stripped.

use markdown::{Options as MarkdownOptions, to_html_with_options};

const UNDERLINE_OPEN: char = '\u{E000}';
const UNDERLINE_CLOSE: char = '\u{E001}';
const HIGHLIGHT_OPEN: char = '\u{E002}';
const HIGHLIGHT_CLOSE: char = '\u{E003}';

const HIGHLIGHT_START_TAG: &str = "<b>";
const HIGHLIGHT_END_TAG: &str = "</b>";

/// Renders Markdown into sanitized HTML.
pub fn render_markdown(input: &str) -> String {
    compile(&prepare(&strip_markers(input)))
}

/// Like [`render_markdown`], but balanced `<b>…</b>` pairs (the upstream
/// search highlight markup) become `<mark>…</mark>`.
pub fn render_highlighted(input: &str) -> String {
    let stripped = strip_markers(input);
    compile(&prepare(&mark_highlights(&stripped)))
}

/// Escapes text for use in HTML element content and quoted attributes.
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn markdown_options() -> MarkdownOptions {
    let mut options = MarkdownOptions::gfm();
    // Term text comes from the remote API, never trust embedded HTML.
    options.compile.allow_dangerous_html = false;
    options.compile.allow_dangerous_protocol = false;
    options
}

fn compile(source: &str) -> String {
    let html = to_html_with_options(source, &markdown_options())
        .unwrap_or_else(|_| escape_html(source));
    restore_markers(&html)
}

fn is_marker(ch: char) -> bool {
    matches!(
        ch,
        UNDERLINE_OPEN | UNDERLINE_CLOSE | HIGHLIGHT_OPEN | HIGHLIGHT_CLOSE
    )
}

fn strip_markers(input: &str) -> String {
    input.chars().filter(|ch| !is_marker(*ch)).collect()
}

fn restore_markers(html: &str) -> String {
    let mut out = String::with_capacity(html.len() + 16);
    for ch in html.chars() {
        match ch {
            UNDERLINE_OPEN => out.push_str("<u>"),
            UNDERLINE_CLOSE => out.push_str("</u>"),
            HIGHLIGHT_OPEN => out.push_str("<mark>"),
            HIGHLIGHT_CLOSE => out.push_str("</mark>"),
            _ => out.push(ch),
        }
    }
    out
}

fn mark_highlights(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find(HIGHLIGHT_START_TAG) {
        let after = &rest[open + HIGHLIGHT_START_TAG.len()..];
        let Some(close) = after.find(HIGHLIGHT_END_TAG) else {
            break;
        };
        out.push_str(&rest[..open]);
        out.push(HIGHLIGHT_OPEN);
        out.push_str(&after[..close]);
        out.push(HIGHLIGHT_CLOSE);
        rest = &after[close + HIGHLIGHT_END_TAG.len()..];
    }
    out.push_str(rest);
    out
}

struct Fence {
    marker: char,
    len: usize,
    bare: bool,
}

fn fence(line: &str) -> Option<Fence> {
    let trimmed = line.trim_start_matches(' ');
    if line.len() - trimmed.len() > 3 {
        return None;
    }
    let marker = trimmed.chars().next().filter(|ch| *ch == '`' || *ch == '~')?;
    let len = trimmed.chars().take_while(|ch| *ch == marker).count();
    if len < 3 {
        return None;
    }
    Some(Fence {
        marker,
        len,
        bare: trimmed[len..].trim().is_empty(),
    })
}

/// Applies the hard-break and underline extensions line by line, leaving
/// fenced and indented code untouched.
fn prepare(text: &str) -> String {
    let text = text.replace("\r\n", "\n");
    let lines: Vec<&str> = text.split('\n').collect();
    let mut out = String::with_capacity(text.len() + lines.len() * 2);
    let mut open_fence: Option<Fence> = None;
    let mut previous_blank = true;
    let mut in_indented_code = false;

    for (idx, line) in lines.iter().enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        let blank = line.trim().is_empty();
        let opens_code = previous_blank || in_indented_code;
        if open_fence.is_none() && !blank && is_indented(line) && opens_code {
            in_indented_code = true;
            previous_blank = false;
            out.push_str(line);
            continue;
        }
        if !blank {
            in_indented_code = false;
        }
        previous_blank = blank;

        if let Some(candidate) = fence(line) {
            let closes = open_fence.as_ref().is_some_and(|current| {
                candidate.bare && candidate.marker == current.marker && candidate.len >= current.len
            });
            if open_fence.is_none() {
                open_fence = Some(candidate);
            } else if closes {
                open_fence = None;
            }
            out.push_str(line);
            continue;
        }
        if open_fence.is_some() {
            out.push_str(line);
            continue;
        }

        out.push_str(&underline(line));
        let next_has_text = lines
            .get(idx + 1)
            .is_some_and(|next| !next.trim().is_empty());
        if next_has_text
            && !line.trim().is_empty()
            && !line.ends_with("  ")
            && !line.ends_with('\\')
        {
            out.push_str("  ");
        }
    }
    out
}

fn is_indented(line: &str) -> bool {
    line.starts_with("    ") || line.starts_with('\t')
}

fn run_length(chars: &[char], start: usize) -> usize {
    chars[start..]
        .iter()
        .take_while(|ch| **ch == chars[start])
        .count()
}

/// Index of the next run of exactly `len` copies of `target` at or after `from`.
fn find_run(chars: &[char], from: usize, target: char, len: usize) -> Option<usize> {
    let mut idx = from;
    while idx < chars.len() {
        if chars[idx] == target {
            let run = run_length(chars, idx);
            if run == len {
                return Some(idx);
            }
            idx += run;
        } else {
            idx += 1;
        }
    }
    None
}

const URL_PREFIXES: [&str; 3] = ["http://", "https://", "www."];

fn starts_url(chars: &[char], idx: usize) -> bool {
    if idx > 0 && chars[idx - 1].is_alphanumeric() {
        return false;
    }
    URL_PREFIXES.iter().any(|prefix| {
        let mut rest = chars[idx..].iter();
        prefix
            .chars()
            .all(|expected| rest.next().is_some_and(|ch| ch.to_ascii_lowercase() == expected))
    })
}

/// Marks the characters of `chars` that the underline pass must copy as-is:
/// code spans, bare URLs and `](...)` link destinations.
fn verbatim_mask(chars: &[char]) -> Vec<bool> {
    let mut mask = vec![false; chars.len()];
    let mut idx = 0;
    while idx < chars.len() {
        let ch = chars[idx];
        if ch == '\\' {
            idx += 2;
            continue;
        }
        let end = if ch == '`' {
            let run = run_length(chars, idx);
            find_run(chars, idx + run, '`', run).map_or(idx + run, |end| end + run)
        } else if ch == ']' && chars.get(idx + 1) == Some(&'(') {
            destination_end(chars, idx + 1)
        } else if starts_url(chars, idx) {
            chars[idx..]
                .iter()
                .position(|ch| ch.is_whitespace() || *ch == '>')
                .map_or(chars.len(), |len| idx + len)
        } else {
            idx += 1;
            continue;
        };
        mask[idx..end].fill(true);
        idx = end;
    }
    mask
}

/// End (exclusive) of the parenthesised destination opening at `open`.
fn destination_end(chars: &[char], open: usize) -> usize {
    let mut depth = 0usize;
    let mut idx = open;
    while idx < chars.len() {
        match chars[idx] {
            '\\' => idx += 1,
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return idx + 1;
                }
            }
            _ => {}
        }
        idx += 1;
    }
    chars.len()
}

fn underline(line: &str) -> String {
    let leading = line.trim_start();
    if leading.starts_with('[') && leading.contains("]:") {
        // Link reference definition.
        return line.to_string();
    }
    let chars: Vec<char> = line.chars().collect();
    let verbatim = verbatim_mask(&chars);
    let mut out = String::with_capacity(line.len());
    let mut idx = 0;

    while idx < chars.len() {
        let ch = chars[idx];
        if verbatim[idx] {
            out.push(ch);
            idx += 1;
            continue;
        }
        if ch == '\\' && idx + 1 < chars.len() {
            out.push(ch);
            out.push(chars[idx + 1]);
            idx += 2;
            continue;
        }
        let run = run_length(&chars, idx);
        if ch == '_' && (run == 2 || run == 3) {
            let opens_word = idx == 0 || !chars[idx - 1].is_alphanumeric();
            let mut from = idx + run;
            let close = loop {
                match find_run(&chars, from, '_', run) {
                    Some(at) if verbatim[at] => from = at + run,
                    found => break found.filter(|_| opens_word),
                }
            };
            if let Some(close) = close {
                let inner = &chars[idx + run..close];
                let closes_word = chars
                    .get(close + run)
                    .is_none_or(|next| !next.is_alphanumeric());
                let trimmed = inner
                    .first()
                    .zip(inner.last())
                    .is_some_and(|(first, last)| !first.is_whitespace() && !last.is_whitespace());
                if closes_word && trimmed {
                    out.push(UNDERLINE_OPEN);
                    out.extend(inner);
                    out.push(UNDERLINE_CLOSE);
                    idx = close + run;
                    continue;
                }
            }
        }
        out.extend(&chars[idx..idx + run]);
        idx += run;
    }
    out
}
