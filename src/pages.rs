//! Response bodies for each page, assembled from the embedded templates.

use crate::directory::Directory;
use crate::encode_segment;
use crate::render::{escape_html, render_markdown};
use crate::snippet::render_snippet;
use crate::template::project;
use crate::term::{SearchResult, Term};
use chrono::{DateTime, Utc};

pub const INDEX_TEMPLATE: &str = include_str!("../templates/index.html");
pub const TERM_TEMPLATE: &str = include_str!("../templates/term.html");
pub const SEARCH_TEMPLATE: &str = include_str!("../templates/search.html");
pub const NOT_FOUND_TEMPLATE: &str = include_str!("../templates/404.html");
pub const NO_QUERY_TEMPLATE: &str = include_str!("../templates/noquery.html");
pub const ERROR_TEMPLATE: &str = include_str!("../templates/error.html");

pub const LIST: &str = "$LIST";
pub const TERM_NAME: &str = "$TERM_NAME";
pub const TERM_ALIASES: &str = "$TERM_ALIASES";
pub const DESCRIPTION: &str = "$DESCRIPTION";
pub const SOURCE: &str = "$SOURCE";
pub const ID: &str = "$ID";
pub const CATEGORY: &str = "$CATEGORY";
pub const CATEGORY_ID: &str = "$CATEGORY_ID";
pub const CREATED: &str = "$CREATED";
pub const QUERY: &str = "$QUERY";
pub const COUNT: &str = "$COUNT";
pub const RESULTS: &str = "$RESULTS";
pub const MESSAGE: &str = "$MESSAGE";

const INDEX_NO_ALIASES: &str = "no aliases";
const TERM_NO_ALIASES: &str = "None";
const CREATED_FORMAT: &str = "%a %b %d %Y";

/// Link target for a term page: `/term/` plus the lower-cased, encoded name.
pub fn term_href(name: &str) -> String {
    format!("/term/{}", encode_segment(&name.to_lowercase()))
}

/// Calendar date in UTC, e.g. `Tue Oct 19 2021`.
pub fn format_created(created: &DateTime<Utc>) -> String {
    created.format(CREATED_FORMAT).to_string()
}

pub fn index_item(term: &Term) -> String {
    format!(
        r#"<li><a href="{href}">{name}</a> ({aliases})</li>"#,
        href = term_href(&term.name),
        name = escape_html(&term.name),
        aliases = escape_html(&term.aliases_or(INDEX_NO_ALIASES)),
    )
}

pub fn index_page(directory: &Directory) -> String {
    let list = directory
        .iter()
        .map(index_item)
        .collect::<Vec<_>>()
        .join("\n");
    project(INDEX_TEMPLATE, &[(LIST, list)])
}

pub fn term_page(term: &Term) -> String {
    let name = escape_html(&term.name);
    project(
        TERM_TEMPLATE,
        &[
            (TERM_NAME, name.clone()),
            (TERM_NAME, name),
            (TERM_ALIASES, escape_html(&term.aliases_or(TERM_NO_ALIASES))),
            (DESCRIPTION, render_markdown(&term.description)),
            (SOURCE, render_markdown(&term.source)),
            (ID, escape_html(&term.id.to_string())),
            (CATEGORY_ID, escape_html(&term.category_id.to_string())),
            (CATEGORY, escape_html(&term.category)),
            (CREATED, format_created(&term.created)),
        ],
    )
}

pub fn search_item(result: &SearchResult) -> String {
    let term = &result.term;
    format!(
        r#"<li><a href="{href}">{name}</a><div class="snippet">{snippet}</div></li>"#,
        href = term_href(&term.name),
        name = escape_html(&term.name),
        snippet = render_snippet(&term.description, result.headline.as_deref()),
    )
}

pub fn search_page(query: &str, results: &[SearchResult]) -> String {
    let items = results.iter().map(search_item).collect::<String>();
    project(
        SEARCH_TEMPLATE,
        &[
            (QUERY, escape_html(query)),
            (COUNT, results.len().to_string()),
            (RESULTS, items),
        ],
    )
}

/// Echoes the requested name back, escaped.
pub fn not_found_page(requested: &str) -> String {
    project(NOT_FOUND_TEMPLATE, &[(TERM_NAME, escape_html(requested))])
}

pub fn no_query_page() -> String {
    NO_QUERY_TEMPLATE.to_string()
}

pub fn error_page(message: &str) -> String {
    project(ERROR_TEMPLATE, &[(MESSAGE, escape_html(message))])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::fixtures::term;

    #[test]
    fn index_item_without_aliases_says_so() {
        let item = index_item(&term("System", &[]));
        assert!(item.contains("(no aliases)"), "{item}");
    }

    #[test]
    fn index_item_joins_aliases() {
        let item = index_item(&term("Fronting", &["A", "B"]));
        assert_eq!(
            item,
            r#"<li><a href="/term/fronting">Fronting</a> (A, B)</li>"#
        );
    }

    #[test]
    fn index_lists_every_term_in_order() {
        let directory = Directory::new(vec![term("Zeta", &[]), term("Alpha", &["a"])]);
        let page = index_page(&directory);
        let zeta = page.find("/term/zeta").expect("zeta listed");
        let alpha = page.find("/term/alpha").expect("alpha listed");
        assert!(zeta < alpha);
        assert!(!page.contains(LIST));
    }

    #[test]
    fn term_href_encodes_and_lowercases() {
        assert_eq!(term_href("Co-Fronting"), "/term/co-fronting");
        assert_eq!(term_href("Plural System"), "/term/plural%20system");
        assert_eq!(term_href("A/B"), "/term/a%2Fb");
        assert_eq!(term_href("Ünï"), "/term/%C3%BCn%C3%AF");
    }

    #[test]
    fn term_names_are_escaped_in_links() {
        let item = index_item(&term("<b>Bold</b>", &["x&y"]));
        assert!(item.contains("&lt;b&gt;Bold&lt;/b&gt;"), "{item}");
        assert!(item.contains("(x&amp;y)"), "{item}");
    }

    #[test]
    fn term_page_fills_every_field() {
        let mut entry = term("Fronting", &[]);
        entry.description = "Being **in control**.".to_string();
        entry.source = "See https://example.com".to_string();
        entry.category = "Experience".to_string();
        entry.category_id = crate::term::Identifier::Number(7);
        let page = term_page(&entry);

        assert!(page.contains("<title>Fronting • Glossary</title>"));
        assert!(page.contains(">Fronting</h1>"));
        assert!(page.contains("Also known as: None"));
        assert!(page.contains("<strong>in control</strong>"));
        assert!(page.contains(r#"<a href="https://example.com">"#));
        assert!(page.contains("Experience (#7)"));
        assert!(page.contains("Tue Oct 19 2021"));
        for placeholder in [
            TERM_NAME,
            TERM_ALIASES,
            DESCRIPTION,
            SOURCE,
            CATEGORY,
            CATEGORY_ID,
            CREATED,
        ] {
            assert!(!page.contains(placeholder), "{placeholder} left in page");
        }
        assert!(!page.contains("<dd>$ID</dd>"));
    }

    #[test]
    fn term_page_keeps_placeholder_text_inside_descriptions() {
        let mut entry = term("Literal", &["alias"]);
        entry.description = "Costs $SOURCE dollars".to_string();
        entry.source = "the source".to_string();
        let page = term_page(&entry);
        assert!(page.contains("Costs $SOURCE dollars"));
        assert!(page.contains("the source"));
        assert!(page.contains("Also known as: alias"));
    }

    #[test]
    fn created_dates_are_calendar_strings() {
        let date = DateTime::from_timestamp(1_633_392_000, 0).unwrap();
        assert_eq!(format_created(&date), "Tue Oct 05 2021");
    }

    #[test]
    fn search_page_reports_count_and_snippets() {
        let mut entry = term("Fox", &[]);
        entry.description = "The quick brown fox jumps".to_string();
        let results = vec![SearchResult {
            term: entry,
            headline: Some("quick <b>brown</b> fox".to_string()),
        }];
        let page = search_page("brown", &results);
        assert!(page.contains(r#"<span id="result-count">1</span>"#));
        assert!(page.contains(r#"<a href="/term/fox">Fox</a>"#));
        assert!(page.contains("...quick <mark>brown</mark> fox..."), "{page}");
    }

    #[test]
    fn empty_search_page_reports_zero() {
        let page = search_page("nothing", &[]);
        assert!(page.contains(r#"<span id="result-count">0</span>"#));
        assert!(!page.contains(RESULTS));
    }

    #[test]
    fn not_found_page_escapes_the_request() {
        let page = not_found_page("<script>alert(1)</script>");
        assert!(page.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!page.contains("<script>alert"));
    }

    #[test]
    fn search_query_is_escaped() {
        let page = search_page("\"><img>", &[]);
        assert!(page.contains("&quot;&gt;&lt;img&gt;"));
    }
}
