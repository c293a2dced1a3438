use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Upstream identifiers arrive either as JSON numbers or strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Identifier {
    Number(i64),
    Text(String),
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Number(value) => write!(f, "{value}"),
            Identifier::Text(value) => f.write_str(value),
        }
    }
}

/// A glossary entry as served by the dictionary API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Term {
    pub id: Identifier,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub aliases: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub source: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    pub category_id: Identifier,
    #[serde(deserialize_with = "deserialize_created")]
    pub created: DateTime<Utc>,
}

impl Term {
    /// True when the already lower-cased `query` equals the name or an alias.
    pub fn matches(&self, query: &str) -> bool {
        self.name.to_lowercase() == query
            || self
                .aliases
                .iter()
                .any(|alias| alias.to_lowercase() == query)
    }

    /// Aliases joined with `", "`, or `fallback` when there are none.
    pub fn aliases_or<'a>(&self, fallback: &'a str) -> std::borrow::Cow<'a, str> {
        if self.aliases.is_empty() {
            std::borrow::Cow::Borrowed(fallback)
        } else {
            std::borrow::Cow::Owned(self.aliases.join(", "))
        }
    }
}

/// One hit from the upstream search endpoint.
///
/// `headline` is the upstream's highlighted excerpt of the description, when
/// it provides one. Both `{"term": {..}, "headline": ..}` and a flat term
/// object carrying a `headline` key are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SearchResultWire")]
pub struct SearchResult {
    pub term: Term,
    pub headline: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SearchResultWire {
    Nested {
        term: Term,
        #[serde(default)]
        headline: Option<String>,
    },
    Flat {
        #[serde(flatten)]
        term: Term,
        #[serde(default)]
        headline: Option<String>,
    },
}

impl From<SearchResultWire> for SearchResult {
    fn from(wire: SearchResultWire) -> Self {
        match wire {
            SearchResultWire::Nested { term, headline }
            | SearchResultWire::Flat { term, headline } => Self { term, headline },
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn deserialize_created<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawTimestamp {
        Millis(i64),
        Text(String),
    }

    match RawTimestamp::deserialize(deserializer)? {
        RawTimestamp::Millis(millis) => DateTime::from_timestamp_millis(millis)
            .ok_or_else(|| de::Error::custom(format!("timestamp {millis} is out of range"))),
        RawTimestamp::Text(text) => parse_timestamp(&text)
            .ok_or_else(|| de::Error::custom(format!("unrecognised timestamp {text:?}"))),
    }
}

fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
