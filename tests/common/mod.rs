//! Shared helpers for the integration tests.
//!
//! Import with `mod common; use common::*;` at the top of each test file.

#![allow(dead_code)]

pub mod fake_dictionary_api;

pub use fake_dictionary_api::FakeDictionaryApi;

use serde_json::{Value, json};

/// A term object shaped like the upstream `/list` entries.
pub fn term_json(id: i64, name: &str, aliases: &[&str], description: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "aliases": aliases,
        "description": description,
        "source": "",
        "category": "General",
        "category_id": 1,
        "created": 1_634_644_800_000_i64,
    })
}
