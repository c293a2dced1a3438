use crate::term::Term;
use serde::{Deserialize, Serialize};

/// The full term list fetched for a single request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Directory {
    terms: Vec<Term>,
}

impl Directory {
    pub fn new(terms: Vec<Term>) -> Self {
        Self { terms }
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Term> {
        self.terms.iter()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Resolves a user-supplied name or alias. See [`resolve`].
    pub fn resolve(&self, query: &str) -> Option<&Term> {
        resolve(&self.terms, query)
    }
}

/// Finds the term whose name or alias equals `query`, ignoring case.
///
/// When several terms match (one term's name is another's alias), the one
/// that comes last in directory order is returned.
pub fn resolve<'a>(terms: &'a [Term], query: &str) -> Option<&'a Term> {
    let query = query.to_lowercase();
    terms.iter().rev().find(|term| term.matches(&query))
}
