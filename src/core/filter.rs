//! Typed filter trees parsed from `filter[...]` query parameters

use crate::core::field::FieldValue;
use indexmap::IndexMap;

/// An ordered tree of filter conditions keyed by field path segment.
///
/// The parser produces one entry per `filter[...]` parameter; services can
/// also construct trees programmatically, which is the only way to express
/// the boolean combinators (query strings cannot).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterTree(pub IndexMap<String, FilterEntry>);

/// One condition attached to a field path
#[derive(Debug, Clone, PartialEq)]
pub enum FilterEntry {
    /// Bare value: `filter[title]=rust`
    Literal(FieldValue),

    /// Comma list: `filter[status]=active,draft`
    List(Vec<FieldValue>),

    /// Operator map: `filter[createdAt][gte]=2024-01-01`
    ///
    /// Keys are kept as written; the predicate builder validates them.
    Operators(IndexMap<String, FilterOperand>),

    /// Nested subtree from a dotted path: `filter[category.name]=tools`
    Nested(FilterTree),

    /// Any child tree matches
    Or(Vec<FilterTree>),

    /// Every child tree matches
    And(Vec<FilterTree>),

    /// The child tree does not match
    Not(Box<FilterTree>),
}

/// Right-hand side of an operator entry
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOperand {
    Value(FieldValue),
    List(Vec<FieldValue>),
}

impl FilterTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Insert an entry, replacing any existing entry at the same key
    pub fn insert(&mut self, key: impl Into<String>, entry: FilterEntry) {
        self.0.insert(key.into(), entry);
    }

    /// Chainable insert for programmatic construction
    pub fn with(mut self, key: impl Into<String>, entry: FilterEntry) -> Self {
        self.insert(key, entry);
        self
    }

    pub fn get(&self, key: &str) -> Option<&FilterEntry> {
        self.0.get(key)
    }
}
