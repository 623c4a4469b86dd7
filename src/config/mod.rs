//! Pagination configuration and the filter field schema

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Page size limits, passed explicitly to the paginator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageConfig {
    /// Page size applied when the request does not specify one
    pub default_size: i64,

    /// Largest page size a client may request
    pub max_size: i64,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            default_size: 10,
            max_size: 50,
        }
    }
}

/// Declares which filter paths carry date, enum, or to-one relation semantics.
///
/// Date and enum kinds match on the final path segment; relations match on
/// the segment naming the related entity. Undeclared fields get plain text
/// semantics (case-insensitive substring match).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterSchema {
    #[serde(default)]
    pub date_fields: HashSet<String>,

    #[serde(default)]
    pub enum_fields: HashSet<String>,

    #[serde(default)]
    pub relation_fields: HashSet<String>,
}

impl FilterSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a date-valued field (matched on the final path segment)
    pub fn date(mut self, field: &str) -> Self {
        self.date_fields.insert(field.to_string());
        self
    }

    /// Declare an enum-valued field (always exact-match)
    pub fn enumeration(mut self, field: &str) -> Self {
        self.enum_fields.insert(field.to_string());
        self
    }

    /// Declare a to-one relation field
    pub fn relation(mut self, field: &str) -> Self {
        self.relation_fields.insert(field.to_string());
        self
    }

    pub fn is_date(&self, segment: &str) -> bool {
        self.date_fields.contains(segment)
    }

    pub fn is_enum(&self, segment: &str) -> bool {
        self.enum_fields.contains(segment)
    }

    pub fn is_relation(&self, segment: &str) -> bool {
        self.relation_fields.contains(segment)
    }
}
