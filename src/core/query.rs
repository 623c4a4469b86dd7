//! Pagination requests and the query-string parser

use crate::core::field::FieldValue;
use crate::core::filter::{FilterEntry, FilterOperand, FilterTree};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Sort direction for a single term
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// One sort term: a dotted field path and a direction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortTerm {
    pub field: String,
    pub direction: SortDirection,
}

impl SortTerm {
    /// Parse a signed field name (`"-createdAt"` means descending)
    pub fn parse(raw: &str) -> Self {
        match raw.strip_prefix('-') {
            Some(field) => Self {
                field: field.to_string(),
                direction: SortDirection::Desc,
            },
            None => Self {
                field: raw.to_string(),
                direction: SortDirection::Asc,
            },
        }
    }

    pub fn asc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            direction: SortDirection::Desc,
        }
    }

    /// Render back to the signed form used in query strings and fingerprints
    pub fn signed(&self) -> String {
        match self.direction {
            SortDirection::Asc => self.field.clone(),
            SortDirection::Desc => format!("-{}", self.field),
        }
    }
}

/// A pagination request as parsed from the query string.
///
/// Cursors are carried verbatim; decoding and range checks are deferred to
/// validation so that parsing stays a pure, infallible function.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageRequest {
    /// Requested page size; `None` means the configured default
    pub size: Option<i64>,

    /// Opaque cursor to page forward from
    pub after: Option<String>,

    /// Opaque cursor to page backward from
    pub before: Option<String>,

    /// Signed sort fields as given (e.g. `["-createdAt", "title"]`)
    pub sort: Vec<String>,

    /// Filter conditions
    pub filter: FilterTree,
}

impl PageRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_size(mut self, size: i64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn after(mut self, cursor: impl Into<String>) -> Self {
        self.after = Some(cursor.into());
        self
    }

    pub fn before(mut self, cursor: impl Into<String>) -> Self {
        self.before = Some(cursor.into());
        self
    }

    pub fn with_sort(mut self, fields: &[&str]) -> Self {
        self.sort = fields.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_filter(mut self, filter: FilterTree) -> Self {
        self.filter = filter;
        self
    }
}

/// Parse raw query pairs into a [`PageRequest`].
///
/// - `page[size]` is parsed as an integer; anything unparseable falls back
///   to the default, matching the reference behavior.
/// - `sort` accepts a comma-joined value or repeated keys.
/// - `filter[<path>]` and `filter[<path>][<op>]` merge into the filter
///   tree: dotted paths become nested entries, comma values become lists,
///   and the literal string `null` becomes a null match.
///
/// Pure function of its input; no validation happens here.
pub fn parse_query(pairs: &[(String, String)]) -> PageRequest {
    let mut request = PageRequest::default();

    for (key, value) in pairs {
        match key.as_str() {
            "page[size]" => request.size = value.parse::<i64>().ok(),
            "page[after]" => request.after = Some(value.clone()),
            "page[before]" => request.before = Some(value.clone()),
            "sort" => request
                .sort
                .extend(value.split(',').filter(|s| !s.is_empty()).map(str::to_string)),
            _ => {
                if let Some(path) = key
                    .strip_prefix("filter[")
                    .and_then(|rest| rest.strip_suffix(']'))
                {
                    merge_filter(&mut request.filter, path, value);
                }
            }
        }
    }

    request
}

/// Merge one `filter[...]` parameter into the tree.
///
/// `path` is the text between the outer brackets, e.g. `createdAt][gte`
/// or `category.name`.
fn merge_filter(tree: &mut FilterTree, path: &str, value: &str) {
    let (field_path, operator) = match path.split_once("][") {
        Some((field, op)) => (field, Some(op)),
        None => (path, None),
    };

    let segments: Vec<&str> = field_path.split('.').filter(|s| !s.is_empty()).collect();
    let Some((leaf, parents)) = segments.split_last() else {
        return;
    };

    let parent = subtree_for(tree, parents);

    match operator {
        Some(op) => {
            let operand = parse_operand(value);
            match parent.0.get_mut(*leaf) {
                Some(FilterEntry::Operators(ops)) => {
                    ops.insert(op.to_string(), operand);
                }
                _ => {
                    let mut ops = IndexMap::new();
                    ops.insert(op.to_string(), operand);
                    parent.insert(*leaf, FilterEntry::Operators(ops));
                }
            }
        }
        None => {
            let entry = match parse_operand(value) {
                FilterOperand::Value(v) => FilterEntry::Literal(v),
                FilterOperand::List(vs) => FilterEntry::List(vs),
            };
            parent.insert(*leaf, entry);
        }
    }
}

/// Walk down `segments`, creating nested subtrees as needed
fn subtree_for<'a>(tree: &'a mut FilterTree, segments: &[&str]) -> &'a mut FilterTree {
    let mut current = tree;
    for segment in segments {
        let entry = current
            .0
            .entry(segment.to_string())
            .or_insert_with(|| FilterEntry::Nested(FilterTree::new()));
        if !matches!(entry, FilterEntry::Nested(_)) {
            *entry = FilterEntry::Nested(FilterTree::new());
        }
        current = match entry {
            FilterEntry::Nested(subtree) => subtree,
            _ => unreachable!("entry was just made Nested"),
        };
    }
    current
}

fn parse_operand(value: &str) -> FilterOperand {
    if value.contains(',') {
        FilterOperand::List(value.split(',').map(parse_scalar).collect())
    } else {
        FilterOperand::Value(parse_scalar(value))
    }
}

fn parse_scalar(value: &str) -> FieldValue {
    if value == "null" {
        FieldValue::Null
    } else {
        FieldValue::String(value.to_string())
    }
}
