//! Backend-neutral predicates, ordering, and request normalization
//!
//! This is where stringly-typed input stops: the typed filter tree and sort
//! spec are lowered into a [`Predicate`] and an ordering that any backend
//! can interpret, plus the keyset boundary condition when a cursor is
//! present. The module also carries the reference interpretation
//! ([`Predicate::matches`]) used by the in-memory backend.

use crate::config::{FilterSchema, PageConfig};
use crate::core::cursor::{self, CursorPayload};
use crate::core::error::PageError;
use crate::core::field::FieldValue;
use crate::core::filter::{FilterEntry, FilterOperand, FilterTree};
use crate::core::query::{PageRequest, SortDirection, SortTerm};
use crate::core::record::{Record, lookup};
use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use std::cmp::Ordering;
use std::sync::OnceLock;
use uuid::Uuid;

/// Comparison operators understood by the predicate layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
}

/// A backend-neutral boolean condition over a record
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Matches every record
    True,

    /// Compare a field against a value
    Compare {
        path: String,
        op: CompareOp,
        value: FieldValue,
    },

    /// Substring match on a text field; `ci` selects case-insensitive
    Contains {
        path: String,
        needle: String,
        ci: bool,
    },

    /// Field equals any of the values
    In {
        path: String,
        values: Vec<FieldValue>,
    },

    /// Field is null, or the to-one relation is absent
    IsNull { path: String },

    /// Condition on a to-one related record; inner paths are relative
    Related {
        path: String,
        predicate: Box<Predicate>,
    },

    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
}

/// One ordering term: a dotted path split into segments, one level per
/// segment, plus a direction
#[derive(Debug, Clone, PartialEq)]
pub struct OrderTerm {
    pub segments: Vec<String>,
    pub direction: SortDirection,
}

impl OrderTerm {
    pub fn path(&self) -> String {
        self.segments.join(".")
    }
}

/// A validated request, ready for predicate building
#[derive(Debug, Clone)]
pub struct NormalizedPageRequest {
    pub size: i64,
    pub cursor: Option<CursorPayload>,
    pub before: bool,
    /// Sort terms with the `id` tie-break appended, making the order total
    pub sort_terms: Vec<SortTerm>,
    pub filter: FilterTree,
}

/// Validate and normalize a parsed request.
///
/// Applies the configured default size, the `[id asc]` default sort, and
/// the trailing `id` tie-break; decodes whichever cursor is present and
/// rejects one issued under a different sort spec.
pub fn validate(
    request: &PageRequest,
    config: &PageConfig,
) -> Result<NormalizedPageRequest, PageError> {
    let size = match request.size {
        Some(s) if s < 1 || s > config.max_size => {
            return Err(PageError::InvalidPageSize {
                size: s,
                max: config.max_size,
            });
        }
        Some(s) => s,
        None => config.default_size,
    };

    if request.after.is_some() && request.before.is_some() {
        return Err(PageError::ConflictingCursors);
    }

    let mut sort_terms: Vec<SortTerm> = request
        .sort
        .iter()
        .map(|s| SortTerm::parse(s))
        .filter(|t| !t.field.is_empty())
        .collect();
    if sort_terms.is_empty() {
        sort_terms.push(SortTerm::asc("id"));
    }
    if !sort_terms.iter().any(|t| t.field == "id") {
        sort_terms.push(SortTerm::asc("id"));
    }

    let before = request.before.is_some();
    let cursor = match request.after.as_deref().or(request.before.as_deref()) {
        Some(token) => {
            let payload = cursor::decode(token)?;
            let expected = cursor::fingerprint(&sort_terms);
            if payload.sort != expected {
                return Err(PageError::CursorSortMismatch {
                    expected,
                    found: payload.sort,
                });
            }
            Some(payload)
        }
        None => None,
    };

    Ok(NormalizedPageRequest {
        size,
        cursor,
        before,
        sort_terms,
        filter: request.filter.clone(),
    })
}

/// Build the ordering from sort terms; dotted paths split into segments
pub fn build_ordering(terms: &[SortTerm]) -> Vec<OrderTerm> {
    terms
        .iter()
        .map(|term| OrderTerm {
            segments: term.field.split('.').map(str::to_string).collect(),
            direction: term.direction,
        })
        .collect()
}

/// Flip every term's direction
pub fn reverse_ordering(ordering: &[OrderTerm]) -> Vec<OrderTerm> {
    ordering
        .iter()
        .map(|term| OrderTerm {
            segments: term.segments.clone(),
            direction: term.direction.reversed(),
        })
        .collect()
}

/// Build the keyset boundary condition for a cursor.
///
/// Single sort field: a strict comparison that excludes the boundary record
/// itself. Multiple fields: the lexicographic disjunction — the i-th
/// disjunct fixes equality on the earlier fields and applies the strict
/// comparison on field i. Normalization guarantees `id` terminates the term
/// list, so the compared tuple is unique per record.
pub fn keyset_condition(payload: &CursorPayload, terms: &[SortTerm], before: bool) -> Predicate {
    if terms.len() == 1 {
        let term = &terms[0];
        let Some(value) = payload.value_for(&term.field) else {
            return Predicate::True;
        };
        return Predicate::Compare {
            path: term.field.clone(),
            op: boundary_op(term.direction, before),
            value,
        };
    }

    let mut disjuncts = Vec::new();
    for (i, term) in terms.iter().enumerate() {
        let Some(value) = payload.value_for(&term.field) else {
            continue;
        };
        let mut conjuncts = Vec::new();
        for prev in &terms[..i] {
            let Some(prev_value) = payload.value_for(&prev.field) else {
                continue;
            };
            conjuncts.push(Predicate::Compare {
                path: prev.field.clone(),
                op: CompareOp::Eq,
                value: prev_value,
            });
        }
        conjuncts.push(Predicate::Compare {
            path: term.field.clone(),
            op: boundary_op(term.direction, before),
            value,
        });
        disjuncts.push(if conjuncts.len() == 1 {
            conjuncts.remove(0)
        } else {
            Predicate::And(conjuncts)
        });
    }

    if disjuncts.is_empty() {
        Predicate::True
    } else {
        Predicate::Or(disjuncts)
    }
}

/// Strict boundary operator: records after the cursor in scan direction.
///
/// `>` when (ascending and paging forward) or (descending and paging
/// backward); `<` otherwise.
fn boundary_op(direction: SortDirection, before: bool) -> CompareOp {
    if (direction == SortDirection::Asc) != before {
        CompareOp::Gt
    } else {
        CompareOp::Lt
    }
}

/// Combine two predicates with logical AND, dropping `True` operands
pub fn and(a: Predicate, b: Predicate) -> Predicate {
    match (a, b) {
        (Predicate::True, b) => b,
        (a, Predicate::True) => a,
        (a, b) => Predicate::And(vec![a, b]),
    }
}

/// Lower a filter tree into a predicate under the given schema
pub fn filter_predicate(tree: &FilterTree, schema: &FilterSchema) -> Result<Predicate, PageError> {
    lower_tree(tree, schema, &[])
}

fn lower_tree(
    tree: &FilterTree,
    schema: &FilterSchema,
    prefix: &[String],
) -> Result<Predicate, PageError> {
    let mut parts = Vec::new();
    for (key, entry) in &tree.0 {
        match entry {
            FilterEntry::Or(children) => {
                let built = children
                    .iter()
                    .map(|child| lower_tree(child, schema, prefix))
                    .collect::<Result<Vec<_>, _>>()?;
                parts.push(Predicate::Or(built));
            }
            FilterEntry::And(children) => {
                let built = children
                    .iter()
                    .map(|child| lower_tree(child, schema, prefix))
                    .collect::<Result<Vec<_>, _>>()?;
                parts.push(Predicate::And(built));
            }
            FilterEntry::Not(child) => {
                parts.push(Predicate::Not(Box::new(lower_tree(child, schema, prefix)?)));
            }
            _ => parts.push(lower_entry(key, entry, schema, prefix)?),
        }
    }

    Ok(match parts.len() {
        0 => Predicate::True,
        1 => parts.remove(0),
        _ => Predicate::And(parts),
    })
}

fn lower_entry(
    key: &str,
    entry: &FilterEntry,
    schema: &FilterSchema,
    prefix: &[String],
) -> Result<Predicate, PageError> {
    let segments: Vec<&str> = key.split('.').filter(|s| !s.is_empty()).collect();

    // A dotted key whose head names a to-one relation wraps the remainder
    // in a related-record condition instead of a flat field condition.
    if segments.len() > 1 && schema.is_relation(segments[0]) {
        let mut relation_path = prefix.to_vec();
        relation_path.push(segments[0].to_string());
        let rest = segments[1..].join(".");
        let inner = lower_entry(&rest, entry, schema, &[])?;
        return Ok(Predicate::Related {
            path: relation_path.join("."),
            predicate: Box::new(inner),
        });
    }

    let mut full = prefix.to_vec();
    full.extend(segments.iter().map(|s| s.to_string()));
    let leaf = full.last().cloned().unwrap_or_default();
    let path = full.join(".");

    match entry {
        FilterEntry::Literal(value) => Ok(lower_literal(&path, &leaf, value, schema)),
        FilterEntry::List(values) => Ok(Predicate::In {
            path,
            values: values.clone(),
        }),
        FilterEntry::Operators(ops) => lower_operators(&path, &leaf, ops, schema),
        FilterEntry::Nested(subtree) => {
            if schema.is_relation(&leaf) {
                Ok(Predicate::Related {
                    path,
                    predicate: Box::new(lower_tree(subtree, schema, &[])?),
                })
            } else {
                lower_tree(subtree, schema, &full)
            }
        }
        FilterEntry::Or(_) | FilterEntry::And(_) | FilterEntry::Not(_) => {
            unreachable!("combinators are handled in lower_tree")
        }
    }
}

fn lower_literal(path: &str, leaf: &str, value: &FieldValue, schema: &FilterSchema) -> Predicate {
    if value.is_null() {
        return Predicate::IsNull {
            path: path.to_string(),
        };
    }

    if schema.is_date(leaf) {
        if let FieldValue::String(s) = value {
            // A bare calendar date means the whole day, inclusive
            if let Some(date) = bare_date(s) {
                return Predicate::And(vec![
                    Predicate::Compare {
                        path: path.to_string(),
                        op: CompareOp::Gte,
                        value: FieldValue::DateTime(day_floor(date)),
                    },
                    Predicate::Compare {
                        path: path.to_string(),
                        op: CompareOp::Lte,
                        value: FieldValue::DateTime(day_ceil(date)),
                    },
                ]);
            }
            if let Some(dt) = parse_timestamp(s) {
                return Predicate::Compare {
                    path: path.to_string(),
                    op: CompareOp::Eq,
                    value: FieldValue::DateTime(dt),
                };
            }
        }
        return Predicate::Compare {
            path: path.to_string(),
            op: CompareOp::Eq,
            value: value.clone(),
        };
    }

    if schema.is_enum(leaf) {
        // Enums are exact-match; wildcard syntax has no meaning here
        return Predicate::Compare {
            path: path.to_string(),
            op: CompareOp::Eq,
            value: value.clone(),
        };
    }

    if schema.is_relation(leaf) {
        return relation_condition(path, value);
    }

    if let FieldValue::String(s) = value {
        return Predicate::Contains {
            path: path.to_string(),
            needle: s.replace('*', ""),
            ci: true,
        };
    }

    Predicate::Compare {
        path: path.to_string(),
        op: CompareOp::Eq,
        value: value.clone(),
    }
}

fn lower_operators(
    path: &str,
    leaf: &str,
    ops: &indexmap::IndexMap<String, FilterOperand>,
    schema: &FilterSchema,
) -> Result<Predicate, PageError> {
    let mut parts = Vec::new();

    for (op, operand) in ops {
        let part = match op.as_str() {
            "equals" => {
                let value = scalar(operand);
                if value.is_null() {
                    Predicate::IsNull {
                        path: path.to_string(),
                    }
                } else if schema.is_relation(leaf) {
                    relation_condition(path, &value)
                } else if schema.is_date(leaf) {
                    Predicate::Compare {
                        path: path.to_string(),
                        op: CompareOp::Eq,
                        value: date_bound(&value, "equals"),
                    }
                } else {
                    Predicate::Compare {
                        path: path.to_string(),
                        op: CompareOp::Eq,
                        value,
                    }
                }
            }
            "not" => {
                let value = scalar(operand);
                if value.is_null() {
                    Predicate::Not(Box::new(Predicate::IsNull {
                        path: path.to_string(),
                    }))
                } else {
                    Predicate::Compare {
                        path: path.to_string(),
                        op: CompareOp::Ne,
                        value: coerce(&value, leaf, "not", schema),
                    }
                }
            }
            "in" => Predicate::In {
                path: path.to_string(),
                values: match operand {
                    FilterOperand::Value(v) => vec![v.clone()],
                    FilterOperand::List(vs) => vs.clone(),
                },
            },
            "contains" => {
                let value = scalar(operand);
                match value.as_string() {
                    // Explicit contains passes the needle through as written
                    Some(s) => Predicate::Contains {
                        path: path.to_string(),
                        needle: s.to_string(),
                        ci: false,
                    },
                    None => Predicate::Compare {
                        path: path.to_string(),
                        op: CompareOp::Eq,
                        value,
                    },
                }
            }
            "lt" | "lte" | "gt" | "gte" => Predicate::Compare {
                path: path.to_string(),
                op: match op.as_str() {
                    "lt" => CompareOp::Lt,
                    "lte" => CompareOp::Lte,
                    "gt" => CompareOp::Gt,
                    _ => CompareOp::Gte,
                },
                value: coerce(&scalar(operand), leaf, op, schema),
            },
            _ => {
                return Err(PageError::UnknownFilterOperator {
                    path: path.to_string(),
                    operator: op.clone(),
                });
            }
        };
        parts.push(part);
    }

    Ok(match parts.len() {
        0 => Predicate::True,
        1 => parts.remove(0),
        _ => Predicate::And(parts),
    })
}

/// First value of a list operand, or the value itself
fn scalar(operand: &FilterOperand) -> FieldValue {
    match operand {
        FilterOperand::Value(v) => v.clone(),
        FilterOperand::List(vs) => vs.first().cloned().unwrap_or(FieldValue::Null),
    }
}

fn coerce(value: &FieldValue, leaf: &str, op: &str, schema: &FilterSchema) -> FieldValue {
    if schema.is_date(leaf) {
        date_bound(value, op)
    } else {
        value.clone()
    }
}

/// Resolve a date-field operand: bare dates are day-floored (day-ceiled for
/// `lte`), timestamps are used as-is.
fn date_bound(value: &FieldValue, op: &str) -> FieldValue {
    if let FieldValue::String(s) = value {
        if let Some(date) = bare_date(s) {
            return match op {
                "lte" => FieldValue::DateTime(day_ceil(date)),
                _ => FieldValue::DateTime(day_floor(date)),
            };
        }
        if let Some(dt) = parse_timestamp(s) {
            return FieldValue::DateTime(dt);
        }
    }
    value.clone()
}

/// Condition on a to-one relation given a scalar value: a UUID matches the
/// related record's id, anything else matches its name.
fn relation_condition(path: &str, value: &FieldValue) -> Predicate {
    let inner = match value {
        FieldValue::Uuid(id) => Predicate::Compare {
            path: "id".to_string(),
            op: CompareOp::Eq,
            value: FieldValue::Uuid(*id),
        },
        FieldValue::String(s) => match Uuid::parse_str(s) {
            Ok(id) => Predicate::Compare {
                path: "id".to_string(),
                op: CompareOp::Eq,
                value: FieldValue::Uuid(id),
            },
            Err(_) => Predicate::Contains {
                path: "name".to_string(),
                needle: s.replace('*', ""),
                ci: true,
            },
        },
        other => Predicate::Compare {
            path: "id".to_string(),
            op: CompareOp::Eq,
            value: other.clone(),
        },
    };

    Predicate::Related {
        path: path.to_string(),
        predicate: Box::new(inner),
    }
}

fn bare_date(s: &str) -> Option<NaiveDate> {
    static DATE_ONLY: OnceLock<Regex> = OnceLock::new();
    let re = DATE_ONLY.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());
    if re.is_match(s) {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
    } else {
        None
    }
}

fn day_floor(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(0, 0, 0).unwrap().and_utc()
}

fn day_ceil(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_milli_opt(23, 59, 59, 999).unwrap().and_utc()
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

impl Predicate {
    /// Reference interpretation of the predicate over a record.
    ///
    /// Used by the in-memory backend; database-backed repositories are
    /// expected to translate the predicate into their own query language
    /// instead. Incomparable kinds never match.
    pub fn matches<T: Record>(&self, record: &T) -> bool {
        self.eval(record, "")
    }

    fn eval<T: Record>(&self, record: &T, prefix: &str) -> bool {
        match self {
            Predicate::True => true,
            Predicate::Compare { path, op, value } => {
                let Some(actual) = lookup(record, &join_path(prefix, path)) else {
                    return false;
                };
                match actual.compare(value) {
                    Some(ord) => match op {
                        CompareOp::Eq => ord == Ordering::Equal,
                        CompareOp::Ne => ord != Ordering::Equal,
                        CompareOp::Lt => ord == Ordering::Less,
                        CompareOp::Lte => ord != Ordering::Greater,
                        CompareOp::Gt => ord == Ordering::Greater,
                        CompareOp::Gte => ord != Ordering::Less,
                    },
                    None => false,
                }
            }
            Predicate::Contains { path, needle, ci } => {
                let Some(FieldValue::String(actual)) = lookup(record, &join_path(prefix, path))
                else {
                    return false;
                };
                if *ci {
                    actual.to_lowercase().contains(&needle.to_lowercase())
                } else {
                    actual.contains(needle.as_str())
                }
            }
            Predicate::In { path, values } => {
                let Some(actual) = lookup(record, &join_path(prefix, path)) else {
                    return false;
                };
                values
                    .iter()
                    .any(|v| actual.compare(v) == Some(Ordering::Equal))
            }
            Predicate::IsNull { path } => {
                matches!(
                    lookup(record, &join_path(prefix, path)),
                    None | Some(FieldValue::Null)
                )
            }
            Predicate::Related { path, predicate } => {
                predicate.eval(record, &join_path(prefix, path))
            }
            Predicate::And(parts) => parts.iter().all(|p| p.eval(record, prefix)),
            Predicate::Or(parts) => parts.iter().any(|p| p.eval(record, prefix)),
            Predicate::Not(inner) => !inner.eval(record, prefix),
        }
    }
}

fn join_path(prefix: &str, path: &str) -> String {
    if prefix.is_empty() {
        path.to_string()
    } else {
        format!("{}.{}", prefix, path)
    }
}
