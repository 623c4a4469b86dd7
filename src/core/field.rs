//! Field value types used for cursors, filter literals, and comparisons

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

/// A polymorphic field value that can hold different types
///
/// Variant order matters: untagged deserialization tries variants in
/// declaration order, so the numeric and temporal kinds must come before
/// `String` for cursor payloads to round-trip to the same kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FieldValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    DateTime(DateTime<Utc>),
    Uuid(Uuid),
    String(String),
    Null,
}

impl FieldValue {
    /// Get the value as a string if possible
    pub fn as_string(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the value as an integer if possible
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get the value as a UUID if possible
    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            FieldValue::Uuid(u) => Some(*u),
            _ => None,
        }
    }

    /// Get the value as a UTC timestamp if possible
    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Compare two values of compatible kinds
    ///
    /// Integers and floats compare numerically across kinds, and an RFC 3339
    /// string compares against a timestamp. Incomparable kinds return `None`
    /// rather than an arbitrary order.
    pub fn compare(&self, other: &FieldValue) -> Option<Ordering> {
        match (self, other) {
            (FieldValue::String(a), FieldValue::String(b)) => Some(a.cmp(b)),
            (FieldValue::Integer(a), FieldValue::Integer(b)) => Some(a.cmp(b)),
            (FieldValue::Float(a), FieldValue::Float(b)) => a.partial_cmp(b),
            (FieldValue::Integer(a), FieldValue::Float(b)) => (*a as f64).partial_cmp(b),
            (FieldValue::Float(a), FieldValue::Integer(b)) => a.partial_cmp(&(*b as f64)),
            (FieldValue::Boolean(a), FieldValue::Boolean(b)) => Some(a.cmp(b)),
            (FieldValue::Uuid(a), FieldValue::Uuid(b)) => Some(a.cmp(b)),
            (FieldValue::DateTime(a), FieldValue::DateTime(b)) => Some(a.cmp(b)),
            (FieldValue::DateTime(a), FieldValue::String(b)) => parse_datetime(b).map(|b| a.cmp(&b)),
            (FieldValue::String(a), FieldValue::DateTime(b)) => parse_datetime(a).map(|a| a.cmp(b)),
            (FieldValue::Null, FieldValue::Null) => Some(Ordering::Equal),
            _ => None,
        }
    }
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_value_string() {
        let value = FieldValue::String("test".to_string());
        assert_eq!(value.as_string(), Some("test"));
        assert_eq!(value.as_integer(), None);
        assert!(!value.is_null());
    }

    #[test]
    fn test_field_value_integer() {
        let value = FieldValue::Integer(42);
        assert_eq!(value.as_integer(), Some(42));
        assert_eq!(value.as_string(), None);
    }

    #[test]
    fn test_field_value_null() {
        let value = FieldValue::Null;
        assert!(value.is_null());
        assert_eq!(value.as_string(), None);
    }

    #[test]
    fn test_compare_strings() {
        let a = FieldValue::String("apple".to_string());
        let b = FieldValue::String("banana".to_string());
        assert_eq!(a.compare(&b), Some(Ordering::Less));
        assert_eq!(b.compare(&a), Some(Ordering::Greater));
        assert_eq!(a.compare(&a), Some(Ordering::Equal));
    }

    #[test]
    fn test_compare_numeric_coercion() {
        let int = FieldValue::Integer(3);
        let float = FieldValue::Float(3.5);
        assert_eq!(int.compare(&float), Some(Ordering::Less));
        assert_eq!(float.compare(&int), Some(Ordering::Greater));
    }

    #[test]
    fn test_compare_datetime_against_string() {
        let earlier = FieldValue::DateTime("2024-01-01T00:00:00Z".parse().unwrap());
        let later = FieldValue::String("2024-06-01T00:00:00Z".to_string());
        assert_eq!(earlier.compare(&later), Some(Ordering::Less));
        assert_eq!(later.compare(&earlier), Some(Ordering::Greater));
    }

    #[test]
    fn test_compare_incompatible_kinds() {
        let s = FieldValue::String("hello".to_string());
        let i = FieldValue::Integer(1);
        assert_eq!(s.compare(&i), None);
        assert_eq!(FieldValue::Null.compare(&i), None);
    }

    #[test]
    fn test_untagged_roundtrip_preserves_kind() {
        let values = vec![
            FieldValue::Boolean(true),
            FieldValue::Integer(42),
            FieldValue::Float(2.5),
            FieldValue::DateTime("2024-03-15T09:30:00Z".parse().unwrap()),
            FieldValue::Uuid(Uuid::new_v4()),
            FieldValue::String("plain text".to_string()),
            FieldValue::Null,
        ];
        for original in values {
            let json = serde_json::to_string(&original).expect("serialize should succeed");
            let restored: FieldValue =
                serde_json::from_str(&json).expect("deserialize should succeed");
            assert_eq!(original, restored);
        }
    }
}
