//! Opaque cursor encoding for page boundaries
//!
//! A cursor is base64url over a canonical JSON payload holding the boundary
//! record's sort-field values, its id, and a fingerprint of the sort spec
//! that produced it. Tokens are stable across processes; decode failures
//! are client-input errors, never server errors.

use crate::core::error::PageError;
use crate::core::field::FieldValue;
use crate::core::query::SortTerm;
use crate::core::record::{Record, lookup};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Decoded cursor payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CursorPayload {
    /// Boundary values of the non-id sort fields, in sort order
    #[serde(rename = "f")]
    pub fields: IndexMap<String, FieldValue>,

    /// The boundary record's id, the final tie-break
    #[serde(rename = "i")]
    pub id: Uuid,

    /// Signed sort-field fingerprint, e.g. `-createdAt,id`
    #[serde(rename = "s")]
    pub sort: String,
}

impl CursorPayload {
    /// Boundary value for a sort field; `"id"` resolves to the record id
    pub fn value_for(&self, field: &str) -> Option<FieldValue> {
        if field == "id" {
            Some(FieldValue::Uuid(self.id))
        } else {
            self.fields.get(field).cloned()
        }
    }
}

/// Fingerprint of a sort spec, stored inside every cursor
pub fn fingerprint(terms: &[SortTerm]) -> String {
    terms
        .iter()
        .map(SortTerm::signed)
        .collect::<Vec<_>>()
        .join(",")
}

/// Encode the boundary cursor for `record` under the given sort spec
pub fn encode<T: Record>(record: &T, terms: &[SortTerm]) -> Result<String, PageError> {
    let mut fields = IndexMap::new();
    for term in terms {
        if term.field == "id" {
            continue;
        }
        let value = lookup(record, &term.field).ok_or_else(|| PageError::CursorFieldMissing {
            field: term.field.clone(),
        })?;
        fields.insert(term.field.clone(), value);
    }

    let payload = CursorPayload {
        fields,
        id: record.id(),
        sort: fingerprint(terms),
    };

    let json = serde_json::to_vec(&payload)
        .map_err(|e| PageError::Internal(format!("cursor serialization failed: {}", e)))?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

/// Decode an opaque token back into its payload
pub fn decode(token: &str) -> Result<CursorPayload, PageError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(token)
        .map_err(|_| PageError::MalformedCursor)?;
    serde_json::from_slice(&bytes).map_err(|_| PageError::MalformedCursor)
}
