//! # Keyset-RS
//!
//! A cursor-based keyset pagination engine for Rust web backends.
//!
//! ## Features
//!
//! - **Opaque Cursors**: base64url tokens carrying the boundary record's
//!   sort values, id, and a sort-spec fingerprint
//! - **Bidirectional Paging**: stable forward and backward traversal with
//!   no gaps and no duplicates under a fixed sort order
//! - **Typed Filter Trees**: `filter[path][op]=value` query parameters
//!   parsed into a tagged tree, lowered into backend-neutral predicates
//! - **Schema-Aware Semantics**: declared date, enum, and relation fields
//!   get whole-day ranges, exact matching, and related-record conditions
//! - **Self-Describing Links**: `first`/`prev`/`next`/`last` URLs that
//!   round-trip through the parser
//! - **Storage-Agnostic**: drives any backend through a two-method
//!   `Repository` contract (`find` + `count`)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use keyset::prelude::*;
//!
//! // Implement Record for your type
//! impl Record for Article {
//!     fn id(&self) -> Uuid {
//!         self.id
//!     }
//!
//!     fn field(&self, path: &str) -> Option<FieldValue> {
//!         match path {
//!             "title" => Some(FieldValue::String(self.title.clone())),
//!             "createdAt" => Some(FieldValue::DateTime(self.created_at)),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! // Parse, paginate, respond
//! let request = parse_query(&pairs);
//! let paginator = Paginator::new(
//!     PageConfig::default(),
//!     FilterSchema::new().date("createdAt").enumeration("status"),
//! );
//! let page = paginator.paginate(&repo, &request, "/articles").await?;
//! // page.data, page.meta.end_cursor, page.links.next, ...
//! ```

pub mod config;
pub mod core;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core Types ===
    pub use crate::core::{
        cursor::CursorPayload,
        error::{ErrorResponse, PageError},
        field::FieldValue,
        filter::{FilterEntry, FilterOperand, FilterTree},
        links::PageLinks,
        paginator::{Page, PaginationMeta, Paginator},
        predicate::{CompareOp, OrderTerm, Predicate},
        query::{PageRequest, SortDirection, SortTerm, parse_query},
        record::Record,
        repository::Repository,
    };

    // === Config ===
    pub use crate::config::{FilterSchema, PageConfig};

    // === Server ===
    pub use crate::server::PageQuery;

    // === Storage ===
    pub use crate::storage::InMemoryRepository;

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use uuid::Uuid;
}
