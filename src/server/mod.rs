//! HTTP integration glue
//!
//! Routing and handlers belong to the host application; this module only
//! provides the request-side extractor. The error-to-response mapping
//! lives on [`crate::core::error::PageError`].

pub mod extract;

pub use extract::PageQuery;
