//! Repository contract the paginator drives

use crate::core::predicate::{OrderTerm, Predicate};
use crate::core::record::Record;
use anyhow::Result;
use async_trait::async_trait;

/// Read-only query contract the pagination engine requires from a backend.
///
/// The engine issues at most three calls per `paginate()` invocation (page
/// fetch, total count, last-cursor probe) and never writes. Implementations
/// own their consistency guarantees; errors propagate to the caller
/// unchanged and are not retried here.
#[async_trait]
pub trait Repository<T: Record>: Send + Sync {
    /// Fetch up to `limit` records matching `predicate`, ordered by
    /// `ordering`
    async fn find(
        &self,
        predicate: &Predicate,
        ordering: &[OrderTerm],
        limit: usize,
    ) -> Result<Vec<T>>;

    /// Count all records matching `predicate`
    async fn count(&self, predicate: &Predicate) -> Result<u64>;
}
