//! Pagination orchestrator
//!
//! Drives one `paginate()` call end to end: validate, build predicates,
//! fetch `size + 1` records and the total count concurrently, derive the
//! paging flags, encode boundary cursors, probe for the last cursor, and
//! assemble the response envelope. Read-only; repository errors propagate
//! unchanged.

use crate::config::{FilterSchema, PageConfig};
use crate::core::cursor;
use crate::core::error::PageError;
use crate::core::links::{self, PageLinks};
use crate::core::predicate::{self, OrderTerm, Predicate};
use crate::core::query::{PageRequest, SortTerm};
use crate::core::record::Record;
use crate::core::repository::Repository;
use serde::Serialize;
use tracing::debug;

/// Pagination metadata
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    /// Whether a page exists after this one
    pub has_next_page: bool,

    /// Whether a page exists before this one
    pub has_previous_page: bool,

    /// Cursor of the first returned record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_cursor: Option<String>,

    /// Cursor of the last returned record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_cursor: Option<String>,

    /// Cursor of the final matching record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_cursor: Option<String>,

    /// Total records matching the filter, ignoring the cursor window
    pub total_count: u64,
}

/// One page of results with metadata and navigation links
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub meta: PaginationMeta,
    pub links: PageLinks,
}

/// The pagination engine.
///
/// Holds the explicit size limits and the filter field schema; everything
/// else is per-call state, so one paginator is safely shared across
/// concurrent requests.
#[derive(Debug, Clone)]
pub struct Paginator {
    config: PageConfig,
    schema: FilterSchema,
}

impl Paginator {
    pub fn new(config: PageConfig, schema: FilterSchema) -> Self {
        Self { config, schema }
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    /// Execute one paginated fetch against `repository`.
    ///
    /// Issues the page fetch and the total count concurrently, then the
    /// cheap last-cursor probe. The count uses the filter predicate alone
    /// so `total_count` reflects the whole matching set, not the remaining
    /// window.
    pub async fn paginate<T, R>(
        &self,
        repository: &R,
        request: &PageRequest,
        base_url: &str,
    ) -> Result<Page<T>, PageError>
    where
        T: Record,
        R: Repository<T>,
    {
        let normalized = predicate::validate(request, &self.config)?;
        let filter = predicate::filter_predicate(&normalized.filter, &self.schema)?;
        let ordering = predicate::build_ordering(&normalized.sort_terms);

        let combined = match &normalized.cursor {
            Some(payload) => predicate::and(
                filter.clone(),
                predicate::keyset_condition(payload, &normalized.sort_terms, normalized.before),
            ),
            None => filter.clone(),
        };

        // A backward page is fetched as a forward scan in the opposite
        // direction, then flipped back to the request's nominal order.
        let scan_ordering = if normalized.before {
            predicate::reverse_ordering(&ordering)
        } else {
            ordering.clone()
        };
        let take = normalized.size as usize + 1;

        debug!(
            size = normalized.size,
            backward = normalized.before,
            "fetching page and total count"
        );

        let (mut records, total_count) = tokio::try_join!(
            repository.find(&combined, &scan_ordering, take),
            repository.count(&filter),
        )
        .map_err(PageError::Repository)?;

        let overflow = records.len() == take;
        if overflow {
            records.pop();
        }
        if normalized.before {
            records.reverse();
        }

        // Forward: the overflow is the next page, and any cursor implies a
        // prior page. Backward: the overflow precedes the window, and the
        // cursor implies a following page.
        let (mut has_next_page, mut has_previous_page) = if normalized.before {
            (true, overflow)
        } else {
            (overflow, normalized.cursor.is_some())
        };
        if records.is_empty() && total_count == 0 {
            has_next_page = false;
            has_previous_page = false;
        }

        let start_cursor = records
            .first()
            .map(|r| cursor::encode(r, &normalized.sort_terms))
            .transpose()?;
        let end_cursor = records
            .last()
            .map(|r| cursor::encode(r, &normalized.sort_terms))
            .transpose()?;
        let last_cursor = self
            .last_cursor(repository, &filter, &ordering, &normalized.sort_terms)
            .await?;

        let meta = PaginationMeta {
            has_next_page,
            has_previous_page,
            start_cursor,
            end_cursor,
            last_cursor,
            total_count,
        };
        let links = links::generate_links(base_url, request, &self.config, &meta);

        Ok(Page {
            data: records,
            meta,
            links,
        })
    }

    /// Probe the fully-reversed ordering for the final matching record and
    /// encode its cursor under the current sort spec.
    async fn last_cursor<T, R>(
        &self,
        repository: &R,
        filter: &Predicate,
        ordering: &[OrderTerm],
        sort_terms: &[SortTerm],
    ) -> Result<Option<String>, PageError>
    where
        T: Record,
        R: Repository<T>,
    {
        let reversed = predicate::reverse_ordering(ordering);
        let rows = repository
            .find(filter, &reversed, 1)
            .await
            .map_err(PageError::Repository)?;
        rows.first()
            .map(|r| cursor::encode(r, sort_terms))
            .transpose()
    }
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(PageConfig::default(), FilterSchema::default())
    }
}
