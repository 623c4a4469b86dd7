//! Core module containing the pagination engine

pub mod cursor;
pub mod error;
pub mod field;
pub mod filter;
pub mod links;
pub mod paginator;
pub mod predicate;
pub mod query;
pub mod record;
pub mod repository;

pub use cursor::CursorPayload;
pub use error::PageError;
pub use field::FieldValue;
pub use filter::{FilterEntry, FilterOperand, FilterTree};
pub use links::PageLinks;
pub use paginator::{Page, PaginationMeta, Paginator};
pub use predicate::{CompareOp, OrderTerm, Predicate};
pub use query::{PageRequest, SortDirection, SortTerm, parse_query};
pub use record::Record;
pub use repository::Repository;
