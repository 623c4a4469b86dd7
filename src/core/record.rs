//! Record trait defining what the paginator needs from paginated types

use crate::core::field::FieldValue;
use uuid::Uuid;

/// Contract for types that can be paginated.
///
/// The engine only needs two things from a record: its unique identifier
/// (the implicit final tie-break of every sort order) and dynamic access to
/// field values by dotted path, used for cursor encoding and in-memory
/// predicate evaluation.
pub trait Record: Clone + Send + Sync + 'static {
    /// Get the unique identifier for this record
    fn id(&self) -> Uuid;

    /// Look up a field value by dotted path (e.g. `"category.name"`)
    ///
    /// Returns `None` when the path does not resolve for this record.
    /// Implementations do not need to handle `"id"`; the engine resolves it
    /// through [`Record::id`].
    fn field(&self, path: &str) -> Option<FieldValue>;
}

/// Resolve a path against a record, treating `"id"` as the identifier.
pub fn lookup<T: Record>(record: &T, path: &str) -> Option<FieldValue> {
    match record.field(path) {
        Some(value) => Some(value),
        None if path == "id" => Some(FieldValue::Uuid(record.id())),
        None => None,
    }
}
