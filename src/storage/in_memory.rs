//! In-memory implementation of Repository for testing and development

use crate::core::field::FieldValue;
use crate::core::predicate::{OrderTerm, Predicate};
use crate::core::query::SortDirection;
use crate::core::record::{Record, lookup};
use crate::core::repository::Repository;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// In-memory repository implementation
///
/// Useful for testing and development. Uses RwLock for thread-safe access
/// and evaluates predicates directly over the stored records.
#[derive(Clone)]
pub struct InMemoryRepository<T: Record> {
    records: Arc<RwLock<HashMap<Uuid, T>>>,
}

impl<T: Record> InMemoryRepository<T> {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert a record, replacing any existing record with the same id
    pub fn insert(&self, record: T) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        records.insert(record.id(), record);

        Ok(())
    }

    /// Remove a record by id
    pub fn remove(&self, id: &Uuid) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        records.remove(id);

        Ok(())
    }

    /// Number of stored records
    pub fn len(&self) -> Result<usize> {
        let records = self
            .records
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(records.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl<T: Record> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Record> Repository<T> for InMemoryRepository<T> {
    async fn find(
        &self,
        predicate: &Predicate,
        ordering: &[OrderTerm],
        limit: usize,
    ) -> Result<Vec<T>> {
        let records = self
            .records
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        let mut matched: Vec<T> = records
            .values()
            .filter(|record| predicate.matches(*record))
            .cloned()
            .collect();

        matched.sort_by(|a, b| compare_records(a, b, ordering));
        matched.truncate(limit);

        Ok(matched)
    }

    async fn count(&self, predicate: &Predicate) -> Result<u64> {
        let records = self
            .records
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(records
            .values()
            .filter(|record| predicate.matches(*record))
            .count() as u64)
    }
}

/// Order two records under the given ordering terms.
///
/// Records missing a sort value order after records that have one;
/// incomparable values are treated as equal and fall through to the next
/// term.
fn compare_records<T: Record>(a: &T, b: &T, ordering: &[OrderTerm]) -> Ordering {
    for term in ordering {
        let path = term.path();
        let va = resolve(a, &path);
        let vb = resolve(b, &path);

        let ord = match (va, vb) {
            (Some(x), Some(y)) => x.compare(&y).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };

        let ord = match term.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        };

        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

fn resolve<T: Record>(record: &T, path: &str) -> Option<FieldValue> {
    match lookup(record, path) {
        Some(FieldValue::Null) => None,
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::predicate::{CompareOp, build_ordering};
    use crate::core::query::SortTerm;

    #[derive(Clone)]
    struct Item {
        id: Uuid,
        name: String,
        rank: i64,
    }

    impl Item {
        fn new(name: &str, rank: i64) -> Self {
            Self {
                id: Uuid::new_v4(),
                name: name.to_string(),
                rank,
            }
        }
    }

    impl Record for Item {
        fn id(&self) -> Uuid {
            self.id
        }

        fn field(&self, path: &str) -> Option<FieldValue> {
            match path {
                "name" => Some(FieldValue::String(self.name.clone())),
                "rank" => Some(FieldValue::Integer(self.rank)),
                _ => None,
            }
        }
    }

    fn seeded() -> InMemoryRepository<Item> {
        let repo = InMemoryRepository::new();
        repo.insert(Item::new("alpha", 3)).unwrap();
        repo.insert(Item::new("bravo", 1)).unwrap();
        repo.insert(Item::new("charlie", 2)).unwrap();
        repo
    }

    #[tokio::test]
    async fn test_find_all_sorted() {
        let repo = seeded();
        let ordering = build_ordering(&[SortTerm::asc("rank")]);

        let found = repo.find(&Predicate::True, &ordering, 10).await.unwrap();

        assert_eq!(found.len(), 3);
        assert_eq!(found[0].name, "bravo");
        assert_eq!(found[1].name, "charlie");
        assert_eq!(found[2].name, "alpha");
    }

    #[tokio::test]
    async fn test_find_respects_limit() {
        let repo = seeded();
        let ordering = build_ordering(&[SortTerm::asc("rank")]);

        let found = repo.find(&Predicate::True, &ordering, 2).await.unwrap();

        assert_eq!(found.len(), 2);
        assert_eq!(found[1].name, "charlie");
    }

    #[tokio::test]
    async fn test_find_descending() {
        let repo = seeded();
        let ordering = build_ordering(&[SortTerm::desc("rank")]);

        let found = repo.find(&Predicate::True, &ordering, 10).await.unwrap();

        assert_eq!(found[0].name, "alpha");
    }

    #[tokio::test]
    async fn test_find_applies_predicate() {
        let repo = seeded();
        let ordering = build_ordering(&[SortTerm::asc("rank")]);
        let predicate = Predicate::Compare {
            path: "rank".to_string(),
            op: CompareOp::Gte,
            value: FieldValue::Integer(2),
        };

        let found = repo.find(&predicate, &ordering, 10).await.unwrap();

        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|item| item.rank >= 2));
    }

    #[tokio::test]
    async fn test_count_ignores_limit() {
        let repo = seeded();
        assert_eq!(repo.count(&Predicate::True).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_insert_replaces_by_id() {
        let repo = InMemoryRepository::new();
        let mut item = Item::new("first", 1);
        repo.insert(item.clone()).unwrap();

        item.name = "renamed".to_string();
        repo.insert(item).unwrap();

        assert_eq!(repo.len().unwrap(), 1);
        let found = repo.find(&Predicate::True, &[], 10).await.unwrap();
        assert_eq!(found[0].name, "renamed");
    }

    #[tokio::test]
    async fn test_remove() {
        let repo = seeded();
        let found = repo.find(&Predicate::True, &[], 10).await.unwrap();

        repo.remove(&found[0].id()).unwrap();

        assert_eq!(repo.len().unwrap(), 2);
    }
}
