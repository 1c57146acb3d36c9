//! In-memory property store.
//!
//! Records live in an insertion-ordered `Vec` behind a single `RwLock`.
//! `insert_unique` checks for the id and pushes under one write guard, so a
//! concurrent insert of the same id always sees the first one.
//!
//! Search approximates a text index: a record matches when any search term
//! equals, case-insensitively, a word of its address, name, city or tag.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use property_core::Property;
use tokio::sync::RwLock;
use tracing::instrument;

use super::{FieldUpdate, PropertyFilter, PropertyStore};
use crate::error::{StoreError, StoreResult};

#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Vec<Property>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// A store pre-populated with `records`, which must have distinct ids.
    pub fn with_records(records: Vec<Property>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
}

fn matches_terms(property: &Property, terms: &[String]) -> bool {
    property
        .searchable_text()
        .flat_map(words)
        .any(|word| terms.contains(&word))
}

#[async_trait]
impl PropertyStore for MemoryStore {
    #[instrument(skip(self))]
    async fn find_many(&self, filter: &PropertyFilter) -> StoreResult<Vec<Property>> {
        let records = self.records.read().await;
        let Some(search) = filter.text_search() else {
            return Ok(records.clone());
        };
        let terms: Vec<String> = words(search).collect();
        Ok(records
            .iter()
            .filter(|p| matches_terms(p, &terms))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Property>> {
        let records = self.records.read().await;
        Ok(records.iter().find(|p| p.id == id).cloned())
    }

    #[instrument(skip(self, record), fields(id = %record.id))]
    async fn insert_unique(&self, record: Property) -> StoreResult<Property> {
        let mut records = self.records.write().await;
        if records.iter().any(|p| p.id == record.id) {
            return Err(StoreError::DuplicateKey { id: record.id });
        }
        records.push(record.clone());
        Ok(record)
    }

    #[instrument(skip(self))]
    async fn update_field(&self, id: &str, update: FieldUpdate) -> StoreResult<Option<Property>> {
        let mut records = self.records.write().await;
        Ok(records.iter_mut().find(|p| p.id == id).map(|property| {
            update.apply(property);
            property.clone()
        }))
    }

    #[instrument(skip(self))]
    async fn delete_by_id(&self, id: &str) -> StoreResult<bool> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|p| p.id != id);
        Ok(records.len() != before)
    }

    async fn group_by_status(&self) -> StoreResult<BTreeMap<String, Vec<Property>>> {
        let records = self.records.read().await;
        let mut groups: BTreeMap<String, Vec<Property>> = BTreeMap::new();
        for property in records.iter() {
            groups
                .entry(property.group.clone())
                .or_default()
                .push(property.clone());
        }
        Ok(groups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use property_core::PropertyFields;

    fn property(id: &str, group: &str, address: Option<&str>) -> Property {
        let mut fields = PropertyFields::new(group);
        fields.address = address.map(String::from);
        Property::from_fields(id, fields)
    }

    #[tokio::test]
    async fn insert_then_find() {
        let store = MemoryStore::new();
        store.insert_unique(property("a", "Pending", None)).await.unwrap();
        let found = store.find_by_id("a").await.unwrap().unwrap();
        assert_eq!(found.group, "Pending");
        assert!(store.find_by_id("b").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_id() {
        let store = MemoryStore::new();
        store.insert_unique(property("a", "Pending", None)).await.unwrap();
        let err = store
            .insert_unique(property("a", "Exited", None))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { ref id } if id == "a"));
        assert_eq!(store.len().await, 1);
        assert_eq!(store.find_by_id("a").await.unwrap().unwrap().group, "Pending");
    }

    #[tokio::test]
    async fn find_many_preserves_insertion_order() {
        let store = MemoryStore::new();
        for id in ["c", "a", "b"] {
            store.insert_unique(property(id, "Pending", None)).await.unwrap();
        }
        let ids: Vec<String> = store
            .find_many(&PropertyFilter::all())
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn search_matches_whole_words_case_insensitively() {
        let store = MemoryStore::with_records(vec![
            property("a", "Pending", Some("12 Harbour Road")),
            property("b", "Pending", Some("Harbourside Lane")),
            property("c", "Exited", Some("3 Hill Street")),
        ]);
        let hits = store
            .find_many(&PropertyFilter::search("harbour"))
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "a");

        let hits = store
            .find_many(&PropertyFilter::search("hill harbour"))
            .await
            .unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn update_field_returns_new_state() {
        let store = MemoryStore::with_records(vec![property("a", "Pending", Some("1 Main St"))]);
        let updated = store
            .update_field("a", FieldUpdate::Group("Exited".into()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.group, "Exited");
        assert_eq!(updated.address.as_deref(), Some("1 Main St"));
        assert!(store
            .update_field("missing", FieldUpdate::Group("Exited".into()))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn delete_reports_whether_removed() {
        let store = MemoryStore::with_records(vec![property("a", "Pending", None)]);
        assert!(!store.delete_by_id("missing").await.unwrap());
        assert_eq!(store.len().await, 1);
        assert!(store.delete_by_id("a").await.unwrap());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn group_by_status_buckets_every_record() {
        let store = MemoryStore::with_records(vec![
            property("a", "Pending", None),
            property("b", "Exited", None),
            property("c", "Pending", None),
        ]);
        let groups = store.group_by_status().await.unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups["Pending"].len(), 2);
        assert_eq!(groups["Exited"].len(), 1);
    }
}
