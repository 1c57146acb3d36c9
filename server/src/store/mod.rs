//! Record store adapter.
//!
//! `PropertyStore` is the only way handlers and the create path touch the
//! collection. Two backends implement it:
//! - [`MongoStore`]: the production backend.
//! - [`MemoryStore`]: an in-process store for tests and local runs.
//!
//! A backend must make `insert_unique` atomic with respect to the id check.
//! That check is the sole serialization point between concurrent creates.

pub mod memory;
pub mod mongo;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use property_core::Property;
use tracing::info;

use crate::config::{ServerConfig, StoreBackend};
use crate::error::StoreResult;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

/// Filter for `find_many`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyFilter {
    pub search_term: Option<String>,
}

impl PropertyFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search_term: Some(term.into()),
        }
    }

    /// The search term to apply, if any. Blank terms mean "no filter".
    pub fn text_search(&self) -> Option<&str> {
        self.search_term
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// A single-field mutation. Only `group` is mutable after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    Group(String),
}

impl FieldUpdate {
    /// Stored field name.
    pub fn field(&self) -> &'static str {
        match self {
            FieldUpdate::Group(_) => "group",
        }
    }

    pub fn apply(&self, property: &mut Property) {
        match self {
            FieldUpdate::Group(group) => property.group = group.clone(),
        }
    }
}

#[async_trait]
pub trait PropertyStore: Send + Sync + 'static {
    /// All records matching the filter, in insertion order.
    async fn find_many(&self, filter: &PropertyFilter) -> StoreResult<Vec<Property>>;

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Property>>;

    /// Inserts a record. Returns `Err(DuplicateKey)` if the id already exists.
    async fn insert_unique(&self, record: Property) -> StoreResult<Property>;

    /// Applies the update and returns the record as it is afterwards, or
    /// `None` if no record has this id.
    async fn update_field(&self, id: &str, update: FieldUpdate) -> StoreResult<Option<Property>>;

    /// Returns `true` if a record was removed.
    async fn delete_by_id(&self, id: &str) -> StoreResult<bool>;

    /// Every record, bucketed by its `group` value.
    async fn group_by_status(&self) -> StoreResult<BTreeMap<String, Vec<Property>>>;

    /// Releases backend resources. Called once on shutdown.
    async fn close(&self) -> StoreResult<()> {
        Ok(())
    }
}

/// Opens the backend selected by the configuration.
pub async fn open(config: &ServerConfig) -> StoreResult<Arc<dyn PropertyStore>> {
    match config.backend {
        StoreBackend::MongoDb => {
            let store = MongoStore::connect(
                &config.mongo.uri,
                &config.mongo.database,
                &config.mongo.collection,
            )
            .await?;
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            info!("using in-memory property store; records are lost on exit");
            Ok(MemoryStore::new_shared())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use property_core::PropertyFields;

    #[test]
    fn blank_search_terms_are_ignored() {
        assert_eq!(PropertyFilter::all().text_search(), None);
        assert_eq!(PropertyFilter::search("   ").text_search(), None);
        assert_eq!(PropertyFilter::search(" harbour ").text_search(), Some("harbour"));
    }

    #[test]
    fn group_update_touches_only_group() {
        let mut fields = PropertyFields::new("Pending");
        fields.city = Some("Porto".to_string());
        let mut property = Property::from_fields("abc", fields);
        let before = property.clone();

        let update = FieldUpdate::Group("Exited".to_string());
        assert_eq!(update.field(), "group");
        update.apply(&mut property);

        assert_eq!(property.group, "Exited");
        assert_eq!(property.city, before.city);
        assert_eq!(property.id, before.id);
    }
}
