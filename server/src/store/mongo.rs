//! MongoDB property store.
//!
//! Records are stored one document per property in a single collection.
//! `connect` pings the server and ensures two indexes:
//! - a unique index on `id`, which turns an id collision into write error
//!   `11000` (mapped to `StoreError::DuplicateKey`);
//! - a text index over address, property name, city and tag, used by
//!   `$text` search.
//!
//! Documents are read and written through `PropertyDocument`, not the wire
//! type: contract dates are BSON dates (legacy text dates are still read),
//! and a document missing `group` still decodes. Such documents land in the
//! `"null"` bucket when grouped. MongoDB's own `_id` is left to the server
//! and only used to keep listings in insertion order.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use futures_util::TryStreamExt;
use mongodb::bson::{self, doc, Bson, Document};
use mongodb::error::{Error as MongoError, ErrorKind, WriteFailure};
use mongodb::options::{IndexOptions, ReturnDocument};
use mongodb::{Client, Collection, IndexModel};
use property_core::types::contract_date;
use property_core::{Cost, Property};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::{FieldUpdate, PropertyFilter, PropertyStore};
use crate::error::{StoreError, StoreResult};

/// Server error code for a unique index violation.
const DUPLICATE_KEY_CODE: i32 = 11000;

pub struct MongoStore {
    client: Client,
    collection: Collection<PropertyDocument>,
}

/// Bucket name for documents stored without a `group`.
const MISSING_GROUP_BUCKET: &str = "null";

/// Stored shape of a property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PropertyDocument {
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rental_cost: Option<Cost>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    property_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    contract_start_date: Option<Bson>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    contract_end_date: Option<Bson>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    direct_cost: Option<Cost>,
    #[serde(default)]
    group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fixed_cost: Option<f64>,
}

impl From<&Property> for PropertyDocument {
    fn from(property: &Property) -> Self {
        Self {
            id: property.id.clone(),
            address: property.address.clone(),
            rental_cost: property.rental_cost.clone(),
            property_name: property.property_name.clone(),
            tag: property.tag.clone(),
            contract_start_date: property.contract_start_date.map(to_bson_date),
            contract_end_date: property.contract_end_date.map(to_bson_date),
            direct_cost: property.direct_cost.clone(),
            group: Some(property.group.clone()),
            city: property.city.clone(),
            fixed_cost: property.fixed_cost,
        }
    }
}

impl PropertyDocument {
    /// A missing `group` reads back as an empty string.
    fn into_property(self) -> Property {
        Property {
            id: self.id,
            address: self.address,
            rental_cost: self.rental_cost,
            property_name: self.property_name,
            tag: self.tag,
            contract_start_date: self.contract_start_date.as_ref().and_then(from_bson_date),
            contract_end_date: self.contract_end_date.as_ref().and_then(from_bson_date),
            direct_cost: self.direct_cost,
            group: self.group.unwrap_or_default(),
            city: self.city,
            fixed_cost: self.fixed_cost,
        }
    }
}

fn to_bson_date(date: DateTime<Utc>) -> Bson {
    Bson::DateTime(bson::DateTime::from_millis(date.timestamp_millis()))
}

/// BSON dates, plus text dates written before dates were stored natively.
fn from_bson_date(value: &Bson) -> Option<DateTime<Utc>> {
    match value {
        Bson::DateTime(date) => Utc.timestamp_millis_opt(date.timestamp_millis()).single(),
        Bson::String(text) => contract_date::parse(text).ok(),
        _ => None,
    }
}

/// One `$group` output document.
#[derive(Debug, Deserialize)]
struct GroupBucket {
    #[serde(rename = "_id")]
    group: Option<String>,
    records: Vec<PropertyDocument>,
}

impl GroupBucket {
    fn into_entry(self) -> (String, Vec<Property>) {
        let key = self
            .group
            .unwrap_or_else(|| MISSING_GROUP_BUCKET.to_string());
        let records = self
            .records
            .into_iter()
            .map(PropertyDocument::into_property)
            .collect();
        (key, records)
    }
}

impl MongoStore {
    #[instrument(skip(uri))]
    pub async fn connect(uri: &str, database: &str, collection: &str) -> StoreResult<Self> {
        let client = Client::with_uri_str(uri).await.map_err(connection_error)?;
        let db = client.database(database);
        db.run_command(doc! { "ping": 1 })
            .await
            .map_err(connection_error)?;

        let store = Self {
            client,
            collection: db.collection(collection),
        };
        store.ensure_indexes().await?;
        info!(database, collection, "connected to MongoDB");
        Ok(store)
    }

    async fn ensure_indexes(&self) -> StoreResult<()> {
        let unique_id = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();
        let text = IndexModel::builder()
            .keys(doc! {
                "address": "text",
                "propertyName": "text",
                "city": "text",
                "tag": "text"
            })
            .options(
                IndexOptions::builder()
                    .name("property_text".to_string())
                    .build(),
            )
            .build();

        self.collection
            .create_indexes([unique_id, text])
            .await
            .map_err(query_error)?;
        Ok(())
    }
}

fn by_id(id: &str) -> Document {
    doc! { "id": id }
}

fn set_document(update: &FieldUpdate) -> Document {
    let value = match update {
        FieldUpdate::Group(group) => Bson::String(group.clone()),
    };
    let mut set = Document::new();
    set.insert(update.field(), value);
    doc! { "$set": set }
}

fn is_duplicate_key(err: &MongoError) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write)) if write.code == DUPLICATE_KEY_CODE
    )
}

fn connection_error(err: MongoError) -> StoreError {
    StoreError::Connection {
        message: err.to_string(),
    }
}

fn query_error(err: MongoError) -> StoreError {
    StoreError::Query {
        message: err.to_string(),
    }
}

#[async_trait]
impl PropertyStore for MongoStore {
    #[instrument(skip(self))]
    async fn find_many(&self, filter: &PropertyFilter) -> StoreResult<Vec<Property>> {
        let query = match filter.text_search() {
            Some(term) => doc! { "$text": { "$search": term } },
            None => Document::new(),
        };
        let cursor = self
            .collection
            .find(query)
            .sort(doc! { "_id": 1 })
            .await
            .map_err(query_error)?;
        let documents: Vec<PropertyDocument> = cursor.try_collect().await.map_err(query_error)?;
        Ok(documents
            .into_iter()
            .map(PropertyDocument::into_property)
            .collect())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Property>> {
        self.collection
            .find_one(by_id(id))
            .await
            .map(|found| found.map(PropertyDocument::into_property))
            .map_err(query_error)
    }

    #[instrument(skip(self, record), fields(id = %record.id))]
    async fn insert_unique(&self, record: Property) -> StoreResult<Property> {
        match self
            .collection
            .insert_one(PropertyDocument::from(&record))
            .await {
            Ok(_) => Ok(record),
            Err(err) if is_duplicate_key(&err) => Err(StoreError::DuplicateKey { id: record.id }),
            Err(err) => Err(query_error(err)),
        }
    }

    #[instrument(skip(self))]
    async fn update_field(&self, id: &str, update: FieldUpdate) -> StoreResult<Option<Property>> {
        self.collection
            .find_one_and_update(by_id(id), set_document(&update))
            .return_document(ReturnDocument::After)
            .await
            .map(|updated| updated.map(PropertyDocument::into_property))
            .map_err(query_error)
    }

    #[instrument(skip(self))]
    async fn delete_by_id(&self, id: &str) -> StoreResult<bool> {
        let result = self
            .collection
            .delete_one(by_id(id))
            .await
            .map_err(query_error)?;
        Ok(result.deleted_count > 0)
    }

    #[instrument(skip(self))]
    async fn group_by_status(&self) -> StoreResult<BTreeMap<String, Vec<Property>>> {
        let pipeline = [doc! {
            "$group": { "_id": "$group", "records": { "$push": "$$ROOT" } }
        }];
        let mut cursor = self
            .collection
            .aggregate(pipeline)
            .await
            .map_err(query_error)?;

        let mut groups: BTreeMap<String, Vec<Property>> = BTreeMap::new();
        while let Some(raw) = cursor.try_next().await.map_err(query_error)? {
            let bucket: GroupBucket =
                bson::from_document(raw).map_err(|e| StoreError::Serialization {
                    message: e.to_string(),
                })?;
            let (key, records) = bucket.into_entry();
            groups.entry(key).or_default().extend(records);
        }
        Ok(groups)
    }

    async fn close(&self) -> StoreResult<()> {
        self.client.clone().shutdown().await;
        info!("MongoDB connection closed");
        Ok(())
    }
}
