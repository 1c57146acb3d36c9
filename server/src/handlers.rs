//! HTTP route handlers.
//!
//! Each handler makes exactly one store call (or one `create_with_retry`)
//! and maps the outcome to a status code. Failures are logged here with the
//! operation and the id or search term involved.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use property_core::{MessageBody, Property, PropertyFields, UpdateGroup};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::create::create_with_retry;
use crate::error::AppError;
use crate::store::{FieldUpdate, PropertyFilter, PropertyStore};

/// Shared handler state: the store handle and nothing else.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn PropertyStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn PropertyStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &dyn PropertyStore {
        self.store.as_ref()
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(rename = "searchTerm")]
    pub search_term: Option<String>,
}

pub async fn list_properties(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Property>>, AppError> {
    let filter = PropertyFilter {
        search_term: query.search_term,
    };
    match state.store().find_many(&filter).await {
        Ok(properties) => Ok(Json(properties)),
        Err(err) => {
            error!(error = %err, search_term = ?filter.search_term, "failed to list properties");
            Err(AppError::Internal(err.to_string()))
        }
    }
}

pub async fn group_properties(
    State(state): State<AppState>,
) -> Result<Json<BTreeMap<String, Vec<Property>>>, AppError> {
    state.store().group_by_status().await.map(Json).map_err(|err| {
        error!(error = %err, "failed to group properties");
        AppError::Internal(err.to_string())
    })
}

pub async fn get_property(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Property>, AppError> {
    match state.store().find_by_id(&id).await {
        Ok(Some(property)) => Ok(Json(property)),
        Ok(None) => Err(AppError::NotFound),
        Err(err) => {
            error!(error = %err, %id, "failed to fetch property");
            Err(AppError::Internal(err.to_string()))
        }
    }
}

pub async fn create_property(
    State(state): State<AppState>,
    payload: Result<Json<PropertyFields>, JsonRejection>,
) -> Result<(StatusCode, Json<Property>), AppError> {
    let Json(input) = payload.map_err(|rejection| {
        error!(error = %rejection.body_text(), "rejected create payload");
        AppError::from(rejection)
    })?;
    match create_with_retry(state.store(), input).await {
        Ok(property) => {
            info!(id = %property.id, group = %property.group, "property created");
            Ok((StatusCode::CREATED, Json(property)))
        }
        Err(err) => {
            error!(error = %err, "failed to create property");
            Err(err.into())
        }
    }
}

/// Changes only the `group` of a property.
pub async fn update_property(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateGroup>, JsonRejection>,
) -> Result<Json<Property>, AppError> {
    let Json(input) = payload.map_err(|rejection| {
        error!(error = %rejection.body_text(), %id, "rejected group update payload");
        AppError::from(rejection)
    })?;
    if input.group.trim().is_empty() {
        return Err(AppError::BadRequest("group is required".to_string()));
    }
    match state
        .store()
        .update_field(&id, FieldUpdate::Group(input.group))
        .await
    {
        Ok(Some(property)) => Ok(Json(property)),
        Ok(None) => Err(AppError::NotFound),
        Err(err) => {
            error!(error = %err, %id, "failed to update property group");
            Err(AppError::BadRequest(err.to_string()))
        }
    }
}

pub async fn delete_property(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageBody>, AppError> {
    match state.store().delete_by_id(&id).await {
        Ok(true) => {
            info!(%id, "property deleted");
            Ok(Json(MessageBody::new("Property deleted successfully")))
        }
        Ok(false) => Err(AppError::NotFound),
        Err(err) => {
            error!(error = %err, %id, "failed to delete property");
            Err(AppError::Internal(err.to_string()))
        }
    }
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
