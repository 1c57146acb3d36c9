//! Collision-tolerant property creation.
//!
//! Ids are generated without reading the store first, so the store's unique
//! index is what actually guarantees uniqueness. A collision costs one more
//! attempt with a fresh id; any other failure ends the request immediately.
//! The loop is bounded so a misbehaving store cannot keep a request spinning.

use property_core::{Property, PropertyFields};
use tracing::{debug, warn};

use crate::error::{CreateError, StoreError};
use crate::id::generate_id;
use crate::store::PropertyStore;

pub const MAX_CREATE_ATTEMPTS: u32 = 3;

/// Inserts `data` under a freshly generated id, retrying on id collisions.
pub async fn create_with_retry(
    store: &dyn PropertyStore,
    data: PropertyFields,
) -> Result<Property, CreateError> {
    if data.group.trim().is_empty() {
        return Err(CreateError::Validation("group is required".to_string()));
    }

    for attempt in 1..=MAX_CREATE_ATTEMPTS {
        let candidate = Property::from_fields(generate_id(), data.clone());
        match store.insert_unique(candidate).await {
            Ok(stored) => {
                debug!(id = %stored.id, attempt, "property created");
                return Ok(stored);
            }
            Err(StoreError::DuplicateKey { id }) => {
                warn!(%id, attempt, "generated property id collided, retrying");
            }
            Err(err) => return Err(err.into()),
        }
    }

    Err(CreateError::CreationExhausted {
        attempts: MAX_CREATE_ATTEMPTS,
    })
}
