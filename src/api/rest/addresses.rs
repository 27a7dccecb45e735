use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{delete, post};
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::rest::identity::Identity;
use crate::error::AppError;
use crate::models::settings::SavedAddress;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/addresses", post(create_address).get(list_addresses))
        .route("/addresses/:id", delete(remove_address))
}

#[derive(Deserialize)]
pub struct CreateAddressRequest {
    pub label: String,
    pub address: String,
}

async fn list_addresses(
    State(state): State<Arc<AppState>>,
    identity: Identity,
) -> Json<Vec<SavedAddress>> {
    Json(state.store.addresses_for(&identity.email))
}

async fn create_address(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Json(payload): Json<CreateAddressRequest>,
) -> Result<Json<SavedAddress>, AppError> {
    if payload.label.trim().is_empty() || payload.address.trim().is_empty() {
        return Err(AppError::BadRequest(
            "label and address cannot be empty".to_string(),
        ));
    }

    let saved = state
        .store
        .create_address(&identity.email, payload.label, payload.address);
    Ok(Json(saved))
}

async fn remove_address(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<SavedAddress>, AppError> {
    let removed = state.store.remove_address(id, &identity.email)?;
    Ok(Json(removed))
}
