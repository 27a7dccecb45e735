use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::rest::identity::Identity;
use crate::error::AppError;
use crate::models::admin::AdminRole;
use crate::models::settings::FeeSettings;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/settings/fees", get(get_fees).put(put_fees))
}

async fn get_fees(State(state): State<Arc<AppState>>) -> Json<FeeSettings> {
    Json(state.store.fee_settings().await)
}

async fn put_fees(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Json(settings): Json<FeeSettings>,
) -> Result<Json<FeeSettings>, AppError> {
    match state.roles.resolve(&state.store, &identity.email).await {
        Some(AdminRole::SuperAdmin) => {}
        _ => {
            return Err(AppError::Forbidden(
                "editing fees requires super_admin".to_string(),
            ));
        }
    }

    let fees = [
        settings.food_delivery_fee,
        settings.parcel_small_fee,
        settings.parcel_medium_fee,
        settings.parcel_large_fee,
    ];
    if fees.iter().any(|fee| !fee.is_finite() || *fee < 0.0) {
        return Err(AppError::BadRequest(
            "fees must be non-negative numbers".to_string(),
        ));
    }

    state.store.set_fee_settings(settings.clone()).await;
    Ok(Json(settings))
}
