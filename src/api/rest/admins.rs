use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{delete, get};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::rest::identity::Identity;
use crate::error::AppError;
use crate::models::admin::{AdminRole, AdminUser};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admins", get(list_admins).post(register_admin))
        .route("/admins/:id", delete(remove_admin))
        .route("/auth/role", get(my_role))
}

#[derive(Deserialize)]
pub struct RegisterAdminRequest {
    pub email: String,
    pub role: AdminRole,
}

#[derive(Serialize)]
struct RoleResponse {
    email: String,
    role: Option<AdminRole>,
}

async fn require_super_admin(state: &AppState, identity: &Identity) -> Result<(), AppError> {
    match state.roles.resolve(&state.store, &identity.email).await {
        Some(AdminRole::SuperAdmin) => Ok(()),
        _ => Err(AppError::Forbidden(
            "managing the registry requires super_admin".to_string(),
        )),
    }
}

/// The session-start event: resolves (and if eligible, bootstraps) the
/// calling identity's role.
async fn my_role(State(state): State<Arc<AppState>>, identity: Identity) -> Json<RoleResponse> {
    let role = state.roles.resolve(&state.store, &identity.email).await;

    let result = match role {
        Some(AdminRole::SuperAdmin) => "super_admin",
        Some(AdminRole::Driver) => "driver",
        None => "none",
    };
    state
        .metrics
        .role_resolutions_total
        .with_label_values(&[result])
        .inc();

    Json(RoleResponse {
        email: identity.email,
        role,
    })
}

async fn list_admins(
    State(state): State<Arc<AppState>>,
    identity: Identity,
) -> Result<Json<Vec<AdminUser>>, AppError> {
    require_super_admin(&state, &identity).await?;
    Ok(Json(state.store.admins()))
}

async fn register_admin(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Json(payload): Json<RegisterAdminRequest>,
) -> Result<Json<AdminUser>, AppError> {
    require_super_admin(&state, &identity).await?;

    let email = payload.email.trim().to_ascii_lowercase();
    if email.is_empty() {
        return Err(AppError::BadRequest("email cannot be empty".to_string()));
    }

    let admin = state.store.insert_admin_unique(&email, payload.role).await?;
    Ok(Json(admin))
}

async fn remove_admin(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<AdminUser>, AppError> {
    require_super_admin(&state, &identity).await?;
    let removed = state.store.remove_admin(id)?;
    Ok(Json(removed))
}
