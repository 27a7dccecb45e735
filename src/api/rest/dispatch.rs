use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::rest::identity::Identity;
use crate::engine::{dispatch, views};
use crate::error::AppError;
use crate::models::admin::AdminRole;
use crate::models::order::Order;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/dispatch/pending", get(pending_queue))
        .route("/dispatch/assigned", get(assigned_queue))
        .route("/dispatch/jobs/active", get(my_active_jobs))
        .route("/dispatch/jobs/completed", get(my_completed_jobs))
        .route("/dispatch/orders/:id/assign", post(assign_order))
        .route("/dispatch/orders/:id/complete", post(complete_order))
}

#[derive(Deserialize)]
pub struct AssignOrderRequest {
    pub driver_email: String,
}

async fn require_super_admin(state: &AppState, identity: &Identity) -> Result<(), AppError> {
    match state.roles.resolve(&state.store, &identity.email).await {
        Some(AdminRole::SuperAdmin) => Ok(()),
        _ => Err(AppError::Forbidden(
            "dispatcher access requires super_admin".to_string(),
        )),
    }
}

async fn require_any_role(state: &AppState, identity: &Identity) -> Result<AdminRole, AppError> {
    state
        .roles
        .resolve(&state.store, &identity.email)
        .await
        .ok_or_else(|| AppError::Forbidden("driver access required".to_string()))
}

async fn pending_queue(
    State(state): State<Arc<AppState>>,
    identity: Identity,
) -> Result<Json<Vec<Order>>, AppError> {
    require_super_admin(&state, &identity).await?;
    let snapshot = state.store.orders_snapshot();
    Ok(Json(views::pending_orders(&snapshot)))
}

async fn assigned_queue(
    State(state): State<Arc<AppState>>,
    identity: Identity,
) -> Result<Json<Vec<Order>>, AppError> {
    require_super_admin(&state, &identity).await?;
    let snapshot = state.store.orders_snapshot();
    Ok(Json(views::assigned_orders(&snapshot)))
}

async fn my_active_jobs(
    State(state): State<Arc<AppState>>,
    identity: Identity,
) -> Result<Json<Vec<Order>>, AppError> {
    require_any_role(&state, &identity).await?;
    let snapshot = state.store.orders_snapshot();
    Ok(Json(views::my_active_jobs(&snapshot, &identity.email)))
}

async fn my_completed_jobs(
    State(state): State<Arc<AppState>>,
    identity: Identity,
) -> Result<Json<Vec<Order>>, AppError> {
    require_any_role(&state, &identity).await?;
    let snapshot = state.store.orders_snapshot();
    Ok(Json(views::my_completed_jobs(&snapshot, &identity.email)))
}

async fn assign_order(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignOrderRequest>,
) -> Result<Json<Order>, AppError> {
    let role = state.roles.resolve(&state.store, &identity.email).await;
    let order = dispatch::assign_order(&state, id, &payload.driver_email, role).await?;
    Ok(Json(order))
}

async fn complete_order(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    let order = dispatch::complete_order(&state, id, &identity.email).await?;
    Ok(Json(order))
}
