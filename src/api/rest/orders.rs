use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::rest::identity::Identity;
use crate::engine::views;
use crate::error::AppError;
use crate::fees;
use crate::models::order::{LineItem, NewOrder, Order, OrderType, PaymentMethod};
use crate::reviews;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders", post(create_food_order).get(list_my_orders))
        .route("/orders/:id", get(get_order))
        .route("/orders/:id/review", post(submit_review))
        .route("/parcels", post(create_parcel_order))
}

#[derive(Deserialize)]
pub struct CreateFoodOrderRequest {
    pub customer_name: String,
    pub customer_phone: String,
    pub address: String,
    pub items: Vec<LineItem>,
    pub payment_method: PaymentMethod,
}

#[derive(Deserialize)]
pub struct CreateParcelRequest {
    pub sender_name: String,
    pub customer_phone: String,
    pub pickup_address: String,
    pub delivery_address: String,
    pub recipient_name: String,
    pub description: Option<String>,
    /// Weight bracket label, canonical or legacy.
    pub weight: String,
    pub payment_method: PaymentMethod,
}

#[derive(Deserialize)]
pub struct SubmitReviewRequest {
    pub rating: u8,
    pub feedback: Option<String>,
}

async fn create_food_order(
    State(state): State<Arc<AppState>>,
    identity: Option<Identity>,
    Json(payload): Json<CreateFoodOrderRequest>,
) -> Result<Json<Order>, AppError> {
    if payload.customer_name.trim().is_empty() {
        return Err(AppError::BadRequest("customer name cannot be empty".to_string()));
    }
    if payload.address.trim().is_empty() {
        return Err(AppError::BadRequest("address cannot be empty".to_string()));
    }

    // zero-quantity lines are dropped here and never persisted
    let items: Vec<LineItem> = payload
        .items
        .into_iter()
        .filter(|item| item.quantity >= 1)
        .collect();
    if items.is_empty() {
        return Err(AppError::BadRequest(
            "order must contain at least one item".to_string(),
        ));
    }
    if items.iter().any(|item| item.price < 0.0) {
        return Err(AppError::BadRequest("item price cannot be negative".to_string()));
    }

    let settings = state.store.fee_settings().await;
    let fee = fees::food_delivery_price(&settings);
    let total = fees::order_total(&items, fee);

    let order = state
        .store
        .create_order(NewOrder {
            user_id: identity.map(|i| i.email),
            order_type: OrderType::Food,
            customer_name: payload.customer_name,
            customer_phone: payload.customer_phone,
            address: payload.address,
            pickup_address: None,
            recipient_name: None,
            description: None,
            items,
            total,
            payment_method: payload.payment_method,
        })
        .await;

    state
        .metrics
        .orders_created_total
        .with_label_values(&["food"])
        .inc();
    state.metrics.pending_orders.inc();

    Ok(Json(order))
}

async fn create_parcel_order(
    State(state): State<Arc<AppState>>,
    identity: Option<Identity>,
    Json(payload): Json<CreateParcelRequest>,
) -> Result<Json<Order>, AppError> {
    if payload.sender_name.trim().is_empty() {
        return Err(AppError::BadRequest("sender name cannot be empty".to_string()));
    }
    if payload.pickup_address.trim().is_empty() || payload.delivery_address.trim().is_empty() {
        return Err(AppError::BadRequest(
            "pickup and delivery addresses are required".to_string(),
        ));
    }

    let settings = state.store.fee_settings().await;
    let total = fees::parcel_price(&settings, &payload.weight);

    let order = state
        .store
        .create_order(NewOrder {
            user_id: identity.map(|i| i.email),
            order_type: OrderType::Parcel,
            customer_name: payload.sender_name,
            customer_phone: payload.customer_phone,
            address: payload.delivery_address,
            pickup_address: Some(payload.pickup_address),
            recipient_name: Some(payload.recipient_name),
            description: payload.description,
            items: vec![],
            total,
            payment_method: payload.payment_method,
        })
        .await;

    state
        .metrics
        .orders_created_total
        .with_label_values(&["parcel"])
        .inc();
    state.metrics.pending_orders.inc();

    Ok(Json(order))
}

async fn list_my_orders(
    State(state): State<Arc<AppState>>,
    identity: Identity,
) -> Json<Vec<Order>> {
    let snapshot = state.store.orders_snapshot();
    Json(views::orders_for_user(&snapshot, &identity.email))
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    let order = state
        .store
        .order(id)
        .ok_or_else(|| AppError::NotFound(format!("order {id} not found")))?;

    Ok(Json(order))
}

async fn submit_review(
    State(state): State<Arc<AppState>>,
    _identity: Identity,
    Path(id): Path<Uuid>,
    Json(payload): Json<SubmitReviewRequest>,
) -> Result<Json<Order>, AppError> {
    let order = reviews::submit_review(&state, id, payload.rating, payload.feedback).await?;
    Ok(Json(order))
}
