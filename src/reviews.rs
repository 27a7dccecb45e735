//! Rating and feedback on delivered orders.
//!
//! A review is accepted exactly once per order. A second submission is
//! hard-rejected with a conflict; it never silently overwrites the stored
//! values.

use uuid::Uuid;

use crate::error::AppError;
use crate::models::order::{Order, OrderStatus};
use crate::state::AppState;
use crate::store::OrderPatch;

pub async fn submit_review(
    state: &AppState,
    order_id: Uuid,
    rating: u8,
    feedback: Option<String>,
) -> Result<Order, AppError> {
    if !(1..=5).contains(&rating) {
        return Err(AppError::BadRequest(
            "rating must be between 1 and 5".to_string(),
        ));
    }

    let order = state
        .store
        .order(order_id)
        .ok_or_else(|| AppError::NotFound(format!("order {order_id} not found")))?;

    if order.status != OrderStatus::Delivered {
        return Err(AppError::Conflict(format!(
            "order {order_id} is not delivered yet"
        )));
    }

    state
        .store
        .patch_order(
            order_id,
            Some(OrderStatus::Delivered),
            OrderPatch {
                rating: Some(rating),
                feedback: feedback.filter(|text| !text.trim().is_empty()),
                ..OrderPatch::default()
            },
        )
        .await
}
