//! Dispatch operations on the order state machine.
//!
//! Orders only ever move forward: pending -> assigned -> delivered. Every
//! transition is a guarded store write keyed on the expected prior status,
//! so a racing dispatcher gets a conflict instead of silently winning.

use std::time::Instant;

use tokio::time::timeout;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::admin::AdminRole;
use crate::models::order::{Order, OrderStatus};
use crate::state::AppState;
use crate::store::OrderPatch;

/// Assigns a pending order to a driver. Dispatcher capability required, and
/// the driver email must belong to a registry entry.
pub async fn assign_order(
    state: &AppState,
    order_id: Uuid,
    driver_email: &str,
    caller_role: Option<AdminRole>,
) -> Result<Order, AppError> {
    let result = do_assign(state, order_id, driver_email, caller_role).await;

    state
        .metrics
        .dispatch_ops_total
        .with_label_values(&["assign", outcome(&result)])
        .inc();

    match &result {
        Ok(order) => {
            state.metrics.pending_orders.dec();
            info!(
                order_id = %order.id,
                driver = order.assigned_driver_id.as_deref().unwrap_or_default(),
                "order assigned"
            );
        }
        Err(err) => warn!(order_id = %order_id, error = %err, "assign rejected"),
    }

    result
}

async fn do_assign(
    state: &AppState,
    order_id: Uuid,
    driver_email: &str,
    caller_role: Option<AdminRole>,
) -> Result<Order, AppError> {
    if caller_role != Some(AdminRole::SuperAdmin) {
        return Err(AppError::Forbidden(
            "assigning orders requires super_admin".to_string(),
        ));
    }

    let driver_email = driver_email.trim().to_ascii_lowercase();
    if driver_email.is_empty() {
        return Err(AppError::BadRequest("driver email cannot be empty".to_string()));
    }

    if state.store.find_admin_by_email(&driver_email).is_none() {
        return Err(AppError::BadRequest(format!(
            "{driver_email} is not a registered driver"
        )));
    }

    state
        .store
        .patch_order(
            order_id,
            Some(OrderStatus::Pending),
            OrderPatch {
                status: Some(OrderStatus::Assigned),
                assigned_driver_id: Some(driver_email),
                ..OrderPatch::default()
            },
        )
        .await
}

/// Marks an assigned order delivered. Only the currently assigned driver
/// may call this (email compared case-insensitively and trimmed). The store
/// write races a fixed timeout; on expiry the caller gets a timeout outcome
/// and, because the write is atomic, no half-applied state is left behind.
pub async fn complete_order(
    state: &AppState,
    order_id: Uuid,
    caller_email: &str,
) -> Result<Order, AppError> {
    let start = Instant::now();
    let result = do_complete(state, order_id, caller_email).await;

    let label = outcome(&result);
    state
        .metrics
        .dispatch_ops_total
        .with_label_values(&["complete", label])
        .inc();
    state
        .metrics
        .complete_latency_seconds
        .with_label_values(&[label])
        .observe(start.elapsed().as_secs_f64());

    match &result {
        Ok(order) => info!(order_id = %order.id, driver = %caller_email, "order delivered"),
        Err(err) => warn!(order_id = %order_id, error = %err, "complete rejected"),
    }

    result
}

async fn do_complete(
    state: &AppState,
    order_id: Uuid,
    caller_email: &str,
) -> Result<Order, AppError> {
    let order = state
        .store
        .order(order_id)
        .ok_or_else(|| AppError::NotFound(format!("order {order_id} not found")))?;

    if !order.is_assigned_to(caller_email) {
        return Err(AppError::Forbidden(
            "only the assigned driver may complete this order".to_string(),
        ));
    }

    let write = state.store.patch_order(
        order_id,
        Some(OrderStatus::Assigned),
        OrderPatch {
            status: Some(OrderStatus::Delivered),
            ..OrderPatch::default()
        },
    );

    match timeout(state.complete_timeout, write).await {
        Ok(result) => result,
        Err(_elapsed) => Err(AppError::StoreTimeout(format!(
            "completing order {order_id} did not confirm within {:?}",
            state.complete_timeout
        ))),
    }
}

fn outcome<T>(result: &Result<T, AppError>) -> &'static str {
    match result {
        Ok(_) => "success",
        Err(AppError::Conflict(_)) => "conflict",
        Err(AppError::Forbidden(_)) => "forbidden",
        Err(AppError::NotFound(_)) => "not_found",
        Err(AppError::BadRequest(_)) => "bad_request",
        Err(AppError::StoreTimeout(_)) => "timeout",
        Err(_) => "error",
    }
}
