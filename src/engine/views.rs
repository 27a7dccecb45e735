//! Per-role order views, recomputed as pure functions of the latest full
//! snapshot on every feed update.

use crate::models::order::{Order, OrderStatus};

pub fn pending_orders(snapshot: &[Order]) -> Vec<Order> {
    newest_first(
        snapshot
            .iter()
            .filter(|order| order.status == OrderStatus::Pending)
            .cloned()
            .collect(),
    )
}

pub fn assigned_orders(snapshot: &[Order]) -> Vec<Order> {
    newest_first(
        snapshot
            .iter()
            .filter(|order| order.status == OrderStatus::Assigned)
            .cloned()
            .collect(),
    )
}

/// Jobs still open for a driver: assigned to them, not yet delivered.
pub fn my_active_jobs(snapshot: &[Order], driver_email: &str) -> Vec<Order> {
    newest_first(
        snapshot
            .iter()
            .filter(|order| {
                order.is_assigned_to(driver_email) && order.status != OrderStatus::Delivered
            })
            .cloned()
            .collect(),
    )
}

pub fn my_completed_jobs(snapshot: &[Order], driver_email: &str) -> Vec<Order> {
    newest_first(
        snapshot
            .iter()
            .filter(|order| {
                order.is_assigned_to(driver_email) && order.status == OrderStatus::Delivered
            })
            .cloned()
            .collect(),
    )
}

/// A customer's own order history. Legacy records without an owner never
/// show up here.
pub fn orders_for_user(snapshot: &[Order], email: &str) -> Vec<Order> {
    newest_first(
        snapshot
            .iter()
            .filter(|order| order.user_id.as_deref() == Some(email))
            .cloned()
            .collect(),
    )
}

fn newest_first(mut orders: Vec<Order>) -> Vec<Order> {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    orders
}
