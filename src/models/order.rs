use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    Food,
    Parcel,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Assigned,
    Delivered,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    pub name: String,
    pub price: f64,
    pub quantity: u32,
}

/// One delivery job, food or parcel. Created once, moves forward through
/// `status` only, never deleted by normal flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    /// Creator's identity (email). Absent on legacy/anonymous records.
    pub user_id: Option<String>,
    pub order_type: OrderType,
    pub customer_name: String,
    pub customer_phone: String,
    /// Delivery destination.
    pub address: String,
    pub pickup_address: Option<String>,
    pub recipient_name: Option<String>,
    pub description: Option<String>,
    pub items: Vec<LineItem>,
    /// Computed at creation time, never recomputed even if fees change later.
    pub total: f64,
    pub status: OrderStatus,
    /// Driver email. Non-empty iff status is assigned or delivered.
    pub assigned_driver_id: Option<String>,
    pub payment_method: PaymentMethod,
    pub created_at: DateTime<Utc>,
    pub rating: Option<u8>,
    pub feedback: Option<String>,
}

impl Order {
    /// Driver identity match: case-insensitive, whitespace-trimmed.
    pub fn is_assigned_to(&self, driver_email: &str) -> bool {
        self.assigned_driver_id
            .as_deref()
            .is_some_and(|assigned| assigned.trim().eq_ignore_ascii_case(driver_email.trim()))
    }
}

/// Creation payload. The store assigns the id and `created_at`; every new
/// order starts pending with no driver.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: Option<String>,
    pub order_type: OrderType,
    pub customer_name: String,
    pub customer_phone: String,
    pub address: String,
    pub pickup_address: Option<String>,
    pub recipient_name: Option<String>,
    pub description: Option<String>,
    pub items: Vec<LineItem>,
    pub total: f64,
    pub payment_method: PaymentMethod,
}

impl NewOrder {
    pub fn into_order(self, id: Uuid, created_at: DateTime<Utc>) -> Order {
        Order {
            id,
            user_id: self.user_id,
            order_type: self.order_type,
            customer_name: self.customer_name,
            customer_phone: self.customer_phone,
            address: self.address,
            pickup_address: self.pickup_address,
            recipient_name: self.recipient_name,
            description: self.description,
            items: self.items,
            total: self.total,
            status: OrderStatus::Pending,
            assigned_driver_id: None,
            payment_method: self.payment_method,
            created_at,
            rating: None,
            feedback: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delivered_order(driver: &str) -> Order {
        Order {
            id: Uuid::from_u128(7),
            user_id: Some("c@x.com".to_string()),
            order_type: OrderType::Parcel,
            customer_name: "Thabo".to_string(),
            customer_phone: "0110000000".to_string(),
            address: "12 Main Rd".to_string(),
            pickup_address: Some("1 Depot St".to_string()),
            recipient_name: Some("Sarah".to_string()),
            description: None,
            items: vec![],
            total: 100.0,
            status: OrderStatus::Delivered,
            assigned_driver_id: Some(driver.to_string()),
            payment_method: PaymentMethod::Cash,
            created_at: Utc::now(),
            rating: None,
            feedback: None,
        }
    }

    #[test]
    fn driver_match_ignores_case_and_whitespace() {
        let order = delivered_order("jane@x.com ");
        assert!(order.is_assigned_to("Jane@x.com"));
        assert!(order.is_assigned_to("  JANE@X.COM"));
        assert!(!order.is_assigned_to("john@x.com"));
    }

    #[test]
    fn unassigned_order_matches_no_driver() {
        let mut order = delivered_order("jane@x.com");
        order.assigned_driver_id = None;
        order.status = OrderStatus::Pending;
        assert!(!order.is_assigned_to("jane@x.com"));
    }
}
