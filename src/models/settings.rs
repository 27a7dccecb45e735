use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Process-wide fee configuration. Read-only to the dispatch core; absence
/// in the store falls back to these defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeeSettings {
    pub food_delivery_fee: f64,
    pub parcel_small_fee: f64,
    pub parcel_medium_fee: f64,
    pub parcel_large_fee: f64,
}

impl Default for FeeSettings {
    fn default() -> Self {
        Self {
            food_delivery_fee: 25.0,
            parcel_small_fee: 50.0,
            parcel_medium_fee: 100.0,
            parcel_large_fee: 200.0,
        }
    }
}

/// User-owned convenience record. No lifecycle interaction with orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedAddress {
    pub id: Uuid,
    pub user_id: String,
    pub label: String,
    pub address: String,
}
