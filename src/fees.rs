//! Fee pricing for food deliveries and parcel weight brackets.
//!
//! Bracket labels changed over time in the order forms; the old labels are
//! still stored on historical records, so both spellings must keep pricing.

use crate::models::order::LineItem;
use crate::models::settings::FeeSettings;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParcelBracket {
    Small,
    Medium,
    Large,
}

impl ParcelBracket {
    /// Maps a stored bracket label to its weight band. Unrecognized labels
    /// price as the smallest bracket rather than failing.
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "0-5kg" | "0-5kg (Small Bike)" => ParcelBracket::Small,
            "5-20kg" | "5-20kg (Car)" => ParcelBracket::Medium,
            "20kg+" | "20kg+ (Van)" => ParcelBracket::Large,
            _ => ParcelBracket::Small,
        }
    }
}

pub fn parcel_price(settings: &FeeSettings, bracket_label: &str) -> f64 {
    match ParcelBracket::from_label(bracket_label) {
        ParcelBracket::Small => settings.parcel_small_fee,
        ParcelBracket::Medium => settings.parcel_medium_fee,
        ParcelBracket::Large => settings.parcel_large_fee,
    }
}

/// Flat per-order delivery fee, independent of item count.
pub fn food_delivery_price(settings: &FeeSettings) -> f64 {
    settings.food_delivery_fee
}

pub fn order_total(items: &[LineItem], delivery_fee: f64) -> f64 {
    let subtotal: f64 = items
        .iter()
        .map(|item| item.price * f64::from(item.quantity))
        .sum();
    subtotal + delivery_fee
}
