//! The shared store: single source of truth for orders, the admin registry,
//! fee settings and saved addresses.
//!
//! It exposes four order primitives: append-with-generated-id create, full
//! collection read, guarded partial update by id, and a subscription feed
//! that delivers the entire current order set on every change. Consumers
//! derive their views from the latest snapshot, never from deltas.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::{Mutex, RwLock, broadcast};
use tracing::debug;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::admin::{AdminRole, AdminUser};
use crate::models::order::{NewOrder, Order, OrderStatus};
use crate::models::settings::{FeeSettings, SavedAddress};

pub type OrderSnapshot = Arc<Vec<Order>>;

/// Field-level update for an order. `None` leaves the field untouched.
#[derive(Debug, Default, Clone)]
pub struct OrderPatch {
    pub status: Option<OrderStatus>,
    pub assigned_driver_id: Option<String>,
    pub rating: Option<u8>,
    pub feedback: Option<String>,
}

pub struct SharedStore {
    orders: DashMap<Uuid, Order>,
    admins: DashMap<Uuid, AdminUser>,
    addresses: DashMap<Uuid, SavedAddress>,
    fee_settings: RwLock<Option<FeeSettings>>,
    // Serializes scan-then-insert on the registry so two concurrent first
    // sign-ins cannot both observe it empty.
    admin_write: Mutex<()>,
    feed_tx: broadcast::Sender<OrderSnapshot>,
}

impl SharedStore {
    pub fn new(event_buffer_size: usize) -> Self {
        let (feed_tx, _unused_rx) = broadcast::channel(event_buffer_size);

        Self {
            orders: DashMap::new(),
            admins: DashMap::new(),
            addresses: DashMap::new(),
            fee_settings: RwLock::new(None),
            admin_write: Mutex::new(()),
            feed_tx,
        }
    }

    // ---- orders ----

    pub async fn create_order(&self, new_order: NewOrder) -> Order {
        let order = new_order.into_order(Uuid::new_v4(), Utc::now());
        self.orders.insert(order.id, order.clone());
        self.publish();
        order
    }

    pub fn order(&self, id: Uuid) -> Option<Order> {
        self.orders.get(&id).map(|entry| entry.value().clone())
    }

    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    /// Full collection read, newest first.
    pub fn orders_snapshot(&self) -> OrderSnapshot {
        let mut orders: Vec<Order> = self
            .orders
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Arc::new(orders)
    }

    /// Guarded partial update. When `expected_status` is given the write
    /// only goes through if the order is still in that status, otherwise it
    /// fails with `Conflict` instead of silently overwriting a concurrent
    /// transition. Write-once fields (`rating`, `feedback`) are rejected on
    /// a second write.
    pub async fn patch_order(
        &self,
        id: Uuid,
        expected_status: Option<OrderStatus>,
        patch: OrderPatch,
    ) -> Result<Order, AppError> {
        let updated = {
            let mut entry = self
                .orders
                .get_mut(&id)
                .ok_or_else(|| AppError::NotFound(format!("order {id} not found")))?;

            if let Some(expected) = expected_status {
                if entry.status != expected {
                    return Err(AppError::Conflict(format!(
                        "order {id} is {:?}, expected {:?}",
                        entry.status, expected
                    )));
                }
            }

            if patch.rating.is_some() && entry.rating.is_some() {
                return Err(AppError::Conflict(format!("order {id} is already reviewed")));
            }

            if let Some(status) = patch.status {
                entry.status = status;
            }
            if let Some(driver) = patch.assigned_driver_id {
                entry.assigned_driver_id = Some(driver);
            }
            if let Some(rating) = patch.rating {
                entry.rating = Some(rating);
            }
            if let Some(feedback) = patch.feedback {
                entry.feedback = Some(feedback);
            }

            entry.clone()
        };

        self.publish();
        Ok(updated)
    }

    /// Live feed of full order snapshots. Lagging receivers skip straight to
    /// a later snapshot; intermediate states are disposable.
    pub fn subscribe(&self) -> broadcast::Receiver<OrderSnapshot> {
        self.feed_tx.subscribe()
    }

    fn publish(&self) {
        let snapshot = self.orders_snapshot();
        let receivers = self.feed_tx.send(snapshot).unwrap_or(0);
        debug!(receivers, "order snapshot published");
    }

    // ---- admin registry ----

    /// Full registry scan. The backing store guarantees no secondary index,
    /// so lookups filter client-side.
    pub fn admins(&self) -> Vec<AdminUser> {
        let mut admins: Vec<AdminUser> = self
            .admins
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        admins.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        admins
    }

    /// Linear scan for an email match, case-sensitive as stored. Callers
    /// normalize case before calling.
    pub fn find_admin_by_email(&self, email: &str) -> Option<AdminUser> {
        self.admins
            .iter()
            .find(|entry| entry.value().email == email)
            .map(|entry| entry.value().clone())
    }

    /// Inserts a registry entry, rejecting duplicates by email.
    pub async fn insert_admin_unique(
        &self,
        email: &str,
        role: AdminRole,
    ) -> Result<AdminUser, AppError> {
        let _guard = self.admin_write.lock().await;

        if self.find_admin_by_email(email).is_some() {
            return Err(AppError::Conflict(format!("{email} is already registered")));
        }

        Ok(self.insert_admin(email, role))
    }

    /// The one-time bootstrap insert. Under the registry lock: if the email
    /// already has an entry that entry wins (a concurrent sign-in got there
    /// first); otherwise the identity is promoted when it is the owner or
    /// the registry is completely empty.
    pub async fn try_bootstrap_admin(&self, email: &str, is_owner: bool) -> Option<AdminUser> {
        let _guard = self.admin_write.lock().await;

        if let Some(existing) = self.find_admin_by_email(email) {
            return Some(existing);
        }

        if is_owner || self.admins.is_empty() {
            return Some(self.insert_admin(email, AdminRole::SuperAdmin));
        }

        None
    }

    fn insert_admin(&self, email: &str, role: AdminRole) -> AdminUser {
        let admin = AdminUser {
            id: Uuid::new_v4(),
            email: email.to_string(),
            role,
            created_at: Utc::now(),
        };
        self.admins.insert(admin.id, admin.clone());
        admin
    }

    pub fn remove_admin(&self, id: Uuid) -> Result<AdminUser, AppError> {
        self.admins
            .remove(&id)
            .map(|(_, admin)| admin)
            .ok_or_else(|| AppError::NotFound(format!("admin {id} not found")))
    }

    pub fn admin_count(&self) -> usize {
        self.admins.len()
    }

    // ---- fee settings ----

    pub async fn fee_settings(&self) -> FeeSettings {
        self.fee_settings.read().await.clone().unwrap_or_default()
    }

    pub async fn set_fee_settings(&self, settings: FeeSettings) {
        *self.fee_settings.write().await = Some(settings);
    }

    // ---- saved addresses ----

    pub fn addresses_for(&self, user_id: &str) -> Vec<SavedAddress> {
        let mut addresses: Vec<SavedAddress> = self
            .addresses
            .iter()
            .filter(|entry| entry.value().user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect();
        addresses.sort_by(|a, b| a.label.cmp(&b.label));
        addresses
    }

    pub fn create_address(&self, user_id: &str, label: String, address: String) -> SavedAddress {
        let saved = SavedAddress {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            label,
            address,
        };
        self.addresses.insert(saved.id, saved.clone());
        saved
    }

    pub fn remove_address(&self, id: Uuid, user_id: &str) -> Result<SavedAddress, AppError> {
        let owned = self
            .addresses
            .get(&id)
            .is_some_and(|entry| entry.value().user_id == user_id);

        if !owned {
            return Err(AppError::NotFound(format!("address {id} not found")));
        }

        self.addresses
            .remove(&id)
            .map(|(_, address)| address)
            .ok_or_else(|| AppError::NotFound(format!("address {id} not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::order::{OrderType, PaymentMethod};

    fn parcel_draft(user: &str) -> NewOrder {
        NewOrder {
            user_id: Some(user.to_string()),
            order_type: OrderType::Parcel,
            customer_name: "Sender".to_string(),
            customer_phone: "0110000000".to_string(),
            address: "12 Main Rd".to_string(),
            pickup_address: Some("1 Depot St".to_string()),
            recipient_name: Some("Recipient".to_string()),
            description: None,
            items: vec![],
            total: 100.0,
            payment_method: PaymentMethod::Cash,
        }
    }

    #[tokio::test]
    async fn create_assigns_id_and_starts_pending() {
        let store = SharedStore::new(8);
        let order = store.create_order(parcel_draft("a@x.com")).await;

        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.assigned_driver_id.is_none());
        assert_eq!(store.order(order.id).unwrap().id, order.id);
    }

    #[tokio::test]
    async fn patch_with_stale_expected_status_is_a_conflict() {
        let store = SharedStore::new(8);
        let order = store.create_order(parcel_draft("a@x.com")).await;

        store
            .patch_order(
                order.id,
                Some(OrderStatus::Pending),
                OrderPatch {
                    status: Some(OrderStatus::Assigned),
                    assigned_driver_id: Some("d@x.com".to_string()),
                    ..OrderPatch::default()
                },
            )
            .await
            .unwrap();

        // second dispatcher lost the race
        let err = store
            .patch_order(
                order.id,
                Some(OrderStatus::Pending),
                OrderPatch {
                    status: Some(OrderStatus::Assigned),
                    assigned_driver_id: Some("e@x.com".to_string()),
                    ..OrderPatch::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
        let stored = store.order(order.id).unwrap();
        assert_eq!(stored.assigned_driver_id.as_deref(), Some("d@x.com"));
    }

    #[tokio::test]
    async fn rating_is_write_once() {
        let store = SharedStore::new(8);
        let order = store.create_order(parcel_draft("a@x.com")).await;

        store
            .patch_order(
                order.id,
                None,
                OrderPatch {
                    status: Some(OrderStatus::Delivered),
                    assigned_driver_id: Some("d@x.com".to_string()),
                    rating: Some(4),
                    feedback: Some("great".to_string()),
                },
            )
            .await
            .unwrap();

        let err = store
            .patch_order(
                order.id,
                None,
                OrderPatch {
                    rating: Some(1),
                    feedback: Some("changed my mind".to_string()),
                    ..OrderPatch::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
        let stored = store.order(order.id).unwrap();
        assert_eq!(stored.rating, Some(4));
        assert_eq!(stored.feedback.as_deref(), Some("great"));
    }

    #[tokio::test]
    async fn every_change_pushes_a_full_snapshot() {
        let store = SharedStore::new(8);
        let mut feed = store.subscribe();

        let first = store.create_order(parcel_draft("a@x.com")).await;
        let snapshot = feed.recv().await.unwrap();
        assert_eq!(snapshot.len(), 1);

        store.create_order(parcel_draft("b@x.com")).await;
        let snapshot = feed.recv().await.unwrap();
        assert_eq!(snapshot.len(), 2);

        store
            .patch_order(
                first.id,
                Some(OrderStatus::Pending),
                OrderPatch {
                    status: Some(OrderStatus::Assigned),
                    assigned_driver_id: Some("d@x.com".to_string()),
                    ..OrderPatch::default()
                },
            )
            .await
            .unwrap();
        let snapshot = feed.recv().await.unwrap();
        let updated = snapshot.iter().find(|o| o.id == first.id).unwrap();
        assert_eq!(updated.status, OrderStatus::Assigned);
    }

    #[tokio::test]
    async fn duplicate_admin_email_is_rejected() {
        let store = SharedStore::new(8);
        store
            .insert_admin_unique("d@x.com", AdminRole::Driver)
            .await
            .unwrap();

        let err = store
            .insert_admin_unique("d@x.com", AdminRole::Driver)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(store.admin_count(), 1);
    }

    #[tokio::test]
    async fn concurrent_bootstrap_promotes_exactly_one_entry_per_email() {
        let store = Arc::new(SharedStore::new(8));

        let a = {
            let store = store.clone();
            tokio::spawn(async move { store.try_bootstrap_admin("a@x.com", false).await })
        };
        let b = {
            let store = store.clone();
            tokio::spawn(async move { store.try_bootstrap_admin("a@x.com", false).await })
        };

        let first = a.await.unwrap().unwrap();
        let second = b.await.unwrap().unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(store.admin_count(), 1);
    }
}
