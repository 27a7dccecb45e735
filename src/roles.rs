//! Role resolution for authenticated identities.
//!
//! Runs on every authentication event. The registry is scanned in full
//! (the backing store cannot guarantee a secondary index), and the only
//! side effect is the one-time bootstrap insert, serialized inside the
//! store so it happens at most once per email.

use tracing::info;

use crate::models::admin::AdminRole;
use crate::store::SharedStore;

pub struct RoleResolver {
    owner_email: String,
}

impl RoleResolver {
    pub fn new(owner_email: impl Into<String>) -> Self {
        Self {
            owner_email: owner_email.into(),
        }
    }

    /// Resolves an identity to a privileged role, or `None` for ordinary
    /// customers. Promotes the fixed owner email unconditionally, and the
    /// first identity ever seen when the registry is empty. Idempotent once
    /// an entry exists.
    pub async fn resolve(&self, store: &SharedStore, email: &str) -> Option<AdminRole> {
        let email = email.trim();
        if email.is_empty() {
            return None;
        }

        if let Some(entry) = store.find_admin_by_email(email) {
            return Some(entry.role);
        }

        let is_owner = email == self.owner_email;
        let promoted = store.try_bootstrap_admin(email, is_owner).await?;
        info!(email = %promoted.email, "identity promoted to super_admin");
        Some(promoted.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: &str = "admin@gmail.com";

    fn resolver() -> RoleResolver {
        RoleResolver::new(OWNER)
    }

    #[tokio::test]
    async fn first_identity_on_empty_registry_becomes_super_admin() {
        let store = SharedStore::new(8);
        let resolver = resolver();

        let role = resolver.resolve(&store, "a@x.com").await;
        assert_eq!(role, Some(AdminRole::SuperAdmin));
        assert_eq!(store.admin_count(), 1);

        // second distinct identity arrives once the registry is populated
        let role = resolver.resolve(&store, "b@x.com").await;
        assert_eq!(role, None);
        assert_eq!(store.admin_count(), 1);
    }

    #[tokio::test]
    async fn owner_email_is_promoted_regardless_of_registry_contents() {
        let store = SharedStore::new(8);
        let resolver = resolver();

        for n in 0..5 {
            store
                .insert_admin_unique(&format!("driver{n}@x.com"), AdminRole::Driver)
                .await
                .unwrap();
        }

        let role = resolver.resolve(&store, OWNER).await;
        assert_eq!(role, Some(AdminRole::SuperAdmin));
        assert_eq!(store.admin_count(), 6);
    }

    #[tokio::test]
    async fn existing_registry_entry_wins_over_bootstrap() {
        let store = SharedStore::new(8);
        let resolver = resolver();

        // the owner was explicitly registered as a driver; the stored entry
        // takes precedence over the bootstrap rule
        store
            .insert_admin_unique(OWNER, AdminRole::Driver)
            .await
            .unwrap();

        let role = resolver.resolve(&store, OWNER).await;
        assert_eq!(role, Some(AdminRole::Driver));
        assert_eq!(store.admin_count(), 1);
    }

    #[tokio::test]
    async fn re_resolution_is_idempotent() {
        let store = SharedStore::new(8);
        let resolver = resolver();

        let first = resolver.resolve(&store, "a@x.com").await;
        let second = resolver.resolve(&store, "a@x.com").await;
        assert_eq!(first, second);
        assert_eq!(store.admin_count(), 1);
    }

    #[tokio::test]
    async fn blank_identity_resolves_to_no_role() {
        let store = SharedStore::new(8);
        let role = resolver().resolve(&store, "   ").await;
        assert_eq!(role, None);
        assert_eq!(store.admin_count(), 0);
    }
}
