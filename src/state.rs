use std::time::Duration;

use crate::config::Config;
use crate::observability::metrics::Metrics;
use crate::roles::RoleResolver;
use crate::store::SharedStore;

pub struct AppState {
    pub store: SharedStore,
    pub roles: RoleResolver,
    pub complete_timeout: Duration,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(
        owner_email: impl Into<String>,
        event_buffer_size: usize,
        complete_timeout: Duration,
    ) -> Self {
        Self {
            store: SharedStore::new(event_buffer_size),
            roles: RoleResolver::new(owner_email),
            complete_timeout,
            metrics: Metrics::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.owner_email.clone(),
            config.event_buffer_size,
            config.complete_timeout,
        )
    }
}
