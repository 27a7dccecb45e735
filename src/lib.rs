pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod fees;
pub mod models;
pub mod observability;
pub mod reviews;
pub mod roles;
pub mod state;
pub mod store;
