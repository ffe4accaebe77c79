//! Raffle gateway library: the HTTP boundary of a Sui raffle platform.

pub mod config;
pub mod http;
pub mod ipfs;
pub mod lifecycle;
pub mod observability;
pub mod raffle;
pub mod resilience;
pub mod security;
pub mod sui;

pub use config::schema::GatewayConfig;
pub use http::{AppState, GatewayServer};
pub use lifecycle::Shutdown;
