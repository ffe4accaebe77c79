//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (request ID, trace span, timeout, body limit)
//!     → middleware/turnstile_gate.rs (x-turnstile-token on /api/v1/*)
//!     → ipfs.rs | release.rs | verify.rs | raffles.rs | health.rs
//!     → error.rs (ApiError → JSON body + status)
//! ```

pub mod error;
pub mod health;
pub mod ipfs;
pub mod middleware;
pub mod raffles;
pub mod release;
pub mod request;
pub mod server;
pub mod verify;

pub use error::ApiError;
pub use request::X_REQUEST_ID;
pub use server::{build_router, AppState, GatewayServer, GatewayState, StateError};
