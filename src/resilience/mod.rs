//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Read from an upstream (IPFS gateway, Siteverify, Sui fullnode):
//!     → retries.rs (retry transient failures a fixed number of times)
//!     → backoff.rs (linear delay between attempts)
//! ```
//!
//! # Design Decisions
//! - Only reads are retried; pinning and transaction execution fail visibly
//! - Every outbound client carries its own request timeout

pub mod backoff;
pub mod retries;

pub use retries::{retry_read, Retryable};
