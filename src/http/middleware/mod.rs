pub mod metrics;
pub mod turnstile_gate;

pub use metrics::track_metrics;
pub use turnstile_gate::{turnstile_gate, TURNSTILE_HEADER};
