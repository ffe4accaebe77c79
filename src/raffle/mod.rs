//! Client-side raffle domain helpers.
//!
//! The raffle lifecycle lives in the on-chain Move package. This module holds
//! what the gateway needs to talk to it: call construction, schedule checks,
//! unit conversion and error classification.

pub mod calls;
pub mod errors;
pub mod schedule;
pub mod units;

pub use calls::{CallError, MoveCall, RaffleCall};
pub use errors::{classify, ErrorCode};
pub use schedule::{validate_end_time, ScheduleError};
pub use units::{mist_to_sui, sui_to_mist, MIST_PER_SUI};
