//! Raffle scheduling rules.
//!
//! Times are milliseconds since the Unix epoch, the unit of the on-chain clock.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("end time {end_ms} must be after start time {start_ms}")]
    EndNotAfterStart { start_ms: u64, end_ms: u64 },

    #[error("end time {end_ms} must be in the future (now {now_ms})")]
    EndNotInFuture { end_ms: u64, now_ms: u64 },
}

/// Reject an end time at or before the start time, or at or before `now_ms`.
pub fn validate_end_time(start_ms: u64, end_ms: u64, now_ms: u64) -> Result<(), ScheduleError> {
    if end_ms <= start_ms {
        return Err(ScheduleError::EndNotAfterStart { start_ms, end_ms });
    }
    if end_ms <= now_ms {
        return Err(ScheduleError::EndNotInFuture { end_ms, now_ms });
    }
    Ok(())
}

/// Current wall-clock time in milliseconds.
pub fn now_ms() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}
