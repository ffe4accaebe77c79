//! Classification of chain and SDK error messages into stable codes.
//!
//! Fullnode and Move abort messages are free text. They are matched by
//! case-insensitive substring into a small set of codes the clients can act on.

use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InsufficientFunds,
    UserRejected,
    ObjectNotFound,
    AlreadyReleased,
    RaffleNotEnded,
    RafflePaused,
    SoldOut,
    InvalidInput,
    Network,
    Unknown,
}

/// Patterns checked in order; the first match wins.
const PATTERNS: &[(ErrorCode, &[&str])] = &[
    (
        ErrorCode::AlreadyReleased,
        &["already released", "ealreadyreleased", "already_released", "prize already claimed"],
    ),
    (
        ErrorCode::RaffleNotEnded,
        &["not ended", "enotended", "raffle_not_ended", "still active"],
    ),
    (ErrorCode::RafflePaused, &["paused", "epaused"]),
    (ErrorCode::SoldOut, &["sold out", "esoldout", "max tickets"]),
    (
        ErrorCode::InsufficientFunds,
        &[
            "insufficient",
            "no valid gas coins",
            "gasbalancetoolow",
            "balance too low",
        ],
    ),
    (
        ErrorCode::UserRejected,
        &["user rejected", "rejected the request", "user denied", "rejected by user", "cancelled"],
    ),
    (
        ErrorCode::ObjectNotFound,
        &["object not found", "notexists", "does not exist", "objectnotfound", "deleted"],
    ),
    (
        ErrorCode::Network,
        &["timed out", "timeout", "network", "connection refused", "failed to fetch", "error sending request"],
    ),
    (ErrorCode::InvalidInput, &["invalid", "malformed", "bad request"]),
];

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InsufficientFunds => "INSUFFICIENT_FUNDS",
            ErrorCode::UserRejected => "USER_REJECTED",
            ErrorCode::ObjectNotFound => "OBJECT_NOT_FOUND",
            ErrorCode::AlreadyReleased => "ALREADY_RELEASED",
            ErrorCode::RaffleNotEnded => "RAFFLE_NOT_ENDED",
            ErrorCode::RafflePaused => "RAFFLE_PAUSED",
            ErrorCode::SoldOut => "SOLD_OUT",
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::Network => "NETWORK_ERROR",
            ErrorCode::Unknown => "UNKNOWN_ERROR",
        }
    }

    /// Message suitable for showing to an end user.
    pub fn user_message(self) -> &'static str {
        match self {
            ErrorCode::InsufficientFunds => "Insufficient balance to pay for this transaction.",
            ErrorCode::UserRejected => "The transaction was rejected.",
            ErrorCode::ObjectNotFound => "The raffle could not be found.",
            ErrorCode::AlreadyReleased => "This raffle has already been released.",
            ErrorCode::RaffleNotEnded => "This raffle has not ended yet.",
            ErrorCode::RafflePaused => "This raffle is paused.",
            ErrorCode::SoldOut => "No tickets are left for this raffle.",
            ErrorCode::InvalidInput => "The request contained invalid values.",
            ErrorCode::Network => "The network is unreachable, please try again.",
            ErrorCode::Unknown => "Something went wrong.",
        }
    }

    /// HTTP status the gateway answers with for this code.
    pub fn http_status(self) -> u16 {
        match self {
            ErrorCode::InsufficientFunds => 402,
            ErrorCode::UserRejected => 400,
            ErrorCode::ObjectNotFound => 404,
            ErrorCode::AlreadyReleased | ErrorCode::RaffleNotEnded | ErrorCode::RafflePaused | ErrorCode::SoldOut => 409,
            ErrorCode::InvalidInput => 400,
            ErrorCode::Network => 503,
            ErrorCode::Unknown => 502,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Map an error message onto an [`ErrorCode`].
pub fn classify(message: &str) -> ErrorCode {
    let lower = message.to_ascii_lowercase();
    PATTERNS
        .iter()
        .find(|(_, needles)| needles.iter().any(|n| lower.contains(n)))
        .map(|(code, _)| *code)
        .unwrap_or(ErrorCode::Unknown)
}
