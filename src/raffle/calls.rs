//! Move-call construction for the raffle contract.
//!
//! Each [`RaffleCall`] maps UI-level fields onto the argument list of one entry
//! function. Only `Release` is signed by the gateway itself; the rest are built
//! into unsigned transaction bytes for the user's wallet.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::config::validation::is_object_id;
use crate::config::RaffleConfig;
use crate::ipfs::is_valid_cid;
use crate::raffle::schedule::{validate_end_time, ScheduleError};

/// Shared `sui::random::Random` object.
pub const RANDOM_OBJECT_ID: &str = "0x8";
/// Shared `sui::clock::Clock` object.
pub const CLOCK_OBJECT_ID: &str = "0x6";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    #[error("raffle contract is not configured: {0} missing")]
    MissingConfig(&'static str),

    #[error("'{0}' is not a valid object id")]
    InvalidObjectId(String),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error("{0}")]
    Invalid(String),
}

/// A fully resolved Move call, in the shape `unsafe_moveCall` expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveCall {
    pub package: String,
    pub module: String,
    pub function: String,
    pub type_arguments: Vec<String>,
    pub arguments: Vec<Value>,
}

impl MoveCall {
    /// `package::module::function`
    pub fn target(&self) -> String {
        format!("{}::{}::{}", self.package, self.module, self.function)
    }
}

/// Operations of the raffle contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum RaffleCall {
    #[serde(rename_all = "camelCase")]
    CreateRaffle {
        name: String,
        description: String,
        image_cid: String,
        ticket_price_mist: u64,
        max_tickets: u64,
        start_ms: u64,
        end_ms: u64,
    },
    #[serde(rename_all = "camelCase")]
    BuyTickets {
        raffle_id: String,
        payment_coin_id: String,
        quantity: u64,
    },
    #[serde(rename_all = "camelCase")]
    Release { raffle_id: String },
    #[serde(rename_all = "camelCase")]
    ClaimPrize { raffle_id: String },
    #[serde(rename_all = "camelCase")]
    SetPaused {
        raffle_id: String,
        admin_cap_id: String,
        paused: bool,
    },
    #[serde(rename_all = "camelCase")]
    SetVisibility {
        raffle_id: String,
        admin_cap_id: String,
        visible: bool,
    },
}

fn object_id(id: &str) -> Result<Value, CallError> {
    if is_object_id(id) {
        Ok(Value::String(id.to_string()))
    } else {
        Err(CallError::InvalidObjectId(id.to_string()))
    }
}

/// u64 arguments travel as decimal strings.
fn u64_arg(v: u64) -> Value {
    Value::String(v.to_string())
}

impl RaffleCall {
    pub fn function(&self) -> &'static str {
        match self {
            RaffleCall::CreateRaffle { .. } => "create_raffle",
            RaffleCall::BuyTickets { .. } => "buy_tickets",
            RaffleCall::Release { .. } => "release_raffle",
            RaffleCall::ClaimPrize { .. } => "claim_prize",
            RaffleCall::SetPaused { .. } => "set_paused",
            RaffleCall::SetVisibility { .. } => "set_visibility",
        }
    }

    /// Check field-level rules that do not need the chain.
    pub fn validate(&self, now_ms: u64) -> Result<(), CallError> {
        match self {
            RaffleCall::CreateRaffle {
                name,
                image_cid,
                ticket_price_mist,
                max_tickets,
                start_ms,
                end_ms,
                ..
            } => {
                if name.trim().is_empty() {
                    return Err(CallError::Invalid("name must not be empty".to_string()));
                }
                if !is_valid_cid(image_cid) {
                    return Err(CallError::Invalid(format!("'{}' is not a valid image CID", image_cid)));
                }
                if *ticket_price_mist == 0 {
                    return Err(CallError::Invalid("ticket price must be greater than zero".to_string()));
                }
                if *max_tickets == 0 {
                    return Err(CallError::Invalid("max tickets must be greater than zero".to_string()));
                }
                validate_end_time(*start_ms, *end_ms, now_ms)?;
            }
            RaffleCall::BuyTickets { quantity, .. } => {
                if *quantity == 0 {
                    return Err(CallError::Invalid("quantity must be greater than zero".to_string()));
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Resolve into a [`MoveCall`] against the configured package.
    pub fn to_move_call(&self, contract: &RaffleConfig) -> Result<MoveCall, CallError> {
        if contract.package_id.is_empty() {
            return Err(CallError::MissingConfig("package id"));
        }
        if contract.config_object_id.is_empty() {
            return Err(CallError::MissingConfig("config object id"));
        }
        let config = object_id(&contract.config_object_id)?;

        let arguments = match self {
            RaffleCall::CreateRaffle {
                name,
                description,
                image_cid,
                ticket_price_mist,
                max_tickets,
                start_ms,
                end_ms,
            } => vec![
                config,
                json!(name),
                json!(description),
                json!(image_cid),
                u64_arg(*ticket_price_mist),
                u64_arg(*max_tickets),
                u64_arg(*start_ms),
                u64_arg(*end_ms),
                json!(CLOCK_OBJECT_ID),
            ],
            RaffleCall::BuyTickets {
                raffle_id,
                payment_coin_id,
                quantity,
            } => vec![
                config,
                object_id(raffle_id)?,
                object_id(payment_coin_id)?,
                u64_arg(*quantity),
                json!(CLOCK_OBJECT_ID),
            ],
            RaffleCall::Release { raffle_id } => vec![
                config,
                object_id(raffle_id)?,
                json!(RANDOM_OBJECT_ID),
                json!(CLOCK_OBJECT_ID),
            ],
            RaffleCall::ClaimPrize { raffle_id } => {
                vec![config, object_id(raffle_id)?, json!(CLOCK_OBJECT_ID)]
            }
            RaffleCall::SetPaused {
                raffle_id,
                admin_cap_id,
                paused,
            } => vec![object_id(admin_cap_id)?, object_id(raffle_id)?, json!(paused)],
            RaffleCall::SetVisibility {
                raffle_id,
                admin_cap_id,
                visible,
            } => vec![object_id(admin_cap_id)?, object_id(raffle_id)?, json!(visible)],
        };

        Ok(MoveCall {
            package: contract.package_id.clone(),
            module: contract.module.clone(),
            function: self.function().to_string(),
            type_arguments: Vec::new(),
            arguments,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contract() -> RaffleConfig {
        RaffleConfig {
            package_id: "0xabc".to_string(),
            config_object_id: "0xc0f".to_string(),
            module: "raffle".to_string(),
        }
    }

    #[test]
    fn test_release_call() {
        let call = RaffleCall::Release { raffle_id: "0x42".to_string() }
            .to_move_call(&contract())
            .unwrap();
        assert_eq!(call.target(), "0xabc::raffle::release_raffle");
        assert_eq!(call.arguments, vec![json!("0xc0f"), json!("0x42"), json!("0x8"), json!("0x6")]);
    }

    #[test]
    fn test_buy_tickets_call() {
        let call = RaffleCall::BuyTickets {
            raffle_id: "0x42".to_string(),
            payment_coin_id: "0x99".to_string(),
            quantity: 3,
        }
        .to_move_call(&contract())
        .unwrap();
        assert_eq!(call.function, "buy_tickets");
        assert_eq!(call.arguments[3], json!("3"));
    }

    #[test]
    fn test_invalid_object_id() {
        let err = RaffleCall::ClaimPrize { raffle_id: "raffle-1".to_string() }
            .to_move_call(&contract())
            .unwrap_err();
        assert_eq!(err, CallError::InvalidObjectId("raffle-1".to_string()));
    }

    #[test]
    fn test_missing_contract_config() {
        let err = RaffleCall::Release { raffle_id: "0x1".to_string() }
            .to_move_call(&RaffleConfig::default())
            .unwrap_err();
        assert!(matches!(err, CallError::MissingConfig(_)));
    }

    #[test]
    fn test_create_validation() {
        let create = |start_ms, end_ms| RaffleCall::CreateRaffle {
            name: "Prize".to_string(),
            description: String::new(),
            image_cid: "QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG".to_string(),
            ticket_price_mist: 1_000_000,
            max_tickets: 100,
            start_ms,
            end_ms,
        };
        assert!(create(1_000, 10_000).validate(5_000).is_ok());
        assert!(matches!(
            create(10_000, 10_000).validate(5_000),
            Err(CallError::Schedule(ScheduleError::EndNotAfterStart { .. }))
        ));
        assert!(matches!(
            create(1_000, 4_000).validate(5_000),
            Err(CallError::Schedule(ScheduleError::EndNotInFuture { .. }))
        ));
    }

    #[test]
    fn test_call_json_shape() {
        let call: RaffleCall = serde_json::from_value(json!({
            "action": "setPaused",
            "raffleId": "0x1",
            "adminCapId": "0x2",
            "paused": true
        }))
        .unwrap();
        assert_eq!(
            call,
            RaffleCall::SetPaused {
                raffle_id: "0x1".to_string(),
                admin_cap_id: "0x2".to_string(),
                paused: true
            }
        );
    }
}
