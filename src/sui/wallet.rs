//! Release-key wallet and transaction signing.
//!
//! # Security
//! - The private key is loaded ONLY from the environment
//! - Keys are never logged or serialized
//!
//! Accepted key encodings: `suiprivkey1…` (bech32, flag byte + 32-byte seed),
//! hex (optionally `0x`-prefixed), or base64 of the seed with or without the
//! ed25519 flag byte.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use bech32::Hrp;
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use ed25519_dalek::{Signer, SigningKey};

use crate::sui::types::{SuiError, SuiResult};

/// Environment variable holding the release signing key.
pub const PRIVATE_KEY_ENV_VAR: &str = "RELEASE_PRIVATE_KEY";

const SUI_PRIVKEY_PREFIX: &str = "suiprivkey";
const SUI_PRIVKEY_HRP: Hrp = Hrp::parse_unchecked(SUI_PRIVKEY_PREFIX);
const ED25519_FLAG: u8 = 0x00;
/// Intent prefix for transaction data: scope TransactionData, version V0, app Sui.
const TX_INTENT: [u8; 3] = [0, 0, 0];

type Blake2b256 = Blake2b<U32>;

fn blake2b256(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// Ed25519 wallet that signs release transactions.
pub struct Wallet {
    signing_key: SigningKey,
    address: String,
}

impl Wallet {
    /// Create a wallet from an encoded private key.
    pub fn from_private_key(encoded: &str) -> SuiResult<Self> {
        let seed = decode_seed(encoded.trim())?;
        let signing_key = SigningKey::from_bytes(&seed);
        let public_key = signing_key.verifying_key().to_bytes();
        let address = format!("0x{}", hex::encode(blake2b256(&[&[ED25519_FLAG][..], &public_key[..]])));

        tracing::info!(address = %address, "Release wallet initialized");

        Ok(Self { signing_key, address })
    }

    /// Load the wallet from `RELEASE_PRIVATE_KEY`.
    pub fn from_env() -> SuiResult<Self> {
        let encoded = std::env::var(PRIVATE_KEY_ENV_VAR).map_err(|_| {
            SuiError::Wallet(format!("Environment variable {} not set", PRIVATE_KEY_ENV_VAR))
        })?;
        Self::from_private_key(&encoded)
    }

    /// Sui address of the wallet.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Sign BCS transaction bytes, returning the serialized signature
    /// (`flag ‖ signature ‖ public key`, base64).
    pub fn sign_transaction(&self, tx_bytes: &[u8]) -> String {
        let digest = blake2b256(&[&TX_INTENT[..], tx_bytes]);
        let signature = self.signing_key.sign(&digest);

        let mut serialized = Vec::with_capacity(1 + 64 + 32);
        serialized.push(ED25519_FLAG);
        serialized.extend_from_slice(&signature.to_bytes());
        serialized.extend_from_slice(&self.signing_key.verifying_key().to_bytes());
        BASE64.encode(serialized)
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet").field("address", &self.address).finish()
    }
}

fn invalid(reason: impl std::fmt::Display) -> SuiError {
    SuiError::Wallet(format!("Invalid private key format: {}", reason))
}

fn seed_from_bytes(bytes: &[u8]) -> SuiResult<[u8; 32]> {
    let seed = match bytes.len() {
        32 => bytes,
        33 if bytes[0] == ED25519_FLAG => &bytes[1..],
        33 => return Err(invalid(format!("unsupported key scheme flag {:#04x}", bytes[0]))),
        n => return Err(invalid(format!("expected 32 bytes, got {}", n))),
    };
    let mut out = [0u8; 32];
    out.copy_from_slice(seed);
    Ok(out)
}

fn decode_seed(encoded: &str) -> SuiResult<[u8; 32]> {
    if encoded.starts_with(SUI_PRIVKEY_PREFIX) {
        let (hrp, data) = bech32::decode(encoded).map_err(invalid)?;
        if hrp != SUI_PRIVKEY_HRP {
            return Err(invalid("unexpected bech32 prefix"));
        }
        if data.len() != 33 {
            return Err(invalid(format!("expected 33 bytes, got {}", data.len())));
        }
        return seed_from_bytes(&data);
    }

    let hex_part = encoded.strip_prefix("0x").unwrap_or(encoded);
    if hex_part.len() == 64 && hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        let bytes = hex::decode(hex_part).map_err(invalid)?;
        return seed_from_bytes(&bytes);
    }

    let bytes = BASE64.decode(encoded).map_err(invalid)?;
    seed_from_bytes(&bytes)
}
