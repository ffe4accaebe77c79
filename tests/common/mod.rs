//! Shared utilities for integration tests.
//!
//! One mock upstream serves every external dependency of the gateway:
//! Turnstile and reCAPTCHA siteverify, Pinata pinning, the IPFS gateway and
//! a Sui fullnode. Each endpoint counts its calls so tests can assert on
//! outbound traffic.

#![allow(dead_code)]

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;

use raffle_gateway::config::GatewayConfig;
use raffle_gateway::lifecycle::Shutdown;
use raffle_gateway::sui::Wallet;
use raffle_gateway::{AppState, GatewayServer};

/// CID the mock gateway serves.
pub const IMAGE_CID: &str = "QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG";
/// Well-formed CID the mock gateway does not have.
pub const MISSING_CID: &str = "QmT78zSuBmuS4z925WZfrqQ1qHaJ56DQaTfyMUF7F8ff5o";
/// Well-formed CID the mock gateway serves as an HTML page.
pub const HTML_CID: &str = "QmPZ9gcCEpqKTo6aq61g2nXGUhM4iCL3ewB6LDXZCtioEB";
/// CID the mock Pinata returns for every pin.
pub const PINNED_CID: &str = IMAGE_CID;

pub const IMAGE_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nmock image body";

/// Turnstile tokens understood by the mock.
pub const GOOD_TOKEN: &str = "good-token";
pub const FOREIGN_HOST_TOKEN: &str = "foreign-token";
pub const BAD_TOKEN: &str = "bad-token";
pub const ALLOWED_HOSTNAME: &str = "raffle.example";

/// reCAPTCHA tokens understood by the mock.
pub const GOOD_RECAPTCHA: &str = "good-recaptcha";
pub const LOW_SCORE_RECAPTCHA: &str = "low-score-recaptcha";

pub const PACKAGE_ID: &str = "0x2a";
pub const CONFIG_OBJECT_ID: &str = "0x3b";
pub const RAFFLE_ID: &str = "0x5c";
pub const MISSING_OBJECT_ID: &str = "0xdead";
/// base64 of [1, 2, 3, 4]
pub const MOCK_TX_BYTES: &str = "AQIDBA==";
pub const MOCK_DIGEST: &str = "MockDigest111";

/// Hex seed of the test release key.
pub const RELEASE_SEED_HEX: &str = "0707070707070707070707070707070707070707070707070707070707070707";

#[derive(Clone, Default)]
pub struct MockState {
    pub turnstile_calls: Arc<AtomicUsize>,
    pub recaptcha_calls: Arc<AtomicUsize>,
    pub pin_calls: Arc<AtomicUsize>,
    pub gateway_calls: Arc<AtomicUsize>,
    pub rpc_calls: Arc<AtomicUsize>,
    pub executions: Arc<AtomicUsize>,
    /// Number of gateway fetches to answer with 503 before serving.
    pub gateway_failures: Arc<AtomicUsize>,
    /// Make executed transactions abort on-chain.
    pub fail_execution: Arc<AtomicBool>,
}

pub struct MockUpstream {
    pub addr: SocketAddr,
    pub state: MockState,
}

impl MockUpstream {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn turnstile_calls(&self) -> usize {
        self.state.turnstile_calls.load(Ordering::SeqCst)
    }

    pub fn recaptcha_calls(&self) -> usize {
        self.state.recaptcha_calls.load(Ordering::SeqCst)
    }

    pub fn pin_calls(&self) -> usize {
        self.state.pin_calls.load(Ordering::SeqCst)
    }

    pub fn gateway_calls(&self) -> usize {
        self.state.gateway_calls.load(Ordering::SeqCst)
    }

    pub fn executions(&self) -> usize {
        self.state.executions.load(Ordering::SeqCst)
    }
}

/// Start the mock upstream on an ephemeral port.
pub async fn start_mock_upstream() -> MockUpstream {
    let state = MockState::default();
    let app = Router::new()
        .route("/turnstile", post(turnstile))
        .route("/recaptcha", post(recaptcha))
        .route("/pinning/pinFileToIPFS", post(pin_file))
        .route("/ipfs/{cid}", get(gateway_fetch))
        .route("/rpc", post(rpc))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockUpstream { addr, state }
}

/// Gateway configuration pointing every upstream at `mock`.
pub fn test_config(mock: &MockUpstream) -> GatewayConfig {
    let base = mock.base_url();
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();

    config.ipfs.api_url = base.clone();
    config.ipfs.gateway = base.clone();
    config.ipfs.jwt = Some("test-jwt".to_string());

    config.verification.turnstile_url = format!("{}/turnstile", base);
    config.verification.turnstile_secret = Some("turnstile-secret".to_string());
    config.verification.recaptcha_url = format!("{}/recaptcha", base);
    config.verification.recaptcha_secret = Some("recaptcha-secret".to_string());
    config.verification.recaptcha_min_score = Some(0.5);

    config.sui.rpc_url = Some(format!("{}/rpc", base));
    config.raffle.package_id = PACKAGE_ID.to_string();
    config.raffle.config_object_id = CONFIG_OBJECT_ID.to_string();

    config.retries.base_delay_ms = 10;
    config.retries.max_delay_ms = 50;
    config.timeouts.upstream_secs = 5;
    config
}

pub fn test_wallet() -> Wallet {
    Wallet::from_private_key(RELEASE_SEED_HEX).unwrap()
}

/// Serve the gateway on an ephemeral port. The server runs until the test ends.
pub async fn spawn_gateway(config: GatewayConfig, wallet: Option<Wallet>) -> (SocketAddr, AppState) {
    let state = AppState::from_config(config, wallet).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    let server = GatewayServer::new(state.clone());
    tokio::spawn(async move {
        let _shutdown = shutdown;
        server.run(listener, rx).await.unwrap();
    });

    (addr, state)
}

/// Read a JSON response body.
pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn turnstile(State(state): State<MockState>, Form(form): Form<HashMap<String, String>>) -> Json<Value> {
    state.turnstile_calls.fetch_add(1, Ordering::SeqCst);
    assert_eq!(form.get("secret").map(String::as_str), Some("turnstile-secret"));

    let body = match form.get("response").map(String::as_str) {
        Some(GOOD_TOKEN) => json!({
            "success": true,
            "hostname": ALLOWED_HOSTNAME,
            "challenge_ts": "2026-01-01T00:00:00Z",
            "error-codes": [],
        }),
        Some(FOREIGN_HOST_TOKEN) => json!({ "success": true, "hostname": "evil.example" }),
        _ => json!({ "success": false, "error-codes": ["invalid-input-response"] }),
    };
    Json(body)
}

async fn recaptcha(State(state): State<MockState>, Form(form): Form<HashMap<String, String>>) -> Json<Value> {
    state.recaptcha_calls.fetch_add(1, Ordering::SeqCst);
    let body = match form.get("response").map(String::as_str) {
        Some(GOOD_RECAPTCHA) => json!({ "success": true, "score": 0.9 }),
        Some(LOW_SCORE_RECAPTCHA) => json!({ "success": true, "score": 0.1 }),
        _ => json!({ "success": false, "error-codes": ["invalid-input-response"] }),
    };
    Json(body)
}

async fn pin_file(State(state): State<MockState>, headers: HeaderMap, body: Bytes) -> Response {
    state.pin_calls.fetch_add(1, Ordering::SeqCst);
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some("Bearer test-jwt");
    if !authorized {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!({
        "IpfsHash": PINNED_CID,
        "PinSize": body.len(),
        "Timestamp": "2026-01-01T00:00:00Z",
    }))
    .into_response()
}

async fn gateway_fetch(State(state): State<MockState>, Path(cid): Path<String>) -> Response {
    state.gateway_calls.fetch_add(1, Ordering::SeqCst);
    let failing = state
        .gateway_failures
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok();
    if failing {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }
    if cid == HTML_CID {
        return (
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            "<script>alert(1)</script>",
        )
            .into_response();
    }
    if cid != IMAGE_CID {
        return StatusCode::NOT_FOUND.into_response();
    }
    ([(header::CONTENT_TYPE, "image/png")], IMAGE_BYTES).into_response()
}

async fn rpc(State(state): State<MockState>, Json(request): Json<Value>) -> Json<Value> {
    state.rpc_calls.fetch_add(1, Ordering::SeqCst);
    let id = request["id"].clone();
    let params = &request["params"];

    let outcome = match request["method"].as_str().unwrap_or_default() {
        "sui_getChainIdentifier" => Ok(json!("4c78adac")),
        "unsafe_moveCall" => Ok(json!({ "txBytes": MOCK_TX_BYTES })),
        "sui_executeTransactionBlock" => execute(&state, params),
        "sui_getObject" => Ok(get_object(params[0].as_str().unwrap_or_default())),
        _ => Err(json!({ "code": -32601, "message": "Method not found" })),
    };

    Json(match outcome {
        Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
        Err(error) => json!({ "jsonrpc": "2.0", "id": id, "error": error }),
    })
}

fn execute(state: &MockState, params: &Value) -> Result<Value, Value> {
    let tx_bytes = BASE64.decode(params[0].as_str().unwrap_or_default()).unwrap_or_default();
    let signature = params[1][0].as_str().unwrap_or_default();
    if !signature_valid(&tx_bytes, signature) {
        return Err(json!({ "code": -32002, "message": "Invalid user signature" }));
    }
    state.executions.fetch_add(1, Ordering::SeqCst);

    let status = if state.fail_execution.load(Ordering::SeqCst) {
        json!({
            "status": "failure",
            "error": "MoveAbort(MoveLocation { module: raffle, function: 3 }, 2) in command 0: EAlreadyReleased",
        })
    } else {
        json!({ "status": "success" })
    };
    Ok(json!({ "digest": MOCK_DIGEST, "effects": { "status": status } }))
}

/// Check a serialized ed25519 signature over the transaction intent message.
fn signature_valid(tx_bytes: &[u8], serialized: &str) -> bool {
    let Ok(raw) = BASE64.decode(serialized) else {
        return false;
    };
    if raw.len() != 1 + 64 + 32 || raw[0] != 0x00 {
        return false;
    }
    let Ok(signature) = Signature::from_slice(&raw[1..65]) else {
        return false;
    };
    let mut pk = [0u8; 32];
    pk.copy_from_slice(&raw[65..]);
    let Ok(key) = VerifyingKey::from_bytes(&pk) else {
        return false;
    };

    let mut hasher = Blake2b::<U32>::new();
    hasher.update([0u8, 0, 0]);
    hasher.update(tx_bytes);
    let digest: [u8; 32] = hasher.finalize().into();
    key.verify(&digest, &signature).is_ok()
}

fn get_object(id: &str) -> Value {
    if id == MISSING_OBJECT_ID {
        return json!({ "error": { "code": "notExists", "object_id": id } });
    }
    json!({
        "data": {
            "objectId": id,
            "version": "7",
            "type": format!("{}::raffle::Raffle", PACKAGE_ID),
            "content": {
                "dataType": "moveObject",
                "type": format!("{}::raffle::Raffle", PACKAGE_ID),
                "fields": { "name": "Test raffle", "ticket_price": "1000000000", "released": false },
            },
        },
    })
}
