//! HTTP server setup.
//!
//! # Responsibilities
//! - Build the shared gateway state from configuration
//! - Create the Axum router with all handlers
//! - Wire up middleware (tracing, request ID, timeout, body limit, Turnstile gate)
//! - Serve until the shutdown signal fires

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Request},
    middleware,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::http::middleware::{track_metrics, turnstile_gate};
use crate::http::request::{request_id, UuidRequestId};
use crate::http::{health, ipfs, raffles, release, verify};
use crate::ipfs::{ImageCache, IpfsError, PinataClient};
use crate::security::{RecaptchaVerifier, TurnstileVerifier, VerifiedTokens, VerifyError};
use crate::sui::{SuiClient, SuiError, TxSubmitter, Wallet};

/// Interval between sweeps of expired Turnstile tokens.
const TOKEN_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to build IPFS client: {0}")]
    Ipfs(#[from] IpfsError),

    #[error("failed to build verifier: {0}")]
    Verify(#[from] VerifyError),

    #[error("failed to build Sui client: {0}")]
    Sui(#[from] SuiError),
}

/// Everything handlers share.
#[derive(Debug)]
pub struct GatewayState {
    pub config: GatewayConfig,
    pub image_cache: ImageCache,
    pub pinata: PinataClient,
    /// `None` when no Turnstile secret is configured.
    pub turnstile: Option<TurnstileVerifier>,
    pub recaptcha: RecaptchaVerifier,
    pub verified_tokens: VerifiedTokens,
    pub sui: SuiClient,
    /// `None` when no release key is available.
    pub submitter: Option<TxSubmitter>,
}

/// Application state injected into handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub inner: Arc<GatewayState>,
}

impl AppState {
    /// Build all clients from `config`. `wallet` enables the release endpoint.
    pub fn from_config(config: GatewayConfig, wallet: Option<Wallet>) -> Result<Self, StateError> {
        let upstream_timeout = Duration::from_secs(config.timeouts.upstream_secs);
        let retries = config.retries.clone();

        let pinata = PinataClient::new(&config.ipfs, retries.clone(), upstream_timeout)?;
        let turnstile = TurnstileVerifier::from_config(
            &config.verification,
            config.environment,
            retries.clone(),
            upstream_timeout,
        )?;
        if turnstile.is_none() {
            tracing::warn!("TURNSTILE_SECRET_KEY not set, API requests are not bot-verified");
        }
        let recaptcha = RecaptchaVerifier::from_config(&config.verification, retries.clone(), upstream_timeout)?;

        let sui = SuiClient::new(&config.sui, retries)?;
        let submitter = wallet.map(|w| TxSubmitter::new(sui.clone(), w, config.sui.gas_budget));

        let inner = GatewayState {
            image_cache: ImageCache::from_config(&config.cache),
            verified_tokens: VerifiedTokens::new(Duration::from_secs(config.verification.token_freshness_secs)),
            pinata,
            turnstile,
            recaptcha,
            sui,
            submitter,
            config,
        };
        Ok(Self { inner: Arc::new(inner) })
    }
}

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
pub fn build_router(state: AppState) -> Router {
    let config = &state.inner.config;
    let request_timeout = Duration::from_secs(config.timeouts.request_secs);
    let max_body_bytes = config.listener.max_body_bytes;

    Router::new()
        .route("/api/v1/ipfs/retrieve", get(ipfs::retrieve))
        .route("/api/v1/ipfs/upload", post(ipfs::upload))
        .route("/api/v1/turnstile/verify", post(verify::verify_turnstile))
        .route("/api/v1/release/{raffle_id}", post(release::release_raffle))
        .route("/api/v1/raffles/{raffle_id}", get(raffles::get_raffle))
        .route("/api/v1/tx/build", post(raffles::build_transaction))
        .route("/healthz", get(health::healthz))
        .route_layer(middleware::from_fn(track_metrics))
        .layer(middleware::from_fn_with_state(state.clone(), turnstile_gate))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                path = %request.uri().path(),
                request_id = %request_id(request),
            )
        }))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
}

/// HTTP server for the gateway.
pub struct GatewayServer {
    router: Router,
    state: AppState,
}

impl GatewayServer {
    pub fn new(state: AppState) -> Self {
        Self {
            router: build_router(state.clone()),
            state,
        }
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let sweeper = tokio::spawn(sweep_tokens(self.state.clone()));

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await;

        sweeper.abort();
        tracing::info!("HTTP server stopped");
        result
    }
}

async fn sweep_tokens(state: AppState) {
    let mut interval = tokio::time::interval(TOKEN_SWEEP_INTERVAL);
    loop {
        interval.tick().await;
        state.inner.verified_tokens.purge_expired();
    }
}
