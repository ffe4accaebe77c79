use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

const TURNSTILE_HEADER: &str = "x-turnstile-token";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("gateway returned {status} {code}: {message}")]
    Api { status: u16, code: String, message: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub success: bool,
    pub hostname: Option<String>,
    #[serde(default)]
    pub error_codes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub ipfs_hash: String,
    pub pin_size: u64,
    pub timestamp: String,
    pub gateway_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseResponse {
    pub digest: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildTxResponse {
    pub tx_bytes: String,
    pub target: String,
}

/// An image served by the gateway.
#[derive(Debug, Clone)]
pub struct RetrievedImage {
    pub bytes: Bytes,
    pub content_type: Option<String>,
    /// True when the gateway answered from its cache.
    pub cache_hit: bool,
}

#[derive(Debug, Clone)]
pub struct GatewayClient {
    client: Client,
    base_url: String,
    turnstile_token: Option<String>,
}

impl GatewayClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            turnstile_token: None,
        }
    }

    /// Attach a Turnstile token to every gated request.
    pub fn with_turnstile_token(mut self, token: impl Into<String>) -> Self {
        self.turnstile_token = Some(token.into());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn gated(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.turnstile_token {
            Some(token) => builder.header(TURNSTILE_HEADER, token),
            None => builder,
        }
    }

    pub async fn health(&self) -> Result<Value, ClientError> {
        let resp = self.client.get(self.url("/healthz")).send().await?;
        decode(resp).await
    }

    pub async fn verify_turnstile(&self, token: &str) -> Result<VerifyResponse, ClientError> {
        let resp = self
            .client
            .post(self.url("/api/v1/turnstile/verify"))
            .json(&serde_json::json!({ "token": token }))
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn upload(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
        recaptcha_token: &str,
    ) -> Result<UploadResponse, ClientError> {
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)?;
        let form = Form::new()
            .text("recaptchaToken", recaptcha_token.to_string())
            .part("file", part);

        let resp = self
            .client
            .post(self.url("/api/v1/ipfs/upload"))
            .multipart(form)
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn retrieve(&self, cid: &str) -> Result<RetrievedImage, ClientError> {
        let resp = self
            .client
            .get(self.url("/api/v1/ipfs/retrieve"))
            .query(&[("cid", cid)])
            .send()
            .await?;
        let resp = check(resp).await?;

        let header = |name: &str| {
            resp.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let content_type = header("content-type");
        let cache_hit = header("x-cache").as_deref() == Some("HIT");
        let bytes = resp.bytes().await?;

        Ok(RetrievedImage { bytes, content_type, cache_hit })
    }

    pub async fn release(&self, raffle_id: &str) -> Result<ReleaseResponse, ClientError> {
        let request = self.client.post(self.url(&format!("/api/v1/release/{}", raffle_id)));
        let resp = self.gated(request).send().await?;
        decode(resp).await
    }

    pub async fn get_raffle(&self, raffle_id: &str) -> Result<Value, ClientError> {
        let request = self.client.get(self.url(&format!("/api/v1/raffles/{}", raffle_id)));
        let resp = self.gated(request).send().await?;
        decode(resp).await
    }

    /// Build unsigned transaction bytes. `call` is a tagged raffle call,
    /// e.g. `{"action": "claimPrize", "raffleId": "0x…"}`.
    pub async fn build_tx(&self, sender: &str, call: Value) -> Result<BuildTxResponse, ClientError> {
        let request = self
            .client
            .post(self.url("/api/v1/tx/build"))
            .json(&serde_json::json!({ "sender": sender, "call": call }));
        let resp = self.gated(request).send().await?;
        decode(resp).await
    }
}

async fn check(resp: Response) -> Result<Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body: Value = resp.json().await.unwrap_or(Value::Null);
    let field = |name: &str| body.get(name).and_then(Value::as_str).unwrap_or_default().to_string();
    Err(ClientError::Api {
        status: status.as_u16(),
        code: field("error"),
        message: field("message"),
    })
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
    let resp = check(resp).await?;
    Ok(resp.json().await?)
}
