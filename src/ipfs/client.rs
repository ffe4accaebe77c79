//! Pinata pinning and IPFS gateway client.
//!
//! # Responsibilities
//! - Pin uploaded images (`pinFileToIPFS`), never retried
//! - Fetch content by CID from the dedicated gateway, retried with linear backoff
//! - Validate CIDs before they are interpolated into a URL

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::time::Duration;

use crate::config::{IpfsConfig, RetryConfig};
use crate::ipfs::cache::CachedImage;
use crate::ipfs::upload::UploadDescriptor;
use crate::ipfs::IpfsError;
use crate::observability::metrics;
use crate::resilience::retry_read;

const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// `image/*`, ignoring case and parameters.
pub fn is_image_type(content_type: &str) -> bool {
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    essence
        .get(..6)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("image/"))
        && essence.len() > 6
}

/// True for a CIDv0 (`Qm…`, 46 base58 chars) or a base32 CIDv1 (`b…`).
pub fn is_valid_cid(cid: &str) -> bool {
    if cid.len() == 46 && cid.starts_with("Qm") {
        return cid.chars().all(|c| BASE58_ALPHABET.contains(c));
    }
    if let Some(rest) = cid.strip_prefix('b') {
        return (49..=120).contains(&rest.len())
            && rest.chars().all(|c| c.is_ascii_lowercase() || ('2'..='7').contains(&c));
    }
    false
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PinResponse {
    ipfs_hash: String,
    pin_size: u64,
    timestamp: String,
}

/// Client for the Pinata API and its gateway.
#[derive(Clone)]
pub struct PinataClient {
    http: reqwest::Client,
    api_url: String,
    gateway_base: String,
    jwt: Option<String>,
    retries: RetryConfig,
}

impl PinataClient {
    pub fn new(config: &IpfsConfig, retries: RetryConfig, timeout: Duration) -> Result<Self, IpfsError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            gateway_base: config.gateway_base(),
            jwt: config.jwt.clone(),
            retries,
        })
    }

    /// Public URL of `cid` on the configured gateway.
    pub fn gateway_url(&self, cid: &str) -> String {
        format!("{}/ipfs/{}", self.gateway_base, cid)
    }

    /// Pin a file. The caller is expected to have validated it already.
    pub async fn pin_file(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Bytes,
    ) -> Result<UploadDescriptor, IpfsError> {
        let jwt = self.jwt.as_deref().ok_or(IpfsError::NotConfigured)?;

        let part = Part::bytes(bytes.to_vec())
            .file_name(file_name.to_string())
            .mime_str(content_type)?;
        let form = Form::new()
            .part("file", part)
            .text("pinataMetadata", serde_json::json!({ "name": file_name }).to_string());

        let response = self
            .http
            .post(format!("{}/pinning/pinFileToIPFS", self.api_url))
            .bearer_auth(jwt)
            .multipart(form)
            .send()
            .await
            .inspect_err(|_| metrics::record_upstream_error("pinata"))?;

        let status = response.status();
        if !status.is_success() {
            metrics::record_upstream_error("pinata");
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, body = %body, "Pinata rejected upload");
            return Err(IpfsError::Status(status.as_u16()));
        }

        let pinned: PinResponse = response
            .json()
            .await
            .map_err(|e| IpfsError::Malformed(e.to_string()))?;

        tracing::info!(cid = %pinned.ipfs_hash, size = pinned.pin_size, "Pinned image");
        Ok(UploadDescriptor {
            gateway_url: self.gateway_url(&pinned.ipfs_hash),
            ipfs_hash: pinned.ipfs_hash,
            pin_size: pinned.pin_size,
            timestamp: pinned.timestamp,
        })
    }

    /// Fetch `cid` from the gateway.
    pub async fn fetch(&self, cid: &str) -> Result<CachedImage, IpfsError> {
        if !is_valid_cid(cid) {
            return Err(IpfsError::InvalidCid(cid.to_string()));
        }
        let url = self.gateway_url(cid);
        retry_read(&self.retries, "ipfs_fetch", || self.fetch_once(&url)).await
    }

    async fn fetch_once(&self, url: &str) -> Result<CachedImage, IpfsError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .inspect_err(|_| metrics::record_upstream_error("ipfs_gateway"))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(IpfsError::NotFound);
        }
        if !status.is_success() {
            metrics::record_upstream_error("ipfs_gateway");
            return Err(IpfsError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        if !is_image_type(&content_type) {
            tracing::warn!(url, content_type = %content_type, "Gateway returned non-image content");
            return Err(IpfsError::NotAnImage(content_type));
        }
        let bytes = response.bytes().await?;

        Ok(CachedImage::new(bytes, content_type))
    }
}

impl std::fmt::Debug for PinataClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PinataClient")
            .field("api_url", &self.api_url)
            .field("gateway", &self.gateway_base)
            .field("jwt_configured", &self.jwt.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CID_V0: &str = "QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG";
    const CID_V1: &str = "bafybeigdyrzt5sfp7udm7hu76uh7y26nf3efuylqabf3oclgtqy55fbzdi";

    #[test]
    fn test_cid_validation() {
        assert!(is_valid_cid(CID_V0));
        assert!(is_valid_cid(CID_V1));
        assert!(!is_valid_cid(""));
        assert!(!is_valid_cid("Qm0000"));
        assert!(!is_valid_cid("../../etc/passwd"));
        assert!(!is_valid_cid(&CID_V0.replace('Y', "0")));
        assert!(!is_valid_cid("bafy/../x"));
    }

    #[test]
    fn test_image_type_check() {
        assert!(is_image_type("image/png"));
        assert!(is_image_type("IMAGE/JPEG"));
        assert!(is_image_type("image/svg+xml; charset=utf-8"));
        assert!(!is_image_type("text/html; charset=utf-8"));
        assert!(!is_image_type("application/octet-stream"));
        assert!(!is_image_type("image/"));
        assert!(!is_image_type(""));
    }

    #[test]
    fn test_gateway_url() {
        let client = PinataClient::new(&IpfsConfig::default(), RetryConfig::default(), Duration::from_secs(1)).unwrap();
        assert_eq!(
            client.gateway_url(CID_V0),
            format!("https://gateway.pinata.cloud/ipfs/{}", CID_V0)
        );
    }

    #[tokio::test]
    async fn test_pin_requires_jwt() {
        let client = PinataClient::new(&IpfsConfig::default(), RetryConfig::default(), Duration::from_secs(1)).unwrap();
        let err = client
            .pin_file("a.png", "image/png", Bytes::from_static(b"png"))
            .await
            .unwrap_err();
        assert!(matches!(err, IpfsError::NotConfigured));
    }

    #[tokio::test]
    async fn test_fetch_rejects_bad_cid_without_request() {
        let client = PinataClient::new(&IpfsConfig::default(), RetryConfig::default(), Duration::from_secs(1)).unwrap();
        assert!(matches!(client.fetch("nope").await, Err(IpfsError::InvalidCid(_))));
    }
}
