//! IPFS image proxy subsystem.
//!
//! # Data Flow
//! ```text
//! upload:   multipart → upload.rs (MIME + size) → client.rs (pinFileToIPFS)
//! retrieve: CID → cache.rs (hit?) → client.rs (gateway fetch, retried) → cache.rs
//! ```

pub mod cache;
pub mod client;
pub mod upload;

pub use cache::{CachedImage, ImageCache};
pub use client::{is_valid_cid, PinataClient};
pub use upload::{validate_upload, UploadDescriptor, MAX_UPLOAD_BYTES};

use thiserror::Error;

use crate::resilience::Retryable;

/// Errors from the IPFS proxy.
#[derive(Debug, Error)]
pub enum IpfsError {
    #[error("invalid CID '{0}'")]
    InvalidCid(String),

    #[error("unsupported content type '{0}', only images are accepted")]
    InvalidMime(String),

    #[error("file is empty")]
    EmptyFile,

    #[error("file is {size} bytes, maximum is {max} bytes")]
    TooLarge { size: usize, max: usize },

    /// Request body hit the listener limit before the file was fully read.
    #[error("upload exceeds the maximum of {max} bytes")]
    BodyTooLarge { max: usize },

    /// Gateway served something other than an image.
    #[error("content is '{0}', not an image")]
    NotAnImage(String),

    #[error("pinning service is not configured")]
    NotConfigured,

    #[error("content not found on gateway")]
    NotFound,

    #[error("upstream returned status {0}")]
    Status(u16),

    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed upstream response: {0}")]
    Malformed(String),
}

impl Retryable for IpfsError {
    fn is_retryable(&self) -> bool {
        match self {
            IpfsError::Transport(_) => true,
            IpfsError::Status(code) => *code >= 500 || *code == 429,
            _ => false,
        }
    }
}
