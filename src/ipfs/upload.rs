//! Upload validation and the descriptor returned to clients.
//!
//! Validation runs before anything leaves the process, so a rejected file
//! never reaches the pinning provider.

use serde::{Deserialize, Serialize};

use crate::ipfs::IpfsError;

/// Largest accepted image, 2 MiB.
pub const MAX_UPLOAD_BYTES: usize = 2 * 1024 * 1024;

/// Result of a successful pin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadDescriptor {
    /// CID of the pinned content.
    pub ipfs_hash: String,
    /// Size reported by the pinning service.
    pub pin_size: u64,
    /// Pin timestamp as reported by the pinning service.
    pub timestamp: String,
    /// URL under which the gateway serves the content.
    pub gateway_url: String,
}

/// Check that `content_type` is an image type and `len` is within `max_bytes`.
pub fn validate_upload(content_type: Option<&str>, len: usize, max_bytes: usize) -> Result<(), IpfsError> {
    let mime = content_type.unwrap_or("").trim().to_ascii_lowercase();
    let (kind, subtype) = mime.split_once('/').unwrap_or((mime.as_str(), ""));
    if kind != "image" || subtype.is_empty() {
        return Err(IpfsError::InvalidMime(content_type.unwrap_or("<none>").to_string()));
    }
    if len == 0 {
        return Err(IpfsError::EmptyFile);
    }
    if len > max_bytes {
        return Err(IpfsError::TooLarge { size: len, max: max_bytes });
    }
    Ok(())
}
