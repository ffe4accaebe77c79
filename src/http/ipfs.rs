//! IPFS image proxy handlers.

use axum::{
    extract::{multipart::MultipartError, Multipart, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::Deserialize;

use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::ipfs::{is_valid_cid, validate_upload, CachedImage, IpfsError, UploadDescriptor};
use crate::observability::metrics;

/// Images are content-addressed, so a response never goes stale.
pub const IMAGE_CACHE_CONTROL: &str = "public, max-age=86400, immutable";

/// Response header reporting whether the gateway cache served the image.
pub const X_CACHE: &str = "x-cache";

#[derive(Debug, Deserialize)]
pub struct RetrieveQuery {
    pub cid: Option<String>,
}

pub async fn retrieve(
    State(state): State<AppState>,
    Query(query): Query<RetrieveQuery>,
) -> Result<Response, ApiError> {
    let cid = query.cid.unwrap_or_default().trim().to_string();
    if !is_valid_cid(&cid) {
        return Err(IpfsError::InvalidCid(cid).into());
    }

    let cache = &state.inner.image_cache;
    if let Some(image) = cache.get(&cid) {
        metrics::record_cache_lookup(true);
        tracing::debug!(cid = %cid, "Image cache hit");
        return Ok(image_response(image, "HIT"));
    }
    metrics::record_cache_lookup(false);

    let image = state.inner.pinata.fetch(&cid).await?;
    cache.insert(&cid, image.clone());
    let (entries, bytes) = cache.stats();
    metrics::record_cache_size(bytes);
    tracing::debug!(cid = %cid, size = image.len(), entries, "Image fetched from gateway");

    Ok(image_response(image, "MISS"))
}

fn image_response(image: CachedImage, cache_status: &'static str) -> Response {
    (
        [
            (header::CONTENT_TYPE, image.content_type),
            (header::CACHE_CONTROL, IMAGE_CACHE_CONTROL.to_string()),
            (header::HeaderName::from_static(X_CACHE), cache_status.to_string()),
        ],
        image.bytes,
    )
        .into_response()
}

/// A body over the listener limit is the same rejection as an oversized file.
fn bad_multipart(max_upload_bytes: usize) -> impl Fn(MultipartError) -> ApiError {
    move |e| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            IpfsError::BodyTooLarge { max: max_upload_bytes }.into()
        } else {
            ApiError::BadRequest(e.body_text())
        }
    }
}

struct UploadedFile {
    name: String,
    content_type: Option<String>,
    bytes: Bytes,
}

/// Multipart upload: `recaptchaToken` and `file`.
///
/// The file is validated before the reCAPTCHA call, so a bad file never
/// costs an outbound request.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadDescriptor>, ApiError> {
    let max_upload_bytes = state.inner.config.ipfs.max_upload_bytes;
    let bad_multipart = bad_multipart(max_upload_bytes);
    let mut token: Option<String> = None;
    let mut file: Option<UploadedFile> = None;

    while let Some(field) = multipart.next_field().await.map_err(&bad_multipart)? {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "recaptchaToken" => {
                token = Some(field.text().await.map_err(&bad_multipart)?);
            }
            "file" => {
                let name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(&bad_multipart)?;
                file = Some(UploadedFile { name, content_type, bytes });
            }
            other => tracing::debug!(field = other, "Ignoring multipart field"),
        }
    }

    let file = file.ok_or_else(|| ApiError::BadRequest("multipart field 'file' is required".to_string()))?;
    validate_upload(file.content_type.as_deref(), file.bytes.len(), max_upload_bytes)?;

    let token = token
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::BadRequest("multipart field 'recaptchaToken' is required".to_string()))?;

    let outcome = state.inner.recaptcha.verify(&token).await?;
    if !outcome.success {
        return Err(ApiError::VerificationFailed { error_codes: outcome.error_codes });
    }

    let content_type = file.content_type.unwrap_or_default();
    let descriptor = state
        .inner
        .pinata
        .pin_file(&file.name, &content_type, file.bytes)
        .await?;

    Ok(Json(descriptor))
}
