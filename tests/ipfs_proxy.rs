//! Image retrieval cache and upload validation against the mock upstream.

use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde_json::Value;
use std::sync::atomic::Ordering;

use raffle_gateway::ipfs::MAX_UPLOAD_BYTES;

mod common;
use common::*;

fn upload_form(content_type: &str, bytes: Vec<u8>, recaptcha: Option<&str>) -> Form {
    let part = Part::bytes(bytes)
        .file_name("raffle.png")
        .mime_str(content_type)
        .unwrap();
    let form = Form::new().part("file", part);
    match recaptcha {
        Some(token) => form.text("recaptchaToken", token.to_string()),
        None => form,
    }
}

#[tokio::test]
async fn test_cached_cid_served_without_gateway_call() {
    let mock = start_mock_upstream().await;
    let (addr, _state) = spawn_gateway(test_config(&mock), None).await;
    let client = reqwest::Client::new();
    let url = format!("http://{}/api/v1/ipfs/retrieve?cid={}", addr, IMAGE_CID);

    let first = client.get(&url).send().await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(first.headers()["x-cache"], "MISS");
    assert_eq!(first.headers()["content-type"], "image/png");
    assert_eq!(first.headers()["cache-control"], "public, max-age=86400, immutable");
    assert!(first.headers().contains_key("x-request-id"));
    assert_eq!(first.bytes().await.unwrap().as_ref(), IMAGE_BYTES);

    let second = client.get(&url).send().await.unwrap();
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(second.headers()["x-cache"], "HIT");
    assert_eq!(second.bytes().await.unwrap().as_ref(), IMAGE_BYTES);

    assert_eq!(mock.gateway_calls(), 1);
}

#[tokio::test]
async fn test_invalid_cid_rejected_before_fetch() {
    let mock = start_mock_upstream().await;
    let (addr, _state) = spawn_gateway(test_config(&mock), None).await;
    let client = reqwest::Client::new();

    for query in ["cid=not-a-cid", "cid=", ""] {
        let resp = client
            .get(format!("http://{}/api/v1/ipfs/retrieve?{}", addr, query))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "query {:?}", query);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"], "INVALID_CID");
    }
    assert_eq!(mock.gateway_calls(), 0);
}

#[tokio::test]
async fn test_missing_content_is_404_and_not_cached() {
    let mock = start_mock_upstream().await;
    let (addr, state) = spawn_gateway(test_config(&mock), None).await;

    let resp = reqwest::get(format!("http://{}/api/v1/ipfs/retrieve?cid={}", addr, MISSING_CID))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(state.inner.image_cache.stats().0, 0);
    // Not found is final, no retry.
    assert_eq!(mock.gateway_calls(), 1);
}

#[tokio::test]
async fn test_non_image_content_is_rejected_and_not_cached() {
    let mock = start_mock_upstream().await;
    let (addr, state) = spawn_gateway(test_config(&mock), None).await;
    let url = format!("http://{}/api/v1/ipfs/retrieve?cid={}", addr, HTML_CID);

    let resp = reqwest::get(&url).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(resp.headers()["content-type"], "application/json");
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "NOT_AN_IMAGE");
    assert_eq!(state.inner.image_cache.stats().0, 0);
    assert_eq!(mock.gateway_calls(), 1);

    // A second request goes back to the gateway instead of a cached page.
    let again = reqwest::get(&url).await.unwrap();
    assert_eq!(again.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(mock.gateway_calls(), 2);
}

#[tokio::test]
async fn test_transient_gateway_failures_are_retried() {
    let mock = start_mock_upstream().await;
    mock.state.gateway_failures.store(2, Ordering::SeqCst);
    let (addr, _state) = spawn_gateway(test_config(&mock), None).await;

    let resp = reqwest::get(format!("http://{}/api/v1/ipfs/retrieve?cid={}", addr, IMAGE_CID))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(mock.gateway_calls(), 3);
}

#[tokio::test]
async fn test_gateway_failures_exhaust_retries() {
    let mock = start_mock_upstream().await;
    mock.state.gateway_failures.store(10, Ordering::SeqCst);
    let (addr, _state) = spawn_gateway(test_config(&mock), None).await;

    let resp = reqwest::get(format!("http://{}/api/v1/ipfs/retrieve?cid={}", addr, IMAGE_CID))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "UPSTREAM_ERROR");
    assert_eq!(mock.gateway_calls(), 3);
}

#[tokio::test]
async fn test_upload_pins_image() {
    let mock = start_mock_upstream().await;
    let (addr, _state) = spawn_gateway(test_config(&mock), None).await;

    let resp = reqwest::Client::new()
        .post(format!("http://{}/api/v1/ipfs/upload", addr))
        .multipart(upload_form("image/png", IMAGE_BYTES.to_vec(), Some(GOOD_RECAPTCHA)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["ipfsHash"], PINNED_CID);
    assert_eq!(body["timestamp"], "2026-01-01T00:00:00Z");
    assert_eq!(
        body["gatewayUrl"],
        format!("{}/ipfs/{}", mock.base_url(), PINNED_CID)
    );
    assert_eq!(mock.recaptcha_calls(), 1);
    assert_eq!(mock.pin_calls(), 1);
}

#[tokio::test]
async fn test_upload_rejects_non_image_without_outbound_calls() {
    let mock = start_mock_upstream().await;
    let (addr, _state) = spawn_gateway(test_config(&mock), None).await;

    let resp = reqwest::Client::new()
        .post(format!("http://{}/api/v1/ipfs/upload", addr))
        .multipart(upload_form("application/pdf", b"%PDF-1.7".to_vec(), Some(GOOD_RECAPTCHA)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "INVALID_FILE_TYPE");

    assert_eq!(mock.recaptcha_calls(), 0);
    assert_eq!(mock.pin_calls(), 0);
}

#[tokio::test]
async fn test_upload_rejects_oversized_file_without_outbound_calls() {
    let mock = start_mock_upstream().await;
    let (addr, _state) = spawn_gateway(test_config(&mock), None).await;

    let resp = reqwest::Client::new()
        .post(format!("http://{}/api/v1/ipfs/upload", addr))
        .multipart(upload_form("image/png", vec![0u8; MAX_UPLOAD_BYTES + 1], Some(GOOD_RECAPTCHA)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "FILE_TOO_LARGE");

    assert_eq!(mock.recaptcha_calls(), 0);
    assert_eq!(mock.pin_calls(), 0);
}

#[tokio::test]
async fn test_upload_over_body_limit_is_file_too_large() {
    let mock = start_mock_upstream().await;
    let config = test_config(&mock);
    let body_limit = config.listener.max_body_bytes;
    let (addr, _state) = spawn_gateway(config, None).await;

    let resp = reqwest::Client::new()
        .post(format!("http://{}/api/v1/ipfs/upload", addr))
        .multipart(upload_form("image/png", vec![0u8; body_limit + 1024 * 1024], Some(GOOD_RECAPTCHA)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "FILE_TOO_LARGE");

    assert_eq!(mock.recaptcha_calls(), 0);
    assert_eq!(mock.pin_calls(), 0);
}

#[tokio::test]
async fn test_upload_requires_passing_recaptcha() {
    let mock = start_mock_upstream().await;
    let (addr, _state) = spawn_gateway(test_config(&mock), None).await;
    let client = reqwest::Client::new();
    let url = format!("http://{}/api/v1/ipfs/upload", addr);

    let missing = client
        .post(&url)
        .multipart(upload_form("image/png", IMAGE_BYTES.to_vec(), None))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

    for token in ["wrong", LOW_SCORE_RECAPTCHA] {
        let resp = client
            .post(&url)
            .multipart(upload_form("image/png", IMAGE_BYTES.to_vec(), Some(token)))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN, "token {}", token);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"], "VERIFICATION_FAILED");
    }

    assert_eq!(mock.recaptcha_calls(), 2);
    assert_eq!(mock.pin_calls(), 0);
}
