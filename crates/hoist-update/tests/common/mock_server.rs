//! Wiremock helpers for the release feed and artifact endpoints

use serde_json::Value;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::constants::*;

/// Serve `feed` at the feed path
pub async fn mock_feed(server: &MockServer, feed: Value) {
    Mock::given(method("GET"))
        .and(path(FEED_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(feed))
        .mount(server)
        .await;
}

/// Serve `feed` only to requests carrying the access token
pub async fn mock_authenticated_feed(server: &MockServer, feed: Value) {
    Mock::given(method("GET"))
        .and(path(FEED_PATH))
        .and(query_param("access_token", ACCESS_TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(feed))
        .expect(1)
        .mount(server)
        .await;
}

/// Serve a raw, possibly invalid, feed body
pub async fn mock_feed_body(server: &MockServer, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(FEED_PATH))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

/// Serve the artifact at the public download path, expecting `times` requests
pub async fn mock_download(server: &MockServer, content: &[u8], times: u64) {
    Mock::given(method("GET"))
        .and(path(DOWNLOAD_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content.to_vec()))
        .expect(times)
        .mount(server)
        .await;
}

/// Serve the artifact at the asset API path for authenticated octet-stream requests
pub async fn mock_asset_api_download(server: &MockServer, content: &[u8]) {
    Mock::given(method("GET"))
        .and(path(ASSET_API_PATH))
        .and(query_param("access_token", ACCESS_TOKEN))
        .and(header("accept", "application/octet-stream"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content.to_vec()))
        .expect(1)
        .mount(server)
        .await;
}

/// Answer the artifact path with a server error
pub async fn mock_failing_download(server: &MockServer, status: u16) {
    Mock::given(method("GET"))
        .and(path(DOWNLOAD_PATH))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Feed URL on `server`
pub fn feed_url(server: &MockServer) -> String {
    format!("{}{}", server.uri(), FEED_PATH)
}

/// Public artifact URL on `server`
pub fn download_url(server: &MockServer) -> String {
    format!("{}{}", server.uri(), DOWNLOAD_PATH)
}
