//! Builder for release feed documents

use serde_json::{json, Value};

use super::constants::*;

/// Builder for a "latest release" feed document
#[derive(Debug, Clone)]
pub struct FeedBuilder {
    tag_name: Option<Value>,
    assets: Vec<Value>,
}

impl FeedBuilder {
    /// Create a feed for `tag` with no assets
    pub fn new(tag: &str) -> Self {
        Self {
            tag_name: Some(Value::String(tag.to_string())),
            assets: Vec::new(),
        }
    }

    /// Drop the tag field entirely
    pub fn without_tag(mut self) -> Self {
        self.tag_name = None;
        self
    }

    /// Add a complete asset entry
    pub fn asset(mut self, name: &str, download_url: &str, api_url: &str) -> Self {
        self.assets.push(json!({
            "name": name,
            "browser_download_url": download_url,
            "url": api_url,
            "content_type": "application/octet-stream",
            "size": 0
        }));
        self
    }

    /// Add the artifact asset pointing at `server_uri`
    pub fn artifact_asset(self, server_uri: &str) -> Self {
        self.asset(
            ARTIFACT_NAME,
            &format!("{}{}", server_uri, DOWNLOAD_PATH),
            &format!("{}{}", server_uri, ASSET_API_PATH),
        )
    }

    /// Add an arbitrary raw asset entry
    pub fn raw_asset(mut self, asset: Value) -> Self {
        self.assets.push(asset);
        self
    }

    pub fn build(self) -> Value {
        let mut doc = json!({
            "name": "Release",
            "draft": false,
            "prerelease": false,
            "assets": self.assets,
        });
        if let Some(tag) = self.tag_name {
            doc["tag_name"] = tag;
        }
        doc
    }
}
