//! Wire types for the media endpoints and the CDN API.
//!
//! The CDN speaks camelCase JSON; these structs carry that convention
//! on both the provider side and our own HTTP surface.

use serde::{Deserialize, Serialize};

/// Short-lived signed credentials for a direct-to-CDN client upload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthParams {
    pub token: String,
    pub expire: i64,
    pub signature: String,
}

/// What the auth endpoint hands to clients: the signed triple plus the
/// two public pieces needed to talk to the CDN without another
/// server round-trip. The private key is deliberately absent.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientAuthResponse {
    pub token: String,
    pub expire: i64,
    pub signature: String,
    pub public_key: String,
    pub url_endpoint: String,
}

impl ClientAuthResponse {
    pub fn new(params: AuthParams, public_key: &str, url_endpoint: &str) -> Self {
        Self {
            token: params.token,
            expire: params.expire,
            signature: params.signature,
            public_key: public_key.to_string(),
            url_endpoint: url_endpoint.to_string(),
        }
    }
}

/// Body of `POST /api/imagekit/upload`. `file` is either a base64
/// payload or a fetchable URL, passed through to the CDN untouched.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    pub file: Option<String>,
    pub file_name: Option<String>,
    pub folder: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// A stored remote object as reported by the CDN. `file_id` is the
/// only handle needed for later deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub url: String,
    pub file_id: String,
    pub thumbnail_url: Option<String>,
    pub name: String,
    pub file_path: String,
    pub size: u64,
}

/// Recognized URL-transformation directives. Unset or out-of-range
/// fields are skipped rather than rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transformation {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub quality: Option<u8>,
    pub format: Option<String>,
}

impl Transformation {
    pub fn resize(width: u32, height: u32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ..Self::default()
        }
    }

    /// The provider's path directive, e.g. `tr:w-300,h-200,q-80,f-webp`,
    /// or `None` when no valid directive remains.
    pub fn directive(&self) -> Option<String> {
        let mut parts = Vec::new();

        if let Some(width) = self.width.filter(|w| *w > 0) {
            parts.push(format!("w-{}", width));
        }
        if let Some(height) = self.height.filter(|h| *h > 0) {
            parts.push(format!("h-{}", height));
        }
        if let Some(quality) = self.quality.filter(|q| (1..=100).contains(q)) {
            parts.push(format!("q-{}", quality));
        }
        if let Some(format) = self.format.as_deref().filter(|f| !f.trim().is_empty()) {
            parts.push(format!("f-{}", format.trim()));
        }

        if parts.is_empty() {
            None
        } else {
            Some(format!("tr:{}", parts.join(",")))
        }
    }
}
