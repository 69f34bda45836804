//! Media gateway: the only component allowed to touch the CDN
//! credentials. Handlers get signed parameters and normalized results,
//! never the private key.

pub mod client;

pub use client::CdnClient;

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use thiserror::Error;
use url::Url;
use uuid::Uuid;

use crate::config::CdnConfig;
use crate::models::{AuthParams, Transformation, UploadResult};

type HmacSha1 = Hmac<Sha1>;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("CDN request failed: {0}")]
    Request(String),

    #[error("CDN rejected the request with status {status}: {detail}")]
    Provider { status: u16, detail: String },

    #[error("signature generation failed: {0}")]
    Signing(String),
}

/// Stateless after construction; share it behind an `Arc`.
pub struct MediaGateway {
    config: CdnConfig,
    client: CdnClient,
}

impl MediaGateway {
    pub fn new(config: CdnConfig) -> Result<Self, GatewayError> {
        let client = CdnClient::new(&config)?;
        Ok(Self { config, client })
    }

    pub fn public_key(&self) -> &str {
        &self.config.public_key
    }

    pub fn url_endpoint(&self) -> &str {
        &self.config.url_endpoint
    }

    /// Signed, time-boxed parameters for a direct client upload.
    ///
    /// `token` defaults to a fresh v4 UUID and `expire` to now plus the
    /// configured lifetime. The signature is HMAC-SHA1 over
    /// `token ++ expire`, hex-encoded, which is the scheme the CDN
    /// verifies client uploads against.
    pub fn authentication_parameters(
        &self,
        token: Option<String>,
        expire: Option<i64>,
    ) -> Result<AuthParams, GatewayError> {
        let token = token.unwrap_or_else(|| Uuid::new_v4().to_string());
        let expire =
            expire.unwrap_or_else(|| Utc::now().timestamp() + self.config.auth_expiry_seconds);

        let mut mac = HmacSha1::new_from_slice(self.config.private_key.as_bytes())
            .map_err(|e| GatewayError::Signing(e.to_string()))?;
        mac.update(token.as_bytes());
        mac.update(expire.to_string().as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());

        Ok(AuthParams {
            token,
            expire,
            signature,
        })
    }

    /// Server-initiated upload pass-through. Unique-name generation is
    /// requested from the provider so concurrent uploads with the same
    /// `file_name` cannot collide.
    pub async fn upload_file(
        &self,
        file: &str,
        file_name: &str,
        folder: &str,
        tags: Option<&[String]>,
    ) -> Result<UploadResult, GatewayError> {
        self.client.upload(file, file_name, folder, tags).await
    }

    /// Deletes a stored object by its CDN handle. A miss on an
    /// already-deleted id comes back as an error result, not a panic.
    pub async fn delete_file(&self, file_id: &str) -> Result<(), GatewayError> {
        self.client.delete(file_id).await
    }

    /// True iff `url` points into the configured CDN endpoint. Foreign
    /// hosts and the empty string are rejected.
    pub fn is_valid_url(&self, url: &str) -> bool {
        !url.is_empty() && url.starts_with(&self.config.url_endpoint)
    }

    /// Builds a transformation URL for a stored file path. When the
    /// transformation carries no usable directive, or the endpoint does
    /// not parse as a URL, the path is returned
    /// unchanged. A broken thumbnail is worse than an untransformed one.
    pub fn transformed_url(&self, path: &str, transform: Option<&Transformation>) -> String {
        let directive = match transform.and_then(Transformation::directive) {
            Some(directive) => directive,
            None => return path.to_string(),
        };

        if Url::parse(&self.config.url_endpoint).is_err() {
            return path.to_string();
        }

        format!(
            "{}/{}/{}",
            self.config.url_endpoint.trim_end_matches('/'),
            directive,
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_gateway() -> MediaGateway {
        let config = CdnConfig {
            public_key: "public_abc".to_string(),
            private_key: "private_xyz".to_string(),
            url_endpoint: "https://ik.imagekit.io/acme".to_string(),
            ..CdnConfig::default()
        };
        MediaGateway::new(config).unwrap()
    }

    #[test]
    fn test_auth_params_are_deterministic_for_fixed_inputs() {
        let gateway = test_gateway();
        let first = gateway
            .authentication_parameters(Some("tok".to_string()), Some(1_700_000_000))
            .unwrap();
        let second = gateway
            .authentication_parameters(Some("tok".to_string()), Some(1_700_000_000))
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(first.signature.len(), 40);
        assert!(first.signature.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_signature_depends_on_token_and_expire() {
        let gateway = test_gateway();
        let base = gateway
            .authentication_parameters(Some("tok".to_string()), Some(1_700_000_000))
            .unwrap();
        let other_token = gateway
            .authentication_parameters(Some("tok2".to_string()), Some(1_700_000_000))
            .unwrap();
        let other_expire = gateway
            .authentication_parameters(Some("tok".to_string()), Some(1_700_000_001))
            .unwrap();

        assert_ne!(base.signature, other_token.signature);
        assert_ne!(base.signature, other_expire.signature);
    }

    #[test]
    fn test_expire_defaults_to_configured_lifetime() {
        let gateway = test_gateway();
        let params = gateway.authentication_parameters(None, None).unwrap();
        let expected = Utc::now().timestamp() + 3600;

        assert!((params.expire - expected).abs() <= 5);
        assert!(!params.token.is_empty());
    }

    #[test]
    fn test_generated_tokens_are_unique() {
        let gateway = test_gateway();
        let a = gateway.authentication_parameters(None, None).unwrap();
        let b = gateway.authentication_parameters(None, None).unwrap();
        assert_ne!(a.token, b.token);
    }

    #[test]
    fn test_is_valid_url() {
        let gateway = test_gateway();
        assert!(gateway.is_valid_url("https://ik.imagekit.io/acme/logos/a.png"));
        assert!(gateway.is_valid_url("https://ik.imagekit.io/acme"));
        assert!(!gateway.is_valid_url(""));
        assert!(!gateway.is_valid_url("https://evil.example.com/logos/a.png"));
        assert!(!gateway.is_valid_url("https://ik.imagekit.io/other/logos/a.png"));
    }

    #[test]
    fn test_transformed_url_inserts_directive() {
        let gateway = test_gateway();
        let url = gateway.transformed_url(
            "/logos/a.png",
            Some(&Transformation::resize(300, 200)),
        );
        assert_eq!(
            url,
            "https://ik.imagekit.io/acme/tr:w-300,h-200/logos/a.png"
        );
    }

    #[test]
    fn test_transformed_url_without_directive_returns_path_unchanged() {
        let gateway = test_gateway();
        assert_eq!(gateway.transformed_url("/logos/a.png", None), "/logos/a.png");
        assert_eq!(
            gateway.transformed_url("/logos/a.png", Some(&Transformation::default())),
            "/logos/a.png"
        );
    }

    #[test]
    fn test_transformed_url_with_unparseable_endpoint_degrades() {
        let config = CdnConfig {
            public_key: "public_abc".to_string(),
            private_key: "private_xyz".to_string(),
            url_endpoint: "not a url".to_string(),
            ..CdnConfig::default()
        };
        let gateway = MediaGateway::new(config).unwrap();

        assert_eq!(
            gateway.transformed_url("/logos/a.png", Some(&Transformation::resize(10, 10))),
            "/logos/a.png"
        );
    }
}
