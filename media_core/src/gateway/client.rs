//! Thin typed client for the CDN's REST surface. Transport and
//! provider failures are normalized into `GatewayError` here; callers
//! never see a raw transport error.

use std::time::Duration;

use reqwest::multipart::Form;
use reqwest::Response;

use super::GatewayError;
use crate::config::CdnConfig;
use crate::models::UploadResult;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct CdnClient {
    http: reqwest::Client,
    private_key: String,
    upload_api_base: String,
    management_api_base: String,
}

impl CdnClient {
    pub fn new(config: &CdnConfig) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GatewayError::Request(e.to_string()))?;

        Ok(Self {
            http,
            private_key: config.private_key.clone(),
            upload_api_base: config.upload_api_base.trim_end_matches('/').to_string(),
            management_api_base: config.management_api_base.trim_end_matches('/').to_string(),
        })
    }

    /// `POST /api/v1/files/upload` with multipart form fields. `file`
    /// is forwarded verbatim (base64 payload or fetchable
    /// URL; the provider distinguishes them itself).
    pub async fn upload(
        &self,
        file: &str,
        file_name: &str,
        folder: &str,
        tags: Option<&[String]>,
    ) -> Result<UploadResult, GatewayError> {
        let mut form = Form::new()
            .text("file", file.to_string())
            .text("fileName", file_name.to_string())
            .text("folder", folder.to_string())
            .text("useUniqueFileName", "true");

        if let Some(tags) = tags.filter(|t| !t.is_empty()) {
            form = form.text("tags", tags.join(","));
        }

        let response = self
            .http
            .post(format!("{}/api/v1/files/upload", self.upload_api_base))
            .basic_auth(&self.private_key, Some(""))
            .multipart(form)
            .send()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?;

        let response = Self::check_status(response).await?;

        response
            .json::<UploadResult>()
            .await
            .map_err(|e| GatewayError::Request(format!("malformed upload response: {}", e)))
    }

    /// `DELETE /v1/files/{fileId}`. The provider answers 204 on
    /// success and a JSON error body otherwise.
    pub async fn delete(&self, file_id: &str) -> Result<(), GatewayError> {
        let response = self
            .http
            .delete(format!("{}/v1/files/{}", self.management_api_base, file_id))
            .basic_auth(&self.private_key, Some(""))
            .send()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?;

        Self::check_status(response).await.map(|_| ())
    }

    async fn check_status(response: Response) -> Result<Response, GatewayError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let detail = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());

        Err(GatewayError::Provider {
            status: status.as_u16(),
            detail: truncate_detail(&detail),
        })
    }
}

// Provider error bodies are logged, not forwarded; keep them short.
fn truncate_detail(detail: &str) -> String {
    const MAX: usize = 512;
    if detail.len() <= MAX {
        detail.to_string()
    } else {
        let mut end = MAX;
        while !detail.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…", &detail[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> CdnClient {
        let config = CdnConfig {
            public_key: "public_abc".to_string(),
            private_key: "private_xyz".to_string(),
            url_endpoint: "https://ik.imagekit.io/acme".to_string(),
            upload_api_base: server.uri(),
            management_api_base: server.uri(),
            auth_expiry_seconds: 3600,
        };
        CdnClient::new(&config).unwrap()
    }

    fn upload_body() -> serde_json::Value {
        serde_json::json!({
            "url": "https://ik.imagekit.io/acme/logos/a_x1.png",
            "fileId": "file-1",
            "thumbnailUrl": "https://ik.imagekit.io/acme/tr:n-media_library_thumbnail/logos/a_x1.png",
            "name": "a_x1.png",
            "filePath": "/logos/a_x1.png",
            "size": 2048
        })
    }

    #[tokio::test]
    async fn test_upload_sends_multipart_and_parses_result() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/files/upload"))
            .and(body_string_contains("useUniqueFileName"))
            .and(body_string_contains("logos"))
            .respond_with(ResponseTemplate::new(200).set_body_json(upload_body()))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result = client
            .upload("data:image/png;base64,aGVsbG8=", "a.png", "logos", None)
            .await
            .unwrap();

        assert_eq!(result.file_id, "file-1");
        assert_eq!(result.size, 2048);
    }

    #[tokio::test]
    async fn test_upload_includes_tags_when_present() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/files/upload"))
            .and(body_string_contains("branding,logo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(upload_body()))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let tags = vec!["branding".to_string(), "logo".to_string()];
        client
            .upload("aGVsbG8=", "a.png", "logos", Some(&tags))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_provider_error_is_captured_not_propagated() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/files/upload"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(serde_json::json!({"message": "Invalid file"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.upload("x", "a.png", "logos", None).await.unwrap_err();

        match err {
            GatewayError::Provider { status, detail } => {
                assert_eq!(status, 400);
                assert!(detail.contains("Invalid file"));
            }
            other => panic!("expected provider error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_delete_missing_file_is_error_result() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/v1/files/gone"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(serde_json::json!({"message": "File not found"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.delete("gone").await.unwrap_err();
        assert!(matches!(err, GatewayError::Provider { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_delete_success() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/v1/files/file-1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert!(client.delete("file-1").await.is_ok());
    }

    #[test]
    fn test_truncate_detail_respects_char_boundaries() {
        let long = "é".repeat(600);
        let truncated = truncate_detail(&long);
        assert!(truncated.len() <= 520);
        assert!(truncated.ends_with('…'));
    }
}
