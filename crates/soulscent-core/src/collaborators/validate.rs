//! HTTP-backed content validation.

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;
use url::Url;

use super::traits::ContentValidator;
use crate::error::CoreError;

#[derive(Deserialize)]
struct ValidationResponse {
    accepted: bool,
}

pub struct HttpContentValidator {
    client: Client,
    endpoint: Url,
}

impl HttpContentValidator {
    pub fn new(endpoint: &str) -> Result<Self, CoreError> {
        let endpoint = Url::parse(endpoint).map_err(|e| CoreError::Endpoint {
            url: endpoint.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            client: Client::new(),
            endpoint,
        })
    }

    async fn check(&self, text: &str) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let resp = self
            .client
            .post(self.endpoint.clone())
            .json(&json!({ "text": text }))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            return Err(format!("validation service error: HTTP {status}").into());
        }

        let body: ValidationResponse = resp.json().await?;
        Ok(body.accepted)
    }
}

impl ContentValidator for HttpContentValidator {
    /// A dead moderation service degrades to accepting submissions rather
    /// than blocking journaling; only an explicit rejection refuses text.
    async fn validate(&self, text: &str) -> bool {
        match self.check(text).await {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!(error = %e, "content validation unavailable; accepting submission");
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn explicit_rejection_is_respected() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/validate")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"accepted":false}"#)
            .create_async()
            .await;

        let v = HttpContentValidator::new(&format!("{}/validate", server.url())).unwrap();
        assert!(!v.validate("bad text").await);
    }

    #[tokio::test]
    async fn acceptance_passes_through() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/validate")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"accepted":true}"#)
            .create_async()
            .await;

        let v = HttpContentValidator::new(&format!("{}/validate", server.url())).unwrap();
        assert!(v.validate("今天很好").await);
    }

    #[tokio::test]
    async fn service_failure_fails_open() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/validate")
            .with_status(503)
            .create_async()
            .await;

        let v = HttpContentValidator::new(&format!("{}/validate", server.url())).unwrap();
        assert!(v.validate("今天很好").await);
    }
}
