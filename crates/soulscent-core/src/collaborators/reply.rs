//! HTTP-backed AI reply provider.

use reqwest::Client;
use serde_json::json;
use tracing::warn;
use url::Url;

use super::traits::{ReplyProvider, TreeholeReply};
use crate::error::CoreError;

pub struct HttpReplyProvider {
    client: Client,
    endpoint: Url,
}

impl HttpReplyProvider {
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

    async fn fetch(
        &self,
        mood: &str,
        context: &str,
    ) -> Result<TreeholeReply, Box<dyn std::error::Error + Send + Sync>> {
        let resp = self
            .client
            .post(self.endpoint.clone())
            .json(&json!({ "mood": mood, "context": context }))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            return Err(format!("reply service error: HTTP {status}").into());
        }

        let reply: TreeholeReply = resp.json().await?;
        if !reply.is_complete() {
            return Err("reply service returned empty fields".into());
        }
        Ok(reply)
    }
}

impl ReplyProvider for HttpReplyProvider {
    /// Resolves with real content or the fixed fallback triple -- never an
    /// error.
    async fn treehole_reply(&self, mood: &str, context: &str) -> TreeholeReply {
        match self.fetch(mood, context).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(mood, context, error = %e, "reply provider failed; using fallback");
                TreeholeReply::fallback()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolves_real_reply() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/reply")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"reply":"r","story":"s","nickname":"n"}"#)
            .create_async()
            .await;

        let provider = HttpReplyProvider::new(&format!("{}/reply", server.url())).unwrap();
        let reply = provider.treehole_reply("想静静", "家庭").await;
        assert_eq!(reply.reply, "r");
        assert_eq!(reply.nickname, "n");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn server_error_resolves_to_fallback() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/reply")
            .with_status(500)
            .create_async()
            .await;

        let provider = HttpReplyProvider::new(&format!("{}/reply", server.url())).unwrap();
        let reply = provider.treehole_reply("想静静", "家庭").await;
        assert_eq!(reply, TreeholeReply::fallback());
        assert!(reply.is_complete());
    }

    #[tokio::test]
    async fn malformed_body_resolves_to_fallback() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/reply")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("not json")
            .create_async()
            .await;

        let provider = HttpReplyProvider::new(&format!("{}/reply", server.url())).unwrap();
        let reply = provider.treehole_reply("想静静", "家庭").await;
        assert_eq!(reply, TreeholeReply::fallback());
    }

    #[tokio::test]
    async fn empty_fields_resolve_to_fallback() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/reply")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"reply":"","story":"s","nickname":"n"}"#)
            .create_async()
            .await;

        let provider = HttpReplyProvider::new(&format!("{}/reply", server.url())).unwrap();
        let reply = provider.treehole_reply("想静静", "家庭").await;
        assert_eq!(reply, TreeholeReply::fallback());
    }

    #[test]
    fn bad_endpoint_is_rejected_at_construction() {
        assert!(HttpReplyProvider::new("not a url").is_err());
    }
}
