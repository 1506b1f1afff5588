//! HTTP-backed daily sign provider.

use reqwest::Client;
use serde::Deserialize;
use tracing::warn;
use url::Url;

use super::traits::{SignProvider, TimeOfDay, FALLBACK_SIGN};
use crate::error::CoreError;

#[derive(Deserialize)]
struct SignResponse {
    text: String,
}

pub struct HttpSignProvider {
    client: Client,
    endpoint: Url,
}

impl HttpSignProvider {
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
        time_of_day: TimeOfDay,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("time_of_day", time_of_day.as_str());
        let resp = self.client.get(url).send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            return Err(format!("sign service error: HTTP {status}").into());
        }

        let body: SignResponse = resp.json().await?;
        if body.text.is_empty() {
            return Err("sign service returned empty text".into());
        }
        Ok(body.text)
    }
}

impl SignProvider for HttpSignProvider {
    async fn daily_sign(&self, time_of_day: TimeOfDay) -> String {
        match self.fetch(time_of_day).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "sign provider failed; using fallback");
                FALLBACK_SIGN.to_string()
            }
        }
    }
}
