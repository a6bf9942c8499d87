//! Omnisend Contacts API

use async_trait::async_trait;

use super::{ContactSync, ContactUpsert};
use crate::error::{PurchaseError, Result};

const DEFAULT_BASE_URL: &str = "https://api.omnisend.com/v3";

/// Omnisend REST client
pub struct OmnisendClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OmnisendClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Point the client at another API root (staging, local stub)
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OMNISEND_API_KEY")
            .map_err(|_| PurchaseError::NotConfigured("OMNISEND_API_KEY not set".into()))?;
        Ok(Self::new(api_key))
    }

    fn contacts_url(&self) -> String {
        format!("{}/contacts", self.base_url)
    }
}

#[async_trait]
impl ContactSync for OmnisendClient {
    async fn upsert_contact(&self, contact: &ContactUpsert) -> Result<()> {
        let response = self
            .http
            .post(self.contacts_url())
            .header("X-API-Key", &self.api_key)
            .json(contact)
            .send()
            .await
            .map_err(|e| PurchaseError::Marketing(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PurchaseError::Marketing(format!("HTTP {status}: {body}")));
        }

        tracing::debug!(email = %contact.email, tags = ?contact.tags, "Upserted contact");
        Ok(())
    }

    fn name(&self) -> &str {
        "Omnisend"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contacts_url() {
        let client = OmnisendClient::with_base_url("key", "http://localhost:9999/v3/");
        assert_eq!(client.contacts_url(), "http://localhost:9999/v3/contacts");
        assert_eq!(OmnisendClient::new("key").contacts_url(), "https://api.omnisend.com/v3/contacts");
    }

    #[tokio::test]
    async fn test_transport_error_is_marketing_error() {
        // Port 9 (discard) on localhost is expected to refuse connections
        let client = OmnisendClient::with_base_url("key", "http://127.0.0.1:9/v3");
        let result = client.upsert_contact(&ContactUpsert::subscribed("a@b.com")).await;
        assert!(matches!(result, Err(PurchaseError::Marketing(_))));
    }
}
