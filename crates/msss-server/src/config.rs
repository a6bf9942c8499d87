//! Server Configuration
//!
//! Read from the environment (after `.env` is loaded). Every integration is
//! optional: a missing key disables its feature path, never the server.

use msss_payments::catalog::DEFAULT_TEMPLATES_CENTS;
use msss_payments::AssetLocations;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub stripe_secret_key: Option<String>,
    pub omnisend_api_key: Option<String>,
    pub assets: AssetLocations,
    /// Secret shared with the file host; unsigned direct links when unset
    pub download_signing_secret: Option<String>,
    /// Fallback origin for checkout redirect URLs
    pub site_url: String,
    pub support_email: Option<String>,
    pub templates_price_cents: i64,
    pub bind_addr: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            stripe_secret_key: None,
            omnisend_api_key: None,
            assets: AssetLocations::default(),
            download_signing_secret: None,
            site_url: "http://localhost:3000".into(),
            support_email: None,
            templates_price_cents: DEFAULT_TEMPLATES_CENTS,
            bind_addr: "0.0.0.0:3000".into(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let templates_price_cents = match get("TEMPLATE_PACK_PRICE_CENTS") {
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|cents| *cents > 0)
                .ok_or(ConfigError::Invalid {
                    var: "TEMPLATE_PACK_PRICE_CENTS",
                    value: raw,
                })?,
            None => defaults.templates_price_cents,
        };

        Ok(Self {
            stripe_secret_key: get("STRIPE_SECRET_KEY"),
            omnisend_api_key: get("OMNISEND_API_KEY"),
            assets: AssetLocations {
                book: get("BOOK_PDF_URL"),
                templates: get("TEMPLATE_PACK_URL"),
            },
            download_signing_secret: get("DOWNLOAD_SIGNING_SECRET"),
            site_url: get("SITE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.site_url),
            support_email: get("SUPPORT_EMAIL"),
            templates_price_cents,
            bind_addr: get("BIND_ADDR").unwrap_or(defaults.bind_addr),
        })
    }
}
