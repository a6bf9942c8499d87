//! Application State

use std::sync::Arc;

use msss_payments::{
    AssetStorage, Catalog, ContactSync, DirectLinkStorage, EntitlementGate, OmnisendClient,
    PaymentGateway, PurchaseVerifier, SignedUrlStorage, StripeGateway,
};

use crate::config::AppConfig;

/// Shared application state. Clients are built once and shared read-only.
#[derive(Clone)]
pub struct AppState {
    /// Payment gateway (None if Stripe is not configured)
    pub gateway: Option<Arc<dyn PaymentGateway>>,

    /// Marketing service (None if Omnisend is not configured)
    pub contacts: Option<Arc<dyn ContactSync>>,

    /// Purchase verifier, present whenever the gateway is
    pub verifier: Option<Arc<PurchaseVerifier>>,

    /// Download gate, present whenever the gateway is
    pub gate: Option<Arc<EntitlementGate>>,

    /// Whether download URLs are signed
    pub downloads_signed: bool,

    /// Fallback origin for checkout redirects
    pub site_url: Arc<str>,

    /// Shown on error pages
    pub support_email: Option<Arc<str>>,
}

impl AppState {
    /// Wire real clients from configuration
    pub fn from_config(config: &AppConfig) -> Self {
        let gateway = config.stripe_secret_key.as_deref().map(|key| {
            Arc::new(StripeGateway::new(
                key,
                Catalog::with_templates_price(config.templates_price_cents),
            )) as Arc<dyn PaymentGateway>
        });

        let contacts = config
            .omnisend_api_key
            .as_deref()
            .map(|key| Arc::new(OmnisendClient::new(key)) as Arc<dyn ContactSync>);

        let storage: Arc<dyn AssetStorage> = match &config.download_signing_secret {
            Some(secret) => Arc::new(SignedUrlStorage::new(secret)),
            None => Arc::new(DirectLinkStorage),
        };

        Self::new(gateway, contacts, storage, config)
    }

    /// Wire the given clients
    pub fn new(
        gateway: Option<Arc<dyn PaymentGateway>>,
        contacts: Option<Arc<dyn ContactSync>>,
        storage: Arc<dyn AssetStorage>,
        config: &AppConfig,
    ) -> Self {
        let verifier = gateway
            .clone()
            .map(|gw| Arc::new(PurchaseVerifier::new(gw, contacts.clone())));
        let gate = gateway.clone().map(|gw| {
            Arc::new(EntitlementGate::new(gw, storage.clone(), config.assets.clone()))
        });

        Self {
            gateway,
            contacts,
            verifier,
            gate,
            downloads_signed: storage.signs_urls(),
            site_url: config.site_url.as_str().into(),
            support_email: config.support_email.as_deref().map(Into::into),
        }
    }
}
