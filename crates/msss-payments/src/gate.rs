//! Download Entitlement Gate
//!
//! Every download re-checks the credential against the gateway. Nothing is
//! cached or consumed, so a buyer can download as often as they like while
//! the cookie lives and the session stays paid.

use std::sync::Arc;

use crate::catalog::AssetKind;
use crate::error::{PurchaseError, Result};
use crate::gateway::PaymentGateway;
use crate::storage::{AssetStorage, DownloadUrlOptions};

/// Configured asset locations
#[derive(Clone, Debug, Default)]
pub struct AssetLocations {
    pub book: Option<String>,
    pub templates: Option<String>,
}

impl AssetLocations {
    pub fn locator(&self, kind: AssetKind) -> Option<&str> {
        match kind {
            AssetKind::Book => self.book.as_deref(),
            AssetKind::TemplatesAddon => self.templates.as_deref(),
        }
    }

    /// Environment variable that configures `kind`
    pub const fn env_var(kind: AssetKind) -> &'static str {
        match kind {
            AssetKind::Book => "BOOK_PDF_URL",
            AssetKind::TemplatesAddon => "TEMPLATE_PACK_URL",
        }
    }
}

/// A granted download
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadGrant {
    /// Redirect target
    pub location: String,
    /// Suggested filename
    pub filename: String,
}

/// Entitlement gate
pub struct EntitlementGate {
    gateway: Arc<dyn PaymentGateway>,
    storage: Arc<dyn AssetStorage>,
    assets: AssetLocations,
}

impl EntitlementGate {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        storage: Arc<dyn AssetStorage>,
        assets: AssetLocations,
    ) -> Self {
        Self {
            gateway,
            storage,
            assets,
        }
    }

    /// Decide whether the holder of `credential` may download `kind`
    pub async fn authorize(&self, credential: Option<&str>, kind: AssetKind) -> Result<DownloadGrant> {
        let session_id = credential
            .filter(|c| !c.is_empty())
            .ok_or(PurchaseError::Unauthenticated)?;

        let session = self.gateway.retrieve_session(session_id).await.map_err(|e| {
            tracing::error!(session_id = %session_id, asset = %kind, error = %e, "Download error");
            match e {
                PurchaseError::Gateway(_) => e,
                other => PurchaseError::Gateway(other.to_string()),
            }
        })?;

        if !session.is_paid() {
            tracing::warn!(
                session_id = %session_id,
                status = %session.payment_status,
                "Download denied: payment not verified"
            );
            return Err(PurchaseError::PaymentNotVerified);
        }

        if kind == AssetKind::TemplatesAddon && !session.templates_purchased() {
            tracing::warn!(session_id = %session_id, "Download denied: add-on not purchased");
            return Err(PurchaseError::AddonNotPurchased);
        }

        let locator = self.assets.locator(kind).ok_or_else(|| {
            PurchaseError::NotConfigured(format!(
                "{} not set",
                AssetLocations::env_var(kind)
            ))
        })?;

        let filename = kind.download_filename(locator);
        let location = self
            .storage
            .signed_download_url(locator, &DownloadUrlOptions::new(&filename))
            .await?;

        tracing::info!(session_id = %session_id, asset = %kind, "Download granted");

        Ok(DownloadGrant { location, filename })
    }
}
