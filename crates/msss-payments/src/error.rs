//! Purchase Error Types

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, PurchaseError>;

/// Errors raised while verifying purchases and gating downloads
#[derive(Error, Debug)]
pub enum PurchaseError {
    /// Required input missing or empty
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Session exists but is not paid (an expected verification outcome)
    #[error("Payment not completed")]
    PaymentNotCompleted,

    /// No access credential was presented
    #[error("No purchase credential presented")]
    Unauthenticated,

    /// Credential presented but the payment session is not paid
    #[error("Payment could not be verified")]
    PaymentNotVerified,

    /// Credential is valid but the add-on was not part of the purchase
    #[error("Add-on not included in purchase")]
    AddonNotPurchased,

    /// Payment gateway call failed (unknown session, network, provider)
    #[error("Payment gateway error: {0}")]
    Gateway(String),

    /// Asset storage could not produce a download URL
    #[error("Storage error: {0}")]
    Storage(String),

    /// Marketing service rejected or failed the request
    #[error("Marketing service error: {0}")]
    Marketing(String),

    /// Required configuration missing for this feature path
    #[error("Not configured: {0}")]
    NotConfigured(String),
}

impl PurchaseError {
    /// HTTP status code this error maps to
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::InvalidRequest(_) | Self::PaymentNotCompleted => 400,
            Self::Unauthenticated | Self::PaymentNotVerified | Self::AddonNotPurchased => 403,
            Self::Gateway(_) | Self::Storage(_) | Self::Marketing(_) | Self::NotConfigured(_) => {
                500
            }
        }
    }

    /// Stable machine-readable code
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::PaymentNotCompleted => "PAYMENT_NOT_COMPLETED",
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::PaymentNotVerified => "PAYMENT_NOT_VERIFIED",
            Self::AddonNotPurchased => "ADDON_NOT_PURCHASED",
            Self::Gateway(_) => "VERIFICATION_FAILED",
            Self::Storage(_) | Self::Marketing(_) => "UPSTREAM_FAILURE",
            Self::NotConfigured(_) => "NOT_CONFIGURED",
        }
    }

    /// Whether this is an access denial (as opposed to a failure)
    pub const fn is_denial(&self) -> bool {
        matches!(
            self,
            Self::Unauthenticated | Self::PaymentNotVerified | Self::AddonNotPurchased
        )
    }

    /// Caller-safe message. Provider details stay in the logs.
    pub fn user_message(&self) -> &str {
        match self {
            Self::InvalidRequest(msg) => msg,
            Self::PaymentNotCompleted => "Payment not completed",
            Self::Unauthenticated => "You need to purchase the book to download it.",
            Self::PaymentNotVerified => "Your payment could not be verified.",
            Self::AddonNotPurchased => {
                "The Templates + Trackers Pack was not included with this purchase."
            }
            Self::Gateway(_) => "Failed to verify purchase",
            Self::Storage(_) | Self::Marketing(_) => "An error occurred processing your request.",
            Self::NotConfigured(_) => "Service configuration error.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(PurchaseError::InvalidRequest("x".into()).status_code(), 400);
        assert_eq!(PurchaseError::PaymentNotCompleted.status_code(), 400);
        assert_eq!(PurchaseError::Unauthenticated.status_code(), 403);
        assert_eq!(PurchaseError::AddonNotPurchased.status_code(), 403);
        assert_eq!(PurchaseError::Gateway("boom".into()).status_code(), 500);
        assert_eq!(PurchaseError::NotConfigured("BOOK_PDF_URL".into()).status_code(), 500);
    }

    #[test]
    fn test_payment_not_completed_is_not_a_denial() {
        let err = PurchaseError::PaymentNotCompleted;
        assert!(!err.is_denial());
        assert_eq!(err.code(), "PAYMENT_NOT_COMPLETED");
        assert_eq!(err.user_message(), "Payment not completed");
    }

    #[test]
    fn test_user_message_hides_provider_details() {
        let err = PurchaseError::Gateway("No such checkout.session: cs_live_secret".into());
        assert!(!err.user_message().contains("cs_live_secret"));
        assert_eq!(err.user_message(), "Failed to verify purchase");
    }
}
