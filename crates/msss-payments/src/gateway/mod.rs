//! Payment Session Gateway
//!
//! Port for the payment processor that hosts checkout and owns the
//! authoritative payment status of every session.

mod mock;
mod stripe;

pub use mock::MockPaymentGateway;
pub use self::stripe::StripeGateway;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::session::PaymentSession;

/// Request to create a hosted checkout session
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CheckoutRequest {
    /// Include the templates pack add-on
    #[serde(default)]
    pub add_templates: bool,

    /// URL to redirect after successful payment
    pub success_url: String,

    /// URL to redirect if checkout is cancelled
    pub cancel_url: String,
}

/// Result of creating a checkout session
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Gateway session ID
    pub id: String,

    /// Hosted checkout URL to send the buyer to
    pub url: String,
}

/// Payment gateway trait
///
/// `StripeGateway` talks to Stripe; `MockPaymentGateway` serves tests.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a hosted checkout session
    async fn create_session(&self, request: &CheckoutRequest) -> Result<CheckoutSession>;

    /// Retrieve a session by ID. Unknown IDs are errors.
    async fn retrieve_session(&self, session_id: &str) -> Result<PaymentSession>;

    /// Gateway name
    fn name(&self) -> &str;
}
