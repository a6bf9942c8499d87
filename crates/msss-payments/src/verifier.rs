//! Purchase Verification
//!
//! Turns a returning buyer's checkout session ID into an access credential.
//! The gateway decides whether the session is paid; the add-on entitlement
//! comes from session metadata. A verified purchase also syncs the buyer to
//! the marketing list, whose outcome is logged and otherwise ignored.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::contacts::{ContactSync, ContactUpsert};
use crate::credential::AccessCredential;
use crate::error::{PurchaseError, Result};
use crate::gateway::PaymentGateway;
use crate::session::PaymentSession;

/// Success payload returned to the buyer's browser
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedPurchase {
    pub success: bool,
    pub customer_email: String,
    pub add_templates_purchased: bool,
}

/// Outcome of a verification that reached the gateway
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verification {
    /// Paid: hand out the payload and set the credential
    Verified {
        purchase: VerifiedPurchase,
        credential: AccessCredential,
    },

    /// Session exists but is not paid. An expected outcome, not an error.
    PaymentNotCompleted,
}

/// Purchase verifier
pub struct PurchaseVerifier {
    gateway: Arc<dyn PaymentGateway>,
    contacts: Option<Arc<dyn ContactSync>>,
}

impl PurchaseVerifier {
    /// `contacts` is `None` when the marketing service is not configured
    pub fn new(gateway: Arc<dyn PaymentGateway>, contacts: Option<Arc<dyn ContactSync>>) -> Self {
        Self { gateway, contacts }
    }

    /// Verify a claimed checkout session
    pub async fn verify(&self, session_id: Option<&str>) -> Result<Verification> {
        let session_id = session_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| PurchaseError::InvalidRequest("Session ID required".into()))?;

        let session = self.gateway.retrieve_session(session_id).await.map_err(|e| {
            tracing::error!(session_id = %session_id, error = %e, "Verify error");
            match e {
                PurchaseError::Gateway(_) => e,
                other => PurchaseError::Gateway(other.to_string()),
            }
        })?;

        if !session.is_paid() {
            tracing::info!(
                session_id = %session_id,
                status = %session.payment_status,
                "Payment not completed"
            );
            return Ok(Verification::PaymentNotCompleted);
        }

        let purchase = VerifiedPurchase {
            success: true,
            customer_email: session.email_or_empty(),
            add_templates_purchased: session.templates_purchased(),
        };
        let credential = AccessCredential::new(session_id);

        tracing::info!(
            session_id = %session_id,
            add_templates = purchase.add_templates_purchased,
            "Purchase verified"
        );

        self.sync_buyer(&session, &purchase).await;

        Ok(Verification::Verified { purchase, credential })
    }

    /// Best-effort marketing sync. Awaited only so failures can be logged.
    async fn sync_buyer(&self, session: &PaymentSession, purchase: &VerifiedPurchase) {
        if purchase.customer_email.is_empty() {
            tracing::info!(session_id = %session.id, "No customer email, skipping contact sync");
            return;
        }
        let Some(contacts) = &self.contacts else {
            tracing::info!(session_id = %session.id, "Marketing API key not set, skipping contact sync");
            return;
        };

        let contact = ContactUpsert::buyer(
            &purchase.customer_email,
            purchase.add_templates_purchased,
            session.purchased_at(),
        );

        match contacts.upsert_contact(&contact).await {
            Ok(()) => tracing::info!(
                service = contacts.name(),
                session_id = %session.id,
                "Synced buyer contact"
            ),
            Err(e) => tracing::warn!(
                service = contacts.name(),
                session_id = %session.id,
                error = %e,
                "Contact sync failed"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contacts::{MockContactSync, TEMPLATES_BUYER_TAG};
    use crate::credential::MAX_AGE_SECS;
    use crate::gateway::MockPaymentGateway;
    use crate::session::{ADD_TEMPLATES_KEY, PaymentStatus};

    fn verifier_with(
        sessions: Vec<PaymentSession>,
        contacts: Option<Arc<MockContactSync>>,
    ) -> (PurchaseVerifier, Arc<MockPaymentGateway>) {
        let gateway = Arc::new(MockPaymentGateway::new());
        for session in sessions {
            gateway.insert_session(session);
        }
        let contacts = contacts.map(|c| c as Arc<dyn ContactSync>);
        (PurchaseVerifier::new(gateway.clone(), contacts), gateway)
    }

    fn paid(id: &str) -> PaymentSession {
        PaymentSession::new(id, PaymentStatus::Paid).with_email("a@b.com")
    }

    #[tokio::test]
    async fn test_missing_session_id_never_reaches_gateway() {
        let (verifier, gateway) = verifier_with(vec![paid("cs_123")], None);

        for input in [None, Some(""), Some("   ")] {
            let result = verifier.verify(input).await;
            assert!(matches!(result, Err(PurchaseError::InvalidRequest(_))));
        }
        assert_eq!(gateway.retrieve_calls(), 0);
    }

    #[tokio::test]
    async fn test_paid_session_without_addon() {
        let contacts = Arc::new(MockContactSync::new());
        let (verifier, _) = verifier_with(vec![paid("cs_123")], Some(contacts.clone()));

        let result = verifier.verify(Some("cs_123")).await.unwrap();
        let Verification::Verified { purchase, credential } = result else {
            panic!("expected verified purchase");
        };

        assert_eq!(
            purchase,
            VerifiedPurchase {
                success: true,
                customer_email: "a@b.com".into(),
                add_templates_purchased: false,
            }
        );
        assert_eq!(credential.as_str(), "cs_123");
        assert!(credential.to_header().starts_with("purchase_session=cs_123;"));
        assert!(credential.to_header().ends_with(&format!("Max-Age={MAX_AGE_SECS}")));

        let upserts = contacts.upserts();
        assert_eq!(upserts.len(), 1);
        assert!(!upserts[0].tags.iter().any(|t| t == TEMPLATES_BUYER_TAG));
    }

    #[tokio::test]
    async fn test_paid_session_with_addon_tags_templates_buyer() {
        let contacts = Arc::new(MockContactSync::new());
        let session = paid("cs_789").with_metadata(ADD_TEMPLATES_KEY, "true");
        let (verifier, _) = verifier_with(vec![session], Some(contacts.clone()));

        let Verification::Verified { purchase, .. } = verifier.verify(Some("cs_789")).await.unwrap()
        else {
            panic!("expected verified purchase");
        };

        assert!(purchase.add_templates_purchased);
        assert!(contacts.upserts()[0].tags.iter().any(|t| t == TEMPLATES_BUYER_TAG));
    }

    #[tokio::test]
    async fn test_unpaid_session_sets_nothing_and_skips_sync() {
        let contacts = Arc::new(MockContactSync::new());
        let session = PaymentSession::new("cs_456", PaymentStatus::Unpaid).with_email("a@b.com");
        let (verifier, _) = verifier_with(vec![session], Some(contacts.clone()));

        let result = verifier.verify(Some("cs_456")).await.unwrap();
        assert_eq!(result, Verification::PaymentNotCompleted);
        assert_eq!(contacts.call_count(), 0);
    }

    #[tokio::test]
    async fn test_gateway_failure_is_verification_failed() {
        let (verifier, _) = verifier_with(vec![], None);
        let err = verifier.verify(Some("cs_unknown")).await.unwrap_err();

        assert!(matches!(err, PurchaseError::Gateway(_)));
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.user_message(), "Failed to verify purchase");
    }

    #[tokio::test]
    async fn test_contact_sync_failure_does_not_change_result() {
        let contacts = Arc::new(MockContactSync::failing());
        let (verifier, _) = verifier_with(vec![paid("cs_123")], Some(contacts.clone()));

        let result = verifier.verify(Some("cs_123")).await.unwrap();
        assert!(matches!(result, Verification::Verified { .. }));
        assert_eq!(contacts.call_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_email_skips_sync() {
        let contacts = Arc::new(MockContactSync::new());
        let session = PaymentSession::new("cs_123", PaymentStatus::Paid);
        let (verifier, _) = verifier_with(vec![session], Some(contacts.clone()));

        let Verification::Verified { purchase, .. } = verifier.verify(Some("cs_123")).await.unwrap()
        else {
            panic!("expected verified purchase");
        };
        assert_eq!(purchase.customer_email, "");
        assert_eq!(contacts.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unconfigured_marketing_still_verifies() {
        let (verifier, _) = verifier_with(vec![paid("cs_123")], None);
        assert!(matches!(
            verifier.verify(Some("cs_123")).await.unwrap(),
            Verification::Verified { .. }
        ));
    }

    #[tokio::test]
    async fn test_repeated_verification_is_identical() {
        let contacts = Arc::new(MockContactSync::new());
        let (verifier, _) = verifier_with(vec![paid("cs_123")], Some(contacts.clone()));

        let first = verifier.verify(Some("cs_123")).await.unwrap();
        let second = verifier.verify(Some("cs_123")).await.unwrap();
        assert_eq!(first, second);

        let upserts = contacts.upserts();
        assert_eq!(upserts.len(), 2);
        assert_eq!(upserts[0].email, upserts[1].email);
        assert_eq!(upserts[0].tags, upserts[1].tags);
    }
}
