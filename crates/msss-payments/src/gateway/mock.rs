//! Mock Payment Gateway
//!
//! In-memory sessions with call counting and error injection, for tests and
//! local development without Stripe keys.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use super::{CheckoutRequest, CheckoutSession, PaymentGateway};
use crate::error::{PurchaseError, Result};
use crate::session::{ADD_TEMPLATES_KEY, PaymentSession, PaymentStatus};

/// Mock gateway backed by a session map
#[derive(Default)]
pub struct MockPaymentGateway {
    sessions: RwLock<HashMap<String, PaymentSession>>,
    failure: RwLock<Option<String>>,
    retrieve_calls: AtomicUsize,
    create_calls: AtomicUsize,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session that `retrieve_session` will return
    pub fn insert_session(&self, session: PaymentSession) {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(session.id.clone(), session);
    }

    /// Builder form of [`insert_session`](Self::insert_session)
    pub fn with_session(self, session: PaymentSession) -> Self {
        self.insert_session(session);
        self
    }

    /// Make every call fail with a gateway error
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.failure.write().unwrap_or_else(PoisonError::into_inner) = Some(message.into());
    }

    /// Number of `retrieve_session` calls so far
    pub fn retrieve_calls(&self) -> usize {
        self.retrieve_calls.load(Ordering::SeqCst)
    }

    /// Number of `create_session` calls so far
    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    fn check_failure(&self) -> Result<()> {
        match self.failure.read().unwrap_or_else(PoisonError::into_inner).as_ref() {
            Some(message) => Err(PurchaseError::Gateway(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_session(&self, request: &CheckoutRequest) -> Result<CheckoutSession> {
        let n = self.create_calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.check_failure()?;

        let id = format!("cs_test_mock_{n}");
        let session = PaymentSession::new(&id, PaymentStatus::Unpaid)
            .with_metadata(ADD_TEMPLATES_KEY, request.add_templates.to_string());
        self.insert_session(session);

        Ok(CheckoutSession {
            url: format!("https://checkout.example.test/pay/{id}"),
            id,
        })
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<PaymentSession> {
        self.retrieve_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;

        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(session_id)
            .cloned()
            .ok_or_else(|| PurchaseError::Gateway(format!("No such checkout session: {session_id}")))
    }

    fn name(&self) -> &str {
        "MockGateway"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_retrieve_known_and_unknown() {
        let gateway = MockPaymentGateway::new()
            .with_session(PaymentSession::new("cs_1", PaymentStatus::Paid));

        assert!(gateway.retrieve_session("cs_1").await.unwrap().is_paid());
        assert!(gateway.retrieve_session("cs_2").await.is_err());
        assert_eq!(gateway.retrieve_calls(), 2);
    }

    #[tokio::test]
    async fn test_create_records_addon_flag() {
        let gateway = MockPaymentGateway::new();
        let created = gateway
            .create_session(&CheckoutRequest {
                add_templates: true,
                success_url: "https://x/success".into(),
                cancel_url: "https://x/#book".into(),
            })
            .await
            .unwrap();

        let session = gateway.retrieve_session(&created.id).await.unwrap();
        assert!(session.templates_purchased());
        assert!(!session.is_paid());
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let gateway = MockPaymentGateway::new()
            .with_session(PaymentSession::new("cs_1", PaymentStatus::Paid));
        gateway.fail_with("network down");
        assert!(matches!(
            gateway.retrieve_session("cs_1").await,
            Err(PurchaseError::Gateway(_))
        ));
    }
}
