//! Stripe Checkout Integration
//!
//! Hosted checkout in one-time payment mode, plus session lookup for
//! verification and download gating.

use std::collections::HashMap;

use async_trait::async_trait;
use stripe::{
    CheckoutSession as StripeCheckoutSession, CheckoutSessionCustomerCreation, CheckoutSessionId,
    CheckoutSessionMode, CheckoutSessionPaymentStatus, Client, CreateCheckoutSession,
    CreateCheckoutSessionLineItems, CreateCheckoutSessionLineItemsPriceData,
    CreateCheckoutSessionLineItemsPriceDataProductData, CreateCheckoutSessionPaymentMethodTypes,
    Currency,
};

use super::{CheckoutRequest, CheckoutSession, PaymentGateway};
use crate::catalog::Catalog;
use crate::error::{PurchaseError, Result};
use crate::session::{ADD_TEMPLATES_KEY, PaymentSession, PaymentStatus};

/// Stripe client wrapper
pub struct StripeGateway {
    client: Client,
    catalog: Catalog,
}

impl StripeGateway {
    /// Create a new Stripe gateway
    pub fn new(secret_key: &str, catalog: Catalog) -> Self {
        Self {
            client: Client::new(secret_key),
            catalog,
        }
    }

    /// Create from environment variables
    pub fn from_env(catalog: Catalog) -> Result<Self> {
        let secret_key = std::env::var("STRIPE_SECRET_KEY")
            .map_err(|_| PurchaseError::NotConfigured("STRIPE_SECRET_KEY not set".into()))?;

        Ok(Self::new(&secret_key, catalog))
    }

    /// Parameters for a one-time card payment with an always-created customer
    fn checkout_params<'a>(&self, request: &'a CheckoutRequest) -> CreateCheckoutSession<'a> {
        let mut params = CreateCheckoutSession::new();
        params.success_url = Some(&request.success_url);
        params.cancel_url = Some(&request.cancel_url);
        params.mode = Some(CheckoutSessionMode::Payment);
        params.payment_method_types = Some(vec![CreateCheckoutSessionPaymentMethodTypes::Card]);
        params.customer_creation = Some(CheckoutSessionCustomerCreation::Always);

        // The add-on flag is read back at verification and download time
        let mut metadata = HashMap::new();
        metadata.insert(ADD_TEMPLATES_KEY.to_string(), request.add_templates.to_string());
        params.metadata = Some(metadata);

        params.line_items = Some(
            self.catalog
                .line_items(request.add_templates)
                .into_iter()
                .map(|item| CreateCheckoutSessionLineItems {
                    quantity: Some(1),
                    price_data: Some(CreateCheckoutSessionLineItemsPriceData {
                        currency: Currency::USD,
                        unit_amount: Some(item.cents),
                        product_data: Some(CreateCheckoutSessionLineItemsPriceDataProductData {
                            name: item.name.clone(),
                            description: Some(item.description.clone()),
                            images: item.image.clone().map(|image| vec![image]),
                            ..Default::default()
                        }),
                        ..Default::default()
                    }),
                    ..Default::default()
                })
                .collect(),
        );

        params
    }

    /// Get the underlying Stripe client
    pub const fn inner(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_session(&self, request: &CheckoutRequest) -> Result<CheckoutSession> {
        let params = self.checkout_params(request);

        let session = StripeCheckoutSession::create(&self.client, params)
            .await
            .map_err(|e| PurchaseError::Gateway(e.to_string()))?;

        let url = session
            .url
            .ok_or_else(|| PurchaseError::Gateway("No checkout URL returned".into()))?;

        tracing::info!(
            session_id = %session.id,
            add_templates = request.add_templates,
            "Created checkout session"
        );

        Ok(CheckoutSession {
            id: session.id.to_string(),
            url,
        })
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<PaymentSession> {
        let id: CheckoutSessionId = session_id
            .parse()
            .map_err(|e| PurchaseError::Gateway(format!("Malformed session ID: {e}")))?;

        let session = StripeCheckoutSession::retrieve(&self.client, &id, &[])
            .await
            .map_err(|e| PurchaseError::Gateway(e.to_string()))?;

        let payment_status = match session.payment_status {
            CheckoutSessionPaymentStatus::Paid => PaymentStatus::Paid,
            CheckoutSessionPaymentStatus::Unpaid => PaymentStatus::Unpaid,
            CheckoutSessionPaymentStatus::NoPaymentRequired => PaymentStatus::NoPaymentRequired,
        };

        let customer_email = session
            .customer_details
            .and_then(|details| details.email)
            .or(session.customer_email);

        Ok(PaymentSession {
            id: session.id.to_string(),
            payment_status,
            customer_email,
            created: Some(session.created).filter(|created| *created > 0),
            metadata: session.metadata.unwrap_or_default(),
        })
    }

    fn name(&self) -> &str {
        "Stripe"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(add_templates: bool) -> CheckoutRequest {
        CheckoutRequest {
            add_templates,
            success_url: "https://morningroutines.co/success?session_id={CHECKOUT_SESSION_ID}".into(),
            cancel_url: "https://morningroutines.co/#book".into(),
        }
    }

    #[test]
    fn test_checkout_params_card_payment_with_customer() {
        let gateway = StripeGateway::new("sk_test_placeholder", Catalog::default());
        let request = request(false);
        let params = gateway.checkout_params(&request);

        assert!(matches!(params.mode, Some(CheckoutSessionMode::Payment)));
        assert!(matches!(
            params.customer_creation,
            Some(CheckoutSessionCustomerCreation::Always)
        ));
        assert!(matches!(
            params.payment_method_types.as_deref(),
            Some([CreateCheckoutSessionPaymentMethodTypes::Card])
        ));
        assert_eq!(params.cancel_url, Some("https://morningroutines.co/#book"));
        assert_eq!(params.line_items.as_ref().map(Vec::len), Some(1));
        assert_eq!(
            params.metadata.as_ref().and_then(|m| m.get(ADD_TEMPLATES_KEY)).map(String::as_str),
            Some("false")
        );
    }

    #[test]
    fn test_checkout_params_with_addon() {
        let gateway = StripeGateway::new("sk_test_placeholder", Catalog::with_templates_price(900));
        let request = request(true);
        let params = gateway.checkout_params(&request);

        let items = params.line_items.unwrap_or_default();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].price_data.as_ref().and_then(|p| p.unit_amount), Some(900));
        assert_eq!(
            params.metadata.as_ref().and_then(|m| m.get(ADD_TEMPLATES_KEY)).map(String::as_str),
            Some("true")
        );
    }

    #[tokio::test]
    async fn test_malformed_id_fails_before_network() {
        let gateway = StripeGateway::new("sk_test_placeholder", Catalog::default());
        let result = gateway.retrieve_session("not-a-session").await;
        assert!(matches!(result, Err(PurchaseError::Gateway(_))));
    }
}
