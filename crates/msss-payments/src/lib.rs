//! # msss-payments
//!
//! Purchase verification and download gating for a single digital product
//! (plus an optional add-on) sold through Stripe Checkout (Hosted).
//!
//! ## Flow
//!
//! ```text
//! ┌─────────────┐     ┌─────────────────┐     ┌──────────────────┐
//! │  Checkout   │────▶│  Stripe Hosted  │────▶│ PurchaseVerifier │──▶ Set-Cookie
//! │  (site)     │     │  Checkout Page  │     │  (session_id)    │──▶ ContactSync
//! └─────────────┘     └─────────────────┘     └──────────────────┘
//!                                                      │
//!                      ┌──────────────────┐            ▼
//!   302 to asset ◀─────│ EntitlementGate  │◀──── purchase_session cookie
//!                      └──────────────────┘
//! ```
//!
//! There is no local state. Entitlement is recomputed from the gateway's
//! session record on every request.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use msss_payments::{Catalog, PurchaseVerifier, StripeGateway, Verification};
//!
//! let gateway = Arc::new(StripeGateway::new("sk_test_xxx", Catalog::default()));
//! let verifier = PurchaseVerifier::new(gateway, None);
//!
//! if let Verification::Verified { purchase, credential } = verifier.verify(Some("cs_123")).await? {
//!     // respond with `purchase` and a `Set-Cookie: {credential.to_header()}`
//! }
//! ```

pub mod catalog;
pub mod contacts;
pub mod credential;
pub mod error;
pub mod gate;
pub mod gateway;
pub mod session;
pub mod storage;
pub mod verifier;

pub use catalog::{AssetKind, Catalog};
pub use contacts::{ContactSync, ContactUpsert, MockContactSync, OmnisendClient};
pub use credential::{AccessCredential, parse_credential};
pub use error::{PurchaseError, Result};
pub use gate::{AssetLocations, DownloadGrant, EntitlementGate};
pub use gateway::{
    CheckoutRequest, CheckoutSession, MockPaymentGateway, PaymentGateway, StripeGateway,
};
pub use session::{PaymentSession, PaymentStatus};
pub use storage::{AssetStorage, DirectLinkStorage, SignedUrlStorage};
pub use verifier::{PurchaseVerifier, VerifiedPurchase, Verification};
