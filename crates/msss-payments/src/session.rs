//! Payment Sessions
//!
//! Read-only view of a checkout session as reported by the payment gateway.
//! The gateway is the single source of truth; nothing here is persisted.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata key carrying the add-on flag
pub const ADD_TEMPLATES_KEY: &str = "addTemplates";

/// Payment status of a checkout session
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid,
    Unpaid,
    NoPaymentRequired,
}

impl PaymentStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Paid => "paid",
            Self::Unpaid => "unpaid",
            Self::NoPaymentRequired => "no_payment_required",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A checkout session retrieved from the gateway
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaymentSession {
    /// Gateway session ID (e.g. `cs_...`)
    pub id: String,

    /// Payment status
    pub payment_status: PaymentStatus,

    /// Email entered on the hosted checkout page
    pub customer_email: Option<String>,

    /// Creation time in epoch seconds
    pub created: Option<i64>,

    /// Metadata set when the session was created
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl PaymentSession {
    /// Create a session with no email, timestamp or metadata
    pub fn new(id: impl Into<String>, payment_status: PaymentStatus) -> Self {
        Self {
            id: id.into(),
            payment_status,
            customer_email: None,
            created: None,
            metadata: HashMap::new(),
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.customer_email = Some(email.into());
        self
    }

    pub const fn with_created(mut self, created: i64) -> Self {
        self.created = Some(created);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }

    /// Add-on entitlement: only the exact string `"true"` counts
    pub fn templates_purchased(&self) -> bool {
        self.metadata.get(ADD_TEMPLATES_KEY).map(String::as_str) == Some("true")
    }

    /// Email or empty string
    pub fn email_or_empty(&self) -> String {
        self.customer_email.clone().unwrap_or_default()
    }

    /// Purchase time, falling back to now when the gateway gave none
    pub fn purchased_at(&self) -> DateTime<Utc> {
        self.created
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .unwrap_or_else(Utc::now)
    }
}
