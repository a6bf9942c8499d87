//! Marketing Contact Sync
//!
//! Port for the email-marketing service. Contacts are upserted by email;
//! tags and custom properties are only ever added.

mod mock;
mod omnisend;

pub use mock::MockContactSync;
pub use omnisend::OmnisendClient;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;

/// Tags every buyer receives
pub const BUYER_TAGS: [&str; 2] = ["msss-buyer", "msss"];

/// Extra tag for buyers of the templates pack
pub const TEMPLATES_BUYER_TAG: &str = "msss-templates-buyer";

/// Tag for quiz sign-ups
pub const QUIZ_TAG: &str = "morning-oracle-quiz";

/// Subscription status sent with the contact
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactStatus {
    Subscribed,
    Nonsubscribed,
}

/// Contact upsert payload
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactUpsert {
    pub email: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    pub status: ContactStatus,

    /// RFC 3339 time of the status change
    pub status_date: String,

    pub tags: Vec<String>,

    #[serde(default)]
    pub custom_properties: Map<String, Value>,
}

impl ContactUpsert {
    /// Subscribed contact with no tags or properties
    pub fn subscribed(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            first_name: None,
            status: ContactStatus::Subscribed,
            status_date: rfc3339(Utc::now()),
            tags: Vec::new(),
            custom_properties: Map::new(),
        }
    }

    /// Contact for a verified buyer
    pub fn buyer(
        email: impl Into<String>,
        templates_purchased: bool,
        purchased_at: DateTime<Utc>,
    ) -> Self {
        let mut tags: Vec<String> = BUYER_TAGS.iter().map(|t| (*t).to_string()).collect();
        if templates_purchased {
            tags.push(TEMPLATES_BUYER_TAG.to_string());
        }

        Self {
            tags,
            ..Self::subscribed(email)
        }
        .with_property("msssPurchaseDate", rfc3339(purchased_at))
        .with_property("msssTemplatesPurchased", templates_purchased)
    }

    pub fn with_first_name(mut self, first_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.custom_properties.insert(key.into(), value.into());
        self
    }
}

fn rfc3339(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Marketing service trait
#[async_trait]
pub trait ContactSync: Send + Sync {
    /// Create or update a contact keyed by email
    async fn upsert_contact(&self, contact: &ContactUpsert) -> Result<()>;

    /// Service name
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buyer_tags_without_addon() {
        let contact = ContactUpsert::buyer("a@b.com", false, Utc::now());
        assert_eq!(contact.tags, vec!["msss-buyer", "msss"]);
        assert_eq!(contact.custom_properties["msssTemplatesPurchased"], Value::Bool(false));
    }

    #[test]
    fn test_buyer_tags_with_addon() {
        let contact = ContactUpsert::buyer("a@b.com", true, Utc::now());
        assert!(contact.tags.iter().any(|t| t == TEMPLATES_BUYER_TAG));
        assert_eq!(contact.status, ContactStatus::Subscribed);
    }

    #[test]
    fn test_purchase_date_property() {
        let at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let contact = ContactUpsert::buyer("a@b.com", false, at);
        assert_eq!(
            contact.custom_properties["msssPurchaseDate"],
            Value::String("2023-11-14T22:13:20.000Z".into())
        );
    }

    #[test]
    fn test_wire_format() {
        let contact = ContactUpsert::subscribed("a@b.com")
            .with_first_name("Ada")
            .with_tag(QUIZ_TAG)
            .with_property("morningRank", "Early Bird");
        let json = serde_json::to_value(&contact).unwrap();

        assert_eq!(json["email"], "a@b.com");
        assert_eq!(json["firstName"], "Ada");
        assert_eq!(json["status"], "subscribed");
        assert_eq!(json["tags"][0], QUIZ_TAG);
        assert_eq!(json["customProperties"]["morningRank"], "Early Bird");
        assert!(json.get("statusDate").is_some());
    }
}
