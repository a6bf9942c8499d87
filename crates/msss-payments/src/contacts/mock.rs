//! Mock Contact Sync
//!
//! Records every upsert; can be told to fail.

use std::sync::{PoisonError, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use super::{ContactSync, ContactUpsert};
use crate::error::{PurchaseError, Result};

/// Recording contact sync
#[derive(Default)]
pub struct MockContactSync {
    upserts: RwLock<Vec<ContactUpsert>>,
    failing: AtomicBool,
}

impl MockContactSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mock that records calls and then fails each one
    pub fn failing() -> Self {
        let mock = Self::default();
        mock.failing.store(true, Ordering::SeqCst);
        mock
    }

    /// Contacts received so far
    pub fn upserts(&self) -> Vec<ContactUpsert> {
        self.upserts.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn call_count(&self) -> usize {
        self.upserts.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[async_trait]
impl ContactSync for MockContactSync {
    async fn upsert_contact(&self, contact: &ContactUpsert) -> Result<()> {
        self.upserts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(contact.clone());

        if self.failing.load(Ordering::SeqCst) {
            return Err(PurchaseError::Marketing("HTTP 503: unavailable".into()));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "MockContacts"
    }
}
