//! Asset Storage
//!
//! Turns a configured asset locator into the URL a buyer is redirected to.

mod signed;

pub use signed::SignedUrlStorage;

use async_trait::async_trait;

use crate::error::Result;

/// Lifetime of a signed download URL: 30 days
pub const DOWNLOAD_URL_TTL_SECS: u64 = 2_592_000;

/// Options for a download URL
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadUrlOptions {
    pub expires_in_secs: u64,
    pub download_filename: String,
}

impl DownloadUrlOptions {
    pub fn new(download_filename: impl Into<String>) -> Self {
        Self {
            expires_in_secs: DOWNLOAD_URL_TTL_SECS,
            download_filename: download_filename.into(),
        }
    }
}

/// Storage trait
#[async_trait]
pub trait AssetStorage: Send + Sync {
    /// URL to hand the buyer. May ignore options it cannot honor.
    async fn signed_download_url(&self, locator: &str, options: &DownloadUrlOptions)
    -> Result<String>;

    /// Whether returned URLs expire
    fn signs_urls(&self) -> bool;
}

/// Storage without signing: the configured URL is the download URL
#[derive(Clone, Copy, Debug, Default)]
pub struct DirectLinkStorage;

#[async_trait]
impl AssetStorage for DirectLinkStorage {
    async fn signed_download_url(
        &self,
        locator: &str,
        _options: &DownloadUrlOptions,
    ) -> Result<String> {
        Ok(locator.to_string())
    }

    fn signs_urls(&self) -> bool {
        false
    }
}
