//! HMAC-signed, expiring download URLs
//!
//! Appends `download`, `filename`, `expires` and `signature` query
//! parameters. The signature is HMAC-SHA256 over
//! `<path>\n<expires>\n<filename>` with a secret shared with the file host.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use reqwest::Url;
use sha2::Sha256;

use super::{AssetStorage, DownloadUrlOptions};
use crate::error::{PurchaseError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Storage that signs download URLs
pub struct SignedUrlStorage {
    secret: Vec<u8>,
}

impl SignedUrlStorage {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
        }
    }

    fn mac(&self, path: &str, expires: i64, filename: &str) -> Result<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| PurchaseError::Storage(format!("Invalid signing key: {e}")))?;
        mac.update(path.as_bytes());
        mac.update(b"\n");
        mac.update(expires.to_string().as_bytes());
        mac.update(b"\n");
        mac.update(filename.as_bytes());
        Ok(mac)
    }

    /// Sign `locator` as of `now`
    pub fn sign_at(
        &self,
        locator: &str,
        options: &DownloadUrlOptions,
        now: DateTime<Utc>,
    ) -> Result<String> {
        let mut url = Url::parse(locator)
            .map_err(|e| PurchaseError::Storage(format!("Invalid asset URL: {e}")))?;

        let ttl = i64::try_from(options.expires_in_secs).unwrap_or(i64::MAX);
        let expires = now.timestamp().saturating_add(ttl);
        let signature = hex::encode(
            self.mac(url.path(), expires, &options.download_filename)?
                .finalize()
                .into_bytes(),
        );

        url.query_pairs_mut()
            .append_pair("download", "1")
            .append_pair("filename", &options.download_filename)
            .append_pair("expires", &expires.to_string())
            .append_pair("signature", &signature);

        Ok(url.into())
    }

    /// Check a signed URL's signature and expiry as of `now`
    pub fn verify_at(&self, signed_url: &str, now: DateTime<Utc>) -> bool {
        let Ok(url) = Url::parse(signed_url) else {
            return false;
        };

        let mut filename = None;
        let mut expires = None;
        let mut signature = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "filename" => filename = Some(value.into_owned()),
                "expires" => expires = value.parse::<i64>().ok(),
                "signature" => signature = hex::decode(value.as_bytes()).ok(),
                _ => {}
            }
        }

        let (Some(filename), Some(expires), Some(signature)) = (filename, expires, signature)
        else {
            return false;
        };
        if expires < now.timestamp() {
            return false;
        }

        self.mac(url.path(), expires, &filename)
            .is_ok_and(|mac| mac.verify_slice(&signature).is_ok())
    }
}

#[async_trait]
impl AssetStorage for SignedUrlStorage {
    async fn signed_download_url(
        &self,
        locator: &str,
        options: &DownloadUrlOptions,
    ) -> Result<String> {
        self.sign_at(locator, options, Utc::now())
    }

    fn signs_urls(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn options() -> DownloadUrlOptions {
        DownloadUrlOptions::new("MSSS-Templates-Trackers-Pack.zip")
    }

    #[test]
    fn test_signed_url_verifies_until_expiry() {
        let storage = SignedUrlStorage::new("secret");
        let now = Utc::now();
        let url = storage
            .sign_at("https://files.example.com/packs/t.zip", &options(), now)
            .unwrap();

        assert!(url.starts_with("https://files.example.com/packs/t.zip?download=1&"));
        assert!(url.contains("filename=MSSS-Templates-Trackers-Pack.zip"));
        assert!(storage.verify_at(&url, now + Duration::days(29)));
        assert!(!storage.verify_at(&url, now + Duration::days(31)));
    }

    #[test]
    fn test_tampered_or_foreign_url_rejected() {
        let storage = SignedUrlStorage::new("secret");
        let now = Utc::now();
        let url = storage
            .sign_at("https://files.example.com/book.pdf", &options(), now)
            .unwrap();

        let other_path = url.replace("/book.pdf", "/other.pdf");
        assert!(!storage.verify_at(&other_path, now));
        assert!(!SignedUrlStorage::new("other-secret").verify_at(&url, now));
        assert!(!storage.verify_at("https://files.example.com/book.pdf", now));
    }

    #[test]
    fn test_invalid_locator_is_storage_error() {
        let storage = SignedUrlStorage::new("secret");
        let result = storage.sign_at("not a url", &options(), Utc::now());
        assert!(matches!(result, Err(PurchaseError::Storage(_))));
    }

    #[tokio::test]
    async fn test_direct_link_is_verbatim() {
        let url = super::super::DirectLinkStorage
            .signed_download_url("https://x.io/book.pdf", &options())
            .await
            .unwrap();
        assert_eq!(url, "https://x.io/book.pdf");
    }
}
