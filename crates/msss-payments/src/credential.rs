//! Access Credential Cookie
//!
//! The credential is the gateway's checkout session ID stored in the
//! `purchase_session` cookie. It is not signed: holding it proves nothing
//! until the gateway confirms the session is paid, and its confidentiality
//! rests on TLS plus the gateway's ID entropy.

/// Cookie name carrying the session ID
pub const COOKIE_NAME: &str = "purchase_session";

/// Credential lifetime: 30 days
pub const MAX_AGE_SECS: u64 = 2_592_000;

/// Access credential issued after a verified purchase
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessCredential(String);

impl AccessCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `Set-Cookie` header value for this credential
    pub fn to_header(&self) -> String {
        build_credential_header(&self.0)
    }
}

impl std::fmt::Display for AccessCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Build the `Set-Cookie` value. The token is used verbatim.
pub fn build_credential_header(token: &str) -> String {
    format!("{COOKIE_NAME}={token}; Path=/; HttpOnly; Secure; SameSite=Strict; Max-Age={MAX_AGE_SECS}")
}

/// Extract the credential from a raw `Cookie` header.
///
/// Pairs split at their first `=`; names and values are trimmed. A missing
/// header, missing cookie or empty value yields `None`. When the cookie
/// appears more than once, the first non-empty value wins.
pub fn parse_credential(cookie_header: Option<&str>) -> Option<String> {
    cookie_header?
        .split(';')
        .filter_map(|pair| {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            (name.trim() == COOKIE_NAME).then_some(value.trim())
        })
        .find(|value| !value.is_empty())
        .map(str::to_string)
}
