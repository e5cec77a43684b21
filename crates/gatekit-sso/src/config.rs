//! IdP connection configuration.
//!
//! [`IdpConfig`] carries everything the engine needs to know about the
//! identity provider: the base URL, the client id registered for this
//! application, and the redirect URL the IdP bounces back to after
//! authentication. The API path suffixes are fixed properties of the IdP
//! and live here as associated constants.

use serde::{Deserialize, Serialize};

/// Configuration for the hosted-login SSO flow.
///
/// Fields are public and may be reassigned at runtime; the classifier
/// snapshots its match strings from the config it is built with, so
/// components holding a classifier must be rebuilt after reconfiguration
/// (the controller does this when an explicit override is used).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdpConfig {
    /// The IdP service base URL, trailing slash included,
    /// e.g. `https://idp.example.com/`.
    pub idp_base_url: String,

    /// The OAuth2 client id registered for this application.
    pub client_id: String,

    /// The redirect URL registered for this client, typically a custom
    /// scheme, e.g. `app://oauth/callback`. Matched exactly (sign-out
    /// detection) and as a prefix (token redirect detection).
    pub redirect_url: String,

    /// Locale sent with authorization requests. `None` means detect from
    /// the process environment at build time.
    pub locale_override: Option<String>,
}

impl IdpConfig {
    /// Path suffix of the OAuth2 authorization endpoint.
    pub const OAUTH2_AUTHORIZE_PATH: &'static str = "oauth2/authz/";

    /// Path suffix of the logout endpoint.
    pub const LOGOUT_PATH: &'static str = "logout";

    /// Path suffix of the IdP's interactive login page.
    pub const LOGIN_PATH: &'static str = "login";

    /// Create a configuration for the given IdP and client.
    pub fn new(
        idp_base_url: impl Into<String>,
        client_id: impl Into<String>,
        redirect_url: impl Into<String>,
    ) -> Self {
        Self {
            idp_base_url: idp_base_url.into(),
            client_id: client_id.into(),
            redirect_url: redirect_url.into(),
            locale_override: None,
        }
    }

    /// The authorization endpoint: base URL + authorize path.
    pub fn authorize_url(&self) -> String {
        format!("{}{}", self.idp_base_url, Self::OAUTH2_AUTHORIZE_PATH)
    }

    /// The logout endpoint: base URL + logout path.
    pub fn logout_url(&self) -> String {
        format!("{}{}", self.idp_base_url, Self::LOGOUT_PATH)
    }

    /// The interactive login page: base URL + login path.
    pub fn login_url(&self) -> String {
        format!("{}{}", self.idp_base_url, Self::LOGIN_PATH)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> IdpConfig {
        IdpConfig::new("https://idp.test/", "client-1", "app://oauth/callback")
    }

    #[test]
    fn derived_urls_concatenate_paths() {
        let config = test_config();
        assert_eq!(config.authorize_url(), "https://idp.test/oauth2/authz/");
        assert_eq!(config.logout_url(), "https://idp.test/logout");
        assert_eq!(config.login_url(), "https://idp.test/login");
    }

    #[test]
    fn fields_are_reassignable() {
        let mut config = test_config();
        config.idp_base_url = "https://other.test/".to_string();
        config.client_id = "client-2".to_string();

        assert_eq!(config.authorize_url(), "https://other.test/oauth2/authz/");
        assert_eq!(config.client_id, "client-2");
    }

    #[test]
    fn config_serializes() {
        let config = test_config();
        let json = serde_json::to_string(&config).unwrap();
        let back: IdpConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
