//! OAuth2 implicit-flow request building and redirect parsing.
//!
//! The implicit flow (RFC 6749 §4.2) returns tokens directly in the
//! redirect URI fragment; there is no code-exchange step:
//!
//! 1. Build an authorization URL and load it in the embedded browser
//!    surface.
//! 2. The IdP authenticates the user and redirects to the registered
//!    custom-scheme URI with tokens in the fragment.
//! 3. Extract the tokens straight from the redirect URL.
//!
//! This module owns step 1 (the login/logout URL builders) and the raw
//! parameter extraction used in step 3.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use url::Url;

use crate::config::IdpConfig;
use crate::error::{Result, SsoError};

/// Redirect parameter carrying the opaque bearer token.
pub const ACCESS_TOKEN: &str = "access_token";

/// Redirect parameter carrying the identity JWT.
pub const ID_TOKEN: &str = "id_token";

/// Redirect parameter carrying the token lifetime in seconds.
pub const EXPIRES_IN: &str = "expires_in";

/// Redirect parameter carrying the token type (typically "Bearer").
pub const TOKEN_TYPE: &str = "token_type";

// ---------------------------------------------------------------------------
// Request vocabularies
// ---------------------------------------------------------------------------

/// OAuth2 scopes this engine can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    OpenId,
    Email,
    Profile,
}

impl Scope {
    /// The wire string for this scope.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenId => "openid",
            Self::Email => "email",
            Self::Profile => "profile",
        }
    }
}

/// Scopes requested on every login.
pub const DEFAULT_SCOPES: [Scope; 3] = [Scope::OpenId, Scope::Email, Scope::Profile];

/// OAuth2 response types this engine can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseType {
    /// An opaque bearer token in the redirect fragment.
    Token,
    /// An identity JWT in the redirect fragment.
    IdToken,
}

impl ResponseType {
    /// The wire string for this response type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Token => "token",
            Self::IdToken => "id_token",
        }
    }
}

/// Response types requested on every login.
pub const DEFAULT_RESPONSE_TYPES: [ResponseType; 2] = [ResponseType::Token, ResponseType::IdToken];

// ---------------------------------------------------------------------------
// Percent-encode sets
// ---------------------------------------------------------------------------

/// Encode set for `+`-joined token lists (response types, scopes). The `+`
/// separator stays literal; everything else outside the host-safe range is
/// escaped.
const TOKEN_LIST_ENCODE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'@')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Encode set for a single query parameter value. `:` and `/` are escaped
/// so a custom-scheme redirect URI survives as one value.
const QUERY_VALUE_ENCODE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b',')
    .add(b'/')
    .add(b':')
    .add(b';')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'?')
    .add(b'@')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

// ---------------------------------------------------------------------------
// URL builders
// ---------------------------------------------------------------------------

/// Build the authorization URL the hosted login page is loaded with.
///
/// Parameters are appended in a fixed order: `client_id`, `response_type`,
/// `scopes`, `redirect_uri`, `nonce`, `locale`. Tests compare the result
/// string exactly, so the order is part of the contract.
///
/// # Errors
///
/// Returns [`SsoError::Configuration`] if the config is incomplete, or
/// [`SsoError::UrlParse`] if the assembled URL does not validate.
pub fn build_login_url(config: &IdpConfig) -> Result<Url> {
    if config.idp_base_url.is_empty() {
        return Err(SsoError::Configuration {
            reason: "idp_base_url is empty".to_string(),
        });
    }
    if config.client_id.is_empty() {
        return Err(SsoError::Configuration {
            reason: "client_id is empty".to_string(),
        });
    }

    let response_types = DEFAULT_RESPONSE_TYPES
        .iter()
        .map(ResponseType::as_str)
        .collect::<Vec<_>>()
        .join("+");
    let scopes = DEFAULT_SCOPES
        .iter()
        .map(Scope::as_str)
        .collect::<Vec<_>>()
        .join("+");

    let mut url = String::new();
    url.push_str(&config.authorize_url());
    url.push_str("?client_id=");
    url.push_str(&config.client_id);
    url.push_str("&response_type=");
    url.push_str(&utf8_percent_encode(&response_types, TOKEN_LIST_ENCODE).to_string());
    url.push_str("&scopes=");
    url.push_str(&utf8_percent_encode(&scopes, TOKEN_LIST_ENCODE).to_string());
    url.push_str("&redirect_uri=");
    url.push_str(&utf8_percent_encode(&config.redirect_url, QUERY_VALUE_ENCODE).to_string());
    url.push_str("&nonce=");
    url.push_str(&generate_nonce());
    url.push_str("&locale=");
    url.push_str(&request_locale(config));

    Ok(Url::parse(&url)?)
}

/// Build the logout URL: base URL + logout path + locale.
///
/// # Errors
///
/// Returns [`SsoError::Configuration`] if the config is incomplete, or
/// [`SsoError::UrlParse`] if the assembled URL does not validate.
pub fn build_logout_url(config: &IdpConfig) -> Result<Url> {
    if config.idp_base_url.is_empty() {
        return Err(SsoError::Configuration {
            reason: "idp_base_url is empty".to_string(),
        });
    }

    let url = format!("{}?locale={}", config.logout_url(), request_locale(config));
    Ok(Url::parse(&url)?)
}

/// Generate a fresh request nonce: a 128-bit random value rendered as the
/// canonical hyphenated UUID string.
pub fn generate_nonce() -> String {
    uuid::Uuid::new_v4().to_string()
}

// ---------------------------------------------------------------------------
// Locale
// ---------------------------------------------------------------------------

/// The locale sent with a request: the config override when set, otherwise
/// the process environment.
fn request_locale(config: &IdpConfig) -> String {
    config
        .locale_override
        .clone()
        .unwrap_or_else(system_locale)
}

/// The active locale in `language[_REGION]` form (e.g. `en_GB`), derived
/// from `LC_ALL`/`LC_MESSAGES`/`LANG`. Empty string if unavailable.
pub fn system_locale() -> String {
    for var in ["LC_ALL", "LC_MESSAGES", "LANG"] {
        if let Ok(value) = std::env::var(var) {
            if let Some(tag) = normalize_locale(&value) {
                return tag;
            }
        }
    }
    String::new()
}

/// Strip the encoding suffix from an environment locale value
/// (`en_GB.UTF-8` -> `en_GB`). `C` and `POSIX` carry no language tag.
fn normalize_locale(raw: &str) -> Option<String> {
    let tag = raw.split('.').next().unwrap_or("");
    if tag.is_empty() || tag == "C" || tag == "POSIX" {
        return None;
    }
    Some(tag.to_string())
}

// ---------------------------------------------------------------------------
// Redirect parameter extraction
// ---------------------------------------------------------------------------

/// Extract the raw value of `parameter` from a redirect URL.
///
/// Example redirect:
/// `app://oauth/callback#access_token=WC9zkOpA57anYEbS6vRmb3eDbac&token_type=Bearer&expires_in=31536000&state=6DA15899`
///
/// Scans for the first occurrence of the literal `"{parameter}="` anywhere
/// in the URL string; the value runs to the next `&` or the end of the
/// string. The value is returned exactly as it appeared, with no percent
/// decoding, so an opaque bearer token's bytes pass through untouched.
pub fn resolve_param<'a>(url: &'a str, parameter: &str) -> Option<&'a str> {
    let needle = format!("{parameter}=");
    let start = url.find(&needle)? + needle.len();
    let rest = &url[start..];
    match rest.find('&') {
        Some(end) => Some(&rest[..end]),
        None => Some(rest),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> IdpConfig {
        let mut config = IdpConfig::new("https://idp.test/", "c1", "app://cb");
        config.locale_override = Some("en_GB".to_string());
        config
    }

    #[test]
    fn login_url_has_fixed_parameter_order() {
        let url = build_login_url(&test_config()).unwrap();
        let s = url.as_str();

        assert!(s.starts_with(
            "https://idp.test/oauth2/authz/?client_id=c1\
             &response_type=token+id_token\
             &scopes=openid+email+profile\
             &redirect_uri=app%3A%2F%2Fcb\
             &nonce="
        ));
        assert!(s.ends_with("&locale=en_GB"));
    }

    #[test]
    fn login_url_nonce_differs_between_calls() {
        let config = test_config();
        let first = build_login_url(&config).unwrap();
        let second = build_login_url(&config).unwrap();

        let nonce1 = resolve_param(first.as_str(), "nonce").unwrap();
        let nonce2 = resolve_param(second.as_str(), "nonce").unwrap();
        assert_ne!(nonce1, nonce2);
    }

    #[test]
    fn login_url_keeps_plus_joined_lists_literal() {
        let url = build_login_url(&test_config()).unwrap();
        assert!(url.as_str().contains("response_type=token+id_token"));
        assert!(url.as_str().contains("scopes=openid+email+profile"));
    }

    #[test]
    fn login_url_requires_client_id() {
        let mut config = test_config();
        config.client_id = String::new();

        let result = build_login_url(&config);
        assert!(matches!(result, Err(SsoError::Configuration { .. })));
    }

    #[test]
    fn login_url_requires_base_url() {
        let mut config = test_config();
        config.idp_base_url = String::new();

        let result = build_login_url(&config);
        assert!(matches!(result, Err(SsoError::Configuration { .. })));
    }

    #[test]
    fn logout_url_carries_locale() {
        let url = build_logout_url(&test_config()).unwrap();
        assert_eq!(url.as_str(), "https://idp.test/logout?locale=en_GB");
    }

    #[test]
    fn empty_locale_is_sent_as_empty() {
        let mut config = test_config();
        config.locale_override = Some(String::new());

        let url = build_login_url(&config).unwrap();
        assert!(url.as_str().ends_with("&locale="));
    }

    #[test]
    fn nonce_is_uuid_shaped() {
        let nonce = generate_nonce();
        assert_eq!(nonce.len(), 36);
        assert_eq!(nonce.matches('-').count(), 4);
    }

    #[test]
    fn normalize_locale_strips_encoding() {
        assert_eq!(normalize_locale("en_GB.UTF-8").as_deref(), Some("en_GB"));
        assert_eq!(normalize_locale("fi_FI").as_deref(), Some("fi_FI"));
        assert_eq!(normalize_locale("C"), None);
        assert_eq!(normalize_locale("POSIX"), None);
        assert_eq!(normalize_locale(""), None);
    }

    #[test]
    fn resolve_param_basic_cases() {
        assert_eq!(resolve_param("app://cb#a=1&b=2", "a"), Some("1"));
        assert_eq!(resolve_param("app://cb#a=1", "a"), Some("1"));
        assert_eq!(resolve_param("app://cb#b=2", "a"), None);
    }

    #[test]
    fn resolve_param_takes_first_occurrence() {
        assert_eq!(resolve_param("app://cb#x=1&a=2&a=3", "a"), Some("2"));
    }

    #[test]
    fn resolve_param_does_not_percent_decode() {
        let url = "app://cb#access_token=abc%2Fdef&token_type=Bearer";
        assert_eq!(resolve_param(url, ACCESS_TOKEN), Some("abc%2Fdef"));
    }

    #[test]
    fn resolve_param_distinguishes_token_parameters() {
        let url = "app://cb#access_token=tok1&expires_in=3600&id_token=jwt1";
        assert_eq!(resolve_param(url, ACCESS_TOKEN), Some("tok1"));
        assert_eq!(resolve_param(url, ID_TOKEN), Some("jwt1"));
        assert_eq!(resolve_param(url, EXPIRES_IN), Some("3600"));
        assert_eq!(resolve_param(url, TOKEN_TYPE), None);
    }

    #[test]
    fn scope_and_response_type_wire_strings() {
        assert_eq!(Scope::OpenId.as_str(), "openid");
        assert_eq!(Scope::Email.as_str(), "email");
        assert_eq!(Scope::Profile.as_str(), "profile");
        assert_eq!(ResponseType::Token.as_str(), "token");
        assert_eq!(ResponseType::IdToken.as_str(), "id_token");
    }
}
