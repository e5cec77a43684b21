//! Compact JWT payload decoding.
//!
//! The identity token arriving in the redirect fragment is a compact JWT
//! (`header.payload.signature`). Only the payload is of interest here, and
//! only to read the `sub` claim. No signature, expiry, issuer, or audience
//! verification is performed: the engine trusts any syntactically valid
//! JWT arriving over the redirect channel.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::error::{Result, SsoError};

/// Claim set decoded from a compact JWT payload.
#[derive(Debug, Clone)]
pub struct Claims {
    claims: serde_json::Map<String, serde_json::Value>,
}

impl Claims {
    /// The `sub` claim identifying the authenticated principal, if present
    /// and a string.
    pub fn subject(&self) -> Option<&str> {
        self.claims.get("sub").and_then(|v| v.as_str())
    }

    /// Raw access to any claim value.
    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.claims.get(name)
    }
}

/// Decode the payload of a compact JWT.
///
/// # Errors
///
/// Returns [`SsoError::TokenDecode`] for a wrong segment count, a payload
/// that is not base64url, or a payload that does not parse as a JSON
/// object. Callers treat all of these the same as "claim absent".
pub fn decode(token: &str) -> Result<Claims> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(SsoError::TokenDecode {
            reason: format!("expected 3 segments, got {}", segments.len()),
        });
    }

    let payload = URL_SAFE_NO_PAD
        .decode(segments[1])
        .map_err(|e| SsoError::TokenDecode {
            reason: format!("payload is not base64url: {e}"),
        })?;

    let claims: serde_json::Map<String, serde_json::Value> = serde_json::from_slice(&payload)
        .map_err(|e| SsoError::TokenDecode {
            reason: format!("payload is not a JSON object: {e}"),
        })?;

    Ok(Claims { claims })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// Build an unsigned compact JWT with the given payload JSON.
    fn make_jwt(payload: &str) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.as_bytes());
        format!("{header}.{body}.sig")
    }

    #[test]
    fn decode_reads_subject() {
        let token = make_jwt(r#"{"sub":"user-1","email":"u@example.test"}"#);
        let claims = decode(&token).unwrap();

        assert_eq!(claims.subject(), Some("user-1"));
        assert_eq!(
            claims.get("email").and_then(|v| v.as_str()),
            Some("u@example.test")
        );
    }

    #[test]
    fn decode_without_subject() {
        let token = make_jwt(r#"{"email":"u@example.test"}"#);
        let claims = decode(&token).unwrap();
        assert!(claims.subject().is_none());
    }

    #[test]
    fn non_string_subject_is_absent() {
        let token = make_jwt(r#"{"sub":42}"#);
        let claims = decode(&token).unwrap();
        assert!(claims.subject().is_none());
    }

    #[test]
    fn wrong_segment_count_fails() {
        assert!(matches!(
            decode("only-one-segment"),
            Err(SsoError::TokenDecode { .. })
        ));
        assert!(matches!(
            decode("two.segments"),
            Err(SsoError::TokenDecode { .. })
        ));
        assert!(matches!(
            decode("a.b.c.d"),
            Err(SsoError::TokenDecode { .. })
        ));
    }

    #[test]
    fn non_base64url_payload_fails() {
        let result = decode("header.!!!not-base64!!!.sig");
        assert!(matches!(result, Err(SsoError::TokenDecode { .. })));
    }

    #[test]
    fn non_object_payload_fails() {
        let body = URL_SAFE_NO_PAD.encode(b"[1,2,3]");
        let token = format!("h.{body}.s");
        assert!(matches!(
            decode(&token),
            Err(SsoError::TokenDecode { .. })
        ));
    }
}
