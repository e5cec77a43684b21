//! Navigation-event classification for the embedded browser surface.
//!
//! While the hosted login page runs, the surface reports a stream of
//! navigation events. Classification is pure string matching of each
//! event's URL against strings derived from the configuration; the
//! classifier holds no cross-event state, so ordering between distinct
//! navigations cannot corrupt it.
//!
//! Verdicts drive side effects only. The surface itself is never blocked:
//! whatever the verdict, the action handed back to the browser is "allow".

use crate::config::IdpConfig;
use crate::jwt;
use crate::oauth;

// ---------------------------------------------------------------------------
// Events and verdicts
// ---------------------------------------------------------------------------

/// A navigation event reported by the embedded browser surface.
///
/// The three kinds map to the surface's three interception hooks. They are
/// not mutually exclusive: one physical redirect can surface as both a
/// [`ServerRedirect`](Self::ServerRedirect) and a
/// [`NavigationResponse`](Self::NavigationResponse).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationEvent {
    /// The surface is about to perform a navigation, including the very
    /// first load.
    NavigationAttempt { url: String },

    /// An HTTP response to a navigation was received; `url` is the final
    /// post-redirect URL of that exchange.
    NavigationResponse { url: String },

    /// The surface received a same-exchange redirect during an in-flight
    /// navigation; `current_url` is the surface's address at that moment,
    /// i.e. the address the IdP redirected to.
    ServerRedirect { current_url: String },
}

/// What the engine decided about one navigation event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Nothing of interest; let the navigation proceed.
    Allow,

    /// The event is unrelated to this flow; no side effect.
    Ignore,

    /// Tear down any persisted session.
    CancelSession,

    /// The redirect completed with both tokens resolved.
    CompleteSession {
        /// The JWT `sub` claim of the identity token.
        user_id: String,
        /// The opaque bearer token, raw as it appeared in the URL.
        access_token: String,
    },
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

/// Pure classifier over navigation events.
///
/// Match strings are snapshotted from the config at construction; rebuild
/// the classifier after reconfiguring the IdP.
#[derive(Debug, Clone)]
pub struct NavigationClassifier {
    base_url: String,
    login_url: String,
    authorize_url: String,
    logout_url: String,
    redirect_url: String,
}

impl NavigationClassifier {
    /// Build a classifier from the given configuration.
    pub fn new(config: &IdpConfig) -> Self {
        Self {
            base_url: config.idp_base_url.clone(),
            login_url: config.login_url(),
            authorize_url: config.authorize_url(),
            logout_url: config.logout_url(),
            redirect_url: config.redirect_url.clone(),
        }
    }

    /// Classify a single navigation event.
    pub fn classify(&self, event: &NavigationEvent) -> Verdict {
        match event {
            NavigationEvent::NavigationAttempt { url } => self.classify_attempt(url),
            NavigationEvent::NavigationResponse { url } => self.classify_response(url),
            NavigationEvent::ServerRedirect { current_url } => self.classify_redirect(current_url),
        }
    }

    fn classify_attempt(&self, url: &str) -> Verdict {
        tracing::debug!(url = url, "navigation attempt");

        // Sign-out pressed: the surface navigates to the bare redirect URL.
        // Exact string match, no normalization.
        if url == self.redirect_url {
            return Verdict::CancelSession;
        }

        // "Continue" pressed on the IdP's interstitial, bouncing back to the
        // bare base URL outside an explicit login/authorize/logout flow.
        // The rule is narrow on purpose: an exact base-URL match with
        // prefix exclusions, nothing more general.
        if url == self.base_url
            && !url.starts_with(&self.login_url)
            && !url.starts_with(&self.authorize_url)
            && !url.starts_with(&self.logout_url)
            && url.starts_with(&self.base_url)
        {
            return Verdict::CancelSession;
        }

        Verdict::Allow
    }

    fn classify_response(&self, url: &str) -> Verdict {
        if url == self.redirect_url {
            return Verdict::CancelSession;
        }
        Verdict::Allow
    }

    fn classify_redirect(&self, current_url: &str) -> Verdict {
        if !current_url.starts_with(&self.redirect_url) {
            return Verdict::Ignore;
        }
        self.complete_session(current_url)
    }

    /// Token completion on a redirect that matched the redirect prefix.
    ///
    /// A session exists only when both the identity and the bearer token
    /// resolve from the same redirect; partial resolution is treated
    /// identically to total failure and the session is torn down instead.
    fn complete_session(&self, url: &str) -> Verdict {
        let user_id = oauth::resolve_param(url, oauth::ID_TOKEN).and_then(|raw| {
            match jwt::decode(raw) {
                Ok(claims) => claims.subject().map(str::to_string),
                Err(e) => {
                    tracing::warn!(error = %e, "id_token in redirect did not decode");
                    None
                }
            }
        });

        let access_token = oauth::resolve_param(url, oauth::ACCESS_TOKEN).map(str::to_string);

        match (user_id, access_token) {
            (Some(user_id), Some(access_token)) => Verdict::CompleteSession {
                user_id,
                access_token,
            },
            _ => {
                tracing::warn!(url = url, "redirect matched but tokens did not resolve");
                Verdict::CancelSession
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
