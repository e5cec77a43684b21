//! Flow orchestration between the host UI, the browser surface, and the
//! session store.
//!
//! The [`SsoController`] is the entry point for consuming code: it builds
//! the URL the host should present, feeds every navigation event the
//! surface reports through the classifier, and turns verdicts into session
//! mutations and a dismissal signal back to the host.

use std::sync::Arc;

use url::Url;

use crate::config::IdpConfig;
use crate::error::Result;
use crate::navigation::{NavigationClassifier, NavigationEvent, Verdict};
use crate::oauth;
use crate::session::SessionStore;

// ---------------------------------------------------------------------------
// Surface types
// ---------------------------------------------------------------------------

/// The policy answer handed back to the browser surface for an event.
///
/// The engine never blocks navigation: verdicts drive side effects, and
/// the answer is always [`Allow`](Self::Allow). `Cancel` exists because
/// embedded surfaces expect a policy with both arms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceAction {
    /// Let the navigation proceed.
    Allow,
    /// Block the navigation.
    Cancel,
}

/// Host-side presentation of the embedded browser surface.
///
/// The host owns the actual web-rendering widget; the engine only tells it
/// when to present a URL and when to dismiss the surface. Dismissing the
/// surface before a redirect completes simply stops event delivery; no
/// session mutation occurs.
pub trait SurfaceHost {
    /// Present a fresh browser surface loaded with `url`.
    fn present(&self, url: &Url);

    /// Dismiss the surface.
    fn dismiss(&self);
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Orchestrates a hosted-login session end to end.
///
/// One controller drives one browser surface at a time; the host presents
/// the surface modally, so no parallel flows run concurrently.
pub struct SsoController {
    config: IdpConfig,
    classifier: NavigationClassifier,
    sessions: Arc<SessionStore>,
}

impl SsoController {
    /// Create a controller for the given IdP configuration and session
    /// store.
    pub fn new(config: IdpConfig, sessions: Arc<SessionStore>) -> Self {
        let classifier = NavigationClassifier::new(&config);
        Self {
            config,
            classifier,
            sessions,
        }
    }

    /// The session store, shared so collaborators (e.g. a REST client
    /// attaching `Authorization: Bearer` headers) can read the current
    /// token and user id.
    pub fn sessions(&self) -> Arc<SessionStore> {
        Arc::clone(&self.sessions)
    }

    /// The active configuration.
    pub fn config(&self) -> &IdpConfig {
        &self.config
    }

    /// Start a login: build the authorization URL and present it.
    ///
    /// # Errors
    ///
    /// Returns a configuration-class error if the URL cannot be built; the
    /// surface is not presented in that case.
    pub fn start_login(&self, host: &dyn SurfaceHost) -> Result<()> {
        let url = oauth::build_login_url(&self.config)?;
        tracing::info!(url = %url, "presenting hosted login page");
        host.present(&url);
        Ok(())
    }

    /// Start a login against an explicit IdP and client, reconfiguring the
    /// controller first.
    pub fn start_login_with(
        &mut self,
        idp_base_url: &str,
        client_id: &str,
        host: &dyn SurfaceHost,
    ) -> Result<()> {
        self.reconfigure(idp_base_url, client_id);
        self.start_login(host)
    }

    /// Start a logout: build the logout URL and present it.
    ///
    /// # Errors
    ///
    /// Returns a configuration-class error if the URL cannot be built.
    pub fn start_logout(&self, host: &dyn SurfaceHost) -> Result<()> {
        let url = oauth::build_logout_url(&self.config)?;
        tracing::info!(url = %url, "presenting hosted logout page");
        host.present(&url);
        Ok(())
    }

    /// Start a logout against an explicit IdP and client, reconfiguring the
    /// controller first.
    pub fn start_logout_with(
        &mut self,
        idp_base_url: &str,
        client_id: &str,
        host: &dyn SurfaceHost,
    ) -> Result<()> {
        self.reconfigure(idp_base_url, client_id);
        self.start_logout(host)
    }

    /// Feed one navigation event from the browser surface.
    ///
    /// Terminal verdicts mutate the session store and dismiss the surface;
    /// the returned action is always [`SurfaceAction::Allow`].
    pub fn on_navigation_event(
        &self,
        event: &NavigationEvent,
        host: &dyn SurfaceHost,
    ) -> SurfaceAction {
        match self.classifier.classify(event) {
            Verdict::CompleteSession {
                user_id,
                access_token,
            } => {
                match self.sessions.store(&user_id, &access_token) {
                    Ok(()) => {
                        tracing::info!(user_id = %user_id, "login completed");
                    }
                    Err(e) => {
                        // Fail closed: a session that cannot be persisted
                        // is torn down rather than left half-formed.
                        tracing::error!(error = %e, "failed to persist session");
                        self.sessions.reset();
                    }
                }
                host.dismiss();
            }
            Verdict::CancelSession => {
                self.sessions.reset();
                host.dismiss();
            }
            Verdict::Allow | Verdict::Ignore => {}
        }

        SurfaceAction::Allow
    }

    /// Whether a user is currently logged in: a non-empty token resolves
    /// from the session store.
    pub fn is_logged_in(&self) -> bool {
        self.sessions.current_token().is_some()
    }

    fn reconfigure(&mut self, idp_base_url: &str, client_id: &str) {
        self.config.idp_base_url = idp_base_url.to_string();
        self.config.client_id = client_id.to_string();
        self.classifier = NavigationClassifier::new(&self.config);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
