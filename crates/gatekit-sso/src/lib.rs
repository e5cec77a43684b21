//! Embedded-browser OAuth2 implicit-flow SSO engine for gatekit.
//!
//! This crate drives a hosted login page inside an in-app browser surface:
//! it builds the authorization URL, watches every navigation the surface
//! reports to detect the redirect back to the application, extracts the
//! bearer and identity tokens straight from that redirect (no server-side
//! exchange), and persists the resulting session securely, keyed by the
//! authenticated user's id.
//!
//! # Architecture
//!
//! ```text
//! SsoController
//! ├── IdpConfig              (base URL, client id, redirect URL)
//! ├── oauth                  (login/logout URL builder, redirect parsing)
//! ├── NavigationClassifier   (URL stream -> verdicts)
//! ├── jwt                    (identity-token subject resolution)
//! └── SessionStore           (current-user pointer + gatekit-secrets)
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use gatekit_secrets::MemorySecretStore;
//! use gatekit_sso::{IdpConfig, SessionStore, SsoController, SurfaceHost};
//!
//! # struct MyHost;
//! # impl SurfaceHost for MyHost {
//! #     fn present(&self, _url: &url::Url) {}
//! #     fn dismiss(&self) {}
//! # }
//! # fn example() -> gatekit_sso::Result<()> {
//! let config = IdpConfig::new("https://idp.example.com/", "my-app", "app://oauth/callback");
//! let sessions = Arc::new(SessionStore::ephemeral(Box::new(MemorySecretStore::new())));
//! let controller = SsoController::new(config, sessions);
//!
//! let host = MyHost;
//! controller.start_login(&host)?;
//! // ... the host feeds every surface navigation to
//! // controller.on_navigation_event(&event, &host) until it dismisses.
//! assert!(!controller.is_logged_in());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod jwt;
pub mod navigation;
pub mod oauth;
pub mod session;

// Re-export key types at the crate root for convenience.
pub use config::IdpConfig;
pub use controller::{SsoController, SurfaceAction, SurfaceHost};
pub use error::{Result, SsoError};
pub use navigation::{NavigationClassifier, NavigationEvent, Verdict};
pub use session::{Session, SessionStore};
