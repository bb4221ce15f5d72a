//! Session state resolver.
//!
//! The session is never stored as such: `authenticated` is derived from the
//! auth cookie and `is_admin` from the server's admin check. Both flags are
//! a UX hint only; the backend authorizes every privileged request itself.

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{ClientError, Result};
use crate::gateway::AuthGateway;
use crate::http::CookieJar;
use crate::models::LoginRequest;
use crate::validation::{validate_login, SignupForm};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionState {
    pub authenticated: bool,
    pub is_admin: bool,
}

impl SessionState {
    pub const ANONYMOUS: SessionState = SessionState {
        authenticated: false,
        is_admin: false,
    };
}

pub struct SessionContext {
    auth: AuthGateway,
    cookies: Arc<CookieJar>,
    state: ArcSwap<SessionState>,
    /// Bumped by every session event; results of older events are dropped
    epoch: Mutex<u64>,
}

impl SessionContext {
    pub fn new(auth: AuthGateway, cookies: Arc<CookieJar>) -> Self {
        Self {
            auth,
            cookies,
            state: ArcSwap::from_pointee(SessionState::ANONYMOUS),
            epoch: Mutex::new(0),
        }
    }

    pub fn snapshot(&self) -> SessionState {
        **self.state.load()
    }

    pub fn is_authenticated(&self) -> bool {
        self.snapshot().authenticated
    }

    pub fn is_admin(&self) -> bool {
        self.snapshot().is_admin
    }

    pub fn cookies(&self) -> &Arc<CookieJar> {
        &self.cookies
    }

    fn next_epoch(&self) -> u64 {
        let mut epoch = self.epoch.lock();
        *epoch += 1;
        *epoch
    }

    /// Store `state` unless a newer session event happened since `epoch`
    fn publish(&self, epoch: u64, state: SessionState) -> bool {
        let current = self.epoch.lock();
        if *current != epoch {
            debug!(epoch, current = *current, "Discarding stale session result");
            return false;
        }
        self.state.store(Arc::new(state));
        true
    }

    /// Re-derive the session, as done on every navigation.
    ///
    /// `is_admin` reads false until the server confirms it; a failed check
    /// leaves it false and is not retried.
    pub async fn refresh(&self) -> SessionState {
        let epoch = self.next_epoch();

        if self.cookies.auth_token().is_none() {
            self.publish(epoch, SessionState::ANONYMOUS);
            return self.snapshot();
        }

        self.publish(
            epoch,
            SessionState {
                authenticated: true,
                is_admin: false,
            },
        );

        let is_admin = match self.auth.check_admin().await {
            Ok(is_admin) => is_admin,
            Err(e) => {
                warn!(error = %e, "Admin check failed, treating session as non-admin");
                false
            }
        };

        self.publish(
            epoch,
            SessionState {
                authenticated: true,
                is_admin,
            },
        );
        self.snapshot()
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<SessionState> {
        validate_login(email, password).map_err(ClientError::Validation)?;

        let token = self
            .auth
            .login(&LoginRequest {
                email: email.trim().to_string(),
                password: password.to_string(),
            })
            .await?;
        self.cookies.set_auth_token(&token)?;
        info!(email = %email.trim(), "Logged in");

        Ok(self.refresh().await)
    }

    /// Create an account. The new user still has to log in.
    pub async fn signup(&self, form: SignupForm) -> Result<()> {
        let request = form.into_request()?;
        self.auth.signup(&request).await?;
        info!(email = %request.email, "Account created");
        Ok(())
    }

    /// Invalidate the server session and reset local state.
    ///
    /// The local reset always happens; a server failure is still returned.
    pub async fn logout(&self) -> Result<()> {
        let server = self.auth.logout().await;

        let epoch = self.next_epoch();
        let local = self.cookies.mark_logged_out();
        self.publish(epoch, SessionState::ANONYMOUS);

        match &server {
            Ok(()) => info!("Logged out"),
            Err(e) => warn!(error = %e, "Server logout failed, local session cleared anyway"),
        }
        server.and(local)
    }
}
