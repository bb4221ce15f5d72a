pub mod cli;
pub mod config;
pub mod donation;
pub mod error;
pub mod gateway;
pub mod http;
pub mod models;
pub mod navigation;
pub mod session;
pub mod validation;
pub mod views;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{ClientError, Result};

use std::sync::Arc;

use config::Config;
use donation::DonationFlow;
use gateway::{ActivityGateway, AuthGateway, DonationGateway, UserGateway};
use http::{CookieJar, HttpClient};
use session::SessionContext;

/// Everything a front end needs to talk to the backend, built once per
/// process and shared by reference.
pub struct ClientContext {
    pub config: Config,
    pub http: HttpClient,
    pub session: Arc<SessionContext>,
    pub activities: ActivityGateway,
    pub donations: DonationGateway,
    pub users: UserGateway,
}

impl ClientContext {
    pub fn new(config: Config, http: HttpClient) -> Self {
        let session = Arc::new(SessionContext::new(
            AuthGateway::new(http.clone()),
            http.cookies().clone(),
        ));
        Self {
            activities: ActivityGateway::new(http.clone()),
            donations: DonationGateway::new(http.clone()),
            users: UserGateway::new(http.clone()),
            session,
            http,
            config,
        }
    }

    /// Open the persisted cookie jar and build a reqwest-backed client
    pub fn from_config(config: Config) -> Result<Self> {
        let cookies = Arc::new(CookieJar::open(
            config.session.cookie_path(),
            config.session.cookie_name.clone(),
        )?);
        let http = HttpClient::from_config(&config, cookies)?;
        Ok(Self::new(config, http))
    }

    pub fn donation_flow(&self) -> DonationFlow {
        DonationFlow::new(
            self.donations.clone(),
            self.activities.clone(),
            self.config.donation.reconcile,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::donation::ReconcilePolicy;
    use crate::test_support::{client, logged_in_jar, MockTransport};
    use serde_json::json;

    #[tokio::test]
    async fn test_context_shares_one_cookie_jar() {
        let transport = MockTransport::new();
        transport.reply("GET", "/users/logout", 200, json!({}));
        let mut config = Config::default();
        config.donation.reconcile = ReconcilePolicy::Refetch;
        let ctx = ClientContext::new(config, client(&transport, logged_in_jar()));

        assert_eq!(ctx.donation_flow().policy(), ReconcilePolicy::Refetch);
        assert!(ctx.http.cookies().auth_token().is_some());

        ctx.session.logout().await.unwrap();
        assert!(ctx.http.cookies().auth_token().is_none());
    }

    #[test]
    fn test_from_config_uses_cookie_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = Config::default();
        config.session.data_dir = dir.path().to_path_buf();

        let ctx = ClientContext::from_config(config).unwrap();
        assert_eq!(
            ctx.http.cookies().path(),
            Some(dir.path().join("cookies.json").as_path())
        );
        assert_eq!(ctx.http.base_url(), "http://localhost:5000/api");
    }
}
