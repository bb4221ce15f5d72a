//! Typed routes and the authentication guard.

use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::error::ClientError;
use crate::models::ResourceId;
use crate::session::{SessionContext, SessionState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Signup,
    Activities,
    Activity(ResourceId),
    MyActivities,
    CreateActivity,
    EditActivity(ResourceId),
    MyDonations,
    Admin,
    AdminEditUser(ResourceId),
    AdminEditActivity(ResourceId),
}

/// Who may see a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
    Admin,
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Login => "/login".to_string(),
            Route::Signup => "/signup".to_string(),
            Route::Activities => "/activities".to_string(),
            Route::Activity(id) => format!("/activity/{}", id),
            Route::MyActivities => "/my-activities".to_string(),
            Route::CreateActivity => "/create-activity".to_string(),
            Route::EditActivity(id) => format!("/edit-activity/{}", id),
            Route::MyDonations => "/my-donations".to_string(),
            Route::Admin => "/admin".to_string(),
            Route::AdminEditUser(id) => format!("/admin/users/{}/edit", id),
            Route::AdminEditActivity(id) => format!("/admin/activities/{}/edit", id),
        }
    }

    pub fn parse(path: &str) -> Result<Route, ClientError> {
        let trimmed = path.trim().trim_end_matches('/');
        let segments: Vec<&str> = trimmed.split('/').filter(|s| !s.is_empty()).collect();
        let route = match segments.as_slice() {
            [] => Route::Home,
            ["login"] => Route::Login,
            ["signup"] => Route::Signup,
            ["activities"] => Route::Activities,
            ["activity", id] => Route::Activity(ResourceId::parse(id)?),
            ["my-activities"] => Route::MyActivities,
            ["create-activity"] => Route::CreateActivity,
            ["edit-activity", id] => Route::EditActivity(ResourceId::parse(id)?),
            ["my-donations"] => Route::MyDonations,
            ["admin"] => Route::Admin,
            ["admin", "users", id, "edit"] => Route::AdminEditUser(ResourceId::parse(id)?),
            ["admin", "activities", id, "edit"] => {
                Route::AdminEditActivity(ResourceId::parse(id)?)
            }
            _ => return Err(ClientError::validation(format!("Unknown route: {}", path))),
        };
        Ok(route)
    }

    pub fn access(&self) -> Access {
        match self {
            Route::Home | Route::Login | Route::Signup | Route::Activities | Route::Activity(_) => {
                Access::Public
            }
            Route::MyActivities
            | Route::CreateActivity
            | Route::EditActivity(_)
            | Route::MyDonations => Access::Authenticated,
            Route::Admin | Route::AdminEditUser(_) | Route::AdminEditActivity(_) => Access::Admin,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

impl FromStr for Route {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Route::parse(s)
    }
}

/// Current location plus the destination to resume after logging in
#[derive(Debug, Clone)]
pub struct Navigator {
    current: Route,
    return_to: Option<Route>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(Route::Home)
    }
}

impl Navigator {
    pub fn new(current: Route) -> Self {
        Self {
            current,
            return_to: None,
        }
    }

    pub fn current(&self) -> &Route {
        &self.current
    }

    pub fn return_to(&self) -> Option<&Route> {
        self.return_to.as_ref()
    }

    /// Remember where to go once logged in
    pub fn remember(&mut self, route: Route) {
        self.return_to = Some(route);
    }

    /// Refresh the session and move to `target`, or wherever the guard sends us
    pub async fn navigate(&mut self, target: Route, session: &SessionContext) -> Route {
        let state = session.refresh().await;
        self.resolve(target, state)
    }

    /// Apply the guard for an already-known session state
    pub fn resolve(&mut self, target: Route, state: SessionState) -> Route {
        let next = match target.access() {
            Access::Public => target,
            Access::Authenticated | Access::Admin if !state.authenticated => {
                return self.redirect_to_login(target);
            }
            Access::Admin if !state.is_admin => {
                debug!(route = %target, "Non-admin sent home");
                Route::Home
            }
            _ => target,
        };
        self.current = next.clone();
        next
    }

    /// Send the user to the login page, remembering `from`
    pub fn redirect_to_login(&mut self, from: Route) -> Route {
        debug!(from = %from, "Redirecting to login");
        self.return_to = Some(from);
        self.current = Route::Login;
        Route::Login
    }

    /// Destination after a successful login: the remembered route or home
    pub fn after_login(&mut self) -> Route {
        let next = self.return_to.take().unwrap_or(Route::Home);
        self.current = next.clone();
        next
    }

    pub fn after_logout(&mut self) -> Route {
        self.return_to = None;
        self.current = Route::Home;
        Route::Home
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::AuthGateway;
    use crate::http::{CookieJar, DEFAULT_AUTH_COOKIE};
    use crate::test_support::{client, MockTransport};
    use serde_json::json;
    use std::sync::Arc;

    fn id(raw: &str) -> ResourceId {
        ResourceId::parse(raw).unwrap()
    }

    const USER: SessionState = SessionState {
        authenticated: true,
        is_admin: false,
    };

    #[test]
    fn test_route_paths_parse_back() {
        let routes = [
            Route::Home,
            Route::Login,
            Route::Activity(id("a1")),
            Route::EditActivity(id("a1")),
            Route::MyDonations,
            Route::AdminEditUser(id("u1")),
            Route::AdminEditActivity(id("a1")),
        ];
        for route in routes {
            assert_eq!(Route::parse(&route.path()).unwrap(), route);
        }
        assert_eq!("/admin/users/u7/edit".parse::<Route>().unwrap(), Route::AdminEditUser(id("u7")));
    }

    #[test]
    fn test_unknown_route() {
        assert!(Route::parse("/nowhere").is_err());
        assert!(Route::parse("/activity/bad id").is_err());
    }

    #[test]
    fn test_guard() {
        let mut nav = Navigator::default();
        assert_eq!(nav.resolve(Route::Activities, SessionState::ANONYMOUS), Route::Activities);
        assert_eq!(nav.resolve(Route::MyDonations, SessionState::ANONYMOUS), Route::Login);
        assert_eq!(nav.return_to(), Some(&Route::MyDonations));
        assert_eq!(nav.resolve(Route::MyDonations, USER), Route::MyDonations);
        assert_eq!(nav.resolve(Route::Admin, USER), Route::Home);
        assert_eq!(
            nav.resolve(Route::Admin, SessionState { authenticated: true, is_admin: true }),
            Route::Admin
        );
    }

    #[test]
    fn test_after_login_without_origin_goes_home() {
        let mut nav = Navigator::new(Route::Login);
        assert_eq!(nav.after_login(), Route::Home);
    }

    #[tokio::test]
    async fn test_redirect_and_return_across_login() {
        let transport = MockTransport::new();
        transport.reply("POST", "/users/login", 200, json!({"token": "t1"}));
        transport.reply("POST", "/users/check-admin", 403, json!({}));
        let jar = Arc::new(CookieJar::in_memory(DEFAULT_AUTH_COOKIE));
        let session = SessionContext::new(AuthGateway::new(client(&transport, jar.clone())), jar);

        let mut nav = Navigator::default();
        let donation_page = Route::Activity(id("a1"));
        assert_eq!(nav.navigate(donation_page.clone(), &session).await, donation_page);

        // "Donate" while logged out
        assert_eq!(nav.redirect_to_login(donation_page.clone()), Route::Login);
        assert_eq!(nav.current(), &Route::Login);

        session.login("ada@example.org", "pw").await.unwrap();
        assert_eq!(nav.after_login(), donation_page);
        assert!(nav.return_to().is_none());
    }
}
