//! Typed gateways over the backend's REST resources.
//!
//! Each method is exactly one HTTP exchange. Nothing is cached or retried,
//! and failures reach the caller unchanged.

pub mod activities;
pub mod auth;
pub mod donations;
pub mod users;

pub use activities::ActivityGateway;
pub use auth::AuthGateway;
pub use donations::DonationGateway;
pub use users::UserGateway;

use serde::Deserialize;

/// Success wrapper used by every resource endpoint:
/// `{ "status": "success", "data": { <key>: ... } }`
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub status: Option<String>,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn into_data(self) -> T {
        self.data
    }
}
