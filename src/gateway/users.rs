//! `/users` resource (administration).

use reqwest::Method;
use serde::Deserialize;

use super::Envelope;
use crate::error::Result;
use crate::http::HttpClient;
use crate::models::{NewUser, ResourceId, User, UserUpdate};

#[derive(Deserialize)]
struct UserData {
    user: User,
}

#[derive(Deserialize)]
struct UsersData {
    #[serde(default)]
    users: Vec<User>,
}

#[derive(Clone)]
pub struct UserGateway {
    http: HttpClient,
}

impl UserGateway {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn list(&self) -> Result<Vec<User>> {
        let envelope: Envelope<UsersData> = self.http.get("/users").await?;
        Ok(envelope.into_data().users)
    }

    pub async fn get(&self, id: &ResourceId) -> Result<User> {
        let envelope: Envelope<UserData> = self.http.get(&format!("/users/{}", id)).await?;
        Ok(envelope.into_data().user)
    }

    pub async fn create(&self, user: &NewUser) -> Result<User> {
        let envelope: Envelope<UserData> = self.http.post("/users", user).await?;
        Ok(envelope.into_data().user)
    }

    pub async fn update(&self, id: &ResourceId, update: &UserUpdate) -> Result<User> {
        let envelope: Envelope<UserData> =
            self.http.patch(&format!("/users/{}", id), update).await?;
        Ok(envelope.into_data().user)
    }

    pub async fn delete(&self, id: &ResourceId) -> Result<()> {
        self.http
            .execute(Method::DELETE, &format!("/users/{}", id), None)
            .await
    }
}
