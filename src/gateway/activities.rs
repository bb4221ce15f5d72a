//! `/activities` resource.

use reqwest::Method;
use serde::Deserialize;

use super::Envelope;
use crate::error::Result;
use crate::http::HttpClient;
use crate::models::{Activity, ActivityUpdate, NewActivity, ResourceId};

#[derive(Deserialize)]
struct ActivityData {
    activity: Activity,
}

#[derive(Deserialize)]
struct ActivitiesData {
    #[serde(default)]
    activities: Vec<Activity>,
}

#[derive(Clone)]
pub struct ActivityGateway {
    http: HttpClient,
}

impl ActivityGateway {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn list(&self) -> Result<Vec<Activity>> {
        let envelope: Envelope<ActivitiesData> = self.http.get("/activities").await?;
        Ok(envelope.into_data().activities)
    }

    /// Activities created by the logged-in user
    pub async fn list_mine(&self) -> Result<Vec<Activity>> {
        let envelope: Envelope<ActivitiesData> =
            self.http.get("/activities/my-activities").await?;
        Ok(envelope.into_data().activities)
    }

    pub async fn get(&self, id: &ResourceId) -> Result<Activity> {
        let envelope: Envelope<ActivityData> =
            self.http.get(&format!("/activities/{}", id)).await?;
        Ok(envelope.into_data().activity)
    }

    pub async fn create(&self, activity: &NewActivity) -> Result<Activity> {
        let envelope: Envelope<ActivityData> = self.http.post("/activities", activity).await?;
        Ok(envelope.into_data().activity)
    }

    pub async fn update(&self, id: &ResourceId, update: &ActivityUpdate) -> Result<Activity> {
        let envelope: Envelope<ActivityData> =
            self.http.put(&format!("/activities/{}", id), update).await?;
        Ok(envelope.into_data().activity)
    }

    pub async fn delete(&self, id: &ResourceId) -> Result<()> {
        self.http
            .execute(Method::DELETE, &format!("/activities/{}", id), None)
            .await
    }
}
