//! `/donations` resource. Donations are immutable: there is no update or
//! delete.

use serde::Deserialize;

use super::Envelope;
use crate::error::Result;
use crate::http::HttpClient;
use crate::models::{Donation, NewDonation};

#[derive(Deserialize)]
struct DonationsData {
    #[serde(default)]
    donations: Vec<Donation>,
}

#[derive(Deserialize)]
struct CreatedData {
    #[serde(default)]
    donation: Option<Donation>,
}

#[derive(Clone)]
pub struct DonationGateway {
    http: HttpClient,
}

impl DonationGateway {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// Every donation (admin only)
    pub async fn list(&self) -> Result<Vec<Donation>> {
        let envelope: Envelope<DonationsData> = self.http.get("/donations").await?;
        Ok(envelope.into_data().donations)
    }

    pub async fn list_mine(&self) -> Result<Vec<Donation>> {
        let envelope: Envelope<DonationsData> = self.http.get("/donations/my-donations").await?;
        Ok(envelope.into_data().donations)
    }

    /// `POST /donations`. The created record is returned when the backend
    /// echoes one back in `data.donation`; a malformed echo is a decode
    /// error even though the server accepted the donation.
    pub async fn create(&self, donation: &NewDonation) -> Result<Option<Donation>> {
        let envelope: Option<Envelope<Option<CreatedData>>> =
            self.http.post("/donations", donation).await?;
        Ok(envelope
            .and_then(Envelope::into_data)
            .and_then(|data| data.donation))
    }
}
