//! Fundraising activity models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{Amount, PersonRef, ResourceId};

/// Creator label for activities without an owner
pub const COMMUNITY: &str = "Community";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityStatus {
    #[default]
    Open,
    Closed,
}

impl ActivityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityStatus::Open => "open",
            ActivityStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(ActivityStatus::Open),
            "closed" => Ok(ActivityStatus::Closed),
            other => Err(format!("unknown status '{}', expected 'open' or 'closed'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    #[serde(rename = "_id")]
    pub id: ResourceId,
    #[serde(default)]
    pub creator: Option<PersonRef>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "goalAmount")]
    pub goal_amount: Amount,
    #[serde(rename = "totalDonations", default)]
    pub total_donations: Amount,
    #[serde(default)]
    pub status: ActivityStatus,
    #[serde(default)]
    pub end_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Activity {
    /// Share of the goal raised so far, in percent. Not capped: an activity
    /// that exceeded its goal reports more than 100.
    pub fn progress_percent(&self) -> f64 {
        if !self.goal_amount.is_positive() {
            return 0.0;
        }
        self.total_donations.cents() as f64 / self.goal_amount.cents() as f64 * 100.0
    }

    /// Width of a progress bar, capped at 100
    pub fn progress_bar_percent(&self) -> f64 {
        self.progress_percent().clamp(0.0, 100.0)
    }

    /// Progress with one decimal, e.g. `25.0%`
    pub fn progress_label(&self) -> String {
        format!("{:.1}%", self.progress_percent())
    }

    pub fn creator_name(&self) -> String {
        self.creator
            .as_ref()
            .and_then(PersonRef::full_name)
            .unwrap_or_else(|| COMMUNITY.to_string())
    }

    pub fn is_open(&self) -> bool {
        self.status == ActivityStatus::Open
    }

    pub fn goal_reached(&self) -> bool {
        self.total_donations >= self.goal_amount
    }
}

/// Body of `POST /activities`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewActivity {
    pub name: String,
    pub description: String,
    pub goal_amount: Amount,
    #[serde(rename = "end_at")]
    pub end_at: DateTime<Utc>,
    pub total_donations: Amount,
    pub status: ActivityStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Body of `PUT /activities/{id}`; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal_amount: Option<Amount>,
    #[serde(rename = "end_at", skip_serializing_if = "Option::is_none")]
    pub end_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ActivityStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl ActivityUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.goal_amount.is_none()
            && self.end_at.is_none()
            && self.status.is_none()
            && self.image.is_none()
    }
}
