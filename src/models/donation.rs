//! Donation records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Amount, PersonRef, ResourceId};

/// Activity reference embedded in a donation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActivityRef {
    Populated {
        #[serde(rename = "_id")]
        id: ResourceId,
        #[serde(default)]
        name: String,
    },
    Id(ResourceId),
}

impl ActivityRef {
    pub fn id(&self) -> &ResourceId {
        match self {
            ActivityRef::Populated { id, .. } | ActivityRef::Id(id) => id,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            ActivityRef::Populated { name, .. } if !name.is_empty() => Some(name),
            _ => None,
        }
    }
}

/// An immutable contribution of a user to an activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Donation {
    #[serde(rename = "_id")]
    pub id: ResourceId,
    #[serde(default)]
    pub user: Option<PersonRef>,
    #[serde(default)]
    pub activity: Option<ActivityRef>,
    pub amount: Amount,
}

impl Donation {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.id.timestamp()
    }

    pub fn donor_name(&self) -> String {
        self.user
            .as_ref()
            .and_then(PersonRef::full_name)
            .unwrap_or_else(|| "Anonymous".to_string())
    }

    pub fn activity_name(&self) -> String {
        self.activity
            .as_ref()
            .and_then(|a| a.name().map(str::to_string))
            .unwrap_or_else(|| "Deleted activity".to_string())
    }
}

/// Body of `POST /donations`
#[derive(Debug, Clone, Serialize)]
pub struct NewDonation {
    pub activity: ResourceId,
    pub amount: Amount,
}

pub fn total_donated(donations: &[Donation]) -> Amount {
    donations.iter().map(|d| d.amount).sum()
}
