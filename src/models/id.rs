//! Resource identifiers.

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ClientError;

lazy_static! {
    /// Identifiers are interpolated into request paths, so only URL-safe
    /// characters are allowed.
    static ref ID_REGEX: Regex = Regex::new(r"^[A-Za-z0-9_-]{1,64}$").unwrap();

    /// 12-byte ObjectId rendered as 24 hex characters
    static ref OBJECT_ID_REGEX: Regex = Regex::new(r"^[0-9a-fA-F]{24}$").unwrap();
}

/// Identifier of a server-owned resource.
///
/// Values coming from the server are taken as-is; values coming from users
/// go through [`ResourceId::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn parse(raw: &str) -> Result<Self, ClientError> {
        let raw = raw.trim();
        if ID_REGEX.is_match(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(ClientError::validation(format!("Invalid identifier: {:?}", raw)))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Creation time embedded in ObjectId-style identifiers (first 4 bytes,
    /// big-endian seconds since the epoch)
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        if !OBJECT_ID_REGEX.is_match(&self.0) {
            return None;
        }
        let seconds = u32::from_str_radix(&self.0[..8], 16).ok()?;
        DateTime::from_timestamp(i64::from(seconds), 0)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ResourceId {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
