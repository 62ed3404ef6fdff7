//! The service catalog offered by the salon.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::interval::DEFAULT_DURATION_MINUTES;
use crate::money::Money;

fn default_duration() -> u32 {
    DEFAULT_DURATION_MINUTES
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: String,
    pub name: String,
    #[serde(default = "default_duration")]
    pub duration_minutes: u32,
    pub price: Money,
    #[serde(default)]
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct ServiceDraft {
    pub name: String,
    pub duration_minutes: u32,
    pub price: Money,
    pub description: String,
}

/// Partial update; `None` fields keep their current value.
#[derive(Clone, Debug, Default)]
pub struct ServiceUpdate {
    pub name: Option<String>,
    pub duration_minutes: Option<u32>,
    pub price: Option<Money>,
    pub description: Option<String>,
}
