//! Appointment records and their status lifecycle.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::interval::{ClockTime, DEFAULT_DURATION_MINUTES, TimeInterval};
use crate::money::Money;
use crate::{EngineError, ResultEngine};

/// Lifecycle status of an appointment.
///
/// `scheduled` is the initial state. `completed` and `cancelled` are locked:
/// the only remaining operation on them is deletion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Statuses reachable from `self` through `update_status`.
    pub fn allowed_transitions(self) -> &'static [AppointmentStatus] {
        match self {
            Self::Scheduled => &[Self::Confirmed, Self::Cancelled],
            Self::Confirmed => &[Self::Completed, Self::Cancelled],
            Self::Completed | Self::Cancelled => &[],
        }
    }

    pub fn can_transition_to(self, next: AppointmentStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for AppointmentStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "scheduled" => Ok(Self::Scheduled),
            "confirmed" => Ok(Self::Confirmed),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(EngineError::InvalidAmount(format!(
                "invalid appointment status: {other}"
            ))),
        }
    }
}

fn default_duration() -> u32 {
    DEFAULT_DURATION_MINUTES
}

/// A booking in a provider's calendar.
///
/// The service and client fields are a denormalized copy of whatever the
/// caller selected at booking time; the scheduler only interprets the
/// provider, date, time, duration and status.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    pub provider_id: String,
    #[serde(default)]
    pub provider_name: String,
    pub date: NaiveDate,
    pub time: ClockTime,
    /// Records stored before durations were tracked fall back to one hour.
    #[serde(default = "default_duration")]
    pub duration_minutes: u32,
    #[serde(default)]
    pub service_id: Option<String>,
    pub service_name: String,
    pub price: Money,
    pub client_name: String,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub finance_recorded: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// The `[start, start + duration)` minute interval this booking occupies.
    #[must_use]
    pub fn interval(&self) -> TimeInterval {
        self.time.interval(self.duration_minutes)
    }

    /// Cancelled bookings release their slot and are ignored by every
    /// conflict and availability check.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status != AppointmentStatus::Cancelled
    }
}

/// Input for a new booking. The time arrives as raw text from the caller and
/// is validated here even if the boundary already checked it.
#[derive(Clone, Debug)]
pub struct AppointmentDraft {
    pub provider_id: String,
    pub provider_name: String,
    pub date: NaiveDate,
    pub time: String,
    pub duration_minutes: Option<u32>,
    pub service_id: Option<String>,
    pub service_name: String,
    pub price: Money,
    pub client_name: String,
}

impl AppointmentDraft {
    pub(crate) fn parse_time(&self) -> ResultEngine<ClockTime> {
        self.time.parse()
    }

    pub(crate) fn duration(&self) -> ResultEngine<u32> {
        match self.duration_minutes {
            None => Ok(DEFAULT_DURATION_MINUTES),
            Some(0) => Err(EngineError::InvalidAmount(
                "duration must be positive".to_string(),
            )),
            Some(minutes) => Ok(minutes),
        }
    }
}
