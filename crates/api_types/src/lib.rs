//! Request/response payload types shared by the HTTP server and its clients.
//!
//! Monetary fields travel as raw integer kopecks (`*_kopecks`); times of day
//! travel as `"HH:MM"` strings and are validated by the engine.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub mod appointment {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum AppointmentStatus {
        Scheduled,
        Confirmed,
        Completed,
        Cancelled,
    }

    impl AppointmentStatus {
        /// Returns the canonical status string used by the engine.
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Scheduled => "scheduled",
                Self::Confirmed => "confirmed",
                Self::Completed => "completed",
                Self::Cancelled => "cancelled",
            }
        }
    }

    /// Request body for booking an appointment. The provider is the
    /// authenticated user; there is no way to book into someone else's
    /// calendar.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct AppointmentNew {
        pub date: NaiveDate,
        /// Start time, `"HH:MM"`.
        pub time: String,
        pub duration_minutes: Option<u32>,
        pub service_id: Option<String>,
        pub service_name: String,
        pub price_kopecks: i64,
        pub client_name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct StatusUpdate {
        pub status: AppointmentStatus,
    }

    /// Query string for listing appointments.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct AppointmentList {
        pub date: Option<NaiveDate>,
        /// Provider id; defaults to the authenticated user. `all` lists every
        /// calendar.
        pub provider: Option<String>,
        pub status: Option<AppointmentStatus>,
        pub time_sorted: Option<bool>,
    }

    /// Query string for the availability grid.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SlotQuery {
        pub date: NaiveDate,
        pub duration_minutes: u32,
        /// Provider whose calendar is being booked; defaults to the
        /// authenticated user.
        pub provider: Option<String>,
    }
}

pub mod finance {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum RecordKind {
        Income,
        Expense,
    }

    impl RecordKind {
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Income => "income",
                Self::Expense => "expense",
            }
        }
    }

    /// Request body for a manually entered ledger record.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct FinanceNew {
        #[serde(rename = "type")]
        pub kind: RecordKind,
        pub category: String,
        pub amount_kopecks: i64,
        pub description: Option<String>,
        pub date: NaiveDate,
        /// `"common"` or a provider id; defaults to `"common"`.
        pub owner: Option<String>,
    }
}

pub mod service {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ServiceNew {
        pub name: String,
        pub duration_minutes: u32,
        pub price_kopecks: i64,
        pub description: Option<String>,
    }

    /// Partial update; absent fields keep their current value.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ServicePatch {
        pub name: Option<String>,
        pub duration_minutes: Option<u32>,
        pub price_kopecks: Option<i64>,
        pub description: Option<String>,
    }
}

pub mod material {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MaterialNew {
        pub name: String,
        /// `"common"` or a provider id; defaults to `"common"`.
        pub owner: Option<String>,
        pub quantity: i64,
        pub unit: String,
        pub price_kopecks: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PurchaseNew {
        pub quantity: i64,
        pub price_kopecks: i64,
        pub date: NaiveDate,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ConsumeRequest {
        pub quantity: i64,
    }
}

pub mod client {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ClientNew {
        pub name: String,
        pub phone: String,
        pub birthday: Option<NaiveDate>,
        pub notes: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct VisitNew {
        pub date: NaiveDate,
        pub service_name: String,
        pub price_kopecks: i64,
        pub notes: Option<String>,
    }
}

pub mod report {
    use super::*;

    /// Half-open `[from, to)` reporting window.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReportQuery {
        pub from: NaiveDate,
        pub to: NaiveDate,
    }
}

pub mod user {
    use super::*;

    /// The authenticated account, without its password.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: String,
        pub username: String,
        pub name: String,
        pub role: String,
    }
}
