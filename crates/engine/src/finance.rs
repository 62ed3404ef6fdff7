//! The finance ledger: manual income/expense entries plus records derived
//! from completed appointments.
//!
//! The ledger is append-only. A record created for an appointment keeps a
//! weak back-reference (`appointment_id`); deleting the appointment later
//! leaves the record untouched, so the books stay historical.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;
use crate::appointments::Appointment;
use crate::money::Money;

/// Ledger category used for appointment-derived income.
pub const CATEGORY_SERVICE: &str = "service";

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

impl TryFrom<&str> for RecordKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(EngineError::InvalidAmount(format!(
                "invalid record kind: {other}"
            ))),
        }
    }
}

/// Who a ledger entry (or a material) belongs to: the whole salon or one
/// provider. Stored as the provider id, with `"common"` as the shared
/// sentinel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Owner {
    Common,
    Provider(String),
}

impl Owner {
    pub const COMMON: &str = "common";

    /// Whether `provider_id` is allowed to see records with this owner.
    #[must_use]
    pub fn visible_to(&self, provider_id: &str) -> bool {
        match self {
            Self::Common => true,
            Self::Provider(id) => id == provider_id,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Common => Self::COMMON,
            Self::Provider(id) => id,
        }
    }
}

impl From<String> for Owner {
    fn from(value: String) -> Self {
        if value == Self::COMMON {
            Self::Common
        } else {
            Self::Provider(value)
        }
    }
}

impl From<Owner> for String {
    fn from(value: Owner) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: RecordKind,
    pub category: String,
    pub amount: Money,
    #[serde(default)]
    pub description: String,
    pub date: NaiveDate,
    pub owner: Owner,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    /// Weak back-reference to the appointment this record was derived from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appointment_id: Option<String>,
}

impl FinanceRecord {
    /// The income entry synthesized when an appointment completes.
    pub(crate) fn for_completed(appointment: &Appointment, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind: RecordKind::Income,
            category: CATEGORY_SERVICE.to_string(),
            amount: appointment.price,
            description: format!(
                "{} ({})",
                appointment.service_name, appointment.client_name
            ),
            date: appointment.date,
            owner: Owner::from(appointment.provider_id.clone()),
            created_by: appointment.provider_id.clone(),
            created_at: now,
            appointment_id: Some(appointment.id.clone()),
        }
    }
}

/// Input for a manually entered ledger record.
#[derive(Clone, Debug)]
pub struct FinanceDraft {
    pub kind: RecordKind,
    pub category: String,
    pub amount: Money,
    pub description: String,
    pub date: NaiveDate,
    pub owner: Owner,
    pub created_by: String,
}

/// Income/expense/profit totals over a set of visible records.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinanceTotals {
    pub income: Money,
    pub expenses: Money,
    pub profit: Money,
}

impl FinanceTotals {
    pub fn over<'a>(records: impl Iterator<Item = &'a FinanceRecord>) -> Self {
        let mut totals = Self::default();
        for record in records {
            match record.kind {
                RecordKind::Income => totals.income += record.amount,
                RecordKind::Expense => totals.expenses += record.amount,
            }
        }
        totals.profit = totals.income - totals.expenses;
        totals
    }
}
