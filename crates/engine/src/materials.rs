//! Material inventory: stock rows plus purchase history rows.
//!
//! A purchase appends a new row flagged `is_purchase` and bumps the base
//! row's quantity, mirroring how the stock screen has always recorded
//! restocks. Purchase rows are history, not stock; only the base row's
//! quantity is ever consumed from.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::finance::Owner;
use crate::money::Money;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: String,
    pub name: String,
    pub owner: Owner,
    pub quantity: i64,
    pub unit: String,
    pub price: Money,
    #[serde(default)]
    pub is_purchase: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct MaterialDraft {
    pub name: String,
    pub owner: Owner,
    pub quantity: i64,
    pub unit: String,
    pub price: Money,
}

/// A restock of an existing material.
#[derive(Clone, Debug)]
pub struct Purchase {
    pub quantity: i64,
    pub price: Money,
    pub date: NaiveDate,
}
