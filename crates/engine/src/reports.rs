//! Read-only report projections over the engine's collections.
//!
//! Reports never touch storage; they fold over the in-memory snapshots the
//! caller already holds.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::EngineError;
use crate::appointments::Appointment;
use crate::clients::Client;
use crate::finance::{FinanceRecord, FinanceTotals};
use crate::materials::Material;
use crate::money::Money;

/// Half-open `[from, to)` date range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPeriod {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl ReportPeriod {
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date < self.to
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceReport {
    pub income: Money,
    pub expenses: Money,
    pub profit: Money,
    /// Booked revenue: prices of every appointment in the period, whatever
    /// its status.
    pub appointment_revenue: Money,
    /// Price times quantity of every material row created in the period.
    pub material_spend: Money,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientsReport {
    pub new_clients: usize,
    pub total_appointments: usize,
    pub average_bill: Money,
    /// Clients with at least three recorded visits.
    pub frequent_clients: usize,
}

pub fn finance_report(
    finances: &[FinanceRecord],
    appointments: &[Appointment],
    materials: &[Material],
    period: ReportPeriod,
) -> FinanceReport {
    let totals = FinanceTotals::over(finances.iter().filter(|r| period.contains(r.date)));

    let appointment_revenue = appointments
        .iter()
        .filter(|a| period.contains(a.date))
        .map(|a| a.price)
        .sum();

    let material_spend = materials
        .iter()
        .filter(|m| period.contains(m.created_at.date_naive()))
        .map(|m| Money::new(m.price.kopecks() * m.quantity))
        .sum();

    FinanceReport {
        income: totals.income,
        expenses: totals.expenses,
        profit: totals.profit,
        appointment_revenue,
        material_spend,
    }
}

pub fn clients_report(
    clients: &[Client],
    appointments: &[Appointment],
    period: ReportPeriod,
) -> ClientsReport {
    let new_clients = clients
        .iter()
        .filter(|c| period.contains(c.created_at.date_naive()))
        .count();

    let in_period: Vec<&Appointment> = appointments
        .iter()
        .filter(|a| period.contains(a.date))
        .collect();
    let booked: Money = in_period.iter().map(|a| a.price).sum();
    let average_bill = if in_period.is_empty() {
        Money::ZERO
    } else {
        Money::new(booked.kopecks() / in_period.len() as i64)
    };

    ClientsReport {
        new_clients,
        total_appointments: in_period.len(),
        average_bill,
        frequent_clients: clients.iter().filter(|c| c.visits.len() >= 3).count(),
    }
}

/// Material spend in the period, grouped by owner.
pub fn materials_report(materials: &[Material], period: ReportPeriod) -> BTreeMap<String, Money> {
    let mut by_owner = BTreeMap::new();
    for material in materials
        .iter()
        .filter(|m| period.contains(m.created_at.date_naive()))
    {
        let spend = Money::new(material.price.kopecks() * material.quantity);
        *by_owner
            .entry(material.owner.as_str().to_string())
            .or_insert(Money::ZERO) += spend;
    }
    by_owner
}

/// Renders the period's visible ledger rows as CSV, newest first.
pub fn finance_csv(finances: &[FinanceRecord], period: ReportPeriod) -> Result<String, EngineError> {
    let export = |err: &dyn std::fmt::Display| EngineError::Export(err.to_string());

    let mut rows: Vec<&FinanceRecord> = finances
        .iter()
        .filter(|r| period.contains(r.date))
        .collect();
    rows.sort_by(|a, b| b.date.cmp(&a.date));

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(["date", "type", "category", "amount", "description", "owner"])
        .map_err(|e| export(&e))?;
    for record in rows {
        writer
            .write_record([
                record.date.to_string(),
                record.kind.as_str().to_string(),
                record.category.clone(),
                record.amount.to_string(),
                record.description.clone(),
                record.owner.to_string(),
            ])
            .map_err(|e| export(&e))?;
    }

    writer.flush().map_err(|e| export(&e))?;
    let bytes = writer.into_inner().map_err(|e| export(&e))?;
    String::from_utf8(bytes).map_err(|e| export(&e))
}
