//! Client records and their visit history.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    pub id: String,
    pub date: NaiveDate,
    pub service_name: String,
    pub price: Money,
    #[serde(default)]
    pub notes: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    pub name: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthday: Option<NaiveDate>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub visits: Vec<Visit>,
    pub created_at: DateTime<Utc>,
}

impl Client {
    /// Everything this client has ever paid across recorded visits.
    #[must_use]
    pub fn total_spent(&self) -> Money {
        self.visits.iter().map(|v| v.price).sum()
    }
}

#[derive(Clone, Debug)]
pub struct ClientDraft {
    pub name: String,
    pub phone: String,
    pub birthday: Option<NaiveDate>,
    pub notes: String,
}

#[derive(Clone, Debug)]
pub struct VisitDraft {
    pub date: NaiveDate,
    pub service_name: String,
    pub price: Money,
    pub notes: String,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn total_spent_sums_visits() {
        let client = Client {
            id: "1".to_string(),
            name: "Ольга".to_string(),
            phone: "+7 900 000-00-00".to_string(),
            birthday: None,
            notes: String::new(),
            visits: vec![
                Visit {
                    id: "v1".to_string(),
                    date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
                    service_name: "Маникюр".to_string(),
                    price: Money::new(150_000),
                    notes: String::new(),
                },
                Visit {
                    id: "v2".to_string(),
                    date: NaiveDate::from_ymd_opt(2024, 2, 12).unwrap(),
                    service_name: "Педикюр".to_string(),
                    price: Money::new(200_000),
                    notes: String::new(),
                },
            ],
            created_at: Utc.timestamp_opt(0, 0).unwrap(),
        };

        assert_eq!(client.total_spent(), Money::new(350_000));
    }
}
