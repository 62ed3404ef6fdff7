//! Finance ledger API endpoints.

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};
use api_types::finance::FinanceNew;
use engine::{FinanceDraft, FinanceRecord, FinanceTotals, Money, Owner, RecordKind, User};

use crate::{ServerError, server::ServerState};

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<FinanceRecord>>, ServerError> {
    let engine = state.engine.read().await;
    Ok(Json(engine.finances_for(&user.id)))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<FinanceNew>,
) -> Result<(StatusCode, Json<FinanceRecord>), ServerError> {
    let draft = FinanceDraft {
        kind: RecordKind::try_from(payload.kind.as_str())?,
        category: payload.category,
        amount: Money::new(payload.amount_kopecks),
        description: payload.description.unwrap_or_default(),
        date: payload.date,
        owner: Owner::from(payload.owner.unwrap_or_else(|| Owner::COMMON.to_string())),
        created_by: user.id,
    };

    let mut engine = state.engine.write().await;
    let record = engine.add_finance_record(draft)?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn summary(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<FinanceTotals>, ServerError> {
    let engine = state.engine.read().await;
    Ok(Json(engine.finance_totals_for(&user.id)))
}
