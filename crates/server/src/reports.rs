//! Reporting API endpoints.

use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{Query, State},
    http::header,
    response::IntoResponse,
};
use api_types::report::ReportQuery;
use engine::{ClientsReport, FinanceReport, Money, ReportPeriod};

use crate::{ServerError, server::ServerState};

fn period(query: ReportQuery) -> Result<ReportPeriod, ServerError> {
    if query.from >= query.to {
        return Err(ServerError::Generic(
            "`from` must be before `to`".to_string(),
        ));
    }
    Ok(ReportPeriod {
        from: query.from,
        to: query.to,
    })
}

pub async fn finance(
    State(state): State<ServerState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<FinanceReport>, ServerError> {
    let period = period(query)?;
    let engine = state.engine.read().await;
    Ok(Json(engine.finance_report(period)))
}

pub async fn clients(
    State(state): State<ServerState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<ClientsReport>, ServerError> {
    let period = period(query)?;
    let engine = state.engine.read().await;
    Ok(Json(engine.clients_report(period)))
}

pub async fn materials(
    State(state): State<ServerState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<BTreeMap<String, Money>>, ServerError> {
    let period = period(query)?;
    let engine = state.engine.read().await;
    Ok(Json(engine.materials_report(period)))
}

pub async fn finance_csv(
    State(state): State<ServerState>,
    Query(query): Query<ReportQuery>,
) -> Result<impl IntoResponse, ServerError> {
    let period = period(query)?;
    let csv = {
        let engine = state.engine.read().await;
        engine.finance_csv(period)?
    };
    Ok(([(header::CONTENT_TYPE, "text/csv; charset=utf-8")], csv))
}
