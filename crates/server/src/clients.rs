//! Client records API endpoints.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use api_types::client::{ClientNew, VisitNew};
use engine::{Client, ClientDraft, Money, Visit, VisitDraft};

use crate::{ServerError, server::ServerState};

pub async fn list(State(state): State<ServerState>) -> Json<Vec<Client>> {
    let engine = state.engine.read().await;
    Json(engine.clients().to_vec())
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ClientNew>,
) -> Result<(StatusCode, Json<Client>), ServerError> {
    let draft = ClientDraft {
        name: payload.name,
        phone: payload.phone,
        birthday: payload.birthday,
        notes: payload.notes.unwrap_or_default(),
    };

    let mut engine = state.engine.write().await;
    let client = engine.add_client(draft)?;
    Ok((StatusCode::CREATED, Json(client)))
}

pub async fn add_visit(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<VisitNew>,
) -> Result<(StatusCode, Json<Visit>), ServerError> {
    let draft = VisitDraft {
        date: payload.date,
        service_name: payload.service_name,
        price: Money::new(payload.price_kopecks),
        notes: payload.notes.unwrap_or_default(),
    };

    let mut engine = state.engine.write().await;
    let visit = engine.add_client_visit(&id, draft)?;
    Ok((StatusCode::CREATED, Json(visit)))
}
