//! Service catalog API endpoints.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use api_types::service::{ServiceNew, ServicePatch};
use engine::{Money, Service, ServiceDraft, ServiceUpdate};

use crate::{ServerError, server::ServerState};

pub async fn list(State(state): State<ServerState>) -> Json<Vec<Service>> {
    let engine = state.engine.read().await;
    Json(engine.services().to_vec())
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ServiceNew>,
) -> Result<(StatusCode, Json<Service>), ServerError> {
    let draft = ServiceDraft {
        name: payload.name,
        duration_minutes: payload.duration_minutes,
        price: Money::new(payload.price_kopecks),
        description: payload.description.unwrap_or_default(),
    };

    let mut engine = state.engine.write().await;
    let service = engine.add_service(draft)?;
    Ok((StatusCode::CREATED, Json(service)))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<ServicePatch>,
) -> Result<Json<Service>, ServerError> {
    let update = ServiceUpdate {
        name: payload.name,
        duration_minutes: payload.duration_minutes,
        price: payload.price_kopecks.map(Money::new),
        description: payload.description,
    };

    let mut engine = state.engine.write().await;
    let service = engine.update_service(&id, update)?;
    Ok(Json(service))
}

pub async fn remove(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServerError> {
    let mut engine = state.engine.write().await;
    engine.delete_service(&id)?;
    Ok(StatusCode::NO_CONTENT)
}
