//! Appointment API endpoints.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use api_types::appointment::{AppointmentList, AppointmentNew, SlotQuery, StatusUpdate};
use engine::{
    Appointment, AppointmentDraft, AppointmentFilter, AppointmentStatus, Money, Slot, User,
};

use crate::{ServerError, server::ServerState};

fn engine_status(status: api_types::appointment::AppointmentStatus) -> Result<AppointmentStatus, ServerError> {
    AppointmentStatus::try_from(status.as_str()).map_err(ServerError::from)
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(query): Query<AppointmentList>,
) -> Result<Json<Vec<Appointment>>, ServerError> {
    let provider_id = match query.provider.as_deref() {
        // The schedule screen shows the viewer's own calendar by default.
        None => Some(user.id),
        Some("all") => None,
        Some(provider) => Some(provider.to_string()),
    };
    let status = query.status.map(engine_status).transpose()?;

    let filter = AppointmentFilter {
        provider_id,
        date: query.date,
        status,
        time_sorted: query.time_sorted.unwrap_or(false),
    };

    let engine = state.engine.read().await;
    Ok(Json(engine.appointments(&filter)))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<AppointmentNew>,
) -> Result<(StatusCode, Json<Appointment>), ServerError> {
    let draft = AppointmentDraft {
        provider_id: user.id,
        provider_name: user.name,
        date: payload.date,
        time: payload.time,
        duration_minutes: payload.duration_minutes,
        service_id: payload.service_id,
        service_name: payload.service_name,
        price: Money::new(payload.price_kopecks),
        client_name: payload.client_name,
    };

    let mut engine = state.engine.write().await;
    let appointment = engine.create_appointment(draft)?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<StatusUpdate>,
) -> Result<Json<Appointment>, ServerError> {
    let status = engine_status(payload.status)?;

    let mut engine = state.engine.write().await;
    let appointment = engine.update_status(&id, status)?;
    Ok(Json(appointment))
}

pub async fn remove(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServerError> {
    let mut engine = state.engine.write().await;
    engine.delete_appointment(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn slots(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(query): Query<SlotQuery>,
) -> Result<Json<Vec<Slot>>, ServerError> {
    let provider = query.provider.unwrap_or(user.id);

    let engine = state.engine.read().await;
    let slots = engine.available_slots(&provider, query.date, query.duration_minutes)?;
    Ok(Json(slots))
}
