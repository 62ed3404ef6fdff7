//! Material inventory API endpoints.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use api_types::material::{ConsumeRequest, MaterialNew, PurchaseNew};
use engine::{Material, MaterialDraft, Money, Owner, Purchase, User};

use crate::{ServerError, server::ServerState};

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Json<Vec<Material>> {
    let engine = state.engine.read().await;
    Json(engine.materials_for(&user.id))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<MaterialNew>,
) -> Result<(StatusCode, Json<Material>), ServerError> {
    let draft = MaterialDraft {
        name: payload.name,
        owner: Owner::from(payload.owner.unwrap_or_else(|| Owner::COMMON.to_string())),
        quantity: payload.quantity,
        unit: payload.unit,
        price: Money::new(payload.price_kopecks),
    };

    let mut engine = state.engine.write().await;
    let material = engine.add_material(draft)?;
    Ok((StatusCode::CREATED, Json(material)))
}

pub async fn purchase(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<PurchaseNew>,
) -> Result<(StatusCode, Json<Material>), ServerError> {
    let purchase = Purchase {
        quantity: payload.quantity,
        price: Money::new(payload.price_kopecks),
        date: payload.date,
    };

    let mut engine = state.engine.write().await;
    let history = engine.record_purchase(&id, purchase)?;
    Ok((StatusCode::CREATED, Json(history)))
}

pub async fn consume(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<ConsumeRequest>,
) -> Result<Json<Material>, ServerError> {
    let mut engine = state.engine.write().await;
    let material = engine.consume_material(&id, payload.quantity)?;
    Ok(Json(material))
}
