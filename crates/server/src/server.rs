use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, patch, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use tokio::sync::RwLock;

use std::sync::Arc;

use crate::{appointments, clients, finances, materials, reports, services, user};
use engine::Engine;

/// Shared state: the whole engine behind one lock.
///
/// Write volume is one interactive user, so a single global lock is enough;
/// the write guard spans the full check-then-insert-then-persist step of a
/// mutation, which keeps conflict checking race free.
#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<RwLock<Engine>>,
}

async fn auth(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(auth_header) = auth_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let user = {
        let engine = state.engine.read().await;
        engine
            .verify_login(auth_header.username(), auth_header.password())
            .cloned()
    };

    let Some(user) = user else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route(
            "/appointments",
            get(appointments::list).post(appointments::create),
        )
        .route("/appointments/slots", get(appointments::slots))
        .route("/appointments/{id}/status", patch(appointments::update_status))
        .route("/appointments/{id}", delete(appointments::remove))
        .route("/finances", get(finances::list).post(finances::create))
        .route("/finances/summary", get(finances::summary))
        .route("/services", get(services::list).post(services::create))
        .route(
            "/services/{id}",
            patch(services::update).delete(services::remove),
        )
        .route("/materials", get(materials::list).post(materials::create))
        .route("/materials/{id}/purchase", post(materials::purchase))
        .route("/materials/{id}/consume", post(materials::consume))
        .route("/clients", get(clients::list).post(clients::create))
        .route("/clients/{id}/visits", post(clients::add_visit))
        .route("/reports/finance", get(reports::finance))
        .route("/reports/finance.csv", get(reports::finance_csv))
        .route("/reports/clients", get(reports::clients))
        .route("/reports/materials", get(reports::materials))
        .route("/whoami", get(user::whoami))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

pub async fn run(engine: Engine) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(RwLock::new(engine)),
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}

/// The full routed application over `engine`, for in-process testing.
pub fn app(engine: Engine) -> Router {
    router(ServerState {
        engine: Arc::new(RwLock::new(engine)),
    })
}
