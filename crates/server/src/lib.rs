use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{ServerState, app, run, run_with_listener, spawn_with_listener};

mod appointments;
mod clients;
mod finances;
mod materials;
mod reports;
mod server;
mod services;
mod user;

pub mod types {
    pub mod appointment {
        pub use api_types::appointment::{
            AppointmentList, AppointmentNew, AppointmentStatus, SlotQuery, StatusUpdate,
        };
        pub use engine::{Appointment, Slot, SlotStatus};
    }

    pub mod finance {
        pub use api_types::finance::{FinanceNew, RecordKind};
        pub use engine::{FinanceRecord, FinanceTotals};
    }

    pub mod service {
        pub use api_types::service::{ServiceNew, ServicePatch};
        pub use engine::Service;
    }

    pub mod material {
        pub use api_types::material::{ConsumeRequest, MaterialNew, PurchaseNew};
        pub use engine::Material;
    }

    pub mod client {
        pub use api_types::client::{ClientNew, VisitNew};
        pub use engine::{Client, Visit};
    }

    pub mod report {
        pub use api_types::report::ReportQuery;
        pub use engine::{ClientsReport, FinanceReport};
    }

    pub mod user {
        pub use api_types::user::UserView;
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

//TODO: Find a better solution
#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::SlotConflict(_) | EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::Storage(_) | EngineError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InvalidTimeFormat(_)
        | EngineError::IllegalTransition { .. }
        | EngineError::InvalidAmount(_)
        | EngineError::InsufficientStock(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Storage(storage_err) => {
            tracing::error!("storage error: {storage_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}
