use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use base64::Engine as _;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::UserRole;

fn engine_with_users() -> engine::Engine {
    let mut engine = engine::Engine::builder().build().unwrap();
    engine
        .add_user(
            "anna".to_string(),
            "anna123".to_string(),
            "Анна".to_string(),
            UserRole::Cosmetologist,
        )
        .unwrap();
    engine
        .add_user(
            "maria".to_string(),
            "maria123".to_string(),
            "Мария".to_string(),
            UserRole::Cosmetologist,
        )
        .unwrap();
    engine
}

fn basic(username: &str, password: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(format!("{username}:{password}"));
    format!("Basic {encoded}")
}

fn get(uri: &str, auth: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, auth)
        .body(Body::empty())
        .unwrap()
}

fn send_json(method: &str, uri: &str, auth: &str, payload: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, auth)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn booking(time: &str) -> Value {
    json!({
        "date": "2024-03-01",
        "time": time,
        "duration_minutes": 60,
        "service_name": "Чистка лица",
        "price_kopecks": 150_000,
        "client_name": "Ольга",
    })
}

#[tokio::test]
async fn requests_without_credentials_are_rejected() {
    let app = server::app(engine_with_users());

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/appointments").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(get("/appointments", &basic("anna", "wrong")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn whoami_strips_the_password() {
    let app = server::app(engine_with_users());
    let response = app
        .oneshot(get("/whoami", &basic("anna", "anna123")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["username"], "anna");
    assert_eq!(body["name"], "Анна");
    assert_eq!(body["role"], "cosmetologist");
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn double_booking_returns_conflict() {
    let app = server::app(engine_with_users());
    let auth = basic("anna", "anna123");

    let response = app
        .clone()
        .oneshot(send_json("POST", "/appointments", &auth, &booking("10:00")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(send_json("POST", "/appointments", &auth, &booking("10:30")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Maria's calendar is unaffected by Anna's bookings.
    let response = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/appointments",
            &basic("maria", "maria123"),
            &booking("10:30"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(get("/appointments?date=2024-03-01", &auth))
        .await
        .unwrap();
    let listed = body_json(response).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn malformed_time_is_unprocessable() {
    let app = server::app(engine_with_users());
    let response = app
        .oneshot(send_json(
            "POST",
            "/appointments",
            &basic("anna", "anna123"),
            &booking("25:99"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn slot_grid_marks_booked_times() {
    let app = server::app(engine_with_users());
    let auth = basic("anna", "anna123");

    let response = app
        .clone()
        .oneshot(send_json("POST", "/appointments", &auth, &booking("10:00")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(get(
            "/appointments/slots?date=2024-03-01&duration_minutes=30",
            &auth,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let slots = body_json(response).await;
    let status_of = |time: &str| {
        slots
            .as_array()
            .unwrap()
            .iter()
            .find(|s| s["time"] == time)
            .unwrap_or_else(|| panic!("slot {time} missing"))["status"]
            .clone()
    };
    assert_eq!(status_of("10:00"), "busy_self");
    assert_eq!(status_of("09:30"), "available");

    // The same grid from Maria's side reports someone else's booking.
    let response = app
        .oneshot(get(
            "/appointments/slots?date=2024-03-01&duration_minutes=30",
            &basic("maria", "maria123"),
        ))
        .await
        .unwrap();
    let slots = body_json(response).await;
    let busy = slots
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["time"] == "10:00")
        .unwrap();
    assert_eq!(busy["status"], "busy_other");
}

#[tokio::test]
async fn completing_an_appointment_feeds_the_ledger() {
    let app = server::app(engine_with_users());
    let auth = basic("anna", "anna123");

    let response = app
        .clone()
        .oneshot(send_json("POST", "/appointments", &auth, &booking("10:00")))
        .await
        .unwrap();
    let created = body_json(response).await;
    let id = created["id"].as_str().unwrap().to_string();

    for status in ["confirmed", "completed"] {
        let response = app
            .clone()
            .oneshot(send_json(
                "PATCH",
                &format!("/appointments/{id}/status"),
                &auth,
                &json!({ "status": status }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "transition to {status}");
    }

    // completed -> cancelled is illegal.
    let response = app
        .clone()
        .oneshot(send_json(
            "PATCH",
            &format!("/appointments/{id}/status"),
            &auth,
            &json!({ "status": "cancelled" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = app
        .clone()
        .oneshot(get("/finances", &auth))
        .await
        .unwrap();
    let records = body_json(response).await;
    let records = records.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["type"], "income");
    assert_eq!(records[0]["category"], "service");
    assert_eq!(records[0]["amount"], 150_000);
    assert_eq!(records[0]["appointmentId"], id.as_str());

    let response = app
        .oneshot(get("/finances/summary", &auth))
        .await
        .unwrap();
    let summary = body_json(response).await;
    assert_eq!(summary["income"], 150_000);
    assert_eq!(summary["profit"], 150_000);
}

#[tokio::test]
async fn deleting_unknown_appointment_is_not_found() {
    let app = server::app(engine_with_users());
    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/appointments/missing")
                .header(header::AUTHORIZATION, basic("anna", "anna123"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reports_cover_the_requested_window() {
    let app = server::app(engine_with_users());
    let auth = basic("anna", "anna123");

    let response = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/finances",
            &auth,
            &json!({
                "type": "expense",
                "category": "rent",
                "amount_kopecks": 50_000,
                "date": "2024-03-05",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(get("/reports/finance?from=2024-03-01&to=2024-04-01", &auth))
        .await
        .unwrap();
    let report = body_json(response).await;
    assert_eq!(report["expenses"], 50_000);
    assert_eq!(report["profit"], -50_000);

    let response = app
        .clone()
        .oneshot(get(
            "/reports/finance.csv?from=2024-03-01&to=2024-04-01",
            &auth,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let csv = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(csv.starts_with("date,type,category,amount,description,owner"));
    assert!(csv.contains("2024-03-05,expense,rent"));

    // Reversed window is a caller error.
    let response = app
        .oneshot(get("/reports/finance?from=2024-04-01&to=2024-03-01", &auth))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
