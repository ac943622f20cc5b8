//! Integration tests for the dashboard CRUD endpoints.
//!
//! Each test gets its own temp-dir store; no external services are needed.

mod common;

use axum::http::{Method, StatusCode};
use common::{
    create_test_app, directory_entry, empty_request, json_request, parse_response_body,
    test_config, MockExecutor,
};
use domain::models::{Employee, LogEntry, LOG_RETENTION};
use serde_json::json;
use tower::ServiceExt;

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_is_public() {
    let mut config = test_config();
    config.security.dashboard_token = Some("s3cret".to_string());
    let app = create_test_app(config, MockExecutor::default(), vec![]);

    let response = app
        .router
        .clone()
        .oneshot(empty_request(Method::GET, "/api/health", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["store"]["employees"], 0);

    let response = app
        .router
        .oneshot(empty_request(Method::GET, "/api/health/live", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// ============================================================================
// Authorization
// ============================================================================

#[tokio::test]
async fn test_dashboard_token_required_when_configured() {
    let mut config = test_config();
    config.security.dashboard_token = Some("s3cret".to_string());
    let app = create_test_app(config, MockExecutor::default(), vec![]);

    let response = app
        .router
        .clone()
        .oneshot(empty_request(Method::GET, "/api/employees", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = parse_response_body(response).await;
    assert_eq!(body["error"], "unauthorized");

    let response = app
        .router
        .clone()
        .oneshot(empty_request(Method::GET, "/api/employees", Some("wrong")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .router
        .oneshot(empty_request(Method::GET, "/api/employees", Some("s3cret")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_open_dashboard_without_token() {
    let app = create_test_app(test_config(), MockExecutor::default(), vec![]);

    let response = app
        .router
        .oneshot(empty_request(Method::GET, "/api/logs", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(parse_response_body(response).await, json!([]));
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let app = create_test_app(test_config(), MockExecutor::default(), vec![]);

    let mut request = empty_request(Method::GET, "/api/config", None);
    request
        .headers_mut()
        .insert("x-request-id", "req-42".parse().unwrap());
    let response = app.router.oneshot(request).await.unwrap();

    assert_eq!(response.headers()["x-request-id"], "req-42");
}

// ============================================================================
// Settings
// ============================================================================

#[tokio::test]
async fn test_config_partial_merge() {
    let app = create_test_app(test_config(), MockExecutor::default(), vec![]);

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/config",
            json!({ "office_code": "1234", "attendance_mode": "WFH" }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let before = parse_response_body(response).await;

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/config",
            json!({ "latitude": 1.0 }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let after = parse_response_body(response).await;

    let mut expected = before.clone();
    expected["latitude"] = json!(1.0);
    assert_eq!(after, expected);
    assert_eq!(after["office_code"], "1234");
    assert_eq!(after["attendance_mode"], "WFH");

    let response = app
        .router
        .oneshot(empty_request(Method::GET, "/api/config", None))
        .await
        .unwrap();
    assert_eq!(parse_response_body(response).await, expected);
}

#[tokio::test]
async fn test_config_rejects_invalid_coordinates() {
    let app = create_test_app(test_config(), MockExecutor::default(), vec![]);

    let response = app
        .router
        .oneshot(json_request(
            Method::POST,
            "/api/config",
            json!({ "latitude": 91.0 }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = parse_response_body(response).await;
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["details"][0]["field"], "latitude");

    assert_eq!(app.store.settings.get().await.latitude, -6.175392);
}

#[tokio::test]
async fn test_save_location() {
    let app = create_test_app(test_config(), MockExecutor::default(), vec![]);

    let response = app
        .router
        .oneshot(json_request(
            Method::POST,
            "/api/config/location",
            json!({ "latitude": -7.2575, "longitude": 112.7521, "label": "Kantor Surabaya" }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let settings = app.store.settings.get().await;
    assert_eq!(settings.latitude, -7.2575);
    assert_eq!(settings.longitude, 112.7521);
    assert_eq!(settings.location_label, "Kantor Surabaya");
}

// ============================================================================
// Employees
// ============================================================================

#[tokio::test]
async fn test_employee_add_update_toggle_delete() {
    let app = create_test_app(test_config(), MockExecutor::default(), vec![]);

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/employees",
            json!({ "nip": "198001012005011001", "name": "Budi", "phone": "0812-3456-7890" }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = parse_response_body(response).await;
    assert_eq!(created["password"], "198001012005011001");
    assert_eq!(created["enabled"], true);

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/employees",
            json!({ "nip": "198001012005011001", "password": "rahasia" }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = parse_response_body(response).await;
    assert_eq!(updated["name"], "Budi");
    assert_eq!(updated["password"], "rahasia");

    let response = app
        .router
        .clone()
        .oneshot(empty_request(
            Method::POST,
            "/api/employees/198001012005011001/toggle",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(parse_response_body(response).await["enabled"], false);

    let response = app
        .router
        .clone()
        .oneshot(empty_request(
            Method::DELETE,
            "/api/employees/198001012005011001",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(app.store.employees.list().await.is_empty());

    let response = app
        .router
        .oneshot(empty_request(
            Method::DELETE,
            "/api/employees/198001012005011001",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_employee_validation() {
    let app = create_test_app(test_config(), MockExecutor::default(), vec![]);

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/employees",
            json!({ "nip": "123", "phone": "12" }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .router
        .oneshot(empty_request(Method::POST, "/api/employees/404/toggle", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(app.store.employees.list().await.is_empty());
}

#[tokio::test]
async fn test_delete_all_employees() {
    let app = create_test_app(test_config(), MockExecutor::default(), vec![]);
    app.store
        .employees
        .replace_all(&[Employee::new("1", "Ani"), Employee::new("2", "Budi")])
        .await
        .unwrap();

    let response = app
        .router
        .oneshot(empty_request(Method::DELETE, "/api/employees", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(parse_response_body(response).await["deleted"], 2);
    assert!(app.store.employees.list().await.is_empty());
}

// ============================================================================
// Logs
// ============================================================================

#[tokio::test]
async fn test_logs_are_capped_and_cleared() {
    let app = create_test_app(test_config(), MockExecutor::default(), vec![]);
    for i in 0..(LOG_RETENTION + 5) {
        app.store
            .logs
            .append(LogEntry::info(format!("entry {}", i)))
            .await
            .unwrap();
    }

    let response = app
        .router
        .clone()
        .oneshot(empty_request(Method::GET, "/api/logs", None))
        .await
        .unwrap();
    let body = parse_response_body(response).await;
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), LOG_RETENTION);
    assert_eq!(entries[0]["message"], "entry 5");

    let response = app
        .router
        .clone()
        .oneshot(empty_request(Method::DELETE, "/api/logs", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .router
        .oneshot(empty_request(Method::GET, "/api/logs", None))
        .await
        .unwrap();
    assert_eq!(parse_response_body(response).await, json!([]));
}

// ============================================================================
// Employee directory
// ============================================================================

#[tokio::test]
async fn test_directory_requires_office_code() {
    let app = create_test_app(
        test_config(),
        MockExecutor::default(),
        vec![directory_entry("1", "Ani")],
    );

    let response = app
        .router
        .oneshot(empty_request(Method::GET, "/api/pegawai", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_directory_list_and_import() {
    let app = create_test_app(
        test_config(),
        MockExecutor::default(),
        vec![directory_entry("1", "Ani"), directory_entry("2", "Budi")],
    );
    app.store
        .employees
        .replace_all(&[Employee::new("1", "Ani Lama")])
        .await
        .unwrap();

    let response = app
        .router
        .clone()
        .oneshot(empty_request(Method::GET, "/api/pegawai?kode=1234", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(parse_response_body(response).await.as_array().unwrap().len(), 2);

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/config",
            json!({ "office_code": "1234" }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .router
        .oneshot(empty_request(Method::POST, "/api/pegawai/import", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let summary = parse_response_body(response).await;
    assert_eq!(summary["added"], 1);
    assert_eq!(summary["skipped"], 1);

    let roster = app.store.employees.list().await;
    assert_eq!(roster.len(), 2);
    assert_eq!(roster[0].name, "Ani Lama");
    assert_eq!(roster[1].password, "2");
}

// ============================================================================
// WhatsApp
// ============================================================================

#[tokio::test]
async fn test_whatsapp_save_and_missing_tokens() {
    let app = create_test_app(test_config(), MockExecutor::default(), vec![]);

    let response = app
        .router
        .clone()
        .oneshot(empty_request(Method::GET, "/api/whatsapp/status", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/whatsapp/save",
            json!({
                "account_token": "acct",
                "device_token": "dev",
                "device": { "name": "Kantor", "number": "6281234567890" }
            }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let settings = app.store.settings.get().await;
    assert_eq!(settings.whatsapp.device_token(), Some("dev"));
    assert_eq!(settings.whatsapp.account_token(), Some("acct"));
    assert_eq!(settings.whatsapp.device.unwrap().name, "Kantor");

    // The gateway is unreachable in tests.
    let response = app
        .router
        .oneshot(empty_request(Method::GET, "/api/whatsapp/status", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}
