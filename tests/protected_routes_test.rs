mod common;

use actix_web::{http::header, test};
use serde_json::json;
use serial_test::serial;

use common::{call_status, get_test_admin_id, TestApp};

#[actix_rt::test]
#[serial]
async fn test_get_session_without_auth() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get().uri("/api/auth/session").to_request();

    assert_eq!(call_status(&app, req).await, 401);
}

#[actix_rt::test]
#[serial]
async fn test_admin_routes_without_auth() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let id = get_test_admin_id().to_hex();
    let gets = [
        "/api/admin/dashboard".to_string(),
        "/api/admin/dashboard/stats".to_string(),
        "/api/admin/tours".to_string(),
        format!("/api/admin/tours/{}/dates", id),
        "/api/admin/users".to_string(),
        format!("/api/admin/users/{}/favorites", id),
        "/api/admin/bookings".to_string(),
        "/api/admin/reviews".to_string(),
        "/api/admin/statistics?range=7days".to_string(),
        "/api/admin/statistics/report.csv".to_string(),
        "/api/admin/settings/system".to_string(),
    ];

    for uri in gets {
        let req = test::TestRequest::get().uri(&uri).to_request();
        assert_eq!(call_status(&app, req).await, 401, "GET {}", uri);
    }
}

#[actix_rt::test]
#[serial]
async fn test_admin_writes_without_auth() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/admin/tours")
        .set_json(&json!({ "title": "Ha Long Bay Cruise" }))
        .to_request();
    assert_eq!(call_status(&app, req).await, 401);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/admin/tours/{}", get_test_admin_id().to_hex()))
        .to_request();
    assert_eq!(call_status(&app, req).await, 401);

    let req = test::TestRequest::put()
        .uri("/api/admin/settings/password")
        .set_json(&json!({
            "current_password": "secret1",
            "new_password": "secret2",
            "confirm_password": "secret2"
        }))
        .to_request();
    assert_eq!(call_status(&app, req).await, 401);
}

#[actix_rt::test]
#[serial]
async fn test_admin_routes_with_invalid_token() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/admin/tours")
        .insert_header((header::AUTHORIZATION, "Bearer not-a-jwt"))
        .to_request();
    assert_eq!(call_status(&app, req).await, 401);

    let req = test::TestRequest::get()
        .uri("/api/admin/tours")
        .insert_header((header::AUTHORIZATION, "Basic YWRtaW46c2VjcmV0"))
        .to_request();
    assert_eq!(call_status(&app, req).await, 401);
}

#[actix_rt::test]
#[serial]
async fn test_token_signed_with_other_secret_is_rejected() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let token = travel_admin_api::services::account_service::generate_token(
        "admin@example.com",
        get_test_admin_id(),
        "some_other_secret",
    )
    .unwrap();

    let req = test::TestRequest::get()
        .uri("/api/admin/settings/system")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
        .to_request();
    assert_eq!(call_status(&app, req).await, 401);
}
