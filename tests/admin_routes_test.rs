mod common;

use actix_web::{http::header, test};
use serde_json::{json, Value};
use serial_test::serial;

use common::{get_test_admin_id, TestApp};

async fn error_of(resp: actix_web::dev::ServiceResponse) -> String {
    let body: Value = test::read_body_json(resp).await;
    body["error"].as_str().unwrap_or_default().to_string()
}

#[actix_rt::test]
#[serial]
async fn test_create_tour_with_missing_field() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/admin/tours")
        .insert_header((header::AUTHORIZATION, test_app.bearer(get_test_admin_id())))
        .set_json(&json!({
            "title": "Ha Long Bay Cruise",
            "description": "Two days on the bay",
            "status": "active"
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    assert_eq!(error_of(resp).await, "Please fill in all required fields.");
}

#[actix_rt::test]
#[serial]
async fn test_update_tour_with_blank_title() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::put()
        .uri(&format!("/api/admin/tours/{}", get_test_admin_id().to_hex()))
        .insert_header((header::AUTHORIZATION, test_app.bearer(get_test_admin_id())))
        .set_json(&json!({
            "title": "   ",
            "description": "Two days on the bay",
            "category": "beach",
            "status": "active"
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    assert_eq!(error_of(resp).await, "Please fill in all required fields.");
}

#[actix_rt::test]
#[serial]
async fn test_tour_with_unknown_status() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/admin/tours")
        .insert_header((header::AUTHORIZATION, test_app.bearer(get_test_admin_id())))
        .set_json(&json!({
            "title": "Ha Long Bay Cruise",
            "description": "Two days on the bay",
            "category": "beach",
            "status": "draft"
        }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 400);

    let req = test::TestRequest::get()
        .uri("/api/admin/tours?status=draft")
        .insert_header((header::AUTHORIZATION, test_app.bearer(get_test_admin_id())))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 400);
}

#[actix_rt::test]
#[serial]
async fn test_malformed_ids_are_not_found() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    for uri in [
        "/api/admin/tours/not-an-id",
        "/api/admin/users/not-an-id",
        "/api/admin/bookings/not-an-id",
    ] {
        let req = test::TestRequest::get()
            .uri(uri)
            .insert_header((header::AUTHORIZATION, test_app.bearer(get_test_admin_id())))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 404, "GET {}", uri);
    }
}

#[actix_rt::test]
#[serial]
async fn test_add_available_date_with_invalid_date() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/admin/tours/{}/dates", get_test_admin_id().to_hex()))
        .insert_header((header::AUTHORIZATION, test_app.bearer(get_test_admin_id())))
        .set_json(&json!({ "date": "14/04/2025", "price": 775000.0 }))
        .to_request();

    assert_eq!(test::call_service(&app, req).await.status(), 400);
}

#[actix_rt::test]
#[serial]
async fn test_create_user_with_missing_email() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/admin/users")
        .insert_header((header::AUTHORIZATION, test_app.bearer(get_test_admin_id())))
        .set_json(&json!({ "full_name": "Nguyen Van A", "user_name": "nguyenvana" }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    assert_eq!(error_of(resp).await, "Please fill in all required fields.");
}

#[actix_rt::test]
#[serial]
async fn test_update_booking_with_unknown_status() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::put()
        .uri(&format!("/api/admin/bookings/{}", get_test_admin_id().to_hex()))
        .insert_header((header::AUTHORIZATION, test_app.bearer(get_test_admin_id())))
        .set_json(&json!({ "status": "shipped" }))
        .to_request();

    assert_eq!(test::call_service(&app, req).await.status(), 400);
}

#[actix_rt::test]
#[serial]
async fn test_password_mismatch_is_rejected_before_lookup() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    // The store is unreachable: a 400 here means no query was attempted.
    let req = test::TestRequest::put()
        .uri("/api/admin/settings/password")
        .insert_header((header::AUTHORIZATION, test_app.bearer(get_test_admin_id())))
        .set_json(&json!({
            "current_password": "secret1",
            "new_password": "newsecret",
            "confirm_password": "newsecret!"
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    assert_eq!(error_of(resp).await, "New password and confirmation do not match.");
}

#[actix_rt::test]
#[serial]
async fn test_signup_validation_messages() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let cases = [
        (
            json!({ "full_name": "A", "email": "bad", "password": "abc", "confirm_password": "abd" }),
            "Passwords do not match",
        ),
        (
            json!({ "full_name": "A", "email": "bad", "password": "abc", "confirm_password": "abc" }),
            "Password is too weak. Use at least 6 characters.",
        ),
        (
            json!({ "full_name": "A", "email": "bad", "password": "secret1", "confirm_password": "secret1" }),
            "Invalid email address format.",
        ),
    ];

    for (body, message) in cases {
        let req = test::TestRequest::post()
            .uri("/api/auth/signup")
            .set_json(&body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
        assert_eq!(error_of(resp).await, message);
    }
}

#[actix_rt::test]
#[serial]
async fn test_malformed_json_uses_error_body() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/signin")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{ not json")
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    assert!(!error_of(resp).await.is_empty());
}

#[actix_rt::test]
#[serial]
async fn test_catalog_booking_requires_fields() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/catalog/bookings")
        .set_json(&json!({ "tour_date_start": "2025-04-14", "number_of_person": 2 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    assert_eq!(error_of(resp).await, "Please fill in all required fields.");

    let req = test::TestRequest::post()
        .uri("/api/catalog/bookings")
        .set_json(&json!({
            "tour_id": get_test_admin_id().to_hex(),
            "tour_date_start": "2025-04-14",
            "number_of_person": 0
        }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 400);
}
