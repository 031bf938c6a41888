#![allow(dead_code)]

use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use mongodb::bson::oid::ObjectId;
use std::path::PathBuf;

use travel_admin_api::config::AppConfig;
use travel_admin_api::db::mongo::Store;
use travel_admin_api::routes;
use travel_admin_api::services::account_service::generate_token;

// Nothing listens here: every query fails fast, which drives handlers down
// their validation and fallback paths.
const UNREACHABLE_MONGO_URI: &str =
    "mongodb://127.0.0.1:1/?serverSelectionTimeoutMS=200&connectTimeoutMS=200";

pub struct TestApp {
    pub store: Store,
    pub config: AppConfig,
}

impl TestApp {
    pub async fn new() -> Self {
        let client = mongodb::Client::with_uri_str(UNREACHABLE_MONGO_URI)
            .await
            .expect("client options should parse");
        let config = AppConfig::local(scratch_settings_dir());
        let store = Store::new(&client, &config.database);

        Self { store, config }
    }

    pub fn create_app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(self.config.clone()))
            .app_data(web::Data::new(self.store.clone()))
            .configure(routes::config)
    }

    /// `Authorization` header value for a freshly signed admin token.
    pub fn bearer(&self, admin_id: ObjectId) -> String {
        let token = generate_token(&get_test_email(), admin_id, &self.config.jwt_secret)
            .expect("token should sign");
        format!("Bearer {}", token)
    }
}

/// Status of a request whether it was answered by a handler or rejected by
/// middleware with an error.
pub async fn call_status<S, R, B>(app: &S, req: R) -> StatusCode
where
    S: Service<R, Response = ServiceResponse<B>, Error = actix_web::Error>,
{
    match test::try_call_service(app, req).await {
        Ok(resp) => resp.status(),
        Err(err) => err.as_response_error().status_code(),
    }
}

pub fn scratch_settings_dir() -> PathBuf {
    std::env::temp_dir().join(format!("travel-admin-test-{}", uuid::Uuid::new_v4()))
}

pub fn get_test_admin_id() -> ObjectId {
    ObjectId::parse_str("64b7f0c2a1b2c3d4e5f60718").expect("valid test id")
}

pub fn get_test_email() -> String {
    "admin@example.com".to_string()
}
