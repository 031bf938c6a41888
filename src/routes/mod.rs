use actix_web::{error::InternalError, web, HttpResponse};
use mongodb::bson::oid::ObjectId;
use serde_json::json;

use crate::db::mongo::parse_id;
use crate::error::{ApiError, ApiResult};
use crate::middleware::auth::AuthMiddleware;

pub mod auth;
pub mod bookings;
pub mod catalog;
pub mod dashboard;
pub mod health;
pub mod reviews;
pub mod settings;
pub mod statistics;
pub mod tours;
pub mod users;

/// Malformed ids name nothing, so they read as "not found".
pub(crate) fn path_id(id: &str, entity: &str) -> ApiResult<ObjectId> {
    parse_id(id).ok_or_else(|| ApiError::NotFound(format!("{} not found", entity)))
}

/// Body errors use the same `{"error": ...}` shape as handler errors.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let message = err.to_string();
        InternalError::from_response(
            err,
            HttpResponse::BadRequest().json(json!({ "error": message })),
        )
        .into()
    })
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/api")
                .configure(auth::config)
                .configure(catalog::config)
                .service(
                    web::scope("/admin")
                        .wrap(AuthMiddleware)
                        .configure(dashboard::config)
                        .configure(tours::config)
                        .configure(users::config)
                        .configure(bookings::config)
                        .configure(reviews::config)
                        .configure(statistics::config)
                        .configure(settings::config),
                ),
        );
}
