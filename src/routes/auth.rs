use actix_web::{web, HttpResponse};

use crate::config::AppConfig;
use crate::db::mongo::Store;
use crate::error::ApiResult;
use crate::middleware::auth::AuthMiddleware;
use crate::middleware::auth_context::AuthenticatedAdmin;
use crate::models::admin::{AdminSession, SigninRequest, SignupRequest, TokenResponse};
use crate::services::account_service::{self, MongoAdminRepository};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/signup", web::post().to(signup))
            .route("/signin", web::post().to(signin))
            .service(
                web::scope("")
                    .wrap(AuthMiddleware)
                    .route("/session", web::get().to(session)),
            ),
    );
}

pub async fn signup(
    store: web::Data<Store>,
    config: web::Data<AppConfig>,
    input: web::Json<SignupRequest>,
) -> ApiResult<HttpResponse> {
    let repo = MongoAdminRepository::new(&store);
    let auth_token = account_service::signup(&repo, input.into_inner(), &config.jwt_secret).await?;
    Ok(HttpResponse::Created().json(TokenResponse { auth_token }))
}

pub async fn signin(
    store: web::Data<Store>,
    config: web::Data<AppConfig>,
    input: web::Json<SigninRequest>,
) -> ApiResult<HttpResponse> {
    let repo = MongoAdminRepository::new(&store);
    let auth_token =
        account_service::signin(&repo, &input.email, &input.password, &config.jwt_secret).await?;
    Ok(HttpResponse::Ok().json(TokenResponse { auth_token }))
}

pub async fn session(admin: AuthenticatedAdmin, store: web::Data<Store>) -> ApiResult<HttpResponse> {
    let repo = MongoAdminRepository::new(&store);
    let admin = account_service::load_admin(&repo, &admin.admin_id).await?;
    Ok(HttpResponse::Ok().json(AdminSession::from(admin)))
}
