use actix_web::{http::header, web, HttpResponse};
use chrono::Utc;
use serde_json::json;

use crate::config::AppConfig;
use crate::db::mongo::Store;
use crate::error::ApiResult;
use crate::middleware::auth_context::AuthenticatedAdmin;
use crate::models::admin::{AdminSession, PasswordChange, ProfileUpdate, TwoFactorVerification};
use crate::models::settings::{
    BackupRequest, BackupSchedule, NotificationSettings, Preference, SecuritySettings, SystemSettings,
};
use crate::services::account_service::{self, MongoAdminRepository};
use crate::services::image_service;
use crate::services::report_service;
use crate::services::settings_service::SettingsStore;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/settings")
            .route("/profile", web::get().to(get_profile))
            .route("/profile", web::put().to(update_profile))
            .route("/password", web::put().to(change_password))
            .route("/system", web::get().to(get_preference::<SystemSettings>))
            .route("/system", web::put().to(save_preference::<SystemSettings>))
            .route("/notifications", web::get().to(get_preference::<NotificationSettings>))
            .route("/notifications", web::put().to(save_preference::<NotificationSettings>))
            .route("/backup-schedule", web::get().to(get_preference::<BackupSchedule>))
            .route("/backup-schedule", web::put().to(save_preference::<BackupSchedule>))
            .route("/security", web::get().to(get_preference::<SecuritySettings>))
            .route("/two-factor/verify", web::post().to(verify_two_factor))
            .route("/backup", web::post().to(create_backup)),
    );
}

fn settings_store(config: &AppConfig) -> SettingsStore {
    SettingsStore::new(config.settings_dir.clone())
}

pub async fn get_profile(admin: AuthenticatedAdmin, store: web::Data<Store>) -> ApiResult<HttpResponse> {
    let repo = MongoAdminRepository::new(&store);
    let profile = account_service::load_admin(&repo, &admin.admin_id).await?;
    Ok(HttpResponse::Ok().json(AdminSession::from(profile)))
}

pub async fn update_profile(
    admin: AuthenticatedAdmin,
    store: web::Data<Store>,
    config: web::Data<AppConfig>,
    input: web::Json<ProfileUpdate>,
) -> ApiResult<HttpResponse> {
    let update = input.into_inner();
    let blobs = match update.image {
        Some(_) => image_service::connect(config.media_bucket.as_deref()).await,
        None => None,
    };

    let repo = MongoAdminRepository::new(&store);
    let profile = account_service::update_profile(&repo, blobs.as_ref(), &admin.admin_id, update).await?;
    Ok(HttpResponse::Ok().json(AdminSession::from(profile)))
}

pub async fn change_password(
    admin: AuthenticatedAdmin,
    store: web::Data<Store>,
    input: web::Json<PasswordChange>,
) -> ApiResult<HttpResponse> {
    let repo = MongoAdminRepository::new(&store);
    account_service::change_password(&repo, &admin.admin_id, &input).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Password updated successfully" })))
}

pub async fn get_preference<P: Preference>(
    admin: AuthenticatedAdmin,
    config: web::Data<AppConfig>,
) -> ApiResult<HttpResponse> {
    let value: P = settings_store(&config).load(&admin.admin_id.to_hex()).await?;
    Ok(HttpResponse::Ok().json(value))
}

pub async fn save_preference<P: Preference>(
    admin: AuthenticatedAdmin,
    config: web::Data<AppConfig>,
    input: web::Json<P>,
) -> ApiResult<HttpResponse> {
    let saved = settings_store(&config)
        .save(&admin.admin_id.to_hex(), input.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(saved))
}

pub async fn verify_two_factor(
    admin: AuthenticatedAdmin,
    config: web::Data<AppConfig>,
    input: web::Json<TwoFactorVerification>,
) -> ApiResult<HttpResponse> {
    account_service::verify_two_factor_code(&input.verification_code)?;

    let store = settings_store(&config);
    let admin_id = admin.admin_id.to_hex();
    let mut security: SecuritySettings = store.load(&admin_id).await?;
    security.two_factor_enabled = true;
    let saved = store.save(&admin_id, security).await?;

    log::info!("Two-factor authentication enabled for admin {}", admin_id);
    Ok(HttpResponse::Ok().json(saved))
}

/// Returns a simulated backup file as a download; nothing is exported.
pub async fn create_backup(admin: AuthenticatedAdmin, input: web::Json<BackupRequest>) -> HttpResponse {
    let now = Utc::now();
    let backup_type = report_service::backup_type(input.backup_type.as_deref());
    let file_name = report_service::backup_file_name(backup_type, now);

    log::info!("Admin {} requested a {} backup", admin.admin_id, backup_type);

    HttpResponse::Ok()
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file_name),
        ))
        .json(report_service::backup_file(backup_type, now))
}
