use actix_web::{web, HttpResponse};

use crate::db::mongo::Store;
use crate::services::dashboard_service;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/dashboard")
            .route("", web::get().to(overview))
            .route("/stats", web::get().to(stats))
            .route("/recent-bookings", web::get().to(recent_bookings))
            .route("/revenue", web::get().to(revenue_chart))
            .route("/recent-reviews", web::get().to(recent_reviews)),
    );
}

// Dashboard panels never fail: each one degrades to its sample payload.

pub async fn overview(store: web::Data<Store>) -> HttpResponse {
    HttpResponse::Ok().json(dashboard_service::load_overview(&store).await)
}

pub async fn stats(store: web::Data<Store>) -> HttpResponse {
    HttpResponse::Ok().json(dashboard_service::load_stats(&store).await)
}

pub async fn recent_bookings(store: web::Data<Store>) -> HttpResponse {
    HttpResponse::Ok().json(dashboard_service::load_recent_bookings(&store).await)
}

pub async fn revenue_chart(store: web::Data<Store>) -> HttpResponse {
    HttpResponse::Ok().json(dashboard_service::load_revenue_chart(&store).await)
}

pub async fn recent_reviews(store: web::Data<Store>) -> HttpResponse {
    HttpResponse::Ok().json(dashboard_service::load_recent_reviews(&store).await)
}
