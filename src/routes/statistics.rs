use actix_web::{http::header, web, HttpResponse};
use chrono::Utc;

use crate::db::mongo::Store;
use crate::models::statistics::{DateRange, StatisticsQuery};
use crate::services::{report_service, statistics_service};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/statistics")
            .route("", web::get().to(report))
            .route("/report.csv", web::get().to(export_csv)),
    );
}

pub async fn report(store: web::Data<Store>, query: web::Query<StatisticsQuery>) -> HttpResponse {
    let range = DateRange::parse(query.range.as_deref());
    let report = statistics_service::load_report(&store, range, Utc::now()).await;
    HttpResponse::Ok().json(report)
}

pub async fn export_csv(store: web::Data<Store>, query: web::Query<StatisticsQuery>) -> HttpResponse {
    let range = DateRange::parse(query.range.as_deref());
    let now = Utc::now();
    let report = statistics_service::load_report(&store, range, now).await;

    let file_name = report_service::csv_file_name(&report, now);
    log::info!("Exporting statistics report {}", file_name);

    HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file_name),
        ))
        .body(report_service::render_csv(&report, now))
}
