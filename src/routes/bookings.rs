use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::db::mongo::Store;
use crate::error::{ApiError, ApiResult};
use crate::models::booking::{BookingListQuery, BookingResponse, BookingStatusUpdate};
use crate::routes::path_id;
use crate::services::booking_service::{self, MongoBookingRepository};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/bookings")
            .route("", web::get().to(list_bookings))
            .route("/{id}", web::get().to(get_booking))
            .route("/{id}", web::put().to(update_booking_status))
            .route("/{id}", web::delete().to(delete_booking)),
    );
}

fn booking_not_found() -> ApiError {
    ApiError::NotFound("Booking not found".to_string())
}

pub async fn list_bookings(store: web::Data<Store>, query: web::Query<BookingListQuery>) -> ApiResult<HttpResponse> {
    let bookings: Vec<BookingResponse> = MongoBookingRepository::new(&store)
        .list_bookings(query.status.as_deref())
        .await?
        .into_iter()
        .map(BookingResponse::from)
        .collect();
    Ok(HttpResponse::Ok().json(bookings))
}

pub async fn get_booking(store: web::Data<Store>, path: web::Path<String>) -> ApiResult<HttpResponse> {
    let id = path_id(&path, "Booking")?;
    let booking = MongoBookingRepository::new(&store)
        .find_booking(&id)
        .await?
        .ok_or_else(booking_not_found)?;
    Ok(HttpResponse::Ok().json(BookingResponse::from(booking)))
}

pub async fn update_booking_status(
    store: web::Data<Store>,
    path: web::Path<String>,
    input: web::Json<BookingStatusUpdate>,
) -> ApiResult<HttpResponse> {
    let id = path_id(&path, "Booking")?;
    let fields = booking_service::status_update_fields(&input)?;

    let repo = MongoBookingRepository::new(&store);
    if !repo.update_booking(&id, fields).await? {
        return Err(booking_not_found());
    }

    let booking = repo.find_booking(&id).await?.ok_or_else(booking_not_found)?;
    log::info!("Booking {} now {}", id, booking.display_status());
    Ok(HttpResponse::Ok().json(BookingResponse::from(booking)))
}

pub async fn delete_booking(store: web::Data<Store>, path: web::Path<String>) -> ApiResult<HttpResponse> {
    let id = path_id(&path, "Booking")?;
    if !MongoBookingRepository::new(&store).delete_booking(&id).await? {
        return Err(booking_not_found());
    }
    Ok(HttpResponse::Ok().json(json!({ "message": "Booking deleted successfully" })))
}
