use actix_web::{web, HttpResponse};
use chrono::Utc;

use crate::db::mongo::Store;
use crate::error::{ApiError, ApiResult};
use crate::models::booking::{BookingRequest, BookingResponse};
use crate::models::tour::AvailableDateResponse;
use crate::services::booking_service::{self, MongoBookingRepository, UPCOMING_DATE_LIMIT};
use crate::services::tour_service::{self, MongoTourRepository, TourRepository};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/catalog")
            .route("/tours/{id}/dates", web::get().to(tour_dates))
            .route("/bookings", web::post().to(create_booking)),
    );
}

/// Upcoming dates of a tour, or a generated week of default dates when none
/// are stored or they cannot be loaded.
pub async fn tour_dates(store: web::Data<Store>, path: web::Path<String>) -> HttpResponse {
    let tour_id = path.into_inner();
    let today = Utc::now().date_naive();

    let stored = MongoTourRepository::new(&store)
        .upcoming_dates(&tour_id, tour_service::date_start(today), UPCOMING_DATE_LIMIT)
        .await;

    let dates: Vec<AvailableDateResponse> = match stored {
        Ok(dates) if !dates.is_empty() => dates.into_iter().map(AvailableDateResponse::from).collect(),
        Ok(_) => booking_service::default_dates(&tour_id, today),
        Err(e) => {
            log::warn!("Using default dates for tour {}: {}", tour_id, e);
            booking_service::default_dates(&tour_id, today)
        }
    };

    HttpResponse::Ok().json(dates)
}

pub async fn create_booking(store: web::Data<Store>, input: web::Json<BookingRequest>) -> ApiResult<HttpResponse> {
    let request = input.into_inner();
    let valid = booking_service::validate_booking_request(&request)?;

    let tours = MongoTourRepository::new(&store);
    tours
        .find_tour(&valid.tour_object_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Tour not found".to_string()))?;

    let stored_price = tours
        .find_date_on(&valid.tour_id, tour_service::date_start(valid.date))
        .await?
        .map(|d| d.price);

    let mut booking = booking_service::new_booking(&request, &valid, stored_price);
    booking.id = Some(MongoBookingRepository::new(&store).insert_booking(&booking).await?);

    log::info!("Booking {:?} created for tour {}", booking.id, valid.tour_id);
    Ok(HttpResponse::Created().json(BookingResponse::from(booking)))
}
