use chrono::{Days, NaiveDate};
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::Collection;

use crate::db::mongo::{Store, BOOKINGS, REVIEWS};
use crate::error::{ApiError, ApiResult};
use crate::models::booking::{
    Booking, BookingRequest, BookingStatusUpdate, BOOKING_STATUSES, PAYMENT_STATUSES, STATUS_PENDING,
};
use crate::models::format_date;
use crate::models::review::Review;
use crate::models::tour::AvailableDateResponse;
use crate::services::tour_service::{day_of_week, parse_date};

pub const DEFAULT_DATE_COUNT: u64 = 7;
pub const UPCOMING_DATE_LIMIT: i64 = 14;
const BASE_PRICE: f64 = 775_000.0;
const WEEKEND_MARKUP_PERCENT: f64 = 120.0;

pub fn default_price(date: NaiveDate) -> f64 {
    match day_of_week(date) {
        0 | 6 => BASE_PRICE * WEEKEND_MARKUP_PERCENT / 100.0,
        _ => BASE_PRICE,
    }
}

/// Seven days starting at `today`, used when a tour has no upcoming dates.
pub fn default_dates(tour_id: &str, today: NaiveDate) -> Vec<AvailableDateResponse> {
    (0..DEFAULT_DATE_COUNT)
        .filter_map(|offset| today.checked_add_days(Days::new(offset)))
        .map(|date| {
            let day = day_of_week(date);
            AvailableDateResponse {
                id: format!("{}_{}", tour_id, date.format("%Y-%m-%d")),
                tour_id: tour_id.to_string(),
                date: date.format("%Y-%m-%d").to_string(),
                day_of_week: day,
                day_name: crate::models::tour::day_name(day).to_string(),
                price: default_price(date),
                is_holiday: false,
            }
        })
        .collect()
}

/// A booking request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidBookingRequest {
    pub tour_id: String,
    pub tour_object_id: ObjectId,
    pub date: NaiveDate,
    pub number_of_person: u32,
}

pub fn validate_booking_request(request: &BookingRequest) -> ApiResult<ValidBookingRequest> {
    let tour_id = request
        .tour_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(ApiError::missing_fields)?;
    let date = request
        .tour_date_start
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(ApiError::missing_fields)?;
    let number_of_person = request
        .number_of_person
        .ok_or_else(ApiError::missing_fields)?;

    let tour_object_id = ObjectId::parse_str(tour_id)
        .map_err(|_| ApiError::Validation("Invalid tour id.".to_string()))?;
    let date = parse_date(date)
        .ok_or_else(|| ApiError::Validation("Tour date must be formatted as YYYY-MM-DD.".to_string()))?;
    if number_of_person < 1 {
        return Err(ApiError::Validation(
            "Number of participants must be at least 1.".to_string(),
        ));
    }

    Ok(ValidBookingRequest {
        tour_id: tour_id.to_string(),
        tour_object_id,
        date,
        number_of_person,
    })
}

/// Per-person price times party size. A missing stored date is priced like the
/// generated default for that day.
pub fn quote_total(stored_price: Option<f64>, date: NaiveDate, number_of_person: u32) -> f64 {
    stored_price.unwrap_or_else(|| default_price(date)) * f64::from(number_of_person)
}

fn check_known(value: &Option<String>, known: &[&str], field: &str) -> ApiResult<Option<String>> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => {
            let v = v.to_lowercase();
            if known.contains(&v.as_str()) {
                Ok(Some(v))
            } else {
                Err(ApiError::Validation(format!("Unknown {}: {}", field, v)))
            }
        }
    }
}

/// Builds the `$set` document for an admin status change.
pub fn status_update_fields(update: &BookingStatusUpdate) -> ApiResult<Document> {
    let status = check_known(&update.status, &BOOKING_STATUSES, "booking status")?;
    let payment_status = check_known(&update.payment_status, &PAYMENT_STATUSES, "payment status")?;

    let mut fields = Document::new();
    if let Some(status) = status {
        fields.insert("status", status);
    }
    if let Some(payment_status) = payment_status {
        fields.insert("payment_status", payment_status);
    }
    if fields.is_empty() {
        return Err(ApiError::missing_fields());
    }
    Ok(fields)
}

pub fn new_booking(request: &BookingRequest, valid: &ValidBookingRequest, stored_price: Option<f64>) -> Booking {
    Booking {
        id: None,
        tour_id: Some(valid.tour_id.clone()),
        user_id: request.user_id.clone(),
        participant_name: request.participant_name.clone(),
        participant_email: request.participant_email.clone(),
        participant_phone_number: request.participant_phone_number.clone(),
        tour_date_start: Some(crate::services::tour_service::date_start(valid.date)),
        number_of_person: Some(valid.number_of_person),
        total_price: Some(quote_total(stored_price, valid.date, valid.number_of_person)),
        status: Some(STATUS_PENDING.to_string()),
        payment_status: Some(STATUS_PENDING.to_string()),
        created_at: Some(DateTime::now()),
    }
}

pub struct MongoBookingRepository {
    bookings: Collection<Booking>,
    reviews: Collection<Review>,
}

impl MongoBookingRepository {
    pub fn new(store: &Store) -> Self {
        Self {
            bookings: store.collection(BOOKINGS),
            reviews: store.collection(REVIEWS),
        }
    }

    pub async fn list_bookings(&self, status: Option<&str>) -> ApiResult<Vec<Booking>> {
        let filter = match status.map(str::trim).filter(|s| !s.is_empty() && *s != "all") {
            Some(status) => doc! { "status": status.to_lowercase() },
            None => doc! {},
        };
        let cursor = self
            .bookings
            .find(filter)
            .sort(doc! { "tour_date_start": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn find_booking(&self, id: &ObjectId) -> ApiResult<Option<Booking>> {
        Ok(self.bookings.find_one(doc! { "_id": id }).await?)
    }

    pub async fn insert_booking(&self, booking: &Booking) -> ApiResult<ObjectId> {
        let result = self.bookings.insert_one(booking).await?;
        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| ApiError::Internal("Inserted booking has no ObjectId".to_string()))
    }

    pub async fn update_booking(&self, id: &ObjectId, fields: Document) -> ApiResult<bool> {
        let result = self
            .bookings
            .update_one(doc! { "_id": id }, doc! { "$set": fields })
            .await?;
        Ok(result.matched_count > 0)
    }

    pub async fn delete_booking(&self, id: &ObjectId) -> ApiResult<bool> {
        let result = self.bookings.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }

    pub async fn list_reviews(&self, tour_id: Option<&str>) -> ApiResult<Vec<Review>> {
        let filter = match tour_id.map(str::trim).filter(|s| !s.is_empty()) {
            Some(tour_id) => doc! { "tour_id": tour_id },
            None => doc! {},
        };
        let cursor = self
            .reviews
            .find(filter)
            .sort(doc! { "created_at": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn delete_review(&self, id: &ObjectId) -> ApiResult<bool> {
        let result = self.reviews.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }
}

/// `YYYY-MM-DD` of a stored date, for matching a request against it.
pub fn same_day(stored: DateTime, date: NaiveDate) -> bool {
    format_date(stored) == date.format("%Y-%m-%d").to_string()
}
