use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use crate::models::to_rfc3339;

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_COMPLETED: &str = "completed";
pub const STATUS_CANCELLED: &str = "cancelled";
pub const STATUS_FAILED: &str = "failed";
pub const PAYMENT_PAID: &str = "paid";

pub const BOOKING_STATUSES: [&str; 4] =
    [STATUS_PENDING, STATUS_COMPLETED, STATUS_CANCELLED, STATUS_FAILED];
pub const PAYMENT_STATUSES: [&str; 3] = [STATUS_PENDING, PAYMENT_PAID, STATUS_FAILED];

/// Bookings are written by the mobile app as well as by this service, so every
/// field besides the id tolerates being absent.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Booking {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default)]
    pub tour_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub participant_name: Option<String>,
    #[serde(default)]
    pub participant_email: Option<String>,
    #[serde(default)]
    pub participant_phone_number: Option<String>,
    #[serde(default)]
    pub tour_date_start: Option<DateTime>,
    #[serde(default)]
    pub number_of_person: Option<u32>,
    #[serde(default)]
    pub total_price: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,
}

impl Booking {
    pub fn is_completed(&self) -> bool {
        self.status.as_deref() == Some(STATUS_COMPLETED)
    }

    /// The status the console shows: `status`, else `payment_status`.
    pub fn display_status(&self) -> String {
        self.status
            .clone()
            .or_else(|| self.payment_status.clone())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

#[derive(Debug, Deserialize)]
pub struct BookingListQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct BookingStatusUpdate {
    pub status: Option<String>,
    pub payment_status: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct BookingRequest {
    pub tour_id: Option<String>,
    pub user_id: Option<String>,
    pub participant_name: Option<String>,
    pub participant_email: Option<String>,
    pub participant_phone_number: Option<String>,
    /// `YYYY-MM-DD`
    pub tour_date_start: Option<String>,
    pub number_of_person: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub id: String,
    pub tour_id: Option<String>,
    pub user_id: Option<String>,
    pub participant_name: Option<String>,
    pub participant_email: Option<String>,
    pub participant_phone_number: Option<String>,
    pub tour_date_start: Option<String>,
    pub number_of_person: u32,
    pub total_price: f64,
    pub status: Option<String>,
    pub payment_status: Option<String>,
    pub created_at: Option<String>,
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        Self {
            id: booking.id.map(|id| id.to_hex()).unwrap_or_default(),
            tour_id: booking.tour_id,
            user_id: booking.user_id,
            participant_name: booking.participant_name,
            participant_email: booking.participant_email,
            participant_phone_number: booking.participant_phone_number,
            tour_date_start: booking.tour_date_start.map(to_rfc3339),
            number_of_person: booking.number_of_person.unwrap_or(1),
            total_price: booking.total_price.unwrap_or(0.0),
            status: booking.status,
            payment_status: booking.payment_status,
            created_at: booking.created_at.map(to_rfc3339),
        }
    }
}
