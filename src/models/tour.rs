use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use crate::models::{format_date, to_rfc3339};
use crate::services::image_service::ImageData;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TourStatus {
    Active,
    Inactive,
    Archived,
    Completed,
    Pending,
}

impl TourStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TourStatus::Active => "active",
            TourStatus::Inactive => "inactive",
            TourStatus::Archived => "archived",
            TourStatus::Completed => "completed",
            TourStatus::Pending => "pending",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "active" => Some(TourStatus::Active),
            "inactive" => Some(TourStatus::Inactive),
            "archived" => Some(TourStatus::Archived),
            "completed" => Some(TourStatus::Completed),
            "pending" => Some(TourStatus::Pending),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Tour {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    pub description: String,
    pub category: String,
    pub status: TourStatus,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub tour_image_url: Option<String>,
    #[serde(default)]
    pub pickup_loc: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub provider_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime>,
}

/// Body of the tour form. Every field is optional so a missing one becomes a
/// validation message instead of a deserialization failure.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct TourInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub provider_phone: Option<String>,
    pub pickup_loc: Option<String>,
    pub address: Option<String>,
    pub image: Option<ImageData>,
}

#[derive(Debug, Deserialize)]
pub struct TourListQuery {
    pub status: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TourResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub status: TourStatus,
    pub rating: f64,
    pub tour_image_url: Option<String>,
    pub pickup_loc: Option<String>,
    pub address: Option<String>,
    pub provider_phone: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl From<Tour> for TourResponse {
    fn from(tour: Tour) -> Self {
        Self {
            id: tour.id.map(|id| id.to_hex()).unwrap_or_default(),
            title: tour.title,
            description: tour.description,
            category: tour.category,
            status: tour.status,
            rating: tour.rating,
            tour_image_url: tour.tour_image_url,
            pickup_loc: tour.pickup_loc,
            address: tour.address,
            provider_phone: tour.provider_phone,
            created_at: tour.created_at.map(to_rfc3339),
            updated_at: tour.updated_at.map(to_rfc3339),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AvailableDate {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub tour_id: String,
    pub date: DateTime,
    pub day_of_week: u32,
    pub price: f64,
    #[serde(default)]
    pub is_holiday: bool,
}

#[derive(Debug, Deserialize, Default)]
pub struct AvailableDateInput {
    /// `YYYY-MM-DD`
    pub date: Option<String>,
    pub price: Option<f64>,
    #[serde(default)]
    pub is_holiday: bool,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct AvailableDateResponse {
    pub id: String,
    pub tour_id: String,
    pub date: String,
    pub day_of_week: u32,
    pub day_name: String,
    pub price: f64,
    pub is_holiday: bool,
}

impl From<AvailableDate> for AvailableDateResponse {
    fn from(date: AvailableDate) -> Self {
        Self {
            id: date.id.map(|id| id.to_hex()).unwrap_or_default(),
            tour_id: date.tour_id,
            date: format_date(date.date),
            day_of_week: date.day_of_week,
            day_name: day_name(date.day_of_week).to_string(),
            price: date.price,
            is_holiday: date.is_holiday,
        }
    }
}

/// Day index with 0 = Sunday.
pub fn day_name(day_of_week: u32) -> &'static str {
    match day_of_week {
        0 => "Sunday",
        1 => "Monday",
        2 => "Tuesday",
        3 => "Wednesday",
        4 => "Thursday",
        5 => "Friday",
        6 => "Saturday",
        _ => "Unknown",
    }
}
