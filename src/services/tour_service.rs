use chrono::{Datelike, NaiveDate, NaiveTime, Utc};
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::Collection;
use serde::Serialize;
use serde_with::skip_serializing_none;

use crate::db::mongo::{Store, AVAILABLE_DATES, TOURS};
use crate::error::{ApiError, ApiResult};
use crate::models::from_chrono;
use crate::models::tour::{AvailableDate, AvailableDateInput, Tour, TourInput, TourStatus};
use crate::services::image_service::{self, BlobStore, ImageData};

/// A tour form that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidTour {
    pub title: String,
    pub description: String,
    pub category: String,
    pub status: TourStatus,
    pub provider_phone: Option<String>,
    pub pickup_loc: Option<String>,
    pub address: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Serialize)]
struct TourUpdate {
    title: String,
    description: String,
    category: String,
    status: TourStatus,
    provider_phone: Option<String>,
    pickup_loc: Option<String>,
    address: Option<String>,
    tour_image_url: Option<String>,
    updated_at: DateTime,
}

fn required(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn optional(value: &Option<String>) -> Option<String> {
    value.as_deref().map(str::trim).map(str::to_string)
}

pub fn validate_tour_input(input: &TourInput) -> ApiResult<ValidTour> {
    let (Some(title), Some(description), Some(category), Some(status)) = (
        required(&input.title),
        required(&input.description),
        required(&input.category),
        required(&input.status),
    ) else {
        return Err(ApiError::missing_fields());
    };

    let status = TourStatus::parse(&status)
        .ok_or_else(|| ApiError::Validation(format!("Unknown tour status: {}", status)))?;

    Ok(ValidTour {
        title,
        description,
        category,
        status,
        provider_phone: optional(&input.provider_phone),
        pickup_loc: optional(&input.pickup_loc),
        address: optional(&input.address),
    })
}

/// Case-insensitive title match used by the tour list search box.
pub fn matches_search(title: &str, search: Option<&str>) -> bool {
    match search.map(str::trim).filter(|s| !s.is_empty()) {
        Some(query) => title.to_lowercase().contains(&query.to_lowercase()),
        None => true,
    }
}

/// 0 = Sunday ... 6 = Saturday
pub fn day_of_week(date: NaiveDate) -> u32 {
    date.weekday().num_days_from_sunday()
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

pub fn date_start(date: NaiveDate) -> DateTime {
    from_chrono(date.and_time(NaiveTime::MIN).and_utc())
}

pub fn validate_available_date(tour_id: &str, input: &AvailableDateInput) -> ApiResult<AvailableDate> {
    let invalid =
        || ApiError::Validation("Please fill in all required fields with valid values.".to_string());

    let date = input.date.as_deref().and_then(parse_date).ok_or_else(invalid)?;
    let price = input.price.filter(|p| p.is_finite()).ok_or_else(invalid)?;

    Ok(AvailableDate {
        id: None,
        tour_id: tour_id.to_string(),
        date: date_start(date),
        day_of_week: day_of_week(date),
        price,
        is_holiday: input.is_holiday,
    })
}

#[allow(async_fn_in_trait)]
pub trait TourRepository {
    async fn find_tour(&self, id: &ObjectId) -> ApiResult<Option<Tour>>;
    async fn insert_tour(&self, tour: &Tour) -> ApiResult<ObjectId>;
    async fn update_tour(&self, id: &ObjectId, fields: Document) -> ApiResult<()>;
    async fn delete_available_dates(&self, tour_id: &str) -> ApiResult<u64>;
    async fn delete_tour(&self, id: &ObjectId) -> ApiResult<()>;
}

pub struct MongoTourRepository {
    tours: Collection<Tour>,
    dates: Collection<AvailableDate>,
}

impl MongoTourRepository {
    pub fn new(store: &Store) -> Self {
        Self {
            tours: store.collection(TOURS),
            dates: store.collection(AVAILABLE_DATES),
        }
    }

    pub async fn list_tours(&self, status: Option<TourStatus>) -> ApiResult<Vec<Tour>> {
        let filter = match status {
            Some(status) => doc! { "status": status.as_str() },
            None => doc! {},
        };
        let cursor = self.tours.find(filter).sort(doc! { "created_at": -1 }).await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn list_dates(&self, tour_id: &str) -> ApiResult<Vec<AvailableDate>> {
        let cursor = self
            .dates
            .find(doc! { "tour_id": tour_id })
            .sort(doc! { "date": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn upcoming_dates(
        &self,
        tour_id: &str,
        from: DateTime,
        limit: i64,
    ) -> ApiResult<Vec<AvailableDate>> {
        let cursor = self
            .dates
            .find(doc! { "tour_id": tour_id, "date": { "$gte": from } })
            .sort(doc! { "date": 1 })
            .limit(limit)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn find_date_on(&self, tour_id: &str, date: DateTime) -> ApiResult<Option<AvailableDate>> {
        Ok(self
            .dates
            .find_one(doc! { "tour_id": tour_id, "date": date })
            .await?)
    }

    pub async fn insert_date(&self, date: &AvailableDate) -> ApiResult<ObjectId> {
        let result = self.dates.insert_one(date).await?;
        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| ApiError::Internal("Inserted date has no ObjectId".to_string()))
    }

    /// Returns false when no date with this id belongs to the tour.
    pub async fn update_date(&self, tour_id: &str, date_id: &ObjectId, date: &AvailableDate) -> ApiResult<bool> {
        let result = self
            .dates
            .update_one(
                doc! { "_id": date_id, "tour_id": tour_id },
                doc! { "$set": {
                    "date": date.date,
                    "day_of_week": date.day_of_week,
                    "price": date.price,
                    "is_holiday": date.is_holiday,
                } },
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    pub async fn delete_date(&self, tour_id: &str, date_id: &ObjectId) -> ApiResult<bool> {
        let result = self
            .dates
            .delete_one(doc! { "_id": date_id, "tour_id": tour_id })
            .await?;
        Ok(result.deleted_count > 0)
    }
}

impl TourRepository for MongoTourRepository {
    async fn find_tour(&self, id: &ObjectId) -> ApiResult<Option<Tour>> {
        Ok(self.tours.find_one(doc! { "_id": id }).await?)
    }

    async fn insert_tour(&self, tour: &Tour) -> ApiResult<ObjectId> {
        let result = self.tours.insert_one(tour).await?;
        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| ApiError::Internal("Inserted tour has no ObjectId".to_string()))
    }

    async fn update_tour(&self, id: &ObjectId, fields: Document) -> ApiResult<()> {
        self.tours
            .update_one(doc! { "_id": id }, doc! { "$set": fields })
            .await?;
        Ok(())
    }

    async fn delete_available_dates(&self, tour_id: &str) -> ApiResult<u64> {
        let result = self.dates.delete_many(doc! { "tour_id": tour_id }).await?;
        Ok(result.deleted_count)
    }

    async fn delete_tour(&self, id: &ObjectId) -> ApiResult<()> {
        self.tours.delete_one(doc! { "_id": id }).await?;
        Ok(())
    }
}

async fn upload_tour_image<B: BlobStore>(blobs: Option<&B>, image: Option<ImageData>) -> ApiResult<Option<String>> {
    let Some(image) = image else {
        return Ok(None);
    };
    let blobs = blobs.ok_or_else(|| {
        ApiError::Internal("Image storage is not configured".to_string())
    })?;

    let object_name =
        image_service::entity_object_name(TOURS, Utc::now().timestamp_millis(), &image.file_name);
    Ok(Some(blobs.upload(&object_name, image).await?))
}

/// Validates before touching storage or the database.
pub async fn create_tour<R: TourRepository, B: BlobStore>(
    repo: &R,
    blobs: Option<&B>,
    input: TourInput,
) -> ApiResult<Tour> {
    let valid = validate_tour_input(&input)?;
    let tour_image_url = upload_tour_image(blobs, input.image).await?;

    let now = DateTime::now();
    let mut tour = Tour {
        id: None,
        title: valid.title,
        description: valid.description,
        category: valid.category,
        status: valid.status,
        rating: 0.0,
        tour_image_url,
        pickup_loc: valid.pickup_loc,
        address: valid.address,
        provider_phone: valid.provider_phone,
        created_at: Some(now),
        updated_at: Some(now),
    };

    tour.id = Some(repo.insert_tour(&tour).await?);
    log::info!("Created tour {:?} ({})", tour.id, tour.title);
    Ok(tour)
}

pub async fn update_tour<R: TourRepository, B: BlobStore>(
    repo: &R,
    blobs: Option<&B>,
    id: &ObjectId,
    input: TourInput,
) -> ApiResult<Tour> {
    let valid = validate_tour_input(&input)?;

    let existing = repo
        .find_tour(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Tour not found".to_string()))?;

    let tour_image_url = upload_tour_image(blobs, input.image).await?;

    let update = TourUpdate {
        title: valid.title,
        description: valid.description,
        category: valid.category,
        status: valid.status,
        provider_phone: valid.provider_phone,
        pickup_loc: valid.pickup_loc,
        address: valid.address,
        tour_image_url: tour_image_url.clone(),
        updated_at: DateTime::now(),
    };
    let fields = mongodb::bson::to_document(&update)
        .map_err(|e| ApiError::Internal(format!("Failed to encode tour update: {}", e)))?;
    repo.update_tour(id, fields).await?;

    if tour_image_url.is_some() {
        image_service::delete_quietly(blobs, existing.tour_image_url.as_deref()).await;
    }

    repo.find_tour(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Tour not found".to_string()))
}

/// Removes the tour image (best effort), then every available date of the
/// tour, then the tour itself. Not atomic: a failure part-way leaves the tour
/// in place with fewer dates.
pub async fn delete_tour_cascade<R: TourRepository, B: BlobStore>(
    repo: &R,
    blobs: Option<&B>,
    tour: &Tour,
) -> ApiResult<()> {
    let id = tour
        .id
        .ok_or_else(|| ApiError::Internal("Tour has no id".to_string()))?;

    image_service::delete_quietly(blobs, tour.tour_image_url.as_deref()).await;

    let removed = repo.delete_available_dates(&id.to_hex()).await?;
    repo.delete_tour(&id).await?;

    log::info!("Deleted tour {} and {} available dates", id, removed);
    Ok(())
}
