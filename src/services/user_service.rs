use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime};
use mongodb::Collection;
use serde::Serialize;
use serde_with::skip_serializing_none;

use crate::db::mongo::{parse_id, Store, USERS};
use crate::error::{ApiError, ApiResult};
use crate::models::user::{FavoriteTour, User, UserInput};
use crate::services::image_service::{self, BlobStore, ImageData};
use crate::services::tour_service::TourRepository;

#[derive(Debug, Clone, PartialEq)]
pub struct ValidUser {
    pub full_name: String,
    pub user_name: String,
    pub email: String,
    pub phone_number: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Serialize)]
struct UserUpdate {
    full_name: String,
    user_name: String,
    email: String,
    phone_number: Option<String>,
    user_image_url: Option<String>,
    updated_at: DateTime,
}

fn required(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub fn validate_user_input(input: &UserInput) -> ApiResult<ValidUser> {
    let (Some(full_name), Some(user_name), Some(email)) = (
        required(&input.full_name),
        required(&input.user_name),
        required(&input.email),
    ) else {
        return Err(ApiError::missing_fields());
    };

    Ok(ValidUser {
        full_name,
        user_name,
        email,
        phone_number: input.phone_number.as_deref().map(str::trim).map(str::to_string),
    })
}

/// Case-insensitive match on full name, user name or email.
pub fn matches_search(user: &User, search: Option<&str>) -> bool {
    let Some(query) = search.map(str::trim).filter(|s| !s.is_empty()) else {
        return true;
    };
    let query = query.to_lowercase();

    [&user.full_name, &user.user_name, &user.email]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&query))
}

pub struct MongoUserRepository {
    users: Collection<User>,
}

impl MongoUserRepository {
    pub fn new(store: &Store) -> Self {
        Self {
            users: store.collection(USERS),
        }
    }

    pub async fn list(&self) -> ApiResult<Vec<User>> {
        let cursor = self.users.find(doc! {}).sort(doc! { "created_at": -1 }).await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn find(&self, id: &ObjectId) -> ApiResult<Option<User>> {
        Ok(self.users.find_one(doc! { "_id": id }).await?)
    }

    pub async fn insert(&self, user: &User) -> ApiResult<ObjectId> {
        let result = self.users.insert_one(user).await?;
        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| ApiError::Internal("Inserted user has no ObjectId".to_string()))
    }

    async fn update(&self, id: &ObjectId, update: &UserUpdate) -> ApiResult<()> {
        let fields = mongodb::bson::to_document(update)
            .map_err(|e| ApiError::Internal(format!("Failed to encode user update: {}", e)))?;
        self.users
            .update_one(doc! { "_id": id }, doc! { "$set": fields })
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: &ObjectId) -> ApiResult<()> {
        self.users.delete_one(doc! { "_id": id }).await?;
        Ok(())
    }
}

async fn upload_user_image<B: BlobStore>(blobs: Option<&B>, image: Option<ImageData>) -> ApiResult<Option<String>> {
    let Some(image) = image else {
        return Ok(None);
    };
    let blobs = blobs.ok_or_else(|| ApiError::Internal("Image storage is not configured".to_string()))?;

    let object_name =
        image_service::entity_object_name(USERS, Utc::now().timestamp_millis(), &image.file_name);
    Ok(Some(blobs.upload(&object_name, image).await?))
}

pub async fn create_user<B: BlobStore>(
    repo: &MongoUserRepository,
    blobs: Option<&B>,
    input: UserInput,
) -> ApiResult<User> {
    let valid = validate_user_input(&input)?;
    let user_image_url = upload_user_image(blobs, input.image).await?;

    let now = DateTime::now();
    let mut user = User {
        id: None,
        full_name: Some(valid.full_name),
        user_name: Some(valid.user_name),
        email: Some(valid.email),
        phone_number: valid.phone_number,
        user_image_url,
        favorite_tours: Vec::new(),
        created_at: Some(now),
        updated_at: Some(now),
    };

    user.id = Some(repo.insert(&user).await?);
    Ok(user)
}

pub async fn update_user<B: BlobStore>(
    repo: &MongoUserRepository,
    blobs: Option<&B>,
    id: &ObjectId,
    input: UserInput,
) -> ApiResult<User> {
    let valid = validate_user_input(&input)?;

    let existing = repo
        .find(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let user_image_url = upload_user_image(blobs, input.image).await?;
    let replaced_image = user_image_url.is_some();

    let update = UserUpdate {
        full_name: valid.full_name,
        user_name: valid.user_name,
        email: valid.email,
        phone_number: valid.phone_number,
        user_image_url,
        updated_at: DateTime::now(),
    };
    repo.update(id, &update).await?;

    if replaced_image {
        image_service::delete_quietly(blobs, existing.user_image_url.as_deref()).await;
    }

    repo.find(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
}

pub async fn delete_user<B: BlobStore>(
    repo: &MongoUserRepository,
    blobs: Option<&B>,
    user: &User,
) -> ApiResult<()> {
    let id = user
        .id
        .ok_or_else(|| ApiError::Internal("User has no id".to_string()))?;

    image_service::delete_quietly(blobs, user.user_image_url.as_deref()).await;
    repo.delete(&id).await?;

    log::info!("Deleted user {}", id);
    Ok(())
}

/// One row per favorite id. A failing lookup yields an error row instead of
/// failing the whole list.
pub async fn resolve_favorites<R: TourRepository>(repo: &R, favorite_ids: &[String]) -> Vec<FavoriteTour> {
    let mut favorites = Vec::with_capacity(favorite_ids.len());

    for tour_id in favorite_ids {
        let Some(oid) = parse_id(tour_id) else {
            favorites.push(FavoriteTour::not_found(tour_id));
            continue;
        };

        let row = match repo.find_tour(&oid).await {
            Ok(Some(tour)) => FavoriteTour {
                tour_id: tour_id.clone(),
                title: tour.title,
                category: Some(tour.category),
                status: Some(tour.status.as_str().to_string()),
                found: true,
                error: None,
            },
            Ok(None) => FavoriteTour::not_found(tour_id),
            Err(e) => {
                log::error!("Error loading favorite tour {}: {}", tour_id, e);
                FavoriteTour::lookup_failed(tour_id, e.to_string())
            }
        };
        favorites.push(row);
    }

    favorites
}
