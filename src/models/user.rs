use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use crate::models::to_rfc3339;
use crate::services::image_service::ImageData;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub user_image_url: Option<String>,
    // Tour ids, not enforced: a removed tour leaves a dangling entry here.
    #[serde(default)]
    pub favorite_tours: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime>,
}

impl User {
    pub fn display_name(&self) -> String {
        self.full_name
            .clone()
            .filter(|n| !n.is_empty())
            .or_else(|| self.user_name.clone().filter(|n| !n.is_empty()))
            .unwrap_or_else(|| "Anonymous".to_string())
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct UserInput {
    pub full_name: Option<String>,
    pub user_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub image: Option<ImageData>,
}

#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub full_name: Option<String>,
    pub user_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub user_image_url: Option<String>,
    pub favorite_tours: Vec<String>,
    pub favorite_count: usize,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.map(|id| id.to_hex()).unwrap_or_default(),
            favorite_count: user.favorite_tours.len(),
            full_name: user.full_name,
            user_name: user.user_name,
            email: user.email,
            phone_number: user.phone_number,
            user_image_url: user.user_image_url,
            favorite_tours: user.favorite_tours,
            created_at: user.created_at.map(to_rfc3339),
            updated_at: user.updated_at.map(to_rfc3339),
        }
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct FavoriteTour {
    pub tour_id: String,
    pub title: String,
    pub category: Option<String>,
    pub status: Option<String>,
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FavoriteTour {
    pub fn not_found(tour_id: &str) -> Self {
        Self {
            tour_id: tour_id.to_string(),
            title: "Not Found".to_string(),
            category: None,
            status: None,
            found: false,
            error: None,
        }
    }

    pub fn lookup_failed(tour_id: &str, error: String) -> Self {
        Self {
            tour_id: tour_id.to_string(),
            title: "Error loading tour".to_string(),
            category: None,
            status: None,
            found: false,
            error: Some(error),
        }
    }
}
