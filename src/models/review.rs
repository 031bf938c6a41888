use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use crate::models::to_rfc3339;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Review {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub tour_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewListQuery {
    pub tour_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub id: String,
    pub rating: f64,
    pub comment: Option<String>,
    pub user_id: Option<String>,
    pub tour_id: Option<String>,
    pub created_at: Option<String>,
}

impl From<Review> for ReviewResponse {
    fn from(review: Review) -> Self {
        Self {
            id: review.id.map(|id| id.to_hex()).unwrap_or_default(),
            rating: review.rating.unwrap_or(0.0),
            comment: review.comment,
            user_id: review.user_id,
            tour_id: review.tour_id,
            created_at: review.created_at.map(to_rfc3339),
        }
    }
}
