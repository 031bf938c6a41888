use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use crate::models::to_rfc3339;
use crate::services::image_service::ImageData;

pub const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Admin {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub full_name: String,
    pub email: String,
    pub password: String, // Always hashed
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub profile_image_url: Option<String>,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime>,
}

#[derive(Debug, Deserialize, Default)]
pub struct SignupRequest {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct SigninRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub auth_token: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub image: Option<ImageData>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PasswordChange {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
    #[serde(default)]
    pub confirm_password: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct TwoFactorVerification {
    #[serde(default)]
    pub verification_code: String,
}

#[derive(Debug, Serialize)]
pub struct AdminSession {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub profile_image_url: Option<String>,
    pub role: String,
    pub created_at: Option<String>,
}

impl From<Admin> for AdminSession {
    fn from(admin: Admin) -> Self {
        Self {
            id: admin.id.map(|id| id.to_hex()).unwrap_or_default(),
            full_name: admin.full_name,
            email: admin.email,
            phone_number: admin.phone_number,
            profile_image_url: admin.profile_image_url,
            role: admin.role,
            created_at: admin.created_at.map(to_rfc3339),
        }
    }
}
