use base64::{engine::general_purpose, Engine as _};
use google_cloud_storage::client::{Client, ClientConfig};
use google_cloud_storage::http::objects::delete::DeleteObjectRequest;
use google_cloud_storage::http::objects::upload::{Media, UploadObjectRequest, UploadType};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const PUBLIC_HOST: &str = "https://storage.googleapis.com";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ImageData {
    pub data: String,
    #[serde(rename = "fileName")]
    pub file_name: String,
    #[serde(rename = "fileType")]
    pub file_type: String,
}

#[derive(Debug, Error)]
pub enum ImageUploadError {
    #[error("Base64 decode error: {0}")]
    Base64DecodeError(String),
    #[error("GCS error: {0}")]
    GcsError(String),
    #[error("Invalid image format: {0}")]
    InvalidImageFormat(String),
    #[error("Environment error: {0}")]
    EnvironmentError(String),
    #[error("Not an object of this bucket: {0}")]
    ForeignUrl(String),
}

/// Object storage for tour, user and admin pictures.
#[allow(async_fn_in_trait)]
pub trait BlobStore {
    /// Stores the image under `object_name` and returns its public URL.
    async fn upload(&self, object_name: &str, image: ImageData) -> Result<String, ImageUploadError>;

    async fn delete(&self, url: &str) -> Result<(), ImageUploadError>;
}

/// `{entity}/{millis}_{filename}`
pub fn entity_object_name(entity: &str, millis: i64, file_name: &str) -> String {
    format!("{}/{}_{}", entity, millis, sanitize_file_name(file_name))
}

/// `admins/{admin_id}_{millis}`
pub fn admin_object_name(admin_id: &str, millis: i64) -> String {
    format!("admins/{}_{}", admin_id, millis)
}

fn sanitize_file_name(file_name: &str) -> String {
    let name = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name).trim();
    if name.is_empty() {
        "image".to_string()
    } else {
        name.replace(' ', "_")
    }
}

pub fn public_url(bucket: &str, object_name: &str) -> String {
    format!("{}/{}/{}", PUBLIC_HOST, bucket, object_name)
}

pub fn object_name_from_url(bucket: &str, url: &str) -> Result<String, ImageUploadError> {
    let prefix = format!("{}/{}/", PUBLIC_HOST, bucket);
    url.strip_prefix(&prefix)
        .filter(|name| !name.is_empty())
        .map(|name| name.split('?').next().unwrap_or(name).to_string())
        .ok_or_else(|| ImageUploadError::ForeignUrl(url.to_string()))
}

pub fn decode_image(image: &ImageData) -> Result<Vec<u8>, ImageUploadError> {
    check_file_type(&image.file_type)?;

    let base64_data = if image.data.starts_with("data:") {
        image.data.split(',').nth(1).ok_or_else(|| {
            ImageUploadError::InvalidImageFormat("Invalid base64 data format".to_string())
        })?
    } else {
        &image.data
    };

    general_purpose::STANDARD
        .decode(base64_data)
        .map_err(|e| ImageUploadError::Base64DecodeError(e.to_string()))
}

fn check_file_type(file_type: &str) -> Result<(), ImageUploadError> {
    match file_type {
        "image/jpeg" | "image/jpg" | "image/png" | "image/gif" | "image/webp" => Ok(()),
        _ => Err(ImageUploadError::InvalidImageFormat(format!(
            "Unsupported file type: {}",
            file_type
        ))),
    }
}

pub struct ImageService {
    client: Client,
    bucket_name: String,
}

impl ImageService {
    pub async fn new(bucket_name: Option<&str>) -> Result<Self, ImageUploadError> {
        let bucket_name = bucket_name
            .map(str::to_string)
            .ok_or_else(|| ImageUploadError::EnvironmentError("MEDIA_BUCKET not set".to_string()))?;

        let config = ClientConfig::default()
            .with_auth()
            .await
            .map_err(|e| ImageUploadError::GcsError(format!("Failed to create GCS client: {}", e)))?;

        Ok(Self {
            client: Client::new(config),
            bucket_name,
        })
    }
}

impl BlobStore for ImageService {
    async fn upload(&self, object_name: &str, image: ImageData) -> Result<String, ImageUploadError> {
        let image_bytes = decode_image(&image)?;

        let mut media = Media::new(object_name.to_string());
        media.content_type = image.file_type.clone().into();
        let upload_type = UploadType::Simple(media);
        let upload_request = UploadObjectRequest {
            bucket: self.bucket_name.clone(),
            ..Default::default()
        };

        self.client
            .upload_object(&upload_request, image_bytes, &upload_type)
            .await
            .map_err(|e| ImageUploadError::GcsError(format!("Failed to upload to GCS: {}", e)))?;

        log::info!("Uploaded {} to bucket {}", object_name, self.bucket_name);
        Ok(public_url(&self.bucket_name, object_name))
    }

    async fn delete(&self, url: &str) -> Result<(), ImageUploadError> {
        let object = object_name_from_url(&self.bucket_name, url)?;

        let request = DeleteObjectRequest {
            bucket: self.bucket_name.clone(),
            object,
            ..Default::default()
        };

        self.client
            .delete_object(&request)
            .await
            .map_err(|e| ImageUploadError::GcsError(format!("Failed to delete from GCS: {}", e)))
    }
}

/// Builds the storage client only when a request actually needs it; without a
/// configured bucket, uploads fail and deletions are skipped.
pub async fn connect(bucket: Option<&str>) -> Option<ImageService> {
    match ImageService::new(bucket).await {
        Ok(service) => Some(service),
        Err(e) => {
            log::warn!("Image storage unavailable: {}", e);
            None
        }
    }
}

/// Deletes a stored image, logging and swallowing any failure.
pub async fn delete_quietly<B: BlobStore>(store: Option<&B>, url: Option<&str>) {
    let (Some(store), Some(url)) = (store, url.filter(|u| !u.is_empty())) else {
        return;
    };

    if let Err(e) = store.delete(url).await {
        log::error!("Error deleting image {}: {}", url, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_object_name() {
        assert_eq!(
            entity_object_name("tours", 1713081600000, "ha long.jpg"),
            "tours/1713081600000_ha_long.jpg"
        );
        assert_eq!(
            entity_object_name("users", 5, "C:\\photos\\me.png"),
            "users/5_me.png"
        );
        assert_eq!(admin_object_name("abc", 7), "admins/abc_7");
    }

    #[test]
    fn test_object_name_from_url() {
        let url = public_url("media", "tours/1_a.jpg");
        assert_eq!(object_name_from_url("media", &url).unwrap(), "tours/1_a.jpg");
        assert!(object_name_from_url("other", &url).is_err());
        assert!(object_name_from_url("media", "https://example.com/a.jpg").is_err());
    }

    #[test]
    fn test_decode_image_accepts_data_urls() {
        let image = ImageData {
            data: "data:image/png;base64,aGVsbG8=".to_string(),
            file_name: "a.png".to_string(),
            file_type: "image/png".to_string(),
        };
        assert_eq!(decode_image(&image).unwrap(), b"hello".to_vec());
    }

    #[test]
    fn test_decode_image_rejects_unknown_types() {
        let image = ImageData {
            data: "aGVsbG8=".to_string(),
            file_name: "a.txt".to_string(),
            file_type: "text/plain".to_string(),
        };
        assert!(matches!(
            decode_image(&image),
            Err(ImageUploadError::InvalidImageFormat(_))
        ));
    }
}
