use actix_web::{web, HttpResponse, Responder};
use google_cloud_storage::client::{Client as GcsClient, ClientConfig};
use google_cloud_storage::http::objects::list::ListObjectsRequest;
use mongodb::bson::doc;
use serde::Serialize;
use std::collections::HashMap;
use std::env;

use crate::config::AppConfig;
use crate::db::mongo::Store;

#[derive(Serialize)]
struct HealthStatus {
    status: String,
    services: HashMap<String, ServiceStatus>,
    environment: String,
    version: String,
}

#[derive(Serialize, Clone)]
struct ServiceStatus {
    status: String,
    details: Option<String>,
}

impl ServiceStatus {
    fn ok(details: String) -> Self {
        Self {
            status: "ok".to_string(),
            details: Some(details),
        }
    }

    fn error(details: String) -> Self {
        Self {
            status: "error".to_string(),
            details: Some(details),
        }
    }
}

pub async fn health_check(store: web::Data<Store>, config: web::Data<AppConfig>) -> impl Responder {
    let mut health = HealthStatus {
        status: "ok".to_string(),
        services: HashMap::new(),
        environment: env::var("RUST_ENV").unwrap_or("development".to_string()),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    let mongo_result = check_mongodb(&store).await;
    let storage_result = check_cloud_storage(config.media_bucket.as_deref()).await;

    // Any failing dependency degrades the overall status.
    if mongo_result.status != "ok" || storage_result.status != "ok" {
        health.status = "degraded".to_string();
    }

    health.services.insert("mongodb".to_string(), mongo_result);
    health.services.insert("cloud_storage".to_string(), storage_result);

    HttpResponse::Ok().json(health)
}

async fn check_mongodb(store: &Store) -> ServiceStatus {
    match store.database().run_command(doc! {"ping": 1}).await {
        Ok(_) => ServiceStatus::ok("Connected successfully to MongoDB".to_string()),
        Err(e) => {
            log::error!("MongoDB health check failed: {}", e);
            ServiceStatus::error(format!("Failed to connect: {}", e))
        }
    }
}

async fn check_cloud_storage(bucket: Option<&str>) -> ServiceStatus {
    let Some(bucket_name) = bucket else {
        return ServiceStatus::error("Missing bucket configuration: MEDIA_BUCKET".to_string());
    };

    let client_config = match ClientConfig::default().with_auth().await {
        Ok(config) => config,
        Err(e) => {
            return ServiceStatus::error(format!("Failed to initialize GCS client config: {}", e));
        }
    };

    let gcs_client = GcsClient::new(client_config);

    let list_request = ListObjectsRequest {
        bucket: bucket_name.to_string(),
        max_results: Some(1),
        ..Default::default()
    };

    match gcs_client.list_objects(&list_request).await {
        Ok(_) => ServiceStatus::ok(format!(
            "Connected to Cloud Storage: media bucket '{}' accessible",
            bucket_name
        )),
        Err(e) => ServiceStatus::error(format!("Failed to access Cloud Storage bucket: {}", e)),
    }
}
