use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::db::mongo::Store;
use crate::error::{ApiError, ApiResult};
use crate::models::review::{ReviewListQuery, ReviewResponse};
use crate::routes::path_id;
use crate::services::booking_service::MongoBookingRepository;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/reviews")
            .route("", web::get().to(list_reviews))
            .route("/{id}", web::delete().to(delete_review)),
    );
}

pub async fn list_reviews(store: web::Data<Store>, query: web::Query<ReviewListQuery>) -> ApiResult<HttpResponse> {
    let reviews: Vec<ReviewResponse> = MongoBookingRepository::new(&store)
        .list_reviews(query.tour_id.as_deref())
        .await?
        .into_iter()
        .map(ReviewResponse::from)
        .collect();
    Ok(HttpResponse::Ok().json(reviews))
}

pub async fn delete_review(store: web::Data<Store>, path: web::Path<String>) -> ApiResult<HttpResponse> {
    let id = path_id(&path, "Review")?;
    if !MongoBookingRepository::new(&store).delete_review(&id).await? {
        return Err(ApiError::NotFound("Review not found".to_string()));
    }
    Ok(HttpResponse::Ok().json(json!({ "message": "Review deleted successfully" })))
}
