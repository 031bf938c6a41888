use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::config::AppConfig;
use crate::db::mongo::Store;
use crate::error::{ApiError, ApiResult};
use crate::models::tour::{
    AvailableDateInput, AvailableDateResponse, TourInput, TourListQuery, TourResponse, TourStatus,
};
use crate::routes::path_id;
use crate::services::image_service;
use crate::services::tour_service::{self, MongoTourRepository, TourRepository};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/tours")
            .route("", web::get().to(list_tours))
            .route("", web::post().to(create_tour))
            .route("/{id}", web::get().to(get_tour))
            .route("/{id}", web::put().to(update_tour))
            .route("/{id}", web::delete().to(delete_tour))
            .route("/{id}/dates", web::get().to(list_dates))
            .route("/{id}/dates", web::post().to(add_date))
            .route("/{id}/dates/{date_id}", web::put().to(update_date))
            .route("/{id}/dates/{date_id}", web::delete().to(delete_date)),
    );
}

fn tour_not_found() -> ApiError {
    ApiError::NotFound("Tour not found".to_string())
}

pub async fn list_tours(store: web::Data<Store>, query: web::Query<TourListQuery>) -> ApiResult<HttpResponse> {
    let status = match query.status.as_deref().map(str::trim) {
        None | Some("") | Some("all") => None,
        Some(value) => Some(
            TourStatus::parse(value)
                .ok_or_else(|| ApiError::Validation(format!("Unknown tour status: {}", value)))?,
        ),
    };

    let tours = MongoTourRepository::new(&store).list_tours(status).await?;
    let tours: Vec<TourResponse> = tours
        .into_iter()
        .filter(|t| tour_service::matches_search(&t.title, query.search.as_deref()))
        .map(TourResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(tours))
}

pub async fn get_tour(store: web::Data<Store>, path: web::Path<String>) -> ApiResult<HttpResponse> {
    let id = path_id(&path, "Tour")?;
    let tour = MongoTourRepository::new(&store)
        .find_tour(&id)
        .await?
        .ok_or_else(tour_not_found)?;
    Ok(HttpResponse::Ok().json(TourResponse::from(tour)))
}

pub async fn create_tour(
    store: web::Data<Store>,
    config: web::Data<AppConfig>,
    input: web::Json<TourInput>,
) -> ApiResult<HttpResponse> {
    let input = input.into_inner();
    tour_service::validate_tour_input(&input)?;

    let blobs = match input.image {
        Some(_) => image_service::connect(config.media_bucket.as_deref()).await,
        None => None,
    };
    let repo = MongoTourRepository::new(&store);
    let tour = tour_service::create_tour(&repo, blobs.as_ref(), input).await?;

    Ok(HttpResponse::Created().json(TourResponse::from(tour)))
}

pub async fn update_tour(
    store: web::Data<Store>,
    config: web::Data<AppConfig>,
    path: web::Path<String>,
    input: web::Json<TourInput>,
) -> ApiResult<HttpResponse> {
    let id = path_id(&path, "Tour")?;
    let input = input.into_inner();
    tour_service::validate_tour_input(&input)?;

    let blobs = match input.image {
        Some(_) => image_service::connect(config.media_bucket.as_deref()).await,
        None => None,
    };
    let repo = MongoTourRepository::new(&store);
    let tour = tour_service::update_tour(&repo, blobs.as_ref(), &id, input).await?;

    Ok(HttpResponse::Ok().json(TourResponse::from(tour)))
}

pub async fn delete_tour(
    store: web::Data<Store>,
    config: web::Data<AppConfig>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = path_id(&path, "Tour")?;
    let repo = MongoTourRepository::new(&store);
    let tour = repo.find_tour(&id).await?.ok_or_else(tour_not_found)?;

    let blobs = match tour.tour_image_url {
        Some(_) => image_service::connect(config.media_bucket.as_deref()).await,
        None => None,
    };
    tour_service::delete_tour_cascade(&repo, blobs.as_ref(), &tour).await?;

    Ok(HttpResponse::Ok().json(json!({ "message": "Tour deleted successfully" })))
}

pub async fn list_dates(store: web::Data<Store>, path: web::Path<String>) -> ApiResult<HttpResponse> {
    let id = path_id(&path, "Tour")?;
    let dates: Vec<AvailableDateResponse> = MongoTourRepository::new(&store)
        .list_dates(&id.to_hex())
        .await?
        .into_iter()
        .map(AvailableDateResponse::from)
        .collect();
    Ok(HttpResponse::Ok().json(dates))
}

pub async fn add_date(
    store: web::Data<Store>,
    path: web::Path<String>,
    input: web::Json<AvailableDateInput>,
) -> ApiResult<HttpResponse> {
    let id = path_id(&path, "Tour")?;
    let mut date = tour_service::validate_available_date(&id.to_hex(), &input)?;

    let repo = MongoTourRepository::new(&store);
    repo.find_tour(&id).await?.ok_or_else(tour_not_found)?;
    date.id = Some(repo.insert_date(&date).await?);

    Ok(HttpResponse::Created().json(AvailableDateResponse::from(date)))
}

pub async fn update_date(
    store: web::Data<Store>,
    path: web::Path<(String, String)>,
    input: web::Json<AvailableDateInput>,
) -> ApiResult<HttpResponse> {
    let (tour_id, date_id) = path.into_inner();
    let id = path_id(&tour_id, "Tour")?;
    let date_id = path_id(&date_id, "Available date")?;
    let mut date = tour_service::validate_available_date(&id.to_hex(), &input)?;

    if !MongoTourRepository::new(&store)
        .update_date(&id.to_hex(), &date_id, &date)
        .await?
    {
        return Err(ApiError::NotFound("Available date not found".to_string()));
    }

    date.id = Some(date_id);
    Ok(HttpResponse::Ok().json(AvailableDateResponse::from(date)))
}

pub async fn delete_date(store: web::Data<Store>, path: web::Path<(String, String)>) -> ApiResult<HttpResponse> {
    let (tour_id, date_id) = path.into_inner();
    let id = path_id(&tour_id, "Tour")?;
    let date_id = path_id(&date_id, "Available date")?;

    if !MongoTourRepository::new(&store)
        .delete_date(&id.to_hex(), &date_id)
        .await?
    {
        return Err(ApiError::NotFound("Available date not found".to_string()));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Available date deleted successfully" })))
}
