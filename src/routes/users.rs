use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::config::AppConfig;
use crate::db::mongo::Store;
use crate::error::{ApiError, ApiResult};
use crate::models::user::{UserInput, UserListQuery, UserResponse};
use crate::routes::path_id;
use crate::services::image_service;
use crate::services::tour_service::MongoTourRepository;
use crate::services::user_service::{self, MongoUserRepository};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .route("", web::get().to(list_users))
            .route("", web::post().to(create_user))
            .route("/{id}", web::get().to(get_user))
            .route("/{id}", web::put().to(update_user))
            .route("/{id}", web::delete().to(delete_user))
            .route("/{id}/favorites", web::get().to(list_favorites)),
    );
}

fn user_not_found() -> ApiError {
    ApiError::NotFound("User not found".to_string())
}

pub async fn list_users(store: web::Data<Store>, query: web::Query<UserListQuery>) -> ApiResult<HttpResponse> {
    let users: Vec<UserResponse> = MongoUserRepository::new(&store)
        .list()
        .await?
        .into_iter()
        .filter(|u| user_service::matches_search(u, query.search.as_deref()))
        .map(UserResponse::from)
        .collect();
    Ok(HttpResponse::Ok().json(users))
}

pub async fn get_user(store: web::Data<Store>, path: web::Path<String>) -> ApiResult<HttpResponse> {
    let id = path_id(&path, "User")?;
    let user = MongoUserRepository::new(&store)
        .find(&id)
        .await?
        .ok_or_else(user_not_found)?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

pub async fn create_user(
    store: web::Data<Store>,
    config: web::Data<AppConfig>,
    input: web::Json<UserInput>,
) -> ApiResult<HttpResponse> {
    let input = input.into_inner();
    user_service::validate_user_input(&input)?;

    let blobs = match input.image {
        Some(_) => image_service::connect(config.media_bucket.as_deref()).await,
        None => None,
    };
    let repo = MongoUserRepository::new(&store);
    let user = user_service::create_user(&repo, blobs.as_ref(), input).await?;

    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

pub async fn update_user(
    store: web::Data<Store>,
    config: web::Data<AppConfig>,
    path: web::Path<String>,
    input: web::Json<UserInput>,
) -> ApiResult<HttpResponse> {
    let id = path_id(&path, "User")?;
    let input = input.into_inner();
    user_service::validate_user_input(&input)?;

    let blobs = match input.image {
        Some(_) => image_service::connect(config.media_bucket.as_deref()).await,
        None => None,
    };
    let repo = MongoUserRepository::new(&store);
    let user = user_service::update_user(&repo, blobs.as_ref(), &id, input).await?;

    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

pub async fn delete_user(
    store: web::Data<Store>,
    config: web::Data<AppConfig>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = path_id(&path, "User")?;
    let repo = MongoUserRepository::new(&store);
    let user = repo.find(&id).await?.ok_or_else(user_not_found)?;

    let blobs = match user.user_image_url {
        Some(_) => image_service::connect(config.media_bucket.as_deref()).await,
        None => None,
    };
    user_service::delete_user(&repo, blobs.as_ref(), &user).await?;

    Ok(HttpResponse::Ok().json(json!({ "message": "User deleted successfully" })))
}

pub async fn list_favorites(store: web::Data<Store>, path: web::Path<String>) -> ApiResult<HttpResponse> {
    let id = path_id(&path, "User")?;
    let user = MongoUserRepository::new(&store)
        .find(&id)
        .await?
        .ok_or_else(user_not_found)?;

    let tours = MongoTourRepository::new(&store);
    let favorites = user_service::resolve_favorites(&tours, &user.favorite_tours).await;
    Ok(HttpResponse::Ok().json(favorites))
}
