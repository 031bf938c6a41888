use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use travel_admin_api::config::AppConfig;
use travel_admin_api::db::mongo::{create_mongo_client, Store};
use travel_admin_api::routes;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    }

    env_logger::init_from_env(Env::default().default_filter_or("info"));
    log::info!("Application starting...");

    let config = AppConfig::from_env().map_err(|e| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, format!("MONGODB_URI must be set: {}", e))
    })?;

    let client = create_mongo_client(&config.mongo_uri, &config.database)
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    let store = Store::new(&client, &config.database);

    if config.media_bucket.is_none() {
        log::warn!("MEDIA_BUCKET not set, image uploads will fail");
    }

    let (host, port) = (config.host.clone(), config.port);
    log::info!("Starting HTTP server on {}:{}", host, port);

    let config = web::Data::new(config);
    let store = web::Data::new(store);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(Cors::permissive())
            .app_data(config.clone())
            .app_data(store.clone())
            .configure(routes::config)
    })
    .bind((host, port))?
    .run()
    .await
}
