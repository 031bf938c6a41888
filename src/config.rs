use std::{env, path::PathBuf};

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;
const DATABASE: &str = "travel_admin";
const SETTINGS_DIR: &str = "settings";
const DEFAULT_JWT_SECRET: &str = "default_secret";

/// Process-wide settings, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub mongo_uri: String,
    pub database: String,
    pub jwt_secret: String,
    pub media_bucket: Option<String>,
    pub settings_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, env::VarError> {
        let mongo_uri = env::var("MONGODB_URI")?;

        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(PORT);

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            log::warn!("JWT_SECRET not set, falling back to the development secret");
            DEFAULT_JWT_SECRET.to_string()
        });

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| HOST.to_string()),
            port,
            mongo_uri,
            database: env::var("MONGODB_DATABASE").unwrap_or_else(|_| DATABASE.to_string()),
            jwt_secret,
            media_bucket: env::var("MEDIA_BUCKET").ok().filter(|b| !b.is_empty()),
            settings_dir: env::var("SETTINGS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(SETTINGS_DIR)),
        })
    }

    /// Configuration for tests and local tooling that never reach a real cluster.
    pub fn local(settings_dir: PathBuf) -> Self {
        Self {
            host: HOST.to_string(),
            port: PORT,
            mongo_uri: "mongodb://127.0.0.1:27017".to_string(),
            database: DATABASE.to_string(),
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            media_bucket: None,
            settings_dir,
        }
    }
}
