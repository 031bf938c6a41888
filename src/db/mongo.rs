use mongodb::{
    bson::{doc, oid::ObjectId},
    options::{ClientOptions, ServerApi, ServerApiVersion},
    Client, Collection, Database,
};
use std::sync::Arc;
use std::time::Duration;

pub const TOURS: &str = "tours";
pub const AVAILABLE_DATES: &str = "available_dates";
pub const BOOKINGS: &str = "bookings";
pub const USERS: &str = "users";
pub const REVIEWS: &str = "reviews";
pub const ADMINS: &str = "admins";

pub async fn create_mongo_client(uri: &str, database: &str) -> mongodb::error::Result<Arc<Client>> {
    log::info!("Connecting to MongoDB");

    let mut client_options = ClientOptions::parse(uri).await?;

    client_options.app_name = Some("travel-admin-api".to_string());
    client_options.connect_timeout = Some(Duration::from_secs(10));
    client_options.server_selection_timeout = Some(Duration::from_secs(10));
    client_options.max_pool_size = Some(10);
    client_options.min_pool_size = Some(1);

    let server_api = ServerApi::builder().version(ServerApiVersion::V1).build();
    client_options.server_api = Some(server_api);

    let client = Client::with_options(client_options)?;

    // A failed ping is not fatal; requests surface their own errors later.
    match client.database(database).run_command(doc! {"ping": 1}).await {
        Ok(_) => log::info!("Connected to MongoDB and verified with ping"),
        Err(e) => {
            log::warn!("Connected to MongoDB but ping failed: {}", e);
            log::warn!("The API may still work, but some functionality might be impaired");
        }
    }

    Ok(Arc::new(client))
}

/// Handle to the application database, cheap to build per request.
#[derive(Clone)]
pub struct Store {
    db: Database,
}

impl Store {
    pub fn new(client: &Client, database: &str) -> Self {
        Self {
            db: client.database(database),
        }
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

/// Cross-document references are stored as hex strings; a malformed one
/// simply matches nothing.
pub fn parse_id(id: &str) -> Option<ObjectId> {
    ObjectId::parse_str(id.trim()).ok()
}
