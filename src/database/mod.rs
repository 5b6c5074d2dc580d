use mongodb::{
    bson::doc,
    options::IndexOptions,
    Client, Collection, Database, IndexModel,
};
use std::error::Error;

pub const USERS_COLLECTION: &str = "users";
pub const ORDERS_COLLECTION: &str = "orders";
pub const SCANNED_HISTORY_COLLECTION: &str = "scanned_history";

#[derive(Clone)]
pub struct MongoDB {
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str) -> Result<Self, Box<dyn Error>> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        // Connection pool tuning
        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(5);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));

        client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));

        let client = Client::with_options(client_options)?;

        // Extract database name from URI or use default
        let db_name = uri
            .split('/')
            .last()
            .and_then(|s| s.split('?').next())
            .filter(|s| !s.is_empty() && !s.contains(':'))
            .unwrap_or("checkout_buddy");

        let db = client.database(db_name);

        // Test connection
        db.list_collection_names().await?;

        let mongodb = Self { db };
        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Creates the unique and lookup indexes the record collections rely on.
    async fn ensure_indexes(&self) -> Result<(), Box<dyn Error>> {
        log::info!("🔧 Creating database indexes...");

        let users = self
            .db
            .collection::<mongodb::bson::Document>(USERS_COLLECTION);

        // users(email) unique - registration duplicate check
        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        match users.create_index(email_index).await {
            Ok(_) => log::info!("   ✅ Index created: users(email) unique"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        // users(verification_code) unique - code lookup during verification
        let code_index = IndexModel::builder()
            .keys(doc! { "verification_code": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        match users.create_index(code_index).await {
            Ok(_) => log::info!("   ✅ Index created: users(verification_code) unique"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        // orders(userId) - per-owner listing
        let orders = self
            .db
            .collection::<mongodb::bson::Document>(ORDERS_COLLECTION);
        let orders_index = IndexModel::builder().keys(doc! { "userId": 1 }).build();
        match orders.create_index(orders_index).await {
            Ok(_) => log::info!("   ✅ Index created: orders(userId)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        // scanned_history(userId) and scanned_history(barcode) - history reads
        let scanned = self
            .db
            .collection::<mongodb::bson::Document>(SCANNED_HISTORY_COLLECTION);
        let scanned_user_index = IndexModel::builder().keys(doc! { "userId": 1 }).build();
        match scanned.create_index(scanned_user_index).await {
            Ok(_) => log::info!("   ✅ Index created: scanned_history(userId)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        let scanned_barcode_index = IndexModel::builder().keys(doc! { "barcode": 1 }).build();
        match scanned.create_index(scanned_barcode_index).await {
            Ok(_) => log::info!("   ✅ Index created: scanned_history(barcode)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        log::info!("✅ Database indexes ready");

        Ok(())
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_mongodb_connection() {
        dotenv::dotenv().ok();

        let uri = std::env::var("MONGODB_URL")
            .unwrap_or_else(|_| "mongodb://localhost:27017/checkout_buddy".to_string());
        let db = MongoDB::new(&uri).await;
        assert!(db.is_ok());
    }
}
