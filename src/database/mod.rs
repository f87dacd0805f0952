pub mod users;

pub use users::{MongoUserRepository, UserRepository};

use crate::utils::AppError;
use mongodb::{Client, Collection, Database};

const DEFAULT_DB_NAME: &str = "roommates";

#[derive(Clone)]
pub struct MongoDB {
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str) -> Result<Self, AppError> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Invalid DATABASE_URL: {}", e)))?;

        // Sign-in is the only writer; a small pool is plenty
        client_options.max_pool_size = Some(10);
        client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));

        let client = Client::with_options(client_options)
            .map_err(|e| AppError::DatabaseError(format!("Failed to create client: {}", e)))?;

        let db = client.database(&database_name(uri));

        // Test connection
        db.list_collection_names()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to reach MongoDB: {}", e)))?;

        let mongodb = Self { db };
        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// At most one user document per email.
    async fn ensure_indexes(&self) -> Result<(), AppError> {
        use mongodb::bson::doc;
        use mongodb::options::IndexOptions;
        use mongodb::IndexModel;

        log::info!("🔧 Creating database indexes...");

        let users = self.collection::<mongodb::bson::Document>("users");
        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        match users.create_index(email_index).await {
            Ok(_) => log::info!("   ✅ Index ready: users(email) unique"),
            Err(e) => {
                return Err(AppError::DatabaseError(format!(
                    "Failed to create users(email) index: {}",
                    e
                )))
            }
        }

        Ok(())
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }
}

/// Database name from the URI path, e.g. `mongodb://host:27017/roommates?retryWrites=true`.
fn database_name(uri: &str) -> String {
    let without_scheme = uri.split("://").nth(1).unwrap_or(uri);
    without_scheme
        .split_once('/')
        .map(|(_, rest)| rest.split('?').next().unwrap_or(""))
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_DB_NAME)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_name_from_uri() {
        assert_eq!(database_name("mongodb://localhost:27017/forms"), "forms");
        assert_eq!(
            database_name("mongodb+srv://u:p@cluster0.example.net/forms?retryWrites=true"),
            "forms"
        );
        assert_eq!(database_name("mongodb://localhost:27017"), "roommates");
        assert_eq!(database_name("mongodb://localhost:27017/?tls=true"), "roommates");
    }
}
