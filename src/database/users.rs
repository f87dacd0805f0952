use super::MongoDB;
use crate::models::{User, UserProfile};
use crate::utils::AppError;
use async_trait::async_trait;
use mongodb::bson::{doc, DateTime as BsonDateTime};
use mongodb::Collection;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Inserts or refreshes the user keyed on `profile.email`. Returns `true`
    /// when a new document was created.
    async fn upsert(&self, profile: &UserProfile) -> Result<bool, AppError>;
}

pub struct MongoUserRepository {
    users: Collection<User>,
}

impl MongoUserRepository {
    pub fn new(db: &MongoDB) -> Self {
        Self {
            users: db.collection::<User>("users"),
        }
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.users
            .find_one(doc! { "email": email })
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))
    }

    async fn upsert(&self, profile: &UserProfile) -> Result<bool, AppError> {
        let now = BsonDateTime::now();
        // `email` comes from the filter on insert
        let update = doc! {
            "$set": {
                "name": profile.name.clone(),
                "image": profile.image.clone(),
                "provider": profile.provider.as_str(),
                "provider_account_id": profile.provider_account_id.as_str(),
                "updated_at": now,
                "last_login": now,
            },
            "$setOnInsert": {
                "created_at": now,
            },
        };

        let result = self
            .users
            .update_one(doc! { "email": profile.email.as_str() }, update)
            .upsert(true)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to upsert user: {}", e)))?;

        Ok(result.upserted_id.is_some())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::HashMap;
    use tokio::sync::RwLock;

    #[derive(Default)]
    pub struct InMemoryUserRepository {
        users: RwLock<HashMap<String, User>>,
    }

    #[async_trait]
    impl UserRepository for InMemoryUserRepository {
        async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
            Ok(self.users.read().await.get(email).cloned())
        }

        async fn upsert(&self, profile: &UserProfile) -> Result<bool, AppError> {
            let now = BsonDateTime::now();
            let mut users = self.users.write().await;
            let created = !users.contains_key(&profile.email);
            let user = users.entry(profile.email.clone()).or_insert_with(|| User {
                email: profile.email.clone(),
                name: None,
                image: None,
                provider: String::new(),
                provider_account_id: String::new(),
                created_at: Some(now),
                updated_at: None,
                last_login: None,
            });
            user.name = profile.name.clone();
            user.image = profile.image.clone();
            user.provider = profile.provider.clone();
            user.provider_account_id = profile.provider_account_id.clone();
            user.updated_at = Some(now);
            user.last_login = Some(now);
            Ok(created)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::InMemoryUserRepository;
    use super::*;

    fn profile(name: &str) -> UserProfile {
        UserProfile {
            email: "asha@example.com".to_string(),
            name: Some(name.to_string()),
            image: Some("https://lh3.googleusercontent.com/a/asha".to_string()),
            provider: "google".to_string(),
            provider_account_id: "1234567890".to_string(),
        }
    }

    #[tokio::test]
    async fn test_upsert_updates_existing_user() {
        let repo = InMemoryUserRepository::default();
        assert!(repo.upsert(&profile("Asha")).await.unwrap());
        assert!(!repo.upsert(&profile("Asha Rao")).await.unwrap());

        let user = repo.find_by_email("asha@example.com").await.unwrap().unwrap();
        assert_eq!(user.name.as_deref(), Some("Asha Rao"));
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_mongo_upsert_keyed_on_email() {
        dotenv::dotenv().ok();
        let uri = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "mongodb://localhost:27017/roommates_test".to_string());
        let db = MongoDB::new(&uri).await.unwrap();
        let repo = MongoUserRepository::new(&db);

        repo.upsert(&profile("Asha")).await.unwrap();
        assert!(!repo.upsert(&profile("Asha Rao")).await.unwrap());

        let user = repo.find_by_email("asha@example.com").await.unwrap().unwrap();
        assert_eq!(user.name.as_deref(), Some("Asha Rao"));
        assert!(user.created_at.is_some());
    }
}
