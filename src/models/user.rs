use mongodb::bson::DateTime as BsonDateTime;
use serde::{Deserialize, Serialize};

/// Stored user document (`users` collection), keyed on `email`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub provider: String,
    pub provider_account_id: String,
    pub created_at: Option<BsonDateTime>,
    pub updated_at: Option<BsonDateTime>,
    pub last_login: Option<BsonDateTime>,
}

/// What the identity provider tells us about the person signing in.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct UserProfile {
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub provider: String,
    pub provider_account_id: String,
}

/// Public view of the signed-in user.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct UserInfo {
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub provider: String,
}
