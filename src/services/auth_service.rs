use crate::config::{GoogleOAuthConfig, JwtConfig};
use crate::database::UserRepository;
use crate::models::UserProfile;
use crate::services::session_service;
use crate::utils::AppError;
use serde::Deserialize;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

pub const PROVIDER_GOOGLE: &str = "google";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
pub struct GoogleUserInfo {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
}

impl GoogleUserInfo {
    pub fn into_profile(self) -> Result<UserProfile, AppError> {
        let email = self
            .email
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| AppError::OAuthError("No email in user info".to_string()))?;

        Ok(UserProfile {
            email,
            name: self.name,
            image: self.picture,
            provider: PROVIDER_GOOGLE.to_string(),
            provider_account_id: self.id,
        })
    }
}

// Generate Google OAuth URL
pub fn google_authorization_url(config: &GoogleOAuthConfig, state: &str) -> String {
    let params = [
        ("client_id", config.client_id.as_str()),
        ("redirect_uri", config.redirect_uri.as_str()),
        ("response_type", "code"),
        ("scope", "openid email profile"),
        ("state", state),
        ("prompt", "select_account"),
    ];

    let query_string = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    format!("{}?{}", GOOGLE_AUTH_URL, query_string)
}

async fn exchange_code(
    client: &reqwest::Client,
    config: &GoogleOAuthConfig,
    code: &str,
) -> Result<String, AppError> {
    let response = client
        .post(GOOGLE_TOKEN_URL)
        .form(&[
            ("code", code),
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret.as_str()),
            ("redirect_uri", config.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ])
        .timeout(std::time::Duration::from_secs(10))
        .send()
        .await
        .map_err(|e| AppError::OAuthError(format!("Failed to exchange code: {}", e)))?;

    if !response.status().is_success() {
        return Err(AppError::OAuthError(format!(
            "Token endpoint returned {}",
            response.status()
        )));
    }

    let tokens: TokenResponse = response
        .json()
        .await
        .map_err(|e| AppError::OAuthError(format!("Failed to parse token response: {}", e)))?;

    Ok(tokens.access_token)
}

async fn fetch_user_info(
    client: &reqwest::Client,
    access_token: &str,
) -> Result<GoogleUserInfo, AppError> {
    let response = client
        .get(GOOGLE_USERINFO_URL)
        .bearer_auth(access_token)
        .timeout(std::time::Duration::from_secs(10))
        .send()
        .await
        .map_err(|e| AppError::OAuthError(format!("Failed to get user info: {}", e)))?;

    if !response.status().is_success() {
        return Err(AppError::OAuthError(format!(
            "Userinfo endpoint returned {}",
            response.status()
        )));
    }

    response
        .json()
        .await
        .map_err(|e| AppError::OAuthError(format!("Failed to parse user info: {}", e)))
}

/// Handles the OAuth callback: exchanges the code, records the user and
/// returns a signed session token. Sign-in fails if the user cannot be saved.
pub async fn complete_google_sign_in(
    users: &dyn UserRepository,
    google: &GoogleOAuthConfig,
    jwt: &JwtConfig,
    code: &str,
) -> Result<(String, UserProfile), AppError> {
    let client = reqwest::Client::new();
    let access_token = exchange_code(&client, google, code).await?;
    let profile = fetch_user_info(&client, &access_token).await?.into_profile()?;

    let created = users.upsert(&profile).await?;
    if created {
        log::info!("✅ Created new user: {}", profile.email);
    } else {
        log::info!("✅ Updated existing user: {}", profile.email);
    }

    let token = session_service::issue_session(jwt, &profile)?;
    Ok((token, profile))
}
