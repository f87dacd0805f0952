use crate::config::JwtConfig;
use crate::models::{UserInfo, UserProfile};
use crate::utils::AppError;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "session_token";

// Session claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,           // email
    pub name: Option<String>,
    pub picture: Option<String>,
    pub provider: String,
    pub provider_account_id: String,
    pub iat: usize,            // issued at
    pub exp: usize,            // expiration
    pub jti: String,           // JWT ID
    pub aud: String,           // audience
    pub iss: String,           // issuer
}

impl Claims {
    pub fn email(&self) -> &str {
        &self.sub
    }

    pub fn user_info(&self) -> UserInfo {
        UserInfo {
            email: self.sub.clone(),
            name: self.name.clone(),
            image: self.picture.clone(),
            provider: self.provider.clone(),
        }
    }
}

/// Signs a session token for a freshly signed-in user.
pub fn issue_session(config: &JwtConfig, profile: &UserProfile) -> Result<String, AppError> {
    let now = Utc::now();

    let claims = Claims {
        sub: profile.email.clone(),
        name: profile.name.clone(),
        picture: profile.image.clone(),
        provider: profile.provider.clone(),
        provider_account_id: profile.provider_account_id.clone(),
        iat: now.timestamp() as usize,
        exp: (now + Duration::hours(config.ttl_hours)).timestamp() as usize,
        jti: Uuid::new_v4().to_string(),
        aud: config.audience.clone(),
        iss: config.issuer.clone(),
    };

    encode_claims(config, &claims)
}

fn encode_claims(config: &JwtConfig, claims: &Claims) -> Result<String, AppError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(config.secret.as_ref()),
    )
    .map_err(|e| AppError::OAuthError(format!("Failed to sign session: {}", e)))
}

/// Checks signature, expiry, audience and issuer. A token without an email
/// is not a session.
pub fn verify_session(config: &JwtConfig, token: &str) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[config.audience.as_str()]);
    validation.set_issuer(&[config.issuer.as_str()]);

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_ref()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid session: {}", e)))?;

    if claims.sub.trim().is_empty() {
        return Err(AppError::Unauthorized("Session has no email".to_string()));
    }

    Ok(claims)
}

/// Pulls the raw token out of an `Authorization: Bearer` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
pub(crate) fn test_profile(email: &str) -> UserProfile {
    UserProfile {
        email: email.to_string(),
        name: Some("Asha Rao".to_string()),
        image: Some("https://lh3.googleusercontent.com/a/asha".to_string()),
        provider: "google".to_string(),
        provider_account_id: "1234567890".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;

    #[test]
    fn test_issue_then_verify() {
        let config = test_config().jwt;
        let token = issue_session(&config, &test_profile("asha@example.com")).unwrap();

        let claims = verify_session(&config, &token).unwrap();
        assert_eq!(claims.email(), "asha@example.com");
        assert_eq!(claims.provider, "google");
        assert_eq!(claims.user_info().image, test_profile("x").image);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let config = test_config().jwt;
        let token = issue_session(&config, &test_profile("asha@example.com")).unwrap();

        let mut other = config.clone();
        other.secret = "another-secret".to_string();
        assert!(matches!(
            verify_session(&other, &token),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_expired_session_rejected() {
        let config = test_config().jwt;
        let past = (Utc::now() - Duration::hours(2)).timestamp() as usize;
        let claims = Claims {
            sub: "asha@example.com".to_string(),
            name: None,
            picture: None,
            provider: "google".to_string(),
            provider_account_id: "1".to_string(),
            iat: past,
            exp: past,
            jti: Uuid::new_v4().to_string(),
            aud: config.audience.clone(),
            iss: config.issuer.clone(),
        };
        let token = encode_claims(&config, &claims).unwrap();
        assert!(verify_session(&config, &token).is_err());
    }

    #[test]
    fn test_session_without_email_rejected() {
        let config = test_config().jwt;
        let token = issue_session(&config, &test_profile("")).unwrap();
        assert!(verify_session(&config, &token).is_err());
    }

    #[test]
    fn test_wrong_audience_rejected() {
        let config = test_config().jwt;
        let mut other = config.clone();
        other.audience = "someone-else".to_string();
        let token = issue_session(&other, &test_profile("asha@example.com")).unwrap();
        assert!(verify_session(&config, &token).is_err());
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("Basic dXNlcjpwYXNz"), None);
        assert_eq!(bearer_token("Bearer "), None);
    }
}
