use crate::utils::AppError;
use std::env;

const DEFAULT_SESSION_TTL_HOURS: i64 = 24 * 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub public_url: String,
    pub database_url: String,
    pub cookie_secure: bool,
    pub jwt: JwtConfig,
    pub google: GoogleOAuthConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_hours: i64,
}

#[derive(Debug, Clone)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StorageBackend {
    S3 { region: String, bucket: String },
    Memory,
}

impl StorageBackend {
    pub fn name(&self) -> &'static str {
        match self {
            StorageBackend::S3 { .. } => "s3",
            StorageBackend::Memory => "memory",
        }
    }
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub file_key: String,
}

impl Config {
    /// Reads configuration from the process environment (after `.env` has been loaded).
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(get: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String, AppError> {
            get(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| AppError::ConfigError(format!("{} must be set", key)))
        };

        let host = get("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match get("PORT") {
            Some(p) => p
                .parse::<u16>()
                .map_err(|_| AppError::ConfigError(format!("PORT is not a valid port: {}", p)))?,
            None => 3000,
        };
        let public_url = get("PUBLIC_URL")
            .unwrap_or_else(|| "http://localhost:3000".to_string())
            .trim_end_matches('/')
            .to_string();

        let ttl_hours = match get("SESSION_TTL_HOURS") {
            Some(v) => v.parse::<i64>().ok().filter(|h| *h > 0).ok_or_else(|| {
                AppError::ConfigError(format!("SESSION_TTL_HOURS must be a positive integer: {}", v))
            })?,
            None => DEFAULT_SESSION_TTL_HOURS,
        };

        let jwt = JwtConfig {
            secret: required("JWT_SECRET")?,
            issuer: get("JWT_ISSUER").unwrap_or_else(|| "roommate-form".to_string()),
            audience: get("JWT_AUDIENCE").unwrap_or_else(|| "roommate-form-web".to_string()),
            ttl_hours,
        };

        let google = GoogleOAuthConfig {
            client_id: required("GOOGLE_CLIENT_ID")?,
            client_secret: required("GOOGLE_CLIENT_SECRET")?,
            redirect_uri: get("GOOGLE_REDIRECT_URI")
                .unwrap_or_else(|| format!("{}/api/v1/auth/callback", public_url)),
        };

        let backend = match get("STORAGE_BACKEND").as_deref().unwrap_or("s3") {
            "s3" => StorageBackend::S3 {
                region: required("AWS_REGION")?,
                bucket: required("S3_BUCKET_NAME")?,
            },
            "memory" => StorageBackend::Memory,
            other => {
                return Err(AppError::ConfigError(format!(
                    "Invalid STORAGE_BACKEND: {}. Supported: s3, memory",
                    other
                )))
            }
        };

        let storage = StorageConfig {
            backend,
            file_key: get("S3_FILE_KEY").unwrap_or_else(|| "roommates.xlsx".to_string()),
        };

        Ok(Config {
            host,
            port,
            public_url,
            database_url: required("DATABASE_URL")?,
            cookie_secure: matches!(get("COOKIE_SECURE").as_deref(), Some("true") | Some("1")),
            jwt,
            google,
            storage,
        })
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 3000,
        public_url: "http://localhost:3000".to_string(),
        database_url: "mongodb://localhost:27017/roommates_test".to_string(),
        cookie_secure: false,
        jwt: JwtConfig {
            secret: "test-secret".to_string(),
            issuer: "roommate-form".to_string(),
            audience: "roommate-form-web".to_string(),
            ttl_hours: 1,
        },
        google: GoogleOAuthConfig {
            client_id: "client-id.apps.googleusercontent.com".to_string(),
            client_secret: "client-secret".to_string(),
            redirect_uri: "http://localhost:3000/api/v1/auth/callback".to_string(),
        },
        storage: StorageConfig {
            backend: StorageBackend::Memory,
            file_key: "roommates.xlsx".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("DATABASE_URL", "mongodb://localhost:27017/roommates"),
            ("JWT_SECRET", "secret"),
            ("GOOGLE_CLIENT_ID", "id"),
            ("GOOGLE_CLIENT_SECRET", "shh"),
            ("AWS_REGION", "ap-south-1"),
            ("S3_BUCKET_NAME", "roommate-responses"),
        ])
    }

    fn load(env: &HashMap<&'static str, &'static str>) -> Result<Config, AppError> {
        Config::from_lookup(|key| env.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn test_defaults_applied() {
        let config = load(&base_env()).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.storage.file_key, "roommates.xlsx");
        assert_eq!(config.jwt.ttl_hours, 720);
        assert_eq!(
            config.google.redirect_uri,
            "http://localhost:3000/api/v1/auth/callback"
        );
        assert_eq!(
            config.storage.backend,
            StorageBackend::S3 {
                region: "ap-south-1".to_string(),
                bucket: "roommate-responses".to_string(),
            }
        );
        assert_eq!(config.storage.backend.name(), "s3");
        assert!(!config.cookie_secure);
    }

    #[test]
    fn test_missing_bucket_is_reported() {
        let mut env = base_env();
        env.remove("S3_BUCKET_NAME");
        let err = load(&env).unwrap_err();
        assert!(err.to_string().contains("S3_BUCKET_NAME"));
    }

    #[test]
    fn test_memory_backend_needs_no_aws_settings() {
        let mut env = base_env();
        env.remove("AWS_REGION");
        env.remove("S3_BUCKET_NAME");
        env.insert("STORAGE_BACKEND", "memory");
        let config = load(&env).unwrap();
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.storage.backend.name(), "memory");
    }

    #[test]
    fn test_public_url_trailing_slash_trimmed() {
        let mut env = base_env();
        env.insert("PUBLIC_URL", "https://roommates.example.com/");
        let config = load(&env).unwrap();
        assert_eq!(config.public_url, "https://roommates.example.com");
        assert_eq!(
            config.google.redirect_uri,
            "https://roommates.example.com/api/v1/auth/callback"
        );
    }

    #[test]
    fn test_invalid_port_rejected() {
        let mut env = base_env();
        env.insert("PORT", "http");
        assert!(load(&env).is_err());
    }
}
