mod api;
mod config;
mod database;
mod middleware;
mod models;
mod services;
mod spreadsheet;
mod storage;
mod utils;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::database::{MongoUserRepository, UserRepository};
use crate::services::questionnaire_service::ResponseStore;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("❌ Invalid configuration: {}", e);
            return Err(std::io::Error::other(e.to_string()));
        }
    };

    log::info!("🚀 Starting Roommate Questionnaire...");

    // Initialize MongoDB connection
    let db = database::MongoDB::new(&config.database_url)
        .await
        .map_err(|e| {
            log::error!("❌ Failed to connect to MongoDB: {}", e);
            std::io::Error::other(e.to_string())
        })?;
    log::info!("✅ MongoDB connected successfully");

    let users: Arc<dyn UserRepository> = Arc::new(MongoUserRepository::new(&db));
    let users_data: web::Data<dyn UserRepository> = web::Data::from(users);

    let store = storage::from_config(&config.storage).await;
    let responses_data = web::Data::new(ResponseStore::new(store, config.storage.file_key.clone()));

    let bind_addr = (config.host.clone(), config.port);
    log::info!("🌐 Server starting on {}:{}", config.host, config.port);
    log::info!("📝 Questionnaire at: {}/", config.public_url);
    log::info!("📚 Swagger UI available at: {}/swagger-ui/", config.public_url);

    let public_url = config.public_url.clone();
    let config_data = web::Data::new(config);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&public_url)
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .supports_credentials()
            .max_age(3600);

        // OpenAPI document
        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(config_data.clone())
            .app_data(users_data.clone())
            .app_data(responses_data.clone())
            .wrap(cors)
            .wrap(middleware::SecurityHeaders)
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi),
            )
            .configure(api::configure)
    })
    .bind(bind_addr)?
    .run()
    .await
}
