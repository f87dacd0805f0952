pub mod auth;
pub mod health;
pub mod metrics;
pub mod pages;
pub mod questionnaire;
pub mod swagger;

use actix_web::{error, web, HttpRequest, HttpResponse};

use crate::middleware::AuthMiddleware;
use crate::models::SaveResponse;

const MAX_JSON_BYTES: usize = 64 * 1024;

/// Registers every route. Shared between `main` and the handler tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(MAX_JSON_BYTES)
            .error_handler(json_error_handler),
    )
    .route("/", web::get().to(pages::index))
    // Health check
    .route("/health", web::get().to(health::health_check))
    // Metrics
    .route("/metrics", web::get().to(metrics::get_metrics))
    // Auth endpoints
    .service(
        web::scope("/api/v1/auth")
            .route("/google", web::get().to(auth::google_auth))
            .route("/callback", web::get().to(auth::google_callback))
            .route("/logout", web::post().to(auth::logout))
            .service(
                web::resource("/me")
                    .wrap(AuthMiddleware)
                    .route(web::get().to(auth::get_me)),
            ),
    )
    // Questionnaire submission - requires a session
    .service(
        web::resource("/api/v1/questionnaire")
            .wrap(AuthMiddleware)
            .route(web::post().to(questionnaire::save_response)),
    );
}

fn json_error_handler(err: error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    log::warn!("❌ Rejected JSON payload: {}", err);
    let response = HttpResponse::BadRequest().json(SaveResponse::failed(&format!(
        "Invalid request body: {}",
        err
    )));
    error::InternalError::from_response(err, response).into()
}
