use actix_web::{web, HttpResponse};

use crate::api::metrics;
use crate::models::{QuestionnaireRequest, SaveResponse};
use crate::services::questionnaire_service::{ResponseStore, UpsertOutcome};
use crate::services::session_service::Claims;

#[utoipa::path(
    post,
    path = "/api/v1/questionnaire",
    tag = "Questionnaire",
    request_body = QuestionnaireRequest,
    responses(
        (status = 200, description = "Response saved (row created or updated)", body = SaveResponse),
        (status = 400, description = "Malformed or out-of-range answers", body = SaveResponse),
        (status = 401, description = "No valid session", body = SaveResponse),
        (status = 500, description = "Failed to save data", body = SaveResponse)
    ),
    security(
        ("session_cookie" = []),
        ("bearer_auth" = [])
    )
)]
pub async fn save_response(
    session: web::ReqData<Claims>,
    responses: web::Data<ResponseStore>,
    request: web::Json<QuestionnaireRequest>,
) -> HttpResponse {
    let email = session.email();
    log::info!("📋 POST /questionnaire - email: {}", email);
    metrics::increment_submission_count();

    if let Err(e) = request.validate() {
        log::warn!("❌ Rejected submission from {}: {}", email, e);
        return HttpResponse::BadRequest().json(SaveResponse::failed(e.public_message()));
    }

    match responses.upsert(email, &request).await {
        Ok(outcome) => {
            match outcome {
                UpsertOutcome::Updated { row } => log::info!("✅ Saved {} (updated row {})", email, row + 1),
                UpsertOutcome::Appended { row } => log::info!("✅ Saved {} (new row {})", email, row + 1),
            }
            HttpResponse::Ok().json(SaveResponse::ok())
        }
        Err(e) => {
            log::error!("❌ Error saving questionnaire for {}: {}", email, e);
            metrics::increment_submission_failure_count();
            HttpResponse::InternalServerError().json(SaveResponse::failed(e.public_message()))
        }
    }
}
