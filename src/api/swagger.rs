use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Roommate Questionnaire API",
        version = "0.1.0",
        description = "Signed-in users submit roommate-preference answers. Each submission creates or updates the row keyed on the user's email in the responses workbook.\n\n**Authentication:** Google sign-in issues a session cookie (`session_token`); the same token is accepted as a Bearer header."
    ),
    paths(
        // Auth endpoints
        crate::api::auth::google_auth,
        crate::api::auth::google_callback,
        crate::api::auth::get_me,
        crate::api::auth::logout,

        // Questionnaire
        crate::api::questionnaire::save_response,

        // Health & Metrics
        crate::api::health::health_check,
        crate::api::metrics::get_metrics,
    ),
    components(
        schemas(
            crate::models::QuestionnaireRequest,
            crate::models::SaveResponse,
            crate::models::UserInfo,
            crate::api::health::HealthResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Google sign-in, session inspection and sign-out."),
        (name = "Questionnaire", description = "Submit or update the caller's questionnaire answers."),
        (name = "Health", description = "Health check and counters."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Session token issued at sign-in"))
                        .build(),
                ),
            );
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("session_token"))),
            );
        }
    }
}
