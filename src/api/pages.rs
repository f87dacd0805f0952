use actix_web::HttpResponse;

const INDEX_HTML: &str = include_str!("../../static/index.html");

/// Questionnaire page. Session state is resolved client-side via `/api/v1/auth/me`.
pub async fn index() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(INDEX_HTML)
}
