use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use actix_web::{web, HttpMessage, HttpRequest, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::metrics;
use crate::config::Config;
use crate::database::UserRepository;
use crate::models::UserInfo;
use crate::services::auth_service;
use crate::services::session_service::{Claims, SESSION_COOKIE};

const OAUTH_STATE_COOKIE: &str = "oauth_state";
const OAUTH_STATE_PATH: &str = "/api/v1/auth";
const OAUTH_STATE_TTL_MINUTES: i64 = 10;

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CallbackQuery {
    /// Authorization code from Google
    code: Option<String>,
    /// Must match the `oauth_state` cookie
    state: Option<String>,
    /// Set by Google when the user denies consent
    error: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/google",
    tag = "Auth",
    responses(
        (status = 302, description = "Redirect to Google's consent screen")
    )
)]
pub async fn google_auth(config: web::Data<Config>) -> HttpResponse {
    log::info!("🔐 GET /auth/google - Redirecting to Google");

    // CSRF protection for the callback
    let state = Uuid::new_v4().to_string();
    let auth_url = auth_service::google_authorization_url(&config.google, &state);

    let state_cookie = Cookie::build(OAUTH_STATE_COOKIE, state)
        .path(OAUTH_STATE_PATH)
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.cookie_secure)
        .max_age(CookieDuration::minutes(OAUTH_STATE_TTL_MINUTES))
        .finish();

    HttpResponse::Found()
        .append_header(("Location", auth_url))
        .cookie(state_cookie)
        .finish()
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/callback",
    tag = "Auth",
    params(CallbackQuery),
    responses(
        (status = 302, description = "Redirect to the form; sets the session cookie on success or appends `?error=` on failure")
    )
)]
pub async fn google_callback(
    req: HttpRequest,
    config: web::Data<Config>,
    users: web::Data<dyn UserRepository>,
    query: web::Query<CallbackQuery>,
) -> HttpResponse {
    log::info!("🔐 GET /auth/callback - Processing Google OAuth");

    if let Some(error) = &query.error {
        log::error!("❌ OAuth error: {}", error);
        return redirect_with_error(&config, error);
    }

    let expected_state = req.cookie(OAUTH_STATE_COOKIE).map(|c| c.value().to_string());
    if expected_state.is_none() || expected_state != query.state {
        log::warn!("❌ OAuth state mismatch");
        return redirect_with_error(&config, "invalid_state");
    }

    let Some(code) = &query.code else {
        log::error!("❌ No authorization code provided");
        return redirect_with_error(&config, "no_code");
    };

    match auth_service::complete_google_sign_in(users.get_ref(), &config.google, &config.jwt, code)
        .await
    {
        Ok((token, profile)) => {
            log::info!("✅ Google OAuth successful: {}", profile.email);
            metrics::increment_sign_in_count();

            let session = Cookie::build(SESSION_COOKIE, token)
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax)
                .secure(config.cookie_secure)
                .max_age(CookieDuration::hours(config.jwt.ttl_hours))
                .finish();

            HttpResponse::Found()
                .append_header(("Location", format!("{}/", config.public_url)))
                .cookie(session)
                .cookie(removal_cookie(OAUTH_STATE_COOKIE, OAUTH_STATE_PATH))
                .finish()
        }
        Err(e) => {
            log::error!("❌ Google OAuth failed: {}", e);
            redirect_with_error(&config, "sign_in_failed")
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Signed-in user", body = UserInfo),
        (status = 401, description = "No valid session")
    ),
    security(
        ("session_cookie" = []),
        ("bearer_auth" = [])
    )
)]
pub async fn get_me(
    session: web::ReqData<Claims>,
    users: web::Data<dyn UserRepository>,
) -> HttpResponse {
    log::info!("👤 GET /auth/me - {}", session.email());

    // Stored profile is fresher than the token; fall back to the token
    let user = match users.find_by_email(session.email()).await {
        Ok(Some(user)) => UserInfo {
            email: user.email,
            name: user.name,
            image: user.image,
            provider: user.provider,
        },
        Ok(None) => session.user_info(),
        Err(e) => {
            log::warn!("⚠️  Could not load user {}: {}", session.email(), e);
            session.user_info()
        }
    };

    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "user": user
    }))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    tag = "Auth",
    responses(
        (status = 200, description = "Session cookie cleared")
    )
)]
pub async fn logout() -> HttpResponse {
    log::info!("👋 POST /auth/logout");

    HttpResponse::Ok()
        .cookie(removal_cookie(SESSION_COOKIE, "/"))
        .json(serde_json::json!({ "success": true }))
}

fn redirect_with_error(config: &Config, error: &str) -> HttpResponse {
    HttpResponse::Found()
        .append_header((
            "Location",
            format!("{}/?error={}", config.public_url, urlencoding::encode(error)),
        ))
        .cookie(removal_cookie(OAUTH_STATE_COOKIE, OAUTH_STATE_PATH))
        .finish()
}

fn removal_cookie(name: &'static str, path: &'static str) -> Cookie<'static> {
    let mut cookie = Cookie::build(name, "").path(path).finish();
    cookie.make_removal();
    cookie
}

#[cfg(test)]
mod tests {
    use crate::api::{self, testing::TestState};
    use crate::services::session_service::{issue_session, test_profile, SESSION_COOKIE};
    use actix_web::{cookie::Cookie, http::StatusCode, test, App};
    use serde_json::Value;

    fn location<B>(res: &actix_web::dev::ServiceResponse<B>) -> String {
        res.headers()
            .get("Location")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }

    #[actix_web::test]
    async fn test_google_auth_redirects_with_state_cookie() {
        let state = TestState::new();
        let app = test::init_service(state.apply(App::new()).configure(api::configure)).await;

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/v1/auth/google").to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::FOUND);
        assert!(location(&res).starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        let state_cookie = res
            .response()
            .cookies()
            .find(|c| c.name() == "oauth_state")
            .expect("state cookie");
        assert!(location(&res).contains(&format!("state={}", state_cookie.value())));
    }

    #[actix_web::test]
    async fn test_callback_rejects_state_mismatch() {
        let state = TestState::new();
        let app = test::init_service(state.apply(App::new()).configure(api::configure)).await;

        let req = test::TestRequest::get()
            .uri("/api/v1/auth/callback?code=abc&state=forged")
            .cookie(Cookie::new("oauth_state", "expected"))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(location(&res), "http://localhost:3000/?error=invalid_state");
        assert!(res.response().cookies().all(|c| c.name() != SESSION_COOKIE || c.value().is_empty()));
    }

    #[actix_web::test]
    async fn test_callback_forwards_provider_error() {
        let state = TestState::new();
        let app = test::init_service(state.apply(App::new()).configure(api::configure)).await;

        let req = test::TestRequest::get()
            .uri("/api/v1/auth/callback?error=access_denied")
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(location(&res), "http://localhost:3000/?error=access_denied");
    }

    #[actix_web::test]
    async fn test_callback_without_code() {
        let state = TestState::new();
        let app = test::init_service(state.apply(App::new()).configure(api::configure)).await;

        let req = test::TestRequest::get()
            .uri("/api/v1/auth/callback?state=s1")
            .cookie(Cookie::new("oauth_state", "s1"))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(location(&res), "http://localhost:3000/?error=no_code");
    }

    #[actix_web::test]
    async fn test_me_requires_session() {
        let state = TestState::new();
        let app = test::init_service(state.apply(App::new()).configure(api::configure)).await;

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/v1/auth/me").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_me_returns_session_user() {
        let state = TestState::new();
        let app = test::init_service(state.apply(App::new()).configure(api::configure)).await;

        let token = issue_session(&state.config.jwt, &test_profile("asha@example.com")).unwrap();
        let req = test::TestRequest::get()
            .uri("/api/v1/auth/me")
            .cookie(Cookie::new(SESSION_COOKIE, token))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["user"]["email"], "asha@example.com");
        assert_eq!(body["user"]["provider"], "google");
    }

    #[actix_web::test]
    async fn test_bad_bearer_falls_back_to_cookie() {
        let state = TestState::new();
        let app = test::init_service(state.apply(App::new()).configure(api::configure)).await;

        let token = issue_session(&state.config.jwt, &test_profile("asha@example.com")).unwrap();
        let req = test::TestRequest::get()
            .uri("/api/v1/auth/me")
            .insert_header(("Authorization", "Bearer stale.or.forged"))
            .cookie(Cookie::new(SESSION_COOKIE, token))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["user"]["email"], "asha@example.com");
    }

    #[actix_web::test]
    async fn test_valid_bearer_wins_over_cookie() {
        let state = TestState::new();
        let app = test::init_service(state.apply(App::new()).configure(api::configure)).await;

        let bearer = issue_session(&state.config.jwt, &test_profile("ravi@example.com")).unwrap();
        let cookie = issue_session(&state.config.jwt, &test_profile("asha@example.com")).unwrap();
        let req = test::TestRequest::get()
            .uri("/api/v1/auth/me")
            .insert_header(("Authorization", format!("Bearer {}", bearer)))
            .cookie(Cookie::new(SESSION_COOKIE, cookie))
            .to_request();
        let res = test::call_service(&app, req).await;

        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["user"]["email"], "ravi@example.com");
    }

    #[actix_web::test]
    async fn test_logout_clears_session_cookie() {
        let state = TestState::new();
        let app = test::init_service(state.apply(App::new()).configure(api::configure)).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post().uri("/api/v1/auth/logout").to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let cleared = res
            .response()
            .cookies()
            .find(|c| c.name() == SESSION_COOKIE)
            .expect("removal cookie");
        assert_eq!(cleared.value(), "");
    }
}
