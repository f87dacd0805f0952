use actix_web::HttpResponse;
use std::sync::atomic::{AtomicU64, Ordering};

static SUBMISSIONS_TOTAL: AtomicU64 = AtomicU64::new(0);
static SUBMISSION_FAILURES_TOTAL: AtomicU64 = AtomicU64::new(0);
static SIGN_INS_TOTAL: AtomicU64 = AtomicU64::new(0);

pub fn increment_submission_count() {
    SUBMISSIONS_TOTAL.fetch_add(1, Ordering::Relaxed);
}

pub fn increment_submission_failure_count() {
    SUBMISSION_FAILURES_TOTAL.fetch_add(1, Ordering::Relaxed);
}

pub fn increment_sign_in_count() {
    SIGN_INS_TOTAL.fetch_add(1, Ordering::Relaxed);
}

#[utoipa::path(
    get,
    path = "/metrics",
    tag = "Health",
    responses(
        (status = 200, description = "Prometheus text counters", body = String, content_type = "text/plain")
    )
)]
pub async fn get_metrics() -> HttpResponse {
    let metrics = format!(
        "# HELP questionnaire_submissions_total Questionnaire submissions received\n\
         # TYPE questionnaire_submissions_total counter\n\
         questionnaire_submissions_total {}\n\
         \n\
         # HELP questionnaire_submission_failures_total Submissions that failed to persist\n\
         # TYPE questionnaire_submission_failures_total counter\n\
         questionnaire_submission_failures_total {}\n\
         \n\
         # HELP sign_ins_total Completed OAuth sign-ins\n\
         # TYPE sign_ins_total counter\n\
         sign_ins_total {}\n",
        SUBMISSIONS_TOTAL.load(Ordering::Relaxed),
        SUBMISSION_FAILURES_TOTAL.load(Ordering::Relaxed),
        SIGN_INS_TOTAL.load(Ordering::Relaxed),
    );

    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(metrics)
}
