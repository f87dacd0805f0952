pub mod auth_service;
pub mod questionnaire_service;
pub mod session_service;
