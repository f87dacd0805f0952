pub mod questionnaire;
pub mod user;

pub use questionnaire::*;
pub use user::*;
