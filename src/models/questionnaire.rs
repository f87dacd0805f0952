use crate::spreadsheet::{Cell, Column};
use crate::utils::AppError;
use serde::{Deserialize, Serialize};

pub const SHEET_NAME: &str = "Sheet1";
pub const EMAIL_COLUMN: usize = 0;

/// Fixed header of the responses sheet, in column order.
pub const COLUMNS: [Column; 17] = [
    Column { header: "Email", width: 30.0 },
    Column { header: "Phone Number", width: 20.0 },
    Column { header: "First Name", width: 20.0 },
    Column { header: "Last Name", width: 20.0 },
    Column { header: "Sex", width: 10.0 },
    Column { header: "Languages", width: 30.0 },
    Column { header: "Sleep Time Weekdays", width: 20.0 },
    Column { header: "Sleep Time Weekend", width: 20.0 },
    Column { header: "Does noise bother you?", width: 25.0 },
    Column { header: "Noise Time", width: 20.0 },
    Column { header: "Clean Common Area", width: 25.0 },
    Column { header: "Sharing Habits (0-10)", width: 20.0 },
    Column { header: "Clean Dishes", width: 15.0 },
    Column { header: "Roommate Visitors", width: 20.0 },
    Column { header: "Invite People", width: 15.0 },
    Column { header: "Handle Disagreements", width: 25.0 },
    Column { header: "Party Person", width: 15.0 },
];

/// `noiseBother` answers that make `noiseTime` meaningful.
const NIGHT_NOISE_ANSWERS: [&str; 2] = ["At night", "Both"];

/// Spoken languages: normally a list from the multi-select, but an already
/// joined string is accepted as-is.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Languages {
    List(Vec<String>),
    Joined(String),
}

impl Default for Languages {
    fn default() -> Self {
        Languages::List(Vec::new())
    }
}

impl Languages {
    pub fn joined(&self) -> String {
        match self {
            Languages::List(list) => list.join(", "),
            Languages::Joined(s) => s.clone(),
        }
    }
}

/// Body of `POST /api/v1/questionnaire`. Any `email` sent by the client is
/// ignored; the row is keyed on the session's email.
#[derive(Debug, Clone, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct QuestionnaireRequest {
    pub phone_number: String,
    pub name: String,
    pub last_name: String,
    pub sex: String,
    #[schema(value_type = Vec<String>)]
    pub languages: Languages,
    pub sleep_time_weekdays: String,
    pub sleep_time_weekend: String,
    pub noise_bother: String,
    pub noise_time: Option<String>,
    pub clean_common_area: String,
    pub sharing_habits: i64,
    pub clean_dishes: String,
    pub roommate_visitors: String,
    pub invite_people: String,
    pub handle_disagreements: String,
    pub party_person: String,
}

impl QuestionnaireRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let phone = self.phone_number.trim();
        if phone.len() != 10 || !phone.chars().all(|c| c.is_ascii_digit()) {
            return Err(AppError::InvalidRequest(
                "phoneNumber must be a 10-digit number".to_string(),
            ));
        }

        if !(0..=10).contains(&self.sharing_habits) {
            return Err(AppError::InvalidRequest(
                "sharingHabits must be between 0 and 10".to_string(),
            ));
        }

        Ok(())
    }

    /// `noiseTime` is only kept when the answer to `noiseBother` involves nights.
    pub fn effective_noise_time(&self) -> &str {
        if NIGHT_NOISE_ANSWERS.contains(&self.noise_bother.as_str()) {
            self.noise_time.as_deref().unwrap_or("")
        } else {
            ""
        }
    }

    /// Cells for one sheet row, in `COLUMNS` order.
    pub fn to_row(&self, email: &str) -> Vec<Cell> {
        vec![
            Cell::text(email),
            Cell::text(self.phone_number.trim()),
            Cell::text(self.name.as_str()),
            Cell::text(self.last_name.as_str()),
            Cell::text(self.sex.as_str()),
            Cell::text(self.languages.joined()),
            Cell::text(self.sleep_time_weekdays.as_str()),
            Cell::text(self.sleep_time_weekend.as_str()),
            Cell::text(self.noise_bother.as_str()),
            Cell::text(self.effective_noise_time()),
            Cell::text(self.clean_common_area.as_str()),
            Cell::Number(self.sharing_habits as f64),
            Cell::text(self.clean_dishes.as_str()),
            Cell::text(self.roommate_visitors.as_str()),
            Cell::text(self.invite_people.as_str()),
            Cell::text(self.handle_disagreements.as_str()),
            Cell::text(self.party_person.as_str()),
        ]
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SaveResponse {
    pub success: bool,
    pub message: String,
}

impl SaveResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: "Data saved successfully".to_string(),
        }
    }

    pub fn failed(message: &str) -> Self {
        Self {
            success: false,
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_request() -> QuestionnaireRequest {
    QuestionnaireRequest {
        phone_number: "9876543210".to_string(),
        name: "Asha".to_string(),
        last_name: "Rao".to_string(),
        sex: "Female".to_string(),
        languages: Languages::List(vec!["Hindi".to_string(), "English".to_string()]),
        sleep_time_weekdays: "10 to 11pm".to_string(),
        sleep_time_weekend: "midnight to 2 am".to_string(),
        noise_bother: "At night".to_string(),
        noise_time: Some("11pm".to_string()),
        clean_common_area: "Few days per week".to_string(),
        sharing_habits: 7,
        clean_dishes: "Yes".to_string(),
        roommate_visitors: "No".to_string(),
        invite_people: "Yes".to_string(),
        handle_disagreements: "Mediated discussion".to_string(),
        party_person: "No".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_deserializes_form_payload() {
        let body = serde_json::json!({
            "email": "spoofed@example.com",
            "phoneNumber": "9876543210",
            "name": "Asha",
            "lastName": "Rao",
            "sex": "Female",
            "languages": ["Hindi", "Tamil"],
            "sleepTimeWeekdays": "9 to 10pm",
            "sleepTimeWeekend": "after 2am",
            "noiseBother": "Both",
            "noiseTime": "midnight",
            "cleanCommonArea": "Every day",
            "sharingHabits": 4,
            "cleanDishes": "No",
            "roommateVisitors": "Yes",
            "invitePeople": "No",
            "handleDisagreements": "Confrontation",
            "partyPerson": "Yes"
        });

        let request: QuestionnaireRequest = serde_json::from_value(body).unwrap();
        assert_eq!(request.languages.joined(), "Hindi, Tamil");
        assert_eq!(request.sharing_habits, 4);
        assert_eq!(request.effective_noise_time(), "midnight");
    }

    #[test]
    fn test_joined_languages_string_accepted() {
        let request: QuestionnaireRequest =
            serde_json::from_value(serde_json::json!({ "languages": "English, French" })).unwrap();
        assert_eq!(request.languages.joined(), "English, French");
    }

    #[test]
    fn test_noise_time_blank_for_daytime_noise() {
        let mut request = sample_request();
        request.noise_bother = "During the day".to_string();
        request.noise_time = Some("10pm".to_string());
        assert_eq!(request.effective_noise_time(), "");
        assert_eq!(request.to_row("a@x.com")[9], Cell::Empty);
    }

    #[test]
    fn test_noise_time_match_is_exact() {
        let mut request = sample_request();
        request.noise_bother = "at night".to_string();
        assert_eq!(request.effective_noise_time(), "");
    }

    #[test]
    fn test_row_follows_column_order() {
        let row = sample_request().to_row("asha@example.com");
        assert_eq!(row.len(), COLUMNS.len());
        assert_eq!(row[EMAIL_COLUMN], Cell::text("asha@example.com"));
        assert_eq!(row[5], Cell::text("Hindi, English"));
        assert_eq!(row[9], Cell::text("11pm"));
        assert_eq!(row[11], Cell::Number(7.0));
        assert_eq!(row[16], Cell::text("No"));
    }

    #[test]
    fn test_validation() {
        assert!(sample_request().validate().is_ok());

        let mut request = sample_request();
        request.sharing_habits = 11;
        assert!(request.validate().is_err());

        let mut request = sample_request();
        request.phone_number = "98765-4321".to_string();
        assert!(request.validate().is_err());
    }
}
