use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/add-student` and `PUT /api/students/{id}`.
///
/// Every field is optional at the wire level so a missing key and an empty
/// string are rejected the same way, with a JSON error rather than a serde
/// rejection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentPayload {
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub student_email: Option<String>,
    #[serde(default)]
    pub supervisor_name: Option<String>,
    #[serde(default)]
    pub supervisor_email: Option<String>,
    #[serde(default)]
    pub study_start_date: Option<String>,
}

impl StudentPayload {
    /// Wire names of the fields that are absent or blank, in declaration order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("studentName", &self.student_name),
            ("studentEmail", &self.student_email),
            ("supervisorName", &self.supervisor_name),
            ("supervisorEmail", &self.supervisor_email),
            ("studyStartDate", &self.study_start_date),
        ]
        .into_iter()
        .filter(|(_, v)| v.as_deref().is_none_or(|s| s.trim().is_empty()))
        .map(|(name, _)| name)
        .collect()
    }
}

/// A stored record as returned by `GET /api/students`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentView {
    pub id: i64,
    pub student_name: String,
    pub student_email: String,
    pub supervisor_name: String,
    pub supervisor_email: String,
    pub study_start_date: NaiveDate,
}

/// Body of `POST /api/send-email`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SendEmailRequest {
    #[serde(default)]
    pub email: Option<String>,
}
