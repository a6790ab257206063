use chrono::{DateTime, NaiveDate, Utc};
use postgrad_schema::{StudentPayload, StudentView};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct DbStudent {
    pub id: i64,
    pub student_name: String,
    pub student_email: String,
    pub supervisor_name: String,
    pub supervisor_email: String,
    pub study_start_date: NaiveDate,
    pub reminder_due_at: Option<DateTime<Utc>>,
    pub reminder_sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DbStudent> for StudentView {
    fn from(row: DbStudent) -> Self {
        Self {
            id: row.id,
            student_name: row.student_name,
            student_email: row.student_email,
            supervisor_name: row.supervisor_name,
            supervisor_email: row.supervisor_email,
            study_start_date: row.study_start_date,
        }
    }
}

/// Validated user-supplied fields, used for both insert and full update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewStudent {
    pub student_name: String,
    pub student_email: String,
    pub supervisor_name: String,
    pub supervisor_email: String,
    pub study_start_date: NaiveDate,
}

impl TryFrom<StudentPayload> for NewStudent {
    type Error = AppError;

    fn try_from(payload: StudentPayload) -> Result<Self, Self::Error> {
        let missing = payload.missing_fields();
        if !missing.is_empty() {
            return Err(AppError::Validation(format!(
                "All fields are required! Missing: {}",
                missing.join(", ")
            )));
        }

        let field = |v: Option<String>| v.map(|s| s.trim().to_string()).unwrap_or_default();
        let raw_date = field(payload.study_start_date);
        let study_start_date = parse_study_date(&raw_date).ok_or_else(|| {
            AppError::Validation(format!(
                "studyStartDate must be a date like 2024-01-10, got {raw_date:?}"
            ))
        })?;

        Ok(Self {
            student_name: field(payload.student_name),
            student_email: field(payload.student_email),
            supervisor_name: field(payload.supervisor_name),
            supervisor_email: field(payload.supervisor_email),
            study_start_date,
        })
    }
}

/// Accepts `YYYY-MM-DD` (HTML date inputs) or a full RFC 3339 timestamp, whose
/// date in its own offset is kept.
pub fn parse_study_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

/// A one-shot reminder that has been scheduled but not delivered yet.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct PendingReminder {
    pub id: i64,
    pub reminder_due_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(date: &str) -> StudentPayload {
        StudentPayload {
            student_name: Some(" Ali ".to_string()),
            student_email: Some("ali@x.com".to_string()),
            supervisor_name: Some("Dr. Khan".to_string()),
            supervisor_email: Some("khan@x.com".to_string()),
            study_start_date: Some(date.to_string()),
        }
    }

    #[test]
    fn accepts_plain_and_rfc3339_dates() {
        let plain = NewStudent::try_from(payload("2024-01-10")).unwrap();
        assert_eq!(plain.study_start_date, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
        assert_eq!(plain.student_name, "Ali");

        let stamped = NewStudent::try_from(payload("2024-01-10T00:00:00.000Z")).unwrap();
        assert_eq!(stamped.study_start_date, plain.study_start_date);
    }

    #[test]
    fn keeps_date_in_the_given_offset() {
        let local_midnight = NewStudent::try_from(payload("2024-01-10T00:00:00+05:00")).unwrap();
        assert_eq!(
            local_midnight.study_start_date,
            NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
        );
    }

    #[test]
    fn rejects_unparseable_date() {
        let err = NewStudent::try_from(payload("next tuesday")).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn rejects_missing_field_before_parsing() {
        let mut p = payload("2024-01-10");
        p.supervisor_email = None;
        match NewStudent::try_from(p).unwrap_err() {
            AppError::Validation(msg) => assert!(msg.contains("supervisorEmail")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
