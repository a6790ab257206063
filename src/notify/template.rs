use crate::db::DbStudent;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::OutgoingEmail;

/// What triggered a reminder. Only the subject line differs between kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    /// `POST /api/send-email` or `POST /api/send-reminders`.
    Manual,
    /// Recurring sweep.
    Automatic,
    /// One-shot reminder after a student is added.
    Registration,
}

impl ReminderKind {
    fn student_subject(self) -> &'static str {
        match self {
            ReminderKind::Manual => "Study Reminder",
            ReminderKind::Automatic => "Scheduled Study Reminder",
            ReminderKind::Registration => "Study Reminder (After Registration)",
        }
    }

    fn supervisor_subject(self) -> &'static str {
        match self {
            ReminderKind::Manual => "Student Study Reminder",
            ReminderKind::Automatic => "Scheduled Student Study Reminder",
            ReminderKind::Registration => "Student Study Reminder (After Registration)",
        }
    }
}

impl fmt::Display for ReminderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReminderKind::Manual => "manual",
            ReminderKind::Automatic => "automatic",
            ReminderKind::Registration => "registration",
        };
        f.write_str(s)
    }
}

/// `Wed Jan 10 2024`.
pub fn format_study_date(date: NaiveDate) -> String {
    date.format("%a %b %d %Y").to_string()
}

/// Student copy first, supervisor copy second.
pub fn compose_reminder_pair(student: &DbStudent, kind: ReminderKind) -> [OutgoingEmail; 2] {
    let message = format!(
        "Hello {name},\n\n\
         This is your study reminder.\n\
         Study Start Date: {date}\n\n\
         Supervisor: {sup}\n\
         Supervisor Email: {sup_email}\n\n\
         Have a productive day ahead!\n",
        name = student.student_name,
        date = format_study_date(student.study_start_date),
        sup = student.supervisor_name,
        sup_email = student.supervisor_email,
    );

    let supervisor_body = format!(
        "Hello {sup},\n\nReminder for your student {name}.\n\n{message}",
        sup = student.supervisor_name,
        name = student.student_name,
    );

    [
        OutgoingEmail {
            to: student.student_email.clone(),
            subject: kind.student_subject().to_string(),
            body: message,
        },
        OutgoingEmail {
            to: student.supervisor_email.clone(),
            subject: kind.supervisor_subject().to_string(),
            body: supervisor_body,
        },
    ]
}

pub(crate) fn compose_test_email(to: &str) -> OutgoingEmail {
    OutgoingEmail {
        to: to.to_string(),
        subject: "Test Email".to_string(),
        body: "This is a test email from the postgraduate office reminder service.\n\
               If you received it, the mail transport is configured correctly.\n"
            .to_string(),
    }
}
