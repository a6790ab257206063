use crate::db::DbStudent;
use crate::error::MailError;
use std::sync::Arc;
use tracing::{info, warn};

use super::template::compose_test_email;
use super::{Mailer, ReminderKind, compose_reminder_pair};

/// Send counters for one notification or one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    pub attempted: usize,
    pub delivered: usize,
}

impl Delivery {
    pub fn failed(&self) -> usize {
        self.attempted - self.delivered
    }

    fn absorb(&mut self, other: Delivery) {
        self.attempted += other.attempted;
        self.delivered += other.delivered;
    }
}

/// Best-effort reminder sender.
///
/// Delivery failures are logged per message and never returned; a failed
/// student copy does not stop the supervisor copy, and a failed record does
/// not stop a sweep.
#[derive(Clone)]
pub struct Notifier {
    mailer: Arc<dyn Mailer>,
}

impl Notifier {
    pub fn new(mailer: Arc<dyn Mailer>) -> Self {
        Self { mailer }
    }

    /// Sends the student copy, then the supervisor copy.
    pub async fn notify(&self, student: &DbStudent, kind: ReminderKind) -> Delivery {
        let mut delivery = Delivery::default();
        for email in compose_reminder_pair(student, kind) {
            let to = email.to.clone();
            delivery.attempted += 1;
            match self.mailer.send(email).await {
                Ok(()) => delivery.delivered += 1,
                Err(e) => {
                    warn!(
                        student_id = student.id,
                        to = %to,
                        kind = %kind,
                        error = %e,
                        "reminder email failed"
                    );
                }
            }
        }

        if delivery.delivered == delivery.attempted {
            info!(
                student_id = student.id,
                student_email = %student.student_email,
                supervisor_email = %student.supervisor_email,
                kind = %kind,
                "reminder pair sent"
            );
        }
        delivery
    }

    /// Notifies every record, strictly one record at a time.
    pub async fn sweep(&self, students: &[DbStudent], kind: ReminderKind) -> Delivery {
        let mut total = Delivery::default();
        for student in students {
            total.absorb(self.notify(student, kind).await);
        }
        info!(
            kind = %kind,
            records = students.len(),
            attempted = total.attempted,
            delivered = total.delivered,
            failed = total.failed(),
            "reminder sweep finished"
        );
        total
    }

    /// Diagnostic message to the sender's own address. Unlike reminders, the
    /// failure is returned to the caller.
    pub async fn send_test(&self) -> Result<String, MailError> {
        let to = self.mailer.sender().to_string();
        if to.is_empty() {
            return Err(MailError::Unavailable(
                "no sender address configured".to_string(),
            ));
        }
        self.mailer.send(compose_test_email(&to)).await?;
        info!(to = %to, "test email sent");
        Ok(to)
    }
}
