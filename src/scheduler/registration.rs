use crate::db::DbActorHandle;
use crate::error::AppError;
use crate::notify::{Notifier, ReminderKind};
use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Arms per-record timers for the one-shot registration reminder.
///
/// The due time is stored with the record, so `restore` can re-arm whatever
/// was pending when the process stopped. A timer re-reads the record when it
/// fires: deleted records are skipped and edits made in the meantime are used.
#[derive(Clone)]
pub struct RegistrationReminders {
    db: DbActorHandle,
    notifier: Notifier,
    delay: Option<Duration>,
}

impl RegistrationReminders {
    /// `delay_secs == 0` disables the mechanism.
    pub fn new(db: DbActorHandle, notifier: Notifier, delay_secs: u64) -> Self {
        let delay = (delay_secs > 0).then(|| Duration::from_secs(delay_secs));
        Self {
            db,
            notifier,
            delay,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.delay.is_some()
    }

    /// Due time for a record created now, or `None` when disabled.
    pub fn due_at_from_now(&self) -> Option<DateTime<Utc>> {
        let delay = chrono::Duration::from_std(self.delay?).ok()?;
        Utc::now().checked_add_signed(delay)
    }

    /// Spawns a detached timer for `id`.
    pub fn arm(&self, id: i64, due_at: DateTime<Utc>) {
        let this = self.clone();
        let wait = (due_at - Utc::now()).to_std().unwrap_or(Duration::ZERO);
        debug!(student_id = id, due_at = %due_at, wait_secs = wait.as_secs(), "registration reminder armed");
        tokio::spawn(async move {
            tokio::time::sleep(wait).await;
            this.fire(id).await;
        });
    }

    /// Re-arms every pending reminder found in the store. Overdue ones fire
    /// immediately. Returns how many timers were armed.
    pub async fn restore(&self) -> Result<usize, AppError> {
        let pending = self.db.list_pending_reminders().await?;
        for reminder in &pending {
            self.arm(reminder.id, reminder.reminder_due_at);
        }
        if !pending.is_empty() {
            info!(count = pending.len(), "re-armed pending registration reminders");
        }
        Ok(pending.len())
    }

    async fn fire(&self, id: i64) {
        let student = match self.db.get_by_id(id).await {
            Ok(student) => student,
            Err(AppError::NotFound(_)) => {
                debug!(student_id = id, "registration reminder dropped: student deleted");
                return;
            }
            Err(e) => {
                error!(student_id = id, error = %e, "registration reminder lookup failed");
                return;
            }
        };

        if student.reminder_sent_at.is_some() {
            debug!(student_id = id, "registration reminder already sent");
            return;
        }

        let delivery = self
            .notifier
            .notify(&student, ReminderKind::Registration)
            .await;

        // Stamped even on delivery failure: there is no retry.
        if let Err(e) = self.db.mark_reminder_sent(id, Utc::now()).await {
            warn!(student_id = id, error = %e, "failed to record registration reminder as sent");
        }
        debug!(
            student_id = id,
            attempted = delivery.attempted,
            delivered = delivery.delivered,
            "registration reminder fired"
        );
    }
}
