//! Outbound reminder emails.
//!
//! - `mailer.rs`: `Mailer` transport seam and the pooled SMTP implementation
//! - `template.rs`: reminder kinds and message text
//! - `notifier.rs`: per-record pair sends and sequential sweeps (best effort)

mod mailer;
mod notifier;
mod template;

pub use mailer::{DisabledMailer, Mailer, OutgoingEmail, SmtpMailer};
pub use notifier::{Delivery, Notifier};
pub use template::{ReminderKind, compose_reminder_pair, format_study_date};
