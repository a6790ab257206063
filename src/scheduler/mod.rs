//! Reminder scheduling.
//!
//! Two independent mechanisms, each configured under `[reminders]`:
//! - `registration.rs`: one-shot reminder some delay after a student is added,
//!   persisted in the store and re-armed on startup
//! - `sweep.rs`: recurring sweep over every record (fixed interval or daily
//!   wall-clock time in the process's local timezone)

mod registration;
mod sweep;

pub use registration::RegistrationReminders;
pub use sweep::{next_daily_fire, run_sweep, spawn_sweep};
