use crate::config::SweepPolicy;
use crate::db::DbActorHandle;
use crate::error::AppError;
use crate::notify::{Delivery, Notifier, ReminderKind};
use chrono::{DateTime, Days, Local, NaiveTime, TimeZone};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

/// Lists every record and notifies each one in turn.
pub async fn run_sweep(
    db: &DbActorHandle,
    notifier: &Notifier,
    kind: ReminderKind,
) -> Result<Delivery, AppError> {
    let students = db.list_all().await?;
    Ok(notifier.sweep(&students, kind).await)
}

/// Next occurrence of `at` strictly after `now`, in `now`'s timezone.
///
/// Days where `at` does not exist locally (DST gap) are skipped; ambiguous
/// times resolve to the earlier instant.
pub fn next_daily_fire<Tz: TimeZone>(now: &DateTime<Tz>, at: NaiveTime) -> DateTime<Tz> {
    let tz = now.timezone();
    let today = now.date_naive();
    (0..=3u64)
        .filter_map(|offset| today.checked_add_days(Days::new(offset)))
        .filter_map(|day| tz.from_local_datetime(&day.and_time(at)).earliest())
        .find(|candidate| candidate > now)
        .unwrap_or_else(|| now.clone() + chrono::Duration::days(1))
}

/// Starts the recurring sweep task, or returns `None` when disabled.
///
/// Firings missed while a sweep is still running, or while the process was
/// down, are not replayed.
pub fn spawn_sweep(
    policy: SweepPolicy,
    db: DbActorHandle,
    notifier: Notifier,
) -> Option<JoinHandle<()>> {
    match policy {
        SweepPolicy::Disabled => {
            info!("recurring reminder sweep disabled");
            None
        }
        SweepPolicy::Interval { every_secs } => {
            info!(every_secs, "recurring reminder sweep scheduled (interval)");
            let period = Duration::from_secs(every_secs.max(1));
            Some(tokio::spawn(interval_loop(period, db, notifier)))
        }
        SweepPolicy::Daily { at } => {
            info!(at = %at.format("%H:%M"), "recurring reminder sweep scheduled (daily, local time)");
            Some(tokio::spawn(daily_loop(at, db, notifier)))
        }
    }
}

async fn interval_loop(period: Duration, db: DbActorHandle, notifier: Notifier) {
    let Some(start) = tokio::time::Instant::now().checked_add(period) else {
        error!(period_secs = period.as_secs(), "sweep interval out of range; recurring sweep not started");
        return;
    };
    let mut ticker = tokio::time::interval_at(start, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        sweep_once(&db, &notifier).await;
    }
}

async fn daily_loop(at: NaiveTime, db: DbActorHandle, notifier: Notifier) {
    loop {
        let now = Local::now();
        let next = next_daily_fire(&now, at);
        let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
        info!(next_fire = %next, "next reminder sweep");
        tokio::time::sleep(wait).await;
        sweep_once(&db, &notifier).await;
    }
}

async fn sweep_once(db: &DbActorHandle, notifier: &Notifier) {
    if let Err(e) = run_sweep(db, notifier, ReminderKind::Automatic).await {
        error!(error = %e, "scheduled reminder sweep could not list students");
    }
}
