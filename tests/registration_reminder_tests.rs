mod support;

use axum::http::StatusCode;
use chrono::{Duration as ChronoDuration, NaiveDate, Utc};
use postgrad_office::{
    db::NewStudent,
    notify::Notifier,
    scheduler::RegistrationReminders,
};
use std::{sync::Arc, time::Duration};
use support::{RecordingMailer, TempDb, call, spawn_app, student_json};

async fn wait_for_attempts(mailer: &RecordingMailer, expected: usize) {
    for _ in 0..50 {
        if mailer.attempts().len() >= expected {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}

#[tokio::test]
async fn registration_reminder_fires_once_after_delay() {
    let t = spawn_app("registration-fire", RecordingMailer::default(), 1).await;

    let (status, _) = call(&t.app, "POST", "/api/add-student", Some(student_json("Ali", "ali@x.com"))).await;
    assert_eq!(status, StatusCode::OK);

    let row = t.db.find_by_email("ali@x.com").await.unwrap().unwrap();
    assert!(row.reminder_due_at.is_some());
    assert!(t.mailer.attempts().is_empty(), "nothing is sent before the delay");

    wait_for_attempts(&t.mailer, 2).await;
    tokio::time::sleep(Duration::from_millis(300)).await;

    let attempts = t.mailer.attempts();
    assert_eq!(attempts.len(), 2);
    assert_eq!(attempts[0].to, "ali@x.com");
    assert_eq!(attempts[1].to, "khan@x.com");
    assert!(attempts[0].subject.contains("After Registration"));

    let row = t.db.get_by_id(row.id).await.unwrap();
    assert!(row.reminder_sent_at.is_some());
    assert!(t.db.list_pending_reminders().await.unwrap().is_empty());
}

#[tokio::test]
async fn reminder_for_deleted_student_sends_nothing() {
    let t = spawn_app("registration-deleted", RecordingMailer::default(), 1).await;

    call(&t.app, "POST", "/api/add-student", Some(student_json("Ali", "ali@x.com"))).await;
    let row = t.db.find_by_email("ali@x.com").await.unwrap().unwrap();
    let (status, _) = call(&t.app, "DELETE", &format!("/api/students/{}", row.id), None).await;
    assert_eq!(status, StatusCode::OK);

    tokio::time::sleep(Duration::from_millis(1800)).await;
    assert!(t.mailer.attempts().is_empty());
}

#[tokio::test]
async fn pending_reminders_are_restored_and_fire_exactly_once() {
    let tmp = TempDb::new("registration-restore");
    let db = postgrad_office::db::spawn(&tmp.url).await;

    // Simulates a reminder that was due while the process was down.
    let overdue = Utc::now() - ChronoDuration::minutes(5);
    let id = db
        .insert(
            NewStudent {
                student_name: "Ali".to_string(),
                student_email: "ali@x.com".to_string(),
                supervisor_name: "Dr. Khan".to_string(),
                supervisor_email: "khan@x.com".to_string(),
                study_start_date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            },
            Some(overdue),
        )
        .await
        .unwrap();

    let mailer = Arc::new(RecordingMailer::default());
    let reminders = RegistrationReminders::new(db.clone(), Notifier::new(mailer.clone()), 3600);

    assert_eq!(reminders.restore().await.unwrap(), 1);
    wait_for_attempts(&mailer, 2).await;
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(mailer.attempts().len(), 2);
    assert!(db.get_by_id(id).await.unwrap().reminder_sent_at.is_some());

    // A second restart finds nothing pending.
    assert_eq!(reminders.restore().await.unwrap(), 0);
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(mailer.attempts().len(), 2);
}

#[tokio::test]
async fn disabled_registration_reminder_stores_no_due_time() {
    let t = spawn_app("registration-disabled", RecordingMailer::default(), 0).await;
    assert!(!t.reminders.is_enabled());
    assert!(t.reminders.due_at_from_now().is_none());

    call(&t.app, "POST", "/api/add-student", Some(student_json("Ali", "ali@x.com"))).await;
    let row = t.db.find_by_email("ali@x.com").await.unwrap().unwrap();
    assert!(row.reminder_due_at.is_none());
    assert!(t.db.list_pending_reminders().await.unwrap().is_empty());
}

#[tokio::test]
async fn oversized_delay_does_not_break_add_student() {
    let t = spawn_app("registration-oversized", RecordingMailer::default(), 10_000_000_000_000).await;
    assert!(t.reminders.due_at_from_now().is_none());

    let (status, _) = call(&t.app, "POST", "/api/add-student", Some(student_json("Ali", "ali@x.com"))).await;
    assert_eq!(status, StatusCode::OK);

    let row = t.db.find_by_email("ali@x.com").await.unwrap().unwrap();
    assert!(row.reminder_due_at.is_none());
}
