mod support;

use chrono::{Duration, NaiveDate, Utc};
use postgrad_office::{AppError, db::NewStudent};
use support::TempDb;

fn new_student(name: &str, email: &str) -> NewStudent {
    NewStudent {
        student_name: name.to_string(),
        student_email: email.to_string(),
        supervisor_name: "Dr. Khan".to_string(),
        supervisor_email: "khan@x.com".to_string(),
        study_start_date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
    }
}

#[tokio::test]
async fn test_students_db_actor_baseline() {
    let tmp = TempDb::new("db-baseline");
    let db = postgrad_office::db::spawn(&tmp.url).await;

    // 1. Fresh DB is empty
    assert!(db.list_all().await.unwrap().is_empty());
    assert!(db.find_by_email("ali@x.com").await.unwrap().is_none());

    // 2. Insert and read back
    let id = db.insert(new_student("Ali", "ali@x.com"), None).await.unwrap();
    assert!(id > 0, "Expected a valid ID after insert");

    let row = db.find_by_email("ali@x.com").await.unwrap().expect("row by email");
    assert_eq!(row.id, id);
    assert_eq!(row.student_name, "Ali");
    assert_eq!(row.supervisor_email, "khan@x.com");
    assert_eq!(row.study_start_date, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
    assert!(row.reminder_due_at.is_none());
    assert_eq!(db.get_by_id(id).await.unwrap(), row);

    // 3. Duplicate email is a conflict and leaves the table unchanged
    let err = db
        .insert(new_student("Ali Again", "ali@x.com"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)), "got {err:?}");
    assert_eq!(db.list_all().await.unwrap().len(), 1);

    // 4. Update replaces fields of that row only
    let other = db.insert(new_student("Sara", "sara@x.com"), None).await.unwrap();
    db.update(id, new_student("Ali Raza", "ali.raza@x.com")).await.unwrap();
    let updated = db.get_by_id(id).await.unwrap();
    assert_eq!(updated.student_name, "Ali Raza");
    assert_eq!(updated.student_email, "ali.raza@x.com");
    assert_eq!(db.get_by_id(other).await.unwrap().student_name, "Sara");

    // 5. Updating into another row's email conflicts; unknown id is not found
    let err = db.update(id, new_student("Ali", "sara@x.com")).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)), "got {err:?}");
    let err = db.update(9999, new_student("Ghost", "ghost@x.com")).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "got {err:?}");

    // 6. Delete removes exactly that row; second delete is not found
    db.delete(id).await.unwrap();
    let remaining = db.list_all().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, other);
    assert!(matches!(db.delete(id).await.unwrap_err(), AppError::NotFound(_)));
    assert!(matches!(db.get_by_id(id).await.unwrap_err(), AppError::NotFound(_)));
}

#[tokio::test]
async fn test_pending_reminders_lifecycle() {
    let tmp = TempDb::new("db-reminders");
    let db = postgrad_office::db::spawn(&tmp.url).await;

    let due = Utc::now() + Duration::hours(1);
    let with_reminder = db
        .insert(new_student("Ali", "ali@x.com"), Some(due))
        .await
        .unwrap();
    db.insert(new_student("Sara", "sara@x.com"), None).await.unwrap();

    let pending = db.list_pending_reminders().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, with_reminder);
    assert_eq!(pending[0].reminder_due_at, due);

    db.mark_reminder_sent(with_reminder, Utc::now()).await.unwrap();
    assert!(db.list_pending_reminders().await.unwrap().is_empty());
    assert!(db.get_by_id(with_reminder).await.unwrap().reminder_sent_at.is_some());

    // Marking a deleted row is a no-op.
    db.delete(with_reminder).await.unwrap();
    db.mark_reminder_sent(with_reminder, Utc::now()).await.unwrap();
}
