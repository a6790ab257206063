#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use postgrad_office::{
    MailError,
    db::DbActorHandle,
    notify::{Mailer, Notifier, OutgoingEmail},
    scheduler::RegistrationReminders,
    server::{AppState, app_router},
};
use serde_json::Value;
use std::{
    collections::HashSet,
    path::PathBuf,
    sync::{Arc, Mutex},
    time::{SystemTime, UNIX_EPOCH},
};
use tower::ServiceExt;

/// Records every send attempt; fails for the configured recipients.
#[derive(Default)]
pub struct RecordingMailer {
    attempts: Mutex<Vec<OutgoingEmail>>,
    fail_for: HashSet<String>,
}

impl RecordingMailer {
    pub fn failing_for<I, S>(addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            attempts: Mutex::new(Vec::new()),
            fail_for: addresses.into_iter().map(Into::into).collect(),
        }
    }

    pub fn attempts(&self) -> Vec<OutgoingEmail> {
        self.attempts.lock().unwrap().clone()
    }

    pub fn recipients(&self) -> Vec<String> {
        self.attempts().into_iter().map(|e| e.to).collect()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        let to = email.to.clone();
        self.attempts.lock().unwrap().push(email);
        if self.fail_for.contains(&to) {
            return Err(MailError::Unavailable(format!("refused {to}")));
        }
        Ok(())
    }

    fn sender(&self) -> &str {
        "office@uni.edu"
    }
}

pub struct TempDb {
    pub path: PathBuf,
    pub url: String,
}

impl TempDb {
    pub fn new(tag: &str) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before UNIX_EPOCH")
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!(
            "postgrad-{}-{}-{}.sqlite",
            tag,
            std::process::id(),
            nanos
        ));
        let url = format!("sqlite:{}", path.display());
        Self { path, url }
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", self.path.display(), suffix));
        }
    }
}

pub struct TestApp {
    pub app: Router,
    pub db: DbActorHandle,
    pub mailer: Arc<RecordingMailer>,
    pub reminders: RegistrationReminders,
    _tmp: TempDb,
}

/// `registration_delay_secs == 0` keeps timers out of route tests.
pub async fn spawn_app(tag: &str, mailer: RecordingMailer, registration_delay_secs: u64) -> TestApp {
    let tmp = TempDb::new(tag);
    let db = postgrad_office::db::spawn(&tmp.url).await;
    let mailer = Arc::new(mailer);
    let notifier = Notifier::new(mailer.clone());
    let reminders = RegistrationReminders::new(db.clone(), notifier.clone(), registration_delay_secs);
    let state = AppState::new(db.clone(), notifier, reminders.clone());
    TestApp {
        app: app_router(state),
        db,
        mailer,
        reminders,
        _tmp: tmp,
    }
}

pub fn student_json(name: &str, email: &str) -> Value {
    serde_json::json!({
        "studentName": name,
        "studentEmail": email,
        "supervisorName": "Dr. Khan",
        "supervisorEmail": "khan@x.com",
        "studyStartDate": "2024-01-10",
    })
}

pub async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("failed to build request");

    let resp = app.clone().oneshot(request).await.expect("request failed");
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response body was not JSON")
    };
    (status, value)
}
