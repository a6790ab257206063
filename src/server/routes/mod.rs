pub mod reminders;
pub mod students;

use crate::server::router::AppState;
use axum::{
    Router,
    routing::{get, post},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/add-student", post(students::add_student))
        .route("/api/students", get(students::list_students))
        .route(
            "/api/students/{id}",
            get(students::get_student)
                .put(students::update_student)
                .delete(students::delete_student),
        )
        .route("/api/send-email", post(reminders::send_email))
        .route("/api/send-reminders", post(reminders::send_reminders))
        .route("/api/test-email", get(reminders::test_email))
}
