use crate::db::NewStudent;
use crate::error::AppError;
use crate::server::router::AppState;
use crate::utils::logging::with_pretty_json_debug;
use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};
use postgrad_schema::{MessageBody, StudentPayload, StudentView};
use tracing::{debug, info};

/// POST /api/add-student
///
/// Validates every field, inserts the row (the store's unique constraint on
/// `student_email` decides conflicts), then arms the registration reminder if
/// one is configured.
pub async fn add_student(
    State(state): State<AppState>,
    payload: Result<Json<StudentPayload>, JsonRejection>,
) -> Result<Json<MessageBody>, AppError> {
    let Json(payload) = payload?;
    with_pretty_json_debug(&payload, |pretty| {
        debug!(body = %pretty, "add-student payload");
    });

    let student = NewStudent::try_from(payload)?;
    let email = student.student_email.clone();
    let due_at = state.reminders.due_at_from_now();
    let id = state.db.insert(student, due_at).await?;

    if let Some(due_at) = due_at {
        state.reminders.arm(id, due_at);
    }
    info!(student_id = id, student_email = %email, reminder_due_at = ?due_at, "student added");

    Ok(Json(MessageBody::new("Student added successfully!")))
}

/// GET /api/students
pub async fn list_students(
    State(state): State<AppState>,
) -> Result<Json<Vec<StudentView>>, AppError> {
    let rows = state.db.list_all().await?;
    Ok(Json(rows.into_iter().map(StudentView::from).collect()))
}

/// GET /api/students/{id}
pub async fn get_student(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<StudentView>, AppError> {
    let Path(id) = id?;
    let row = state.db.get_by_id(id).await?;
    Ok(Json(row.into()))
}

/// PUT /api/students/{id}
///
/// Full replacement of the five user fields; all are required.
pub async fn update_student(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<StudentPayload>, JsonRejection>,
) -> Result<Json<MessageBody>, AppError> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    let student = NewStudent::try_from(payload)?;

    state.db.update(id, student).await?;
    info!(student_id = id, "student updated");

    Ok(Json(MessageBody::new("Student updated successfully!")))
}

/// DELETE /api/students/{id}
pub async fn delete_student(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageBody>, AppError> {
    let Path(id) = id?;
    state.db.delete(id).await?;
    info!(student_id = id, "student deleted");

    Ok(Json(MessageBody::new("Student deleted successfully!")))
}
