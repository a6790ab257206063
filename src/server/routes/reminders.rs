use crate::error::AppError;
use crate::notify::ReminderKind;
use crate::scheduler::run_sweep;
use crate::server::router::AppState;
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use postgrad_schema::{MessageBody, SendEmailRequest};

/// POST /api/send-email
///
/// Sends the reminder pair for one student looked up by email. Delivery
/// failures are logged and reported in the message, not as an error status.
pub async fn send_email(
    State(state): State<AppState>,
    payload: Result<Json<SendEmailRequest>, JsonRejection>,
) -> Result<Json<MessageBody>, AppError> {
    let Json(req) = payload?;
    let email = req
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::Validation("email is required!".to_string()))?;

    let student = state
        .db
        .find_by_email(email)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No student found with email {email}")))?;

    let delivery = state.notifier.notify(&student, ReminderKind::Manual).await;
    let message = if delivery.failed() == 0 {
        format!(
            "Reminder emails sent to {} and {}",
            student.student_email, student.supervisor_email
        )
    } else {
        format!(
            "Reminder processed for {}: {} of {} emails delivered",
            student.student_email, delivery.delivered, delivery.attempted
        )
    };
    Ok(Json(MessageBody::new(message)))
}

/// POST /api/send-reminders
///
/// Synchronous sweep over every record with the manual reminder kind.
pub async fn send_reminders(
    State(state): State<AppState>,
) -> Result<Json<MessageBody>, AppError> {
    let delivery = run_sweep(&state.db, &state.notifier, ReminderKind::Manual).await?;
    Ok(Json(MessageBody::new(format!(
        "Reminder emails sent to all students: {} of {} delivered",
        delivery.delivered, delivery.attempted
    ))))
}

/// GET /api/test-email
///
/// Sends a diagnostic message to the configured sender address.
pub async fn test_email(State(state): State<AppState>) -> Result<Json<MessageBody>, AppError> {
    let to = state.notifier.send_test().await?;
    Ok(Json(MessageBody::new(format!("Test email sent to {to}"))))
}
