pub mod reply;
pub mod student;

pub use reply::{ErrorBody, MessageBody};
pub use student::{SendEmailRequest, StudentPayload, StudentView};
