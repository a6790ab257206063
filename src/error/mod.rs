mod app;
mod mail;

pub use app::AppError;
pub use mail::MailError;
