pub mod config;
pub mod db;
pub mod error;
pub mod notify;
pub mod scheduler;
pub mod server;
pub mod utils;

pub use error::{AppError, MailError};
