use thiserror::Error as ThisError;

/// Failure of a single outbound message.
///
/// Reminder paths log and swallow this; only the diagnostic test route
/// surfaces it to the caller.
#[derive(Debug, ThisError)]
pub enum MailError {
    #[error("invalid mailbox {address:?}: {source}")]
    Address {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },

    #[error("failed to build message: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("mail transport unavailable: {0}")]
    Unavailable(String),
}
