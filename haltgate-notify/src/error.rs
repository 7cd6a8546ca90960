//! Error types for haltgate-notify.

use thiserror::Error;

/// All errors that can arise while rendering or delivering a notification.
///
/// None of these are fatal to a run; callers log them.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Tera template engine error.
    #[error("template engine error: {0}")]
    Tera(#[from] tera::Error),

    /// The webhook answered with a non-success HTTP status.
    #[error("webhook returned {status} for channel {channel}: {message}")]
    Status {
        channel: String,
        status: u16,
        message: String,
    },

    /// The webhook request never produced a response.
    #[error("webhook transport error for channel {channel}: {message}")]
    Transport { channel: String, message: String },
}
