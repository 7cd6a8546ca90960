//! Normalisation of task failures into readable messages.

use std::any::Any;

use tokio::task::JoinError;

/// Readable text for a panic payload. String payloads are kept verbatim.
pub fn describe_panic(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return (*message).to_string();
    }
    match payload.downcast::<String>() {
        Ok(message) => *message,
        Err(_) => "non-string panic payload".to_string(),
    }
}

pub fn describe_join_error(err: JoinError) -> String {
    if err.is_panic() {
        describe_panic(err.into_panic())
    } else {
        err.to_string()
    }
}
