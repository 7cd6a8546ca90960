//! Notification sink seam.

use haltgate_core::VerdictKind;

use crate::error::NotifyError;

/// Destination for halt and unhalt announcements.
///
/// Implementations are blocking; async callers wrap them in
/// `spawn_blocking`.
pub trait NotificationSink: Send + Sync {
    fn send(&self, text: &str, severity: VerdictKind) -> Result<(), NotifyError>;
}
