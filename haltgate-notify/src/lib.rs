//! # haltgate-notify
//!
//! Announces halt and unhalt transitions to chat. Text is rendered from
//! embedded Tera templates and delivered through a [`NotificationSink`];
//! [`SlackWebhook`] is the stock sink.
//!
//! Notification is always best-effort. Callers log a [`NotifyError`] and
//! carry on.

pub mod context;
pub mod error;
pub mod render;
pub mod sink;
pub mod slack;

pub use context::NotificationContext;
pub use error::NotifyError;
pub use render::{render_notification, Renderer};
pub use sink::NotificationSink;
pub use slack::SlackWebhook;
