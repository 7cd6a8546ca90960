//! Fan-out dispatcher and event pipeline.
//!
//! All collaborators are blocking; this crate runs them on tokio's
//! blocking pool with per-call timeouts and bounded concurrency.

mod dispatcher;
mod error;
pub mod panic;
mod pipeline;
mod report;

pub use dispatcher::{DispatchSettings, Dispatcher};
pub use error::DispatchError;
pub use pipeline::{handle_pull_request, handle_push, EventContext, PushOutcome};
pub use report::{DispatchReport, ProposalOutcome};
