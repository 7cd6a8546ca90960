use thiserror::Error;

use haltgate_git::GitError;
use haltgate_github::GitHubError;

/// Unrecoverable failures of one event. Per-proposal status failures are
/// never surfaced here; they land in the [`crate::DispatchReport`].
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("revision history error: {0}")]
    Git(#[from] GitError),

    #[error("code host error: {0}")]
    GitHub(#[from] GitHubError),

    #[error("{task} task failed: {message}")]
    Join { task: &'static str, message: String },
}

pub(crate) fn join_err(task: &'static str, err: tokio::task::JoinError) -> DispatchError {
    DispatchError::Join {
        task,
        message: crate::panic::describe_join_error(err),
    }
}
