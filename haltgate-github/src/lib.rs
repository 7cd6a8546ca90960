//! # haltgate-github
//!
//! Code-host access for haltgate.
//!
//! [`CodeHost`] is the seam the dispatcher and pipeline depend on;
//! [`GitHubClient`] implements it against the GitHub REST API with a
//! blocking `ureq` agent.

pub mod client;
pub mod error;
pub mod host;

pub use client::GitHubClient;
pub use error::GitHubError;
pub use host::CodeHost;
