//! haltgate core library: domain types, change-set extraction, halt
//! message codec, reconciliation, and configuration.
//!
//! - [`types`]: newtypes and domain structs
//! - [`changes`]: net change-set extraction from status records
//! - [`message`]: sentinel-file message codec
//! - [`reconcile`]: halt/unhalt state machine
//! - [`config`]: layered run configuration
//! - [`error`]: [`ConfigError`]

pub mod changes;
pub mod config;
pub mod error;
pub mod message;
pub mod reconcile;
pub mod types;

pub use config::{PartialSettings, Settings};
pub use error::ConfigError;
pub use reconcile::Reconciler;
pub use types::{
    ChangeSet, ChangedFile, FileStatus, HaltMessage, PathSet, Proposal, ProposalNumber,
    RepoSlug, StatusRecord, StatusState, StatusUpdate, Verdict, VerdictKind,
};
