//! Run configuration.
//!
//! Settings arrive in layers (flags, environment, optional YAML file). Each
//! layer is a [`PartialSettings`]; layers are merged highest-precedence
//! first and then validated into [`Settings`] before any network I/O.
//!
//! ```yaml
//! repository: acme/widgets
//! trunk_branch: main
//! sentinel_path: .github/HALT
//! status_check_name: halt
//! notification_channels: ["#deploys"]
//! ```

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::types::RepoSlug;

pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// One configuration layer. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PartialSettings {
    pub repository: Option<String>,
    pub trunk_branch: Option<String>,
    pub sentinel_path: Option<String>,
    pub status_check_name: Option<String>,
    pub status_target_url: Option<String>,
    pub halt_reference_branch: Option<String>,
    pub notification_webhook: Option<String>,
    pub notification_channels: Option<Vec<String>>,
    pub auth_token: Option<String>,
    pub api_base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub max_concurrency: Option<usize>,
}

impl PartialSettings {
    /// Loads a YAML configuration file.
    pub fn load_yaml_at(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Fills every field unset in `self` from `fallback`.
    pub fn or(self, fallback: PartialSettings) -> PartialSettings {
        PartialSettings {
            repository: self.repository.or(fallback.repository),
            trunk_branch: self.trunk_branch.or(fallback.trunk_branch),
            sentinel_path: self.sentinel_path.or(fallback.sentinel_path),
            status_check_name: self.status_check_name.or(fallback.status_check_name),
            status_target_url: self.status_target_url.or(fallback.status_target_url),
            halt_reference_branch: self
                .halt_reference_branch
                .or(fallback.halt_reference_branch),
            notification_webhook: self.notification_webhook.or(fallback.notification_webhook),
            notification_channels: self
                .notification_channels
                .or(fallback.notification_channels),
            auth_token: self.auth_token.or(fallback.auth_token),
            api_base_url: self.api_base_url.or(fallback.api_base_url),
            request_timeout_secs: self.request_timeout_secs.or(fallback.request_timeout_secs),
            max_concurrency: self.max_concurrency.or(fallback.max_concurrency),
        }
    }
}

/// Validated configuration for one run.
#[derive(Clone, PartialEq, Eq)]
pub struct Settings {
    pub repository: RepoSlug,
    pub trunk_branch: String,
    pub sentinel_path: String,
    pub status_check_name: String,
    pub status_target_url: Option<String>,
    pub halt_reference_branch: Option<String>,
    pub notification_webhook: Option<String>,
    pub notification_channels: Vec<String>,
    pub auth_token: String,
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub max_concurrency: usize,
}

impl Settings {
    /// Validates a merged configuration layer.
    ///
    /// Required fields are checked in declaration order and the first
    /// missing one is reported.
    pub fn resolve(partial: PartialSettings) -> Result<Self, ConfigError> {
        let repository: RepoSlug = required(partial.repository, "repository")?.parse()?;
        let trunk_branch = required(partial.trunk_branch, "trunk_branch")?;
        let sentinel_path = required(partial.sentinel_path, "sentinel_path")?;
        let status_check_name = required(partial.status_check_name, "status_check_name")?;
        let auth_token = required(partial.auth_token, "auth_token")?;

        let request_timeout_secs = partial
            .request_timeout_secs
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        if request_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "request_timeout_secs",
                reason: "must be at least 1".to_string(),
            });
        }
        let max_concurrency = partial.max_concurrency.unwrap_or(DEFAULT_MAX_CONCURRENCY);
        if max_concurrency == 0 {
            return Err(ConfigError::Invalid {
                field: "max_concurrency",
                reason: "must be at least 1".to_string(),
            });
        }

        let notification_channels = partial
            .notification_channels
            .unwrap_or_default()
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();

        Ok(Self {
            repository,
            trunk_branch,
            sentinel_path,
            status_check_name,
            status_target_url: optional(partial.status_target_url),
            halt_reference_branch: optional(partial.halt_reference_branch),
            notification_webhook: optional(partial.notification_webhook),
            notification_channels,
            auth_token,
            api_base_url: optional(partial.api_base_url)
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            request_timeout: Duration::from_secs(request_timeout_secs),
            max_concurrency,
        })
    }

    /// Branch whose sentinel file gates proposals.
    pub fn reference_branch(&self) -> &str {
        self.halt_reference_branch
            .as_deref()
            .unwrap_or(&self.trunk_branch)
    }

    /// Whether a pushed ref (`main` or `refs/heads/main`) is the trunk.
    pub fn is_trunk_ref(&self, git_ref: &str) -> bool {
        let branch = git_ref.strip_prefix("refs/heads/").unwrap_or(git_ref);
        branch == self.trunk_branch
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("repository", &self.repository)
            .field("trunk_branch", &self.trunk_branch)
            .field("sentinel_path", &self.sentinel_path)
            .field("status_check_name", &self.status_check_name)
            .field("status_target_url", &self.status_target_url)
            .field("halt_reference_branch", &self.halt_reference_branch)
            .field(
                "notification_webhook",
                &self.notification_webhook.as_ref().map(|_| "[REDACTED]"),
            )
            .field("notification_channels", &self.notification_channels)
            .field("auth_token", &"[REDACTED]")
            .field("api_base_url", &self.api_base_url)
            .field("request_timeout", &self.request_timeout)
            .field("max_concurrency", &self.max_concurrency)
            .finish()
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ConfigError> {
    optional(value).ok_or(ConfigError::Missing { field })
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> PartialSettings {
        PartialSettings {
            repository: Some("acme/widgets".into()),
            trunk_branch: Some("main".into()),
            sentinel_path: Some(".github/HALT".into()),
            status_check_name: Some("halt".into()),
            auth_token: Some("t0ken".into()),
            ..PartialSettings::default()
        }
    }

    #[test]
    fn resolve_applies_defaults() {
        let settings = Settings::resolve(complete()).expect("resolve");
        assert_eq!(settings.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(settings.request_timeout, Duration::from_secs(30));
        assert_eq!(settings.max_concurrency, DEFAULT_MAX_CONCURRENCY);
        assert_eq!(settings.reference_branch(), "main");
        assert!(settings.notification_channels.is_empty());
    }

    #[test]
    fn blank_required_field_counts_as_missing() {
        let partial = PartialSettings {
            sentinel_path: Some("   ".into()),
            ..complete()
        };
        let err = Settings::resolve(partial).unwrap_err();
        assert!(matches!(err, ConfigError::Missing { field: "sentinel_path" }), "got: {err}");
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let partial = PartialSettings {
            max_concurrency: Some(0),
            ..complete()
        };
        let err = Settings::resolve(partial).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "max_concurrency", .. }));
    }

    #[test]
    fn reference_branch_override() {
        let partial = PartialSettings {
            halt_reference_branch: Some("release".into()),
            ..complete()
        };
        let settings = Settings::resolve(partial).expect("resolve");
        assert_eq!(settings.reference_branch(), "release");
    }

    #[test]
    fn trunk_ref_accepts_short_and_full_names() {
        let settings = Settings::resolve(complete()).expect("resolve");
        assert!(settings.is_trunk_ref("main"));
        assert!(settings.is_trunk_ref("refs/heads/main"));
        assert!(!settings.is_trunk_ref("refs/heads/feature"));
        assert!(!settings.is_trunk_ref("refs/tags/main"));
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let partial = PartialSettings {
            notification_webhook: Some("https://hooks.example.com/secret".into()),
            ..complete()
        };
        let settings = Settings::resolve(partial).expect("resolve");
        let debug = format!("{settings:?}");
        assert!(!debug.contains("t0ken"));
        assert!(!debug.contains("secret"));
    }
}
