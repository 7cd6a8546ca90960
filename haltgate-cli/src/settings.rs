//! Configuration flags shared by every dispatching command.
//!
//! Each flag also reads its environment variable (clap `env`), so flags win
//! over the environment, and both win over the `--config` YAML file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use haltgate_core::{PartialSettings, Settings};

#[derive(Args, Debug, Clone, Default)]
pub struct SettingsArgs {
    /// YAML file with defaults for any setting below.
    #[arg(long, global = true, env = "HALT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Repository as `owner/name`.
    #[arg(long, global = true, env = "GITHUB_REPOSITORY")]
    pub repository: Option<String>,

    #[arg(long, global = true, env = "HALT_TRUNK_BRANCH")]
    pub trunk_branch: Option<String>,

    /// Path of the halt sentinel file, relative to the repository root.
    #[arg(long, global = true, env = "HALT_SENTINEL_PATH")]
    pub sentinel_path: Option<String>,

    #[arg(long, global = true, env = "HALT_STATUS_CHECK_NAME")]
    pub status_check_name: Option<String>,

    /// Link attached to failing statuses.
    #[arg(long, global = true, env = "HALT_STATUS_TARGET_URL")]
    pub status_target_url: Option<String>,

    /// Branch whose sentinel gates pull requests (defaults to the trunk).
    #[arg(long, global = true, env = "HALT_REFERENCE_BRANCH")]
    pub halt_reference_branch: Option<String>,

    #[arg(long, global = true, env = "HALT_NOTIFICATION_WEBHOOK", hide_env_values = true)]
    pub notification_webhook: Option<String>,

    /// Chat channel to announce in. Repeatable.
    #[arg(
        long = "notification-channel",
        global = true,
        env = "HALT_NOTIFICATION_CHANNELS",
        value_delimiter = ','
    )]
    pub notification_channels: Vec<String>,

    #[arg(long, global = true, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub auth_token: Option<String>,

    #[arg(long, global = true, env = "GITHUB_API_URL")]
    pub api_base_url: Option<String>,

    #[arg(long, global = true, env = "HALT_REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: Option<u64>,

    #[arg(long, global = true, env = "HALT_MAX_CONCURRENCY")]
    pub max_concurrency: Option<usize>,
}

impl SettingsArgs {
    /// Flag and environment layer.
    pub fn to_partial(&self) -> PartialSettings {
        PartialSettings {
            repository: self.repository.clone(),
            trunk_branch: self.trunk_branch.clone(),
            sentinel_path: self.sentinel_path.clone(),
            status_check_name: self.status_check_name.clone(),
            status_target_url: self.status_target_url.clone(),
            halt_reference_branch: self.halt_reference_branch.clone(),
            notification_webhook: self.notification_webhook.clone(),
            notification_channels: (!self.notification_channels.is_empty())
                .then(|| self.notification_channels.clone()),
            auth_token: self.auth_token.clone(),
            api_base_url: self.api_base_url.clone(),
            request_timeout_secs: self.request_timeout_secs,
            max_concurrency: self.max_concurrency,
        }
    }

    /// Merges flags, environment and the optional config file.
    pub fn resolve(&self) -> Result<Settings> {
        let file = match &self.config {
            Some(path) => PartialSettings::load_yaml_at(path)
                .with_context(|| format!("failed to load config file {}", path.display()))?,
            None => PartialSettings::default(),
        };
        let settings = Settings::resolve(self.to_partial().or(file))
            .context("invalid configuration")?;
        tracing::debug!(settings = ?settings, "resolved configuration");
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn complete() -> SettingsArgs {
        SettingsArgs {
            repository: Some("acme/widgets".into()),
            trunk_branch: Some("main".into()),
            sentinel_path: Some(".github/HALT".into()),
            status_check_name: Some("halt".into()),
            auth_token: Some("t0ken".into()),
            ..SettingsArgs::default()
        }
    }

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("haltgate.yaml");
        fs::write(
            &path,
            "trunk_branch: develop\nstatus_target_url: https://example.com/halt\n",
        )
        .expect("write config");

        let args = SettingsArgs {
            config: Some(path),
            ..complete()
        };
        let settings = args.resolve().expect("resolve");
        assert_eq!(settings.trunk_branch, "main");
        assert_eq!(
            settings.status_target_url.as_deref(),
            Some("https://example.com/halt")
        );
    }

    #[test]
    fn empty_channel_list_defers_to_lower_layers() {
        assert_eq!(complete().to_partial().notification_channels, None);
        let args = SettingsArgs {
            notification_channels: vec!["#deploys".into()],
            ..complete()
        };
        assert_eq!(
            args.to_partial().notification_channels,
            Some(vec!["#deploys".to_string()])
        );
    }

    #[test]
    fn missing_required_setting_names_the_field() {
        let args = SettingsArgs {
            auth_token: None,
            ..complete()
        };
        let err = args.resolve().unwrap_err();
        assert!(format!("{err:#}").contains("auth_token"), "got: {err:#}");
    }
}
