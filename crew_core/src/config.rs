use std::{
    env, fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use thiserror::Error;

use crew_proto::PollTarget;

pub const BUILTIN_CLIENT_CONFIG: &str = include_str!("data/client_config.json");

/// Environment variable naming a JSON file that replaces the builtin config.
pub const CLIENT_CONFIG_ENV: &str = "CREWLINK_CLIENT_CONFIG_PATH";

/// Tunables for polling cadence and local presentation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    player_poll_interval_ms: u64,
    lobby_poll_interval_ms: u64,
    timer_tick_ms: u64,
    request_timeout_ms: u64,
    notice_history: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            player_poll_interval_ms: 3000,
            lobby_poll_interval_ms: 2500,
            timer_tick_ms: 1000,
            request_timeout_ms: 8000,
            notice_history: 8,
        }
    }
}

impl ClientConfig {
    pub fn builtin() -> Self {
        Self::from_json_str(BUILTIN_CLIENT_CONFIG).unwrap_or_default()
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let config: ClientConfig = serde_json::from_str(json)?;
        Ok(config.sanitized())
    }

    pub fn from_file(path: &Path) -> Result<Self, ClientConfigError> {
        let contents =
            fs::read_to_string(path).map_err(|source| ClientConfigError::ReadFailed {
                path: path.to_path_buf(),
                source,
            })?;
        let config = ClientConfig::from_json_str(&contents)?;
        Ok(config)
    }

    /// Poll interval for the endpoint backing `target`.
    pub fn poll_interval(&self, target: PollTarget) -> Duration {
        match target {
            PollTarget::Player => Duration::from_millis(self.player_poll_interval_ms),
            PollTarget::Lobby => Duration::from_millis(self.lobby_poll_interval_ms),
        }
    }

    pub fn timer_tick(&self) -> Duration {
        Duration::from_millis(self.timer_tick_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn notice_history(&self) -> usize {
        self.notice_history
    }

    /// Override both poll intervals (CLI `--poll-ms`).
    pub fn with_poll_interval_ms(mut self, millis: u64) -> Self {
        self.player_poll_interval_ms = millis;
        self.lobby_poll_interval_ms = millis;
        self.sanitized()
    }

    // Zero intervals would spin the poll loop.
    fn sanitized(mut self) -> Self {
        self.player_poll_interval_ms = self.player_poll_interval_ms.max(250);
        self.lobby_poll_interval_ms = self.lobby_poll_interval_ms.max(250);
        self.timer_tick_ms = self.timer_tick_ms.max(50);
        self.request_timeout_ms = self.request_timeout_ms.max(500);
        self.notice_history = self.notice_history.max(1);
        self
    }
}

#[derive(Debug, Error)]
pub enum ClientConfigError {
    #[error("failed to parse client config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read client config from {path:?}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, Default)]
pub struct ClientConfigMetadata {
    path: Option<PathBuf>,
}

impl ClientConfigMetadata {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }
}

/// Load the config named by `explicit`, else by [`CLIENT_CONFIG_ENV`], else
/// the builtin. A file that fails to load is logged and skipped.
pub fn load_client_config(explicit: Option<&Path>) -> (ClientConfig, ClientConfigMetadata) {
    let override_path = explicit
        .map(Path::to_path_buf)
        .or_else(|| env::var(CLIENT_CONFIG_ENV).ok().map(PathBuf::from));

    if let Some(path) = override_path {
        match ClientConfig::from_file(&path) {
            Ok(config) => {
                tracing::info!(
                    target: "crewlink::config",
                    path = %path.display(),
                    "client_config.loaded=file"
                );
                return (config, ClientConfigMetadata::new(Some(path)));
            }
            Err(err) => {
                tracing::warn!(
                    target: "crewlink::config",
                    path = %path.display(),
                    error = %err,
                    "client_config.load_failed"
                );
            }
        }
    }

    tracing::info!(target: "crewlink::config", "client_config.loaded=builtin");
    (ClientConfig::builtin(), ClientConfigMetadata::new(None))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_matches_defaults() {
        assert_eq!(ClientConfig::builtin(), ClientConfig::default());
    }

    #[test]
    fn partial_json_keeps_remaining_defaults() {
        let config = ClientConfig::from_json_str(r#"{"player_poll_interval_ms": 4000}"#).unwrap();
        assert_eq!(
            config.poll_interval(PollTarget::Player),
            Duration::from_millis(4000)
        );
        assert_eq!(
            config.poll_interval(PollTarget::Lobby),
            Duration::from_millis(2500)
        );
    }

    #[test]
    fn zero_intervals_are_raised() {
        let config = ClientConfig::default().with_poll_interval_ms(0);
        assert_eq!(
            config.poll_interval(PollTarget::Player),
            Duration::from_millis(250)
        );
    }

    #[test]
    fn missing_file_falls_back_to_builtin() {
        let (config, metadata) =
            load_client_config(Some(Path::new("/definitely/not/here/client.json")));
        assert_eq!(config, ClientConfig::builtin());
        assert!(metadata.path().is_none());
    }
}
