//! Application-level configuration loading: place themes, carousel size and the ranking source.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use serde_with::{DurationSeconds, serde_as};
use tracing::{info, warn};

use crate::state::{
    state_machine::{DEFAULT_MAX_PARTICIPANTS, ShowcaseSettings},
    theme::{PlaceTheme, PlaceThemes},
};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/podium.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "PODIUM_BACK_CONFIG_PATH";
/// Environment variable overriding the upstream ranking URL.
const UPSTREAM_URL_ENV: &str = "RANKING_UPSTREAM_URL";
/// Environment variable overriding the upstream poll interval, in seconds.
const POLL_SECS_ENV: &str = "RANKING_POLL_SECS";
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(15);

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    showcase: ShowcaseSettings,
    replay_reveals_on_connect: bool,
    upstream: Option<UpstreamConfig>,
}

/// Where and how often the judging backend ranking is pulled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamConfig {
    /// Base URL of the judging backend.
    pub base_url: String,
    /// Delay between two successful polls.
    pub poll_interval: Duration,
}

impl AppConfig {
    /// Load the application configuration from disk, then apply environment overrides.
    pub fn load() -> Self {
        let path = resolve_config_path();
        let config = match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(app_config) => {
                    info!(
                        path = %path.display(),
                        max_participants = app_config.showcase.max_participants,
                        upstream = app_config.upstream.is_some(),
                        "loaded podium config"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        };
        config.with_env_overrides(
            env::var(UPSTREAM_URL_ENV).ok(),
            env::var(POLL_SECS_ENV).ok(),
        )
    }

    /// Parse the JSON configuration format.
    pub fn from_json(contents: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<RawConfig>(contents).map(Into::into)
    }

    /// Apply the upstream overrides coming from the environment.
    fn with_env_overrides(mut self, upstream_url: Option<String>, poll_secs: Option<String>) -> Self {
        let poll_override = poll_secs.and_then(|raw| match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
            _ => {
                warn!(value = %raw, "ignoring invalid {POLL_SECS_ENV}");
                None
            }
        });

        if let Some(url) = upstream_url.filter(|url| !url.trim().is_empty()) {
            let poll_interval = self
                .upstream
                .as_ref()
                .map(|upstream| upstream.poll_interval)
                .unwrap_or(DEFAULT_POLL_INTERVAL);
            self.upstream = Some(UpstreamConfig {
                base_url: url,
                poll_interval,
            });
        }
        if let (Some(upstream), Some(interval)) = (self.upstream.as_mut(), poll_override) {
            upstream.poll_interval = interval;
        }
        self
    }

    /// Settings handed to every showcase state machine.
    pub fn showcase(&self) -> &ShowcaseSettings {
        &self.showcase
    }

    /// Whether viewers that connect late get the already revealed places.
    pub fn replay_reveals_on_connect(&self) -> bool {
        self.replay_reveals_on_connect
    }

    /// Upstream ranking source, when one is configured.
    pub fn upstream(&self) -> Option<&UpstreamConfig> {
        self.upstream.as_ref()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            showcase: ShowcaseSettings::default(),
            replay_reveals_on_connect: true,
            upstream: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    themes: RawThemes,
    max_participants: Option<usize>,
    replay_reveals_on_connect: Option<bool>,
    upstream: Option<RawUpstream>,
}

#[derive(Debug, Default, Deserialize)]
/// Optional per-place theme overrides.
struct RawThemes {
    first: Option<PlaceTheme>,
    second: Option<PlaceTheme>,
    third: Option<PlaceTheme>,
    finalist: Option<PlaceTheme>,
}

#[serde_as]
#[derive(Debug, Deserialize)]
/// JSON representation of the upstream ranking source.
struct RawUpstream {
    base_url: String,
    #[serde_as(as = "Option<DurationSeconds<u64>>")]
    poll_interval_secs: Option<Duration>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let themes = PlaceThemes::with_overrides(
            value.themes.first,
            value.themes.second,
            value.themes.third,
            value.themes.finalist,
        );
        let max_participants = value
            .max_participants
            .filter(|max| *max > 0)
            .unwrap_or(DEFAULT_MAX_PARTICIPANTS);

        Self {
            showcase: ShowcaseSettings {
                themes,
                max_participants,
            },
            replay_reveals_on_connect: value.replay_reveals_on_connect.unwrap_or(true),
            upstream: value.upstream.map(|upstream| UpstreamConfig {
                base_url: upstream.base_url,
                poll_interval: upstream
                    .poll_interval_secs
                    .filter(|interval| !interval.is_zero())
                    .unwrap_or(DEFAULT_POLL_INTERVAL),
            }),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let config = AppConfig::from_json("{}").unwrap();
        assert_eq!(config.showcase().max_participants, DEFAULT_MAX_PARTICIPANTS);
        assert!(config.replay_reveals_on_connect());
        assert!(config.upstream().is_none());
        assert_eq!(config.showcase().themes, PlaceThemes::default());
    }

    #[test]
    fn file_overrides_are_applied() {
        let raw = r##"{
            "max_participants": 8,
            "replay_reveals_on_connect": false,
            "upstream": { "base_url": "http://judging:8000", "poll_interval_secs": 30 },
            "themes": {
                "first": {
                    "label": "Champion",
                    "gradient": "linear-gradient(#000, #fff)",
                    "accent": "#fff",
                    "text": "#000",
                    "glow": "#fff",
                    "beam": "#fff",
                    "firework_colors": ["#fff"]
                }
            }
        }"##;
        let config = AppConfig::from_json(raw).unwrap();
        assert_eq!(config.showcase().max_participants, 8);
        assert!(!config.replay_reveals_on_connect());
        assert_eq!(
            config.upstream(),
            Some(&UpstreamConfig {
                base_url: "http://judging:8000".into(),
                poll_interval: Duration::from_secs(30),
            })
        );
        assert_eq!(config.showcase().themes.get(1).label, "Champion");
        assert_eq!(config.showcase().themes.get(2), &PlaceTheme::second());
    }

    #[test]
    fn environment_overrides_upstream() {
        let config = AppConfig::default()
            .with_env_overrides(Some("http://ranking".into()), Some("5".into()));
        assert_eq!(
            config.upstream(),
            Some(&UpstreamConfig {
                base_url: "http://ranking".into(),
                poll_interval: Duration::from_secs(5),
            })
        );

        let untouched = AppConfig::default().with_env_overrides(None, Some("zero".into()));
        assert!(untouched.upstream().is_none());
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(AppConfig::from_json("{ not json").is_err());
    }
}
