//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// External media tool locations and limits.
    pub tools: ToolConfig,

    /// Default render parameters.
    pub render: RenderDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Where to find ffmpeg/ffprobe and how long each invocation may run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// ffmpeg binary (name resolved through PATH, or an absolute path).
    pub ffmpeg_path: PathBuf,

    /// ffprobe binary.
    pub ffprobe_path: PathBuf,

    /// Upper bound for a single probe invocation, in seconds.
    pub probe_timeout_secs: u64,

    /// Upper bound for a single encode invocation, in seconds.
    pub encode_timeout_secs: u64,
}

/// Default render parameters used when a job does not override them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderDefaults {
    /// Target video bitrate in kbps.
    pub video_bitrate_kbps: u32,

    /// AAC bitrate in kbps for narration and the final mix.
    pub audio_bitrate_kbps: u32,

    /// Where thumbnails are grabbed from, in seconds into the video.
    pub thumbnail_at_secs: f64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "reelsmith=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            ffprobe_path: PathBuf::from("ffprobe"),
            probe_timeout_secs: 30,
            encode_timeout_secs: 1800,
        }
    }
}

impl ToolConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs.max(1))
    }

    pub fn encode_timeout(&self) -> Duration {
        Duration::from_secs(self.encode_timeout_secs.max(1))
    }
}

impl Default for RenderDefaults {
    fn default() -> Self {
        Self {
            video_bitrate_kbps: 8000,
            audio_bitrate_kbps: 192,
            thumbnail_at_secs: 1.0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_file_path())
    }

    /// Load config from an explicit path, falling back to defaults.
    pub fn load_from(config_path: &std::path::Path) -> Self {
        if config_path.exists() {
            match std::fs::read_to_string(config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("reelsmith").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let parsed: AppConfig =
            serde_json::from_str(r#"{"tools":{"ffmpeg_path":"/opt/ffmpeg/bin/ffmpeg"}}"#).unwrap();
        assert_eq!(parsed.tools.ffmpeg_path, PathBuf::from("/opt/ffmpeg/bin/ffmpeg"));
        assert_eq!(parsed.tools.ffprobe_path, PathBuf::from("ffprobe"));
        assert_eq!(parsed.tools.probe_timeout_secs, 30);
        assert_eq!(parsed.render.video_bitrate_kbps, 8000);
        assert_eq!(parsed.logging.level, "info");
    }

    #[test]
    fn test_missing_config_file_yields_defaults() {
        let config = AppConfig::load_from(std::path::Path::new(
            "/nonexistent/reelsmith/config.json",
        ));
        assert_eq!(config.render.audio_bitrate_kbps, 192);
        assert_eq!(config.tools.encode_timeout(), Duration::from_secs(1800));
    }

    #[test]
    fn test_zero_timeout_is_clamped() {
        let tools = ToolConfig {
            probe_timeout_secs: 0,
            ..ToolConfig::default()
        };
        assert_eq!(tools.probe_timeout(), Duration::from_secs(1));
    }
}
