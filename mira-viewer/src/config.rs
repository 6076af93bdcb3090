//! Viewer configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use mira_core::{ConnectOptions, ReaderConfig, RegionBackend};

/// Top-level configuration for the viewer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Stream identity and sizing, agreed with the engine.
    pub stream: StreamConfig,
    /// Poll-loop timing.
    pub reader: ReaderSettings,
    /// Logging.
    pub logging: LoggingConfig,
}

/// Stream settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Stream name the region name is derived from.
    pub name: String,
    /// Region backend: "file" or "shm".
    pub backend: String,
    /// Maximum frame width the region was sized for.
    pub max_width: u32,
    /// Maximum frame height the region was sized for.
    pub max_height: u32,
}

/// Poll-loop timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderSettings {
    /// Delay between poll ticks in milliseconds.
    pub poll_interval_ms: u64,
    /// Delay before resuming after a read failure, in milliseconds.
    pub backoff_interval_ms: u64,
}

/// Logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level.
    pub level: String,
}

// ── Defaults ─────────────────────────────────────────────────────

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            stream: StreamConfig::default(),
            reader: ReaderSettings::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            name: "frames_8888".into(),
            backend: "file".into(),
            max_width: 1920,
            max_height: 1080,
        }
    }
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 16,
            backoff_interval_ms: 100,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

// ── Loading / derivation ─────────────────────────────────────────

impl ViewerConfig {
    /// Load from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!("invalid config {}: {e}; using defaults", path.display());
                Self::default()
            }),
            Err(_) => {
                tracing::info!("no config at {}; using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Connection parameters for the frame reader. The region is
    /// sized for 4-byte-per-pixel frames at the configured maximum
    /// dimensions.
    pub fn connect_options(&self) -> ConnectOptions {
        ConnectOptions {
            stream_name: self.stream.name.clone(),
            max_frame_size: self.stream.max_width as usize * self.stream.max_height as usize * 4,
            backend: self.backend(),
        }
    }

    /// Poll-loop timing for the frame reader.
    pub fn reader_config(&self) -> ReaderConfig {
        ReaderConfig {
            poll_interval: Duration::from_millis(self.reader.poll_interval_ms),
            backoff_interval: Duration::from_millis(self.reader.backoff_interval_ms),
        }
    }

    fn backend(&self) -> RegionBackend {
        match self.stream.backend.as_str() {
            "file" => RegionBackend::FileMapping,
            "shm" => RegionBackend::PosixShm,
            other => {
                tracing::warn!("unknown backend {other:?}; using file mapping");
                RegionBackend::FileMapping
            }
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let cfg = ViewerConfig::default();
        let text = toml::to_string_pretty(&cfg).unwrap();
        assert!(text.contains("frames_8888"));
        assert!(text.contains("max_width"));
    }

    #[test]
    fn roundtrip_config() {
        let cfg = ViewerConfig::default();
        let text = toml::to_string_pretty(&cfg).unwrap();
        let parsed: ViewerConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.stream.max_width, 1920);
        assert_eq!(parsed.reader.poll_interval_ms, 16);
    }

    #[test]
    fn connect_options_size_the_region_for_rgba() {
        let cfg = ViewerConfig::default();
        let options = cfg.connect_options();
        assert_eq!(options.max_frame_size, 1920 * 1080 * 4);
        assert_eq!(options.backend, RegionBackend::FileMapping);
    }

    #[test]
    fn unknown_backend_falls_back_to_file() {
        let mut cfg = ViewerConfig::default();
        cfg.stream.backend = "carrier-pigeon".into();
        assert_eq!(cfg.connect_options().backend, RegionBackend::FileMapping);

        cfg.stream.backend = "shm".into();
        assert_eq!(cfg.connect_options().backend, RegionBackend::PosixShm);
    }
}
