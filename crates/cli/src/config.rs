//! TOML settings for the `callbook` binary.

use std::path::{Path, PathBuf};
use std::time::Duration;

use callbook_contacts::ServiceConfig;
use callbook_primitives::MAX_RECIPIENT_COUNT;
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error reading a configuration file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// Error parsing TOML syntax or an unexpected key.
	#[error("TOML parse error: {0}")]
	Parse(#[from] toml::de::Error),

	/// A value is outside its accepted range.
	#[error("invalid setting: {0}")]
	Invalid(String),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
	pub service: ServiceConfig,
	pub source: SourceSettings,
	pub watch: WatchSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceSettings {
	/// Address-book export to read.
	pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatchSettings {
	pub poll_interval_ms: u64,
}

impl Default for WatchSettings {
	fn default() -> Self {
		Self { poll_interval_ms: 500 }
	}
}

impl Settings {
	/// `<config dir>/callbook/config.toml`, when the platform has a config dir.
	pub fn default_path() -> Option<PathBuf> {
		dirs::config_dir().map(|dir| dir.join("callbook").join("config.toml"))
	}

	/// Loads settings from `explicit`, or from [`Settings::default_path`].
	///
	/// An explicit path must exist. A missing default file yields defaults.
	pub fn load(explicit: Option<&Path>) -> Result<Self> {
		let (path, required) = match explicit {
			Some(path) => (path.to_path_buf(), true),
			None => match Self::default_path() {
				Some(path) => (path, false),
				None => return Ok(Self::default()),
			},
		};

		match std::fs::read_to_string(&path) {
			Ok(text) => {
				tracing::debug!(path = %path.display(), "loading settings");
				Self::from_toml(&text)
			}
			Err(error) if !required && error.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
			Err(error) => Err(ConfigError::Io { path, error }),
		}
	}

	pub fn from_toml(text: &str) -> Result<Self> {
		let settings: Self = toml::from_str(text)?;
		settings.validate()?;
		Ok(settings)
	}

	fn validate(&self) -> Result<()> {
		let max = self.service.max_recipients;
		if max == 0 || max > MAX_RECIPIENT_COUNT {
			return Err(ConfigError::Invalid(format!(
				"service.max_recipients must be between 1 and {MAX_RECIPIENT_COUNT}, got {max}"
			)));
		}
		if self.service.mailbox_capacity == 0 {
			return Err(ConfigError::Invalid("service.mailbox_capacity must be > 0".to_string()));
		}
		if self.service.event_buffer == 0 {
			return Err(ConfigError::Invalid("service.event_buffer must be > 0".to_string()));
		}
		if self.watch.poll_interval_ms == 0 {
			return Err(ConfigError::Invalid("watch.poll_interval_ms must be > 0".to_string()));
		}
		Ok(())
	}

	/// Export path, preferring the command-line override.
	pub fn contacts_path(&self, cli_override: Option<&Path>) -> Result<PathBuf> {
		cli_override
			.map(Path::to_path_buf)
			.or_else(|| self.source.path.clone())
			.ok_or_else(|| ConfigError::Invalid("no address-book export configured; pass --contacts or set [source] path".to_string()))
	}

	/// Poll interval, preferring the command-line override. Zero is rejected.
	pub fn poll_interval(&self, cli_override: Option<u64>) -> Result<Duration> {
		match cli_override.unwrap_or(self.watch.poll_interval_ms) {
			0 => Err(ConfigError::Invalid("poll interval must be > 0".to_string())),
			ms => Ok(Duration::from_millis(ms)),
		}
	}
}
