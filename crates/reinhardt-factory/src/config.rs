//! Configuration for factory contexts.
//!
//! Supports TOML configuration files and builder-style overrides.
//!
//! ```toml
//! sequence_start = 1
//! default_strategy = "build"
//! default_aliases = true
//! detect_cycles = true
//! max_association_depth = 16
//! stub_id_start = 1000
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::strategy::StrategyKind;

/// Settings applied to a [`FactoryContext`](crate::FactoryContext).
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactoryConfig {
	/// Initial value for sequences declared without an explicit start.
	pub sequence_start: i64,

	/// Strategy used by `materialize_default` when a factory declares none.
	pub default_strategy: StrategyKind,

	/// Install the `foo_id` <-> `foo` alias rules.
	pub default_aliases: bool,

	/// Reject association chains that re-enter a factory being built.
	pub detect_cycles: bool,

	/// Maximum nesting of association resolution.
	pub max_association_depth: usize,

	/// First identity handed out to stubbed instances.
	pub stub_id_start: u64,
}

impl Default for FactoryConfig {
	fn default() -> Self {
		Self {
			sequence_start: 1,
			default_strategy: StrategyKind::Create,
			default_aliases: true,
			detect_cycles: true,
			max_association_depth: 32,
			stub_id_start: 1000,
		}
	}
}

impl FactoryConfig {
	/// Create a configuration with default settings.
	pub fn new() -> Self {
		Self::default()
	}

	/// Set the initial sequence value.
	pub fn with_sequence_start(mut self, start: i64) -> Self {
		self.sequence_start = start;
		self
	}

	/// Set the fallback default strategy.
	pub fn with_default_strategy(mut self, strategy: StrategyKind) -> Self {
		self.default_strategy = strategy;
		self
	}

	/// Enable or disable the built-in alias rules.
	pub fn with_default_aliases(mut self, enabled: bool) -> Self {
		self.default_aliases = enabled;
		self
	}

	/// Enable or disable cycle detection for associations.
	pub fn with_cycle_detection(mut self, enabled: bool) -> Self {
		self.detect_cycles = enabled;
		self
	}

	/// Set the maximum association nesting depth.
	pub fn with_max_association_depth(mut self, depth: usize) -> Self {
		self.max_association_depth = depth;
		self
	}

	/// Set the first stub identity.
	pub fn with_stub_id_start(mut self, start: u64) -> Self {
		self.stub_id_start = start;
		self
	}

	/// Load configuration from a TOML file.
	///
	/// # Errors
	///
	/// Returns error if file cannot be read or parsed.
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
			path: path.as_ref().to_path_buf(),
			source: e,
		})?;

		Self::from_toml(&content)
	}

	/// Parse configuration from TOML string.
	pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
		toml::from_str(content).map_err(|e| ConfigError::Parse {
			message: e.to_string(),
		})
	}
}

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// The configuration file could not be read.
	#[error("Failed to read config file {path:?}: {source}")]
	Io {
		/// File path.
		path: PathBuf,
		/// Underlying I/O error.
		#[source]
		source: std::io::Error,
	},

	/// The configuration could not be parsed.
	#[error("Failed to parse config: {message}")]
	Parse {
		/// Parser message.
		message: String,
	},
}
