//! Configuration module for the orderflow system.
//!
//! Provides structures and utilities for managing engine configuration.
//! Configuration is loaded from TOML files, environment variable
//! references are resolved, and the result is validated before any
//! service is built from it.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the huge input dump
		let message = err.message().to_string();
		ConfigError::Parse(message)
	}
}

/// Main configuration structure for the orderflow engine.
///
/// Contains all sections required to run: engine identity and policy,
/// the storage backend, the payment and catalog lookups, notification
/// channels, and the optional HTTP API server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Configuration specific to this engine instance.
	pub engine: EngineConfig,
	/// Configuration for the storage backend.
	pub storage: StorageConfig,
	/// Configuration for payment status lookups.
	pub payment: PaymentConfig,
	/// Configuration for restaurant ownership lookups.
	pub catalog: CatalogConfig,
	/// Configuration for notification channels.
	pub notify: NotifyConfig,
	/// Configuration for the HTTP API server.
	pub api: Option<ApiConfig>,
}

/// Configuration specific to this engine instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
	/// Identifier for this instance, used in logs.
	pub id: String,
	/// Prefix for generated order numbers, e.g. "FD" in FD1A2B3C4D.
	#[serde(default = "default_order_number_prefix")]
	pub order_number_prefix: String,
	/// How long a shipper location ping stays fresh, in seconds.
	#[serde(default = "default_location_ttl_seconds")]
	pub location_ttl_seconds: u64,
	/// Maximum number of notification dispatches in flight at once.
	#[serde(default = "default_max_concurrent_notifications")]
	pub max_concurrent_notifications: usize,
}

/// Returns the default order number prefix.
fn default_order_number_prefix() -> String {
	"FD".to_string()
}

/// Returns the default location freshness window in seconds.
///
/// A courier that has not reported for three minutes should no longer
/// be drawn on customer tracking maps.
fn default_location_ttl_seconds() -> u64 {
	180
}

/// Returns the default notification dispatch concurrency.
fn default_max_concurrent_notifications() -> usize {
	16
}

/// Configuration for the storage backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of storage implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
	/// Interval in seconds for cleaning up expired storage entries.
	pub cleanup_interval_seconds: u64,
}

/// Configuration for payment status lookups.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaymentConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of payment implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for restaurant ownership lookups.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of catalog implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for notification channels.
///
/// Unlike the other sections there is no primary: every configured
/// channel receives every notification.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotifyConfig {
	/// Map of notification channel names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for the HTTP API server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	/// Whether the API server is enabled.
	#[serde(default)]
	pub enabled: bool,
	/// Host address to bind the server to.
	#[serde(default = "default_api_host")]
	pub host: String,
	/// Port to bind the server to.
	#[serde(default = "default_api_port")]
	pub port: u16,
	/// Request timeout in seconds.
	#[serde(default = "default_api_timeout")]
	pub timeout_seconds: u64,
	/// Maximum request size in bytes.
	#[serde(default = "default_max_request_size")]
	pub max_request_size: usize,
}

/// Returns the default API host.
fn default_api_host() -> String {
	"127.0.0.1".to_string()
}

/// Returns the default API port.
fn default_api_port() -> u16 {
	3000
}

/// Returns the default API timeout in seconds.
fn default_api_timeout() -> u64 {
	30
}

/// Returns the default maximum request size in bytes (1MB).
fn default_max_request_size() -> usize {
	1024 * 1024
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable VAR_NAME.
/// Supports default values with ${VAR_NAME:-default_value}.
///
/// Input strings are limited to 1MB to prevent ReDoS attacks.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	// Limit input size to prevent ReDoS attacks
	const MAX_INPUT_SIZE: usize = 1024 * 1024; // 1MB
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = input.to_string();
	let mut replacements = Vec::new();

	for cap in re.captures_iter(input) {
		let full_match = cap.get(0).unwrap();
		let var_name = cap.get(1).unwrap().as_str();
		let default_value = cap.get(2).map(|m| m.as_str());

		let value = match std::env::var(var_name) {
			Ok(v) => v,
			Err(_) => {
				if let Some(default) = default_value {
					default.to_string()
				} else {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name
					)));
				}
			},
		};

		replacements.push((full_match.start(), full_match.end(), value));
	}

	// Apply replacements in reverse order to maintain positions
	for (start, end, value) in replacements.iter().rev() {
		result.replace_range(start..end, value);
	}

	Ok(result)
}

impl Config {
	/// Loads configuration from a file with environment variable
	/// resolution and validation.
	pub async fn from_file(path: &str) -> Result<Self, ConfigError> {
		let content = tokio::fs::read_to_string(path).await?;
		content.parse()
	}

	/// Validates the configuration to ensure all required fields are
	/// properly set.
	///
	/// - Ensures the engine id and order number prefix are usable
	/// - Validates the storage backend and cleanup interval
	/// - Checks payment and catalog primaries resolve to configured
	///   implementations
	/// - Ensures at least one notification channel exists
	/// - Validates API server settings when enabled
	fn validate(&self) -> Result<(), ConfigError> {
		// Validate engine config
		if self.engine.id.is_empty() {
			return Err(ConfigError::Validation("Engine ID cannot be empty".into()));
		}
		if self.engine.order_number_prefix.is_empty()
			|| !self
				.engine
				.order_number_prefix
				.chars()
				.all(|c| c.is_ascii_alphanumeric())
		{
			return Err(ConfigError::Validation(
				"Order number prefix must be non-empty and alphanumeric".into(),
			));
		}
		if self.engine.location_ttl_seconds == 0 {
			return Err(ConfigError::Validation(
				"location_ttl_seconds must be greater than 0".into(),
			));
		}
		if self.engine.location_ttl_seconds > 3600 {
			return Err(ConfigError::Validation(
				"location_ttl_seconds cannot exceed 3600 (1 hour)".into(),
			));
		}
		if self.engine.max_concurrent_notifications == 0 {
			return Err(ConfigError::Validation(
				"max_concurrent_notifications must be greater than 0".into(),
			));
		}

		// Validate storage config
		if self.storage.implementations.is_empty() {
			return Err(ConfigError::Validation(
				"At least one storage implementation must be configured".into(),
			));
		}
		if self.storage.primary.is_empty() {
			return Err(ConfigError::Validation(
				"Storage primary implementation cannot be empty".into(),
			));
		}
		if !self
			.storage
			.implementations
			.contains_key(&self.storage.primary)
		{
			return Err(ConfigError::Validation(format!(
				"Primary storage '{}' not found in implementations",
				self.storage.primary
			)));
		}
		if self.storage.cleanup_interval_seconds == 0 {
			return Err(ConfigError::Validation(
				"Storage cleanup_interval_seconds must be greater than 0".into(),
			));
		}
		if self.storage.cleanup_interval_seconds > 86400 {
			return Err(ConfigError::Validation(
				"Storage cleanup_interval_seconds cannot exceed 86400 (24 hours)".into(),
			));
		}

		// Validate payment config
		if self.payment.implementations.is_empty() {
			return Err(ConfigError::Validation(
				"At least one payment implementation required".into(),
			));
		}
		if !self
			.payment
			.implementations
			.contains_key(&self.payment.primary)
		{
			return Err(ConfigError::Validation(format!(
				"Primary payment '{}' not found in implementations",
				self.payment.primary
			)));
		}

		// Validate catalog config
		if self.catalog.implementations.is_empty() {
			return Err(ConfigError::Validation(
				"At least one catalog implementation required".into(),
			));
		}
		if !self
			.catalog
			.implementations
			.contains_key(&self.catalog.primary)
		{
			return Err(ConfigError::Validation(format!(
				"Primary catalog '{}' not found in implementations",
				self.catalog.primary
			)));
		}

		// Validate notify config
		if self.notify.implementations.is_empty() {
			return Err(ConfigError::Validation(
				"At least one notification channel required".into(),
			));
		}

		// Validate API config if enabled
		if let Some(ref api) = self.api {
			if api.enabled {
				if api.port == 0 {
					return Err(ConfigError::Validation("API port cannot be 0".into()));
				}
				if api.timeout_seconds == 0 || api.timeout_seconds > 300 {
					return Err(ConfigError::Validation(
						"API timeout_seconds must be between 1 and 300".into(),
					));
				}
				if api.max_request_size == 0 {
					return Err(ConfigError::Validation(
						"API max_request_size must be greater than 0".into(),
					));
				}
			}
		}

		Ok(())
	}
}

/// Implementation of FromStr trait for Config to enable parsing from string.
///
/// Environment variables are resolved and the configuration is
/// automatically validated after parsing.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}
