//! Configuration for the set-code transaction sender.
//!
//! Loads the node endpoint, the sender's private key, and transaction
//! defaults from a TOML file. The hard-coded constants of the original
//! per-network scripts live here instead.

use serde::Deserialize;
use setcode_types::SecretString;
use std::path::Path;
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
		// Extract just the message without the input dump.
		ConfigError::Parse(err.message().to_string())
	}
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	/// Node endpoint and polling behaviour.
	pub node: NodeConfig,
	/// Sender account.
	pub account: AccountConfig,
	/// Transaction defaults.
	#[serde(default)]
	pub transaction: TransactionConfig,
}

/// Node connection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeConfig {
	/// JSON-RPC endpoint URL.
	pub rpc_url: String,
	/// Milliseconds between receipt polls.
	#[serde(default = "default_poll_interval_ms")]
	pub poll_interval_ms: u64,
}

/// Sender account settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountConfig {
	/// Hex-encoded private key of the sending account.
	pub private_key: SecretString,
}

/// Transaction defaults applied when flags don't override them.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionConfig {
	/// Gas limit for the set-code transaction.
	#[serde(default = "default_gas_limit")]
	pub gas_limit: u64,
}

impl Default for TransactionConfig {
	fn default() -> Self {
		Self {
			gas_limit: default_gas_limit(),
		}
	}
}

fn default_poll_interval_ms() -> u64 {
	15_000
}

fn default_gas_limit() -> u64 {
	1_000_000
}

impl Config {
	/// Loads and validates configuration from a TOML file.
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let content = std::fs::read_to_string(path)?;
		let config: Config = toml::from_str(&content)?;
		config.validate()?;
		Ok(config)
	}

	fn validate(&self) -> Result<(), ConfigError> {
		if self.node.rpc_url.is_empty() {
			return Err(ConfigError::Validation(
				"node.rpc_url must not be empty".to_string(),
			));
		}
		if self.node.poll_interval_ms == 0 {
			return Err(ConfigError::Validation(
				"node.poll_interval_ms must be positive".to_string(),
			));
		}
		if self.account.private_key.is_empty() {
			return Err(ConfigError::Validation(
				"account.private_key must not be empty".to_string(),
			));
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;
	use tempfile::NamedTempFile;

	fn write_config(content: &str) -> NamedTempFile {
		let mut file = NamedTempFile::new().expect("temp file");
		file.write_all(content.as_bytes()).expect("write config");
		file
	}

	#[test]
	fn loads_a_full_config() {
		let file = write_config(
			r#"
[node]
rpc_url = "http://localhost:8545"
poll_interval_ms = 2000

[account]
private_key = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"

[transaction]
gas_limit = 500000
"#,
		);

		let config = Config::from_file(file.path()).unwrap();
		assert_eq!(config.node.rpc_url, "http://localhost:8545");
		assert_eq!(config.node.poll_interval_ms, 2000);
		assert_eq!(config.transaction.gas_limit, 500_000);
	}

	#[test]
	fn defaults_apply_when_omitted() {
		let file = write_config(
			r#"
[node]
rpc_url = "http://localhost:8545"

[account]
private_key = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"
"#,
		);

		let config = Config::from_file(file.path()).unwrap();
		assert_eq!(config.node.poll_interval_ms, 15_000);
		assert_eq!(config.transaction.gas_limit, 1_000_000);
	}

	#[test]
	fn rejects_missing_sections() {
		let file = write_config("[node]\nrpc_url = \"http://localhost:8545\"\n");
		assert!(matches!(
			Config::from_file(file.path()),
			Err(ConfigError::Parse(_))
		));
	}

	#[test]
	fn rejects_empty_values() {
		let file = write_config(
			r#"
[node]
rpc_url = ""

[account]
private_key = "0xabc"
"#,
		);
		assert!(matches!(
			Config::from_file(file.path()),
			Err(ConfigError::Validation(_))
		));
	}

	#[test]
	fn key_is_redacted_in_debug_output() {
		let file = write_config(
			r#"
[node]
rpc_url = "http://localhost:8545"

[account]
private_key = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"
"#,
		);
		let config = Config::from_file(file.path()).unwrap();
		let debug = format!("{:?}", config);
		assert!(!debug.contains("ac0974be"));
	}
}
