//! Consumer credential loading and redaction.

// std
use std::env;
// self
use crate::{_prelude::*, auth::TokenSecret, error::ConfigError};

/// Environment variable holding the consumer key.
pub const CONSUMER_KEY_VAR: &str = "EXPENSE_BRIDGE_CONSUMER_KEY";
/// Environment variable holding the consumer secret.
pub const CONSUMER_SECRET_VAR: &str = "EXPENSE_BRIDGE_CONSUMER_SECRET";

/// Process-wide consumer credentials, loaded once at startup and immutable
/// afterwards. The secret renders as `<redacted>` in every formatter.
#[derive(Clone, Debug)]
pub struct ConsumerCredentials {
	/// Consumer key issued by the provider.
	pub key: String,
	/// Consumer secret folded into every signing key.
	pub secret: TokenSecret,
}
impl ConsumerCredentials {
	/// Creates credentials from already-loaded values.
	pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
		Self { key: key.into(), secret: TokenSecret::new(secret) }
	}

	/// Loads credentials from the process environment.
	///
	/// Absence of either variable is a startup-time configuration error, never
	/// a per-request one.
	pub fn from_env() -> Result<Self, ConfigError> {
		let key = env::var(CONSUMER_KEY_VAR)
			.map_err(|_| ConfigError::MissingEnvironment { variable: CONSUMER_KEY_VAR })?;
		let secret = env::var(CONSUMER_SECRET_VAR)
			.map_err(|_| ConfigError::MissingEnvironment { variable: CONSUMER_SECRET_VAR })?;
		let credentials = Self::new(key, secret);

		if credentials.is_empty() {
			return Err(ConfigError::MissingConsumerCredentials);
		}

		Ok(credentials)
	}

	/// Whether either credential component is empty.
	pub fn is_empty(&self) -> bool {
		self.key.is_empty() || self.secret.expose().is_empty()
	}
}
