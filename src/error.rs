//! Bridge-level error types shared across flows, stores, and context assembly.

// self
use crate::_prelude::*;

/// Bridge-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical bridge error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem; fatal, never retried.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Authorization-session failure; the user must restart from `begin`.
	#[error(transparent)]
	Session(#[from] SessionError),
	/// Provider-side failure; retry is the caller's choice.
	#[error(transparent)]
	Upstream(#[from] UpstreamError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Context envelope could not be serialized.
	#[error(transparent)]
	Serialization(#[from] SerializationError),
}

/// Configuration and validation failures raised by the bridge.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Consumer credentials are absent or empty at signing time.
	#[error("Consumer credentials are missing or empty.")]
	MissingConsumerCredentials,
	/// A required environment variable is unset at startup.
	#[error("Environment variable `{variable}` is not set.")]
	MissingEnvironment {
		/// Name of the missing variable.
		variable: &'static str,
	},
	/// Provider refused to confirm the callback URI during leg 1.
	#[error("Provider did not confirm the callback URI.")]
	CallbackRejected {
		/// Raw request-token response body for diagnostics.
		body: String,
	},
}

/// Failures of the authorization session spanning the redirect boundary.
///
/// Every variant means the interactive flow is over; the caller re-initiates
/// from `begin` rather than retrying the failed call.
#[derive(Debug, ThisError)]
pub enum SessionError {
	/// No pending request token was found; the session expired or was cleared.
	#[error("No authorization attempt is pending; please restart authorization.")]
	NoPendingAuthorization,
	/// The callback token does not match the pending request token.
	#[error("Callback token does not match the pending request token; session expired or tampered.")]
	RequestTokenMismatch,
	/// No access token is stored for this session.
	#[error("No access token is available; complete authorization first.")]
	NotConnected,
	/// The provider rejected the stored access token on a resource call.
	#[error("Provider rejected the access token (HTTP {status}); please re-authorize.")]
	AuthorizationRejected {
		/// HTTP status returned by the provider.
		status: u16,
	},
}

/// Provider-side failures carrying raw diagnostic detail.
#[derive(Debug, ThisError)]
pub enum UpstreamError {
	/// Provider returned a non-2xx status.
	#[error("The {endpoint} endpoint returned HTTP {status}.")]
	Status {
		/// Which endpoint failed.
		endpoint: &'static str,
		/// HTTP status code.
		status: u16,
		/// Raw response body.
		body: String,
	},
	/// Token grant response did not contain an `oauth_token`.
	#[error("The {endpoint} endpoint response is missing oauth_token.")]
	MissingToken {
		/// Which endpoint failed.
		endpoint: &'static str,
		/// Raw response body.
		body: String,
	},
	/// Resource endpoint responded with malformed JSON.
	#[error("The {endpoint} endpoint returned malformed JSON.")]
	MalformedJson {
		/// Which endpoint failed.
		endpoint: &'static str,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the provider.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the provider.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Serialization failures raised while emitting context envelopes.
#[derive(Debug, ThisError)]
pub enum SerializationError {
	/// The bounded context envelope failed to serialize.
	#[error("Context envelope could not be serialized.")]
	ContextEnvelope {
		/// Underlying serializer failure.
		#[source]
		source: serde_json::Error,
	},
}
