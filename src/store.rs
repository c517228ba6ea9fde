//! Storage contracts and built-in stores bridging the redirect boundary.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, RequestToken},
};

/// Boxed future returned by token store operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Externally-owned storage bridging token material across the redirect boundary.
///
/// The pending request token must survive a full navigation away from and back
/// to the application, so it lives here rather than on any in-process stack.
/// `take_pending` is a destructive one-time read: a stale secret from an
/// abandoned attempt can never be replayed. The storage medium is the
/// implementor's choice; the bridge only requires durability for at least the
/// lifetime of one redirect.
pub trait TokenStore
where
	Self: Send + Sync,
{
	/// Persists the pending request token, superseding any prior pending record.
	fn put_pending(&self, pending: RequestToken) -> StoreFuture<'_, ()>;

	/// Removes and returns the pending request token, if any.
	fn take_pending(&self) -> StoreFuture<'_, Option<RequestToken>>;

	/// Persists the session's access token, replacing any prior one.
	fn put_access_token(&self, token: AccessToken) -> StoreFuture<'_, ()>;

	/// Returns the stored access token, if any.
	fn get_access_token(&self) -> StoreFuture<'_, Option<AccessToken>>;
}

/// Error type produced by [`TokenStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Token material held by the built-in stores: at most one pending request
/// token and at most one access token per session.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct StoreSnapshot {
	pub(crate) pending: Option<RequestToken>,
	pub(crate) access: Option<AccessToken>,
}
