//! Thread-safe in-memory [`TokenStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, RequestToken},
	store::{StoreError, StoreFuture, StoreSnapshot, TokenStore},
};

type SharedSnapshot = Arc<RwLock<StoreSnapshot>>;

/// Thread-safe storage backend that keeps token material in-process.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(SharedSnapshot);
impl MemoryStore {
	fn put_pending_now(snapshot: SharedSnapshot, pending: RequestToken) -> Result<(), StoreError> {
		snapshot.write().pending = Some(pending);

		Ok(())
	}

	fn take_pending_now(snapshot: SharedSnapshot) -> Option<RequestToken> {
		snapshot.write().pending.take()
	}

	fn put_access_now(snapshot: SharedSnapshot, token: AccessToken) -> Result<(), StoreError> {
		snapshot.write().access = Some(token);

		Ok(())
	}

	fn get_access_now(snapshot: SharedSnapshot) -> Option<AccessToken> {
		snapshot.read().access.clone()
	}
}
impl TokenStore for MemoryStore {
	fn put_pending(&self, pending: RequestToken) -> StoreFuture<'_, ()> {
		let snapshot = self.0.clone();

		Box::pin(async move { Self::put_pending_now(snapshot, pending) })
	}

	fn take_pending(&self) -> StoreFuture<'_, Option<RequestToken>> {
		let snapshot = self.0.clone();

		Box::pin(async move { Ok(Self::take_pending_now(snapshot)) })
	}

	fn put_access_token(&self, token: AccessToken) -> StoreFuture<'_, ()> {
		let snapshot = self.0.clone();

		Box::pin(async move { Self::put_access_now(snapshot, token) })
	}

	fn get_access_token(&self) -> StoreFuture<'_, Option<AccessToken>> {
		let snapshot = self.0.clone();

		Box::pin(async move { Ok(Self::get_access_now(snapshot)) })
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use tokio::runtime::Runtime;
	// self
	use super::*;
	use crate::auth::TokenSecret;

	fn pending(token: &str) -> RequestToken {
		RequestToken {
			token: token.into(),
			token_secret: TokenSecret::new(format!("{token}-secret")),
			callback_confirmed: true,
		}
	}

	#[test]
	fn take_pending_is_a_one_time_read() {
		let store = MemoryStore::default();
		let rt = Runtime::new().expect("Failed to build Tokio runtime for memory store test.");

		rt.block_on(store.put_pending(pending("first")))
			.expect("Failed to persist pending fixture.");

		let taken = rt
			.block_on(store.take_pending())
			.expect("Failed to take pending fixture.")
			.expect("Pending record should be present on first read.");

		assert_eq!(taken.token, "first");
		assert!(
			rt.block_on(store.take_pending())
				.expect("Second take should succeed.")
				.is_none(),
			"The pending record must be consumed by the first read.",
		);
	}

	#[test]
	fn later_pending_supersedes_earlier_one() {
		let store = MemoryStore::default();
		let rt = Runtime::new().expect("Failed to build Tokio runtime for memory store test.");

		rt.block_on(store.put_pending(pending("first")))
			.expect("Failed to persist first pending fixture.");
		rt.block_on(store.put_pending(pending("second")))
			.expect("Failed to persist second pending fixture.");

		let taken = rt
			.block_on(store.take_pending())
			.expect("Failed to take pending fixture.")
			.expect("Pending record should be present.");

		assert_eq!(taken.token, "second", "The later attempt must supersede, not merge.");
	}

	#[test]
	fn access_token_survives_repeated_reads() {
		let store = MemoryStore::default();
		let rt = Runtime::new().expect("Failed to build Tokio runtime for memory store test.");
		let token = AccessToken { token: "access".into(), token_secret: TokenSecret::new("shh") };

		rt.block_on(store.put_access_token(token.clone()))
			.expect("Failed to persist access token fixture.");

		for _ in 0..2 {
			let fetched = rt
				.block_on(store.get_access_token())
				.expect("Failed to read access token.")
				.expect("Access token should remain present.");

			assert_eq!(fetched, token);
		}
	}
}
