//! Rust’s turnkey OAuth 1.0a expense bridge—three-legged authorization, signed resource
//! fetches, and prompt-safe bounded context in one crate built for production.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod context;
pub mod error;
pub mod flows;
pub mod http;
pub mod obs;
pub mod provider;
pub mod resource;
pub mod sign;
pub mod store;
#[cfg(feature = "reqwest")]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; compiled whenever the
	//! `reqwest` feature is enabled so test crates can use them without extra flags.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::ConsumerCredentials,
		flows::Connector,
		http::ReqwestHttpClient,
		provider::ProviderDescriptor,
		store::{MemoryStore, TokenStore},
	};

	/// Connector type alias used by reqwest-backed integration tests.
	pub type ReqwestTestConnector = Connector<ReqwestHttpClient>;

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Constructs a [`Connector`] backed by an in-memory store and the reqwest transport used
	/// across integration tests.
	pub fn build_reqwest_test_connector(
		descriptor: ProviderDescriptor,
		consumer_key: &str,
		consumer_secret: &str,
	) -> (ReqwestTestConnector, Arc<MemoryStore>) {
		let store_backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn TokenStore> = store_backend.clone();
		let credentials = ConsumerCredentials::new(consumer_key, consumer_secret);
		let connector =
			Connector::with_transport(store, descriptor, credentials, test_reqwest_http_client());

		(connector, store_backend)
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use httpmock as _;
