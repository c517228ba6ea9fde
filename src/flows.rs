//! Three-legged authorization flow orchestration.

pub mod state;

pub(crate) mod common;

mod begin;
mod complete;

pub use begin::*;
pub use state::*;

// crates.io
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	auth::ConsumerCredentials,
	http::HttpTransport,
	provider::ProviderDescriptor,
	sign::Signer,
	store::TokenStore,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

#[cfg(feature = "reqwest")]
/// Connector specialized for the crate's default reqwest transport.
pub type ReqwestConnector = Connector<ReqwestHttpClient>;

/// Coordinates the three-legged authorization flow against a single provider.
///
/// The connector owns the HTTP transport, token store, provider descriptor, and
/// consumer credentials so the individual legs can focus on leg-specific logic
/// (request-token acquisition, verifier exchange, resource fetches). The token
/// store is the only state that survives the user's redirect to the provider
/// and back; everything else on this struct is per-instance bookkeeping.
#[derive(Clone)]
pub struct Connector<T>
where
	T: ?Sized + HttpTransport,
{
	/// HTTP transport used for every outbound provider request.
	pub transport: Arc<T>,
	/// Token store bridging the redirect boundary.
	pub store: Arc<dyn TokenStore>,
	/// Provider descriptor defining endpoints and the callback URI.
	pub descriptor: ProviderDescriptor,
	/// Consumer credentials used to sign every request.
	pub credentials: ConsumerCredentials,
	pub(crate) state: Arc<Mutex<FlowState>>,
	pub(crate) cache: Arc<RwLock<Option<Vec<Value>>>>,
	pub(crate) attempt_guard: Arc<AsyncMutex<()>>,
}
impl<T> Connector<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates a connector that reuses the caller-provided transport.
	pub fn with_transport(
		store: Arc<dyn TokenStore>,
		descriptor: ProviderDescriptor,
		credentials: ConsumerCredentials,
		transport: impl Into<Arc<T>>,
	) -> Self {
		Self {
			transport: transport.into(),
			store,
			descriptor,
			credentials,
			state: Arc::new(Mutex::new(FlowState::Idle)),
			cache: Default::default(),
			attempt_guard: Arc::new(AsyncMutex::new(())),
		}
	}

	/// Current flow state.
	pub fn state(&self) -> FlowState {
		*self.state.lock()
	}

	/// Whether an access token is stored for this session.
	///
	/// This plus [`cached_expenses`](crate::resource) is all the outer
	/// application consumes from the bridge.
	pub async fn connected(&self) -> Result<bool> {
		Ok(self.store.get_access_token().await?.is_some())
	}

	pub(crate) fn set_state(&self, next: FlowState) {
		*self.state.lock() = next;
	}

	pub(crate) fn clear_cache(&self) {
		*self.cache.write() = None;
	}

	pub(crate) fn signer(&self) -> Signer<'_> {
		Signer::new(&self.credentials)
	}
}
#[cfg(feature = "reqwest")]
impl Connector<ReqwestHttpClient> {
	/// Creates a new connector for the provided descriptor and credentials.
	///
	/// The connector provisions its own reqwest-backed transport so callers do
	/// not need to pass HTTP handles explicitly.
	pub fn new(
		store: Arc<dyn TokenStore>,
		descriptor: ProviderDescriptor,
		credentials: ConsumerCredentials,
	) -> Self {
		Self::with_transport(store, descriptor, credentials, ReqwestHttpClient::default())
	}
}
impl<T> Debug for Connector<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Connector")
			.field("descriptor", &self.descriptor)
			.field("credentials", &self.credentials)
			.field("state", &self.state())
			.finish()
	}
}
