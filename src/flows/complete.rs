//! Leg 3: verifier exchange, token persistence, and cache priming.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, AuthorizationCallback},
	error::SessionError,
	flows::{Connector, FlowState, common},
	http::HttpTransport,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	sign::{Method, RequestDescriptor},
};

const ACCESS_TOKEN_ENDPOINT: &str = "access-token";
const PRIME_FETCH_LIMIT: u32 = 100;

impl<T> Connector<T>
where
	T: ?Sized + HttpTransport,
{
	/// Completes the flow with the callback delivered by the provider redirect.
	///
	/// The pending request token is consumed destructively before validation,
	/// so a failed exchange always requires a fresh [`Connector::begin`]. The
	/// exchange is signed with the request token pair and carries
	/// `oauth_verifier` in the signed form body. A missing pending record is
	/// the normal expired-session failure mode, not a bug.
	pub async fn complete(&self, callback: AuthorizationCallback) -> Result<AccessToken> {
		const KIND: FlowKind = FlowKind::Exchange;

		let span = FlowSpan::new(KIND, "complete");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.complete_inner(callback)).await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => {
				obs::record_flow_outcome(KIND, FlowOutcome::Failure);
				self.set_state(FlowState::Failed);
			},
		}

		result
	}

	async fn complete_inner(&self, callback: AuthorizationCallback) -> Result<AccessToken> {
		let _attempt = self.attempt_guard.lock().await;

		self.set_state(FlowState::Exchanging);

		let pending =
			self.store.take_pending().await?.ok_or(SessionError::NoPendingAuthorization)?;

		if pending.token != callback.token {
			return Err(SessionError::RequestTokenMismatch.into());
		}

		let request =
			RequestDescriptor::new(Method::Post, self.descriptor.endpoints.access_token.clone())
				.with_param("oauth_verifier", callback.verifier);
		let response = self.signed_call(request, Some(pending.as_pair())).await?;
		let response = common::require_success(ACCESS_TOKEN_ENDPOINT, response)?;
		let grant = common::parse_token_grant(ACCESS_TOKEN_ENDPOINT, &response.body)?;
		let access = AccessToken { token: grant.token, token_secret: grant.token_secret };

		self.store.put_access_token(access.clone()).await?;
		self.set_state(FlowState::Authorized);
		self.prime_cache().await;

		Ok(access)
	}

	/// Best-effort initial fetch that warms the expense cache after
	/// authorization. A failed fetch leaves the cache empty and is recorded
	/// through the resource flow's own instrumentation; the authorization
	/// itself stays valid and the caller can fetch on demand.
	async fn prime_cache(&self) {
		if let Ok(records) = self.fetch_expenses(PRIME_FETCH_LIMIT).await {
			*self.cache.write() = Some(records);
		}
	}
}
