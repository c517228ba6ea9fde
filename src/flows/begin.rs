//! Leg 1: request-token acquisition and the user authorization hand-off.

// self
use crate::{
	_prelude::*,
	auth::RequestToken,
	error::ConfigError,
	flows::{Connector, FlowState, common},
	http::HttpTransport,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	sign::{Method, RequestDescriptor},
};

const REQUEST_TOKEN_ENDPOINT: &str = "request-token";

/// Hand-off data returned by [`Connector::begin`].
///
/// The caller redirects the user to `authorize_url`; the flow has no further
/// action until the provider's callback fires and `complete` is invoked.
#[derive(Clone, Debug)]
pub struct PendingAuthorization {
	/// URL the caller should send the user to.
	pub authorize_url: Url,
	/// Request token issued by the provider (mirrors the pending store record).
	pub token: String,
	/// Whether the provider confirmed the callback URI.
	pub callback_confirmed: bool,
}

impl<T> Connector<T>
where
	T: ?Sized + HttpTransport,
{
	/// Starts (or restarts) the authorization flow.
	///
	/// Any prior pending request token is superseded, never merged; calling
	/// this while `Authorized` begins re-authorization without revoking the
	/// previous access token upstream. The pending secret is persisted through
	/// the token store so it survives the user's navigation away from the
	/// application.
	pub async fn begin(&self) -> Result<PendingAuthorization> {
		const KIND: FlowKind = FlowKind::RequestToken;

		let span = FlowSpan::new(KIND, "begin");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.begin_inner()).await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => {
				obs::record_flow_outcome(KIND, FlowOutcome::Failure);
				self.set_state(FlowState::Failed);
			},
		}

		result
	}

	async fn begin_inner(&self) -> Result<PendingAuthorization> {
		let _attempt = self.attempt_guard.lock().await;

		self.set_state(FlowState::RequestTokenPending);
		self.clear_cache();

		let request =
			RequestDescriptor::new(Method::Post, self.descriptor.endpoints.request_token.clone())
				.with_callback(self.descriptor.callback.clone());
		let response = self.signed_call(request, None).await?;
		let response = common::require_success(REQUEST_TOKEN_ENDPOINT, response)?;
		let grant = common::parse_token_grant(REQUEST_TOKEN_ENDPOINT, &response.body)?;
		let callback_confirmed = grant.callback_confirmed.unwrap_or(false);

		if !callback_confirmed {
			return Err(ConfigError::CallbackRejected { body: response.body }.into());
		}

		let pending = RequestToken {
			token: grant.token.clone(),
			token_secret: grant.token_secret,
			callback_confirmed,
		};

		self.store.put_pending(pending).await?;

		let mut authorize_url = self.descriptor.endpoints.authorize.clone();

		authorize_url.query_pairs_mut().append_pair("oauth_token", &grant.token);
		self.set_state(FlowState::AwaitingUserAuthorization);

		Ok(PendingAuthorization { authorize_url, token: grant.token, callback_confirmed })
	}
}
