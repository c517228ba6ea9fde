//! Authorization flow states.

// self
use crate::_prelude::*;

/// States of the three-legged authorization flow.
///
/// `begin` drives `Idle → RequestTokenPending → AwaitingUserAuthorization`,
/// `complete` drives `AwaitingUserAuthorization → Exchanging → Authorized`.
/// `Failed` is reachable from any non-terminal state and ends the interactive
/// flow; the user re-initiates from `begin`, which also restarts an
/// `Authorized` connector for re-authorization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowState {
	/// No authorization attempt has started.
	Idle,
	/// The request-token leg is in flight.
	RequestTokenPending,
	/// The user is at the provider's site; nothing to do until the callback fires.
	AwaitingUserAuthorization,
	/// The verifier exchange is in flight.
	Exchanging,
	/// An access token has been obtained and stored.
	Authorized,
	/// The flow ended in a failure; restart from `begin`.
	Failed,
}
impl FlowState {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowState::Idle => "idle",
			FlowState::RequestTokenPending => "request_token_pending",
			FlowState::AwaitingUserAuthorization => "awaiting_user_authorization",
			FlowState::Exchanging => "exchanging",
			FlowState::Authorized => "authorized",
			FlowState::Failed => "failed",
		}
	}
}
impl Display for FlowState {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
