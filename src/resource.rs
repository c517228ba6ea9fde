//! Authenticated expense retrieval using the completed access token.

// crates.io
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	error::{SessionError, UpstreamError},
	flows::{Connector, common},
	http::HttpTransport,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	sign::{Method, RequestDescriptor},
};

const EXPENSES_ENDPOINT: &str = "expenses";

#[derive(Clone, Debug, Deserialize)]
struct ExpensesPage {
	expenses: Vec<Value>,
}

impl<T> Connector<T>
where
	T: ?Sized + HttpTransport,
{
	/// Fetches a bounded page of expense records, newest first.
	///
	/// Records come back verbatim; shaping them for prompts is
	/// [`ContextAssembler`](crate::context::ContextAssembler)'s job. Fetches
	/// are idempotent reads and may run concurrently without coordination.
	/// Failures are never retried here; a rejected token surfaces as a
	/// [`SessionError`] so the caller re-authorizes instead of retrying.
	pub async fn fetch_expenses(&self, limit: u32) -> Result<Vec<Value>> {
		const KIND: FlowKind = FlowKind::ResourceFetch;

		let span = FlowSpan::new(KIND, "fetch_expenses");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.fetch_expenses_inner(limit)).await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	async fn fetch_expenses_inner(&self, limit: u32) -> Result<Vec<Value>> {
		let access = self.store.get_access_token().await?.ok_or(SessionError::NotConnected)?;
		let mut url = self.descriptor.endpoints.expenses.clone();

		url.query_pairs_mut().append_pair("limit", &limit.to_string());

		let request = RequestDescriptor::new(Method::Get, url);
		let response = self.signed_call(request, Some(access.as_pair())).await?;

		// A revoked or expired authorization is a session problem, not a generic
		// upstream failure; the caller restarts from `begin`.
		if matches!(response.status, 401 | 403) {
			return Err(SessionError::AuthorizationRejected { status: response.status }.into());
		}

		let response = common::require_success(EXPENSES_ENDPOINT, response)?;

		parse_expenses(&response.body).map(|page| page.expenses)
	}

	/// Returns the records primed by the post-authorization fetch, if any.
	pub fn cached_expenses(&self) -> Option<Vec<Value>> {
		self.cache.read().clone()
	}
}

fn parse_expenses(body: &str) -> Result<ExpensesPage> {
	let mut deserializer = serde_json::Deserializer::from_str(body);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| UpstreamError::MalformedJson { endpoint: EXPENSES_ENDPOINT, source }.into())
}
