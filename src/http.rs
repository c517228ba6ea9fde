//! Transport primitives for signed provider calls.
//!
//! [`HttpTransport`] is the crate's only dependency on an HTTP stack. The three
//! authorization legs and the resource fetch all funnel through it, so callers
//! can swap the bundled reqwest transport for any client able to carry an
//! `Authorization` header and a form-encoded body.

// std
use std::ops::Deref;
// crates.io
#[cfg(feature = "reqwest")] use reqwest::header::AUTHORIZATION;
// self
use crate::{
	_prelude::*,
	error::TransportError,
	sign::{Method, SignedRequest},
};

/// Boxed future returned by transport implementations.
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<TransportResponse, TransportError>> + 'a + Send>>;

/// Raw response surfaced to the flow layer.
///
/// The body is preserved verbatim so failures can carry full diagnostic detail
/// without re-running the flow.
#[derive(Clone, Debug)]
pub struct TransportResponse {
	/// HTTP status code.
	pub status: u16,
	/// Raw response body.
	pub body: String,
}
impl TransportResponse {
	/// Whether the status is in the 2xx range.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Abstraction over HTTP stacks capable of executing signed requests.
///
/// Implementations must be `Send + Sync + 'static` so they can be shared
/// across connector instances without additional wrappers. Provider endpoints
/// return results directly; custom clients should not follow redirects.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Executes the signed request, returning the status and raw body.
	fn execute(&self, request: SignedRequest) -> TransportFuture<'_>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestHttpClient {
	fn execute(&self, request: SignedRequest) -> TransportFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let mut builder = match request.method {
				Method::Get => client.get(request.url),
				Method::Post => client.post(request.url),
			};

			builder = builder.header(AUTHORIZATION, request.authorization);

			if !request.form.is_empty() {
				builder = builder.form(&request.form);
			}

			let response = builder.send().await.map_err(TransportError::from)?;
			let status = response.status().as_u16();
			let body = response.text().await.map_err(TransportError::from)?;

			Ok(TransportResponse { status, body })
		})
	}
}
