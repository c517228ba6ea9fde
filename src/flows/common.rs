//! Shared helpers for flow legs: the single signed-call primitive and
//! form-encoded grant parsing.
//!
//! The provider exposes three near-identical call sites (two token legs and
//! the resource fetch); they all collapse into [`Connector::signed_call`] plus
//! thin callers, so signing, transport, and error mapping live in one place.

// self
use crate::{
	_prelude::*,
	auth::{TokenPair, TokenSecret},
	error::UpstreamError,
	flows::Connector,
	http::{HttpTransport, TransportResponse},
	sign::RequestDescriptor,
};

/// Form-encoded grant returned by the request- and access-token endpoints.
#[derive(Clone, Debug)]
pub(crate) struct TokenGrant {
	pub(crate) token: String,
	pub(crate) token_secret: TokenSecret,
	pub(crate) callback_confirmed: Option<bool>,
}

impl<T> Connector<T>
where
	T: ?Sized + HttpTransport,
{
	/// Signs and executes one provider call.
	pub(crate) async fn signed_call(
		&self,
		request: RequestDescriptor,
		token: Option<TokenPair<'_>>,
	) -> Result<TransportResponse> {
		let signed = self.signer().sign(&request, token)?;

		Ok(self.transport.execute(signed).await?)
	}
}

/// Rejects non-2xx responses, carrying the status and raw body for diagnostics.
pub(crate) fn require_success(
	endpoint: &'static str,
	response: TransportResponse,
) -> Result<TransportResponse> {
	if response.is_success() {
		Ok(response)
	} else {
		Err(UpstreamError::Status { endpoint, status: response.status, body: response.body }.into())
	}
}

/// Parses `oauth_token`, `oauth_token_secret`, and `oauth_callback_confirmed`
/// from a form-encoded grant body.
///
/// A grant without both token and secret is a hard failure, never inferred as
/// success; the raw body rides along in the error.
pub(crate) fn parse_token_grant(endpoint: &'static str, body: &str) -> Result<TokenGrant> {
	let mut token = None;
	let mut token_secret = None;
	let mut callback_confirmed = None;

	for (key, value) in url::form_urlencoded::parse(body.as_bytes()) {
		match key.as_ref() {
			"oauth_token" => token = Some(value.into_owned()),
			"oauth_token_secret" => token_secret = Some(value.into_owned()),
			"oauth_callback_confirmed" => callback_confirmed = Some(value.as_ref() == "true"),
			_ => {},
		}
	}

	match (token, token_secret) {
		(Some(token), Some(secret)) => Ok(TokenGrant {
			token,
			token_secret: TokenSecret::new(secret),
			callback_confirmed,
		}),
		_ => Err(UpstreamError::MissingToken { endpoint, body: body.to_owned() }.into()),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn grant_parsing_reads_all_three_fields() {
		let grant = parse_token_grant(
			"request-token",
			"oauth_token=tok&oauth_token_secret=sec&oauth_callback_confirmed=true",
		)
		.expect("Complete grant body should parse successfully.");

		assert_eq!(grant.token, "tok");
		assert_eq!(grant.token_secret.expose(), "sec");
		assert_eq!(grant.callback_confirmed, Some(true));
	}

	#[test]
	fn grant_parsing_decodes_percent_escapes() {
		let grant = parse_token_grant("access-token", "oauth_token=a%2Fb&oauth_token_secret=s%3Dt")
			.expect("Escaped grant body should parse successfully.");

		assert_eq!(grant.token, "a/b");
		assert_eq!(grant.token_secret.expose(), "s=t");
		assert_eq!(grant.callback_confirmed, None);
	}

	#[test]
	fn missing_token_surfaces_the_raw_body() {
		let err = parse_token_grant("request-token", "error=rate_limited")
			.expect_err("Grant without oauth_token must fail.");

		match err {
			Error::Upstream(UpstreamError::MissingToken { endpoint, body }) => {
				assert_eq!(endpoint, "request-token");
				assert_eq!(body, "error=rate_limited");
			},
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}
}
