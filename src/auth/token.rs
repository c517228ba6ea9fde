//! Token material exchanged with the provider during and after authorization.

// self
use crate::_prelude::*;

/// Redacted secret wrapper keeping token material out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner secret value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Short-lived token issued by the request-token leg.
///
/// The record survives the user's navigation to the provider and back (via the
/// token store) and is consumed exactly once by the exchange leg. It is never
/// persisted beyond a single authorization attempt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestToken {
	/// Public token identifier returned by the provider.
	pub token: String,
	/// Secret paired with the token; required to sign the exchange leg.
	pub token_secret: TokenSecret,
	/// Whether the provider confirmed the callback URI.
	pub callback_confirmed: bool,
}
impl RequestToken {
	/// Borrows the token/secret pair for signing.
	pub fn as_pair(&self) -> TokenPair<'_> {
		TokenPair { token: &self.token, secret: &self.token_secret }
	}
}

/// Long-lived token issued by the exchange leg; no expiry is assumed.
///
/// Loss of validity is detected only when a resource call is rejected, which
/// surfaces as a session failure requiring re-authorization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
	/// Public token identifier returned by the provider.
	pub token: String,
	/// Secret paired with the token; required to sign resource calls.
	pub token_secret: TokenSecret,
}
impl AccessToken {
	/// Borrows the token/secret pair for signing.
	pub fn as_pair(&self) -> TokenPair<'_> {
		TokenPair { token: &self.token, secret: &self.token_secret }
	}
}

/// Parameters delivered by the provider's redirect back to the application.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorizationCallback {
	/// Token echoed by the provider; must match the pending request token.
	pub token: String,
	/// Verifier proving the user approved the request.
	pub verifier: String,
}
impl AuthorizationCallback {
	/// Creates a callback from already-extracted values.
	pub fn new(token: impl Into<String>, verifier: impl Into<String>) -> Self {
		Self { token: token.into(), verifier: verifier.into() }
	}

	/// Extracts `oauth_token` and `oauth_verifier` from a redirect URL's query
	/// parameters; returns `None` when either is absent.
	pub fn from_redirect_url(url: &Url) -> Option<Self> {
		let mut token = None;
		let mut verifier = None;

		for (key, value) in url.query_pairs() {
			match key.as_ref() {
				"oauth_token" => token = Some(value.into_owned()),
				"oauth_verifier" => verifier = Some(value.into_owned()),
				_ => {},
			}
		}

		Some(Self { token: token?, verifier: verifier? })
	}
}

/// Borrowed token/secret pair attached to a signature.
#[derive(Clone, Copy, Debug)]
pub struct TokenPair<'a> {
	/// Public token identifier.
	pub token: &'a str,
	/// Secret folded into the signing key.
	pub secret: &'a TokenSecret,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn secret_formatters_redact() {
		let secret = TokenSecret::new("super-secret");

		assert_eq!(format!("{secret:?}"), "TokenSecret(\"<redacted>\")");
		assert_eq!(format!("{secret}"), "<redacted>");
	}

	#[test]
	fn request_token_debug_redacts_secret() {
		let token = RequestToken {
			token: "request-token".into(),
			token_secret: TokenSecret::new("request-secret"),
			callback_confirmed: true,
		};
		let rendered = format!("{token:?}");

		assert!(rendered.contains("request-token"));
		assert!(!rendered.contains("request-secret"));
	}

	#[test]
	fn callback_extraction_requires_both_parameters() {
		let url = Url::parse("https://app.example.com/cb?oauth_token=tok&oauth_verifier=ver")
			.expect("Redirect URL fixture should parse successfully.");
		let callback = AuthorizationCallback::from_redirect_url(&url)
			.expect("Callback should be extracted when both parameters are present.");

		assert_eq!(callback.token, "tok");
		assert_eq!(callback.verifier, "ver");

		let partial = Url::parse("https://app.example.com/cb?oauth_token=tok")
			.expect("Partial redirect URL fixture should parse successfully.");

		assert!(AuthorizationCallback::from_redirect_url(&partial).is_none());
	}
}
