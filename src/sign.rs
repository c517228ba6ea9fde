//! OAuth 1.0a request signing.
//!
//! The signer canonicalizes parameters exactly as RFC 5849 §3.4 prescribes:
//! percent-encode with the RFC 3986 unreserved set, sort the encoded pairs,
//! assemble `METHOD&url&params`, then HMAC-SHA1 with the
//! `consumer_secret&token_secret` key. Nonce and timestamp are regenerated for
//! every call; [`Signer::sign_with_material`] accepts fixed material so tests
//! can reproduce signatures byte-for-byte.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use rand::{Rng, distr::Alphanumeric};
use sha1::Sha1;
// self
use crate::{
	_prelude::*,
	auth::{ConsumerCredentials, TokenPair},
	error::ConfigError,
};

const NONCE_LEN: usize = 32;
const SIGNATURE_METHOD: &str = "HMAC-SHA1";
const OAUTH_VERSION: &str = "1.0";

// RFC 3986 unreserved characters pass through; everything else, including
// `!*'()` and non-ASCII UTF-8 bytes, is escaped with uppercase hex.
const PARAMETER_ENCODE_SET: &AsciiSet =
	&NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

type HmacSha1 = Hmac<Sha1>;

/// HTTP methods used against the provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
	/// HTTP GET.
	Get,
	/// HTTP POST.
	Post,
}
impl Method {
	/// Returns the uppercase method name used in signature base strings.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
		}
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Describes an outgoing request prior to signing.
#[derive(Clone, Debug)]
pub struct RequestDescriptor {
	/// HTTP method.
	pub method: Method,
	/// Target URL; existing query parameters are folded into the signature.
	pub url: Url,
	/// Form parameters included in the signature and sent as the request body.
	pub params: BTreeMap<String, String>,
	/// Callback URI carried as `oauth_callback` (request-token leg only).
	pub callback: Option<Url>,
}
impl RequestDescriptor {
	/// Creates a descriptor with no extra parameters.
	pub fn new(method: Method, url: Url) -> Self {
		Self { method, url, params: BTreeMap::new(), callback: None }
	}

	/// Adds a signed form parameter.
	pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.params.insert(key.into(), value.into());

		self
	}

	/// Attaches the `oauth_callback` parameter.
	pub fn with_callback(mut self, callback: Url) -> Self {
		self.callback = Some(callback);

		self
	}
}

/// Fresh nonce/timestamp pair consumed by exactly one signature.
#[derive(Clone, Debug)]
pub struct SignatureMaterial {
	/// Random alphanumeric nonce.
	pub nonce: String,
	/// Unix timestamp in seconds.
	pub timestamp: i64,
}
impl SignatureMaterial {
	/// Generates fresh material; a nonce/timestamp pair is never reused.
	pub fn generate() -> Self {
		Self {
			nonce: random_nonce(NONCE_LEN),
			timestamp: OffsetDateTime::now_utc().unix_timestamp(),
		}
	}
}

/// Signed request ready for transport; ephemeral and never reused.
#[derive(Clone, Debug)]
pub struct SignedRequest {
	/// HTTP method.
	pub method: Method,
	/// Target URL.
	pub url: Url,
	/// Full `OAuth ...` Authorization header value.
	pub authorization: String,
	/// Form body parameters (already part of the signature).
	pub form: BTreeMap<String, String>,
}

/// Produces OAuth 1.0a Authorization headers for outgoing requests.
#[derive(Clone, Copy, Debug)]
pub struct Signer<'a> {
	credentials: &'a ConsumerCredentials,
}
impl<'a> Signer<'a> {
	/// Creates a signer borrowing the process-wide consumer credentials.
	pub fn new(credentials: &'a ConsumerCredentials) -> Self {
		Self { credentials }
	}

	/// Signs a request with freshly generated nonce/timestamp material.
	pub fn sign(
		&self,
		request: &RequestDescriptor,
		token: Option<TokenPair<'_>>,
	) -> Result<SignedRequest> {
		self.sign_with_material(request, token, SignatureMaterial::generate())
	}

	/// Signs a request with caller-supplied material.
	///
	/// Deterministic given identical material; never mutates shared state.
	pub fn sign_with_material(
		&self,
		request: &RequestDescriptor,
		token: Option<TokenPair<'_>>,
		material: SignatureMaterial,
	) -> Result<SignedRequest> {
		if self.credentials.is_empty() {
			return Err(ConfigError::MissingConsumerCredentials.into());
		}

		let mut oauth_params = vec![
			("oauth_consumer_key".to_owned(), self.credentials.key.clone()),
			("oauth_nonce".to_owned(), material.nonce),
			("oauth_signature_method".to_owned(), SIGNATURE_METHOD.to_owned()),
			("oauth_timestamp".to_owned(), material.timestamp.to_string()),
			("oauth_version".to_owned(), OAUTH_VERSION.to_owned()),
		];

		if let Some(pair) = token {
			oauth_params.push(("oauth_token".to_owned(), pair.token.to_owned()));
		}
		if let Some(callback) = &request.callback {
			oauth_params.push(("oauth_callback".to_owned(), callback.to_string()));
		}

		let base_string = signature_base_string(request, &oauth_params);
		let signature = self.compute_signature(&base_string, token);

		oauth_params.push(("oauth_signature".to_owned(), signature));

		Ok(SignedRequest {
			method: request.method,
			url: request.url.clone(),
			authorization: authorization_header(&oauth_params),
			form: request.params.clone(),
		})
	}

	fn compute_signature(&self, base_string: &str, token: Option<TokenPair<'_>>) -> String {
		let token_secret = token.map(|pair| pair.secret.expose()).unwrap_or_default();
		let key =
			format!("{}&{}", encode(self.credentials.secret.expose()), encode(token_secret));
		let mut mac = HmacSha1::new_from_slice(key.as_bytes())
			.expect("HMAC-SHA1 accepts keys of any length.");

		mac.update(base_string.as_bytes());

		STANDARD.encode(mac.finalize().into_bytes())
	}
}

/// Percent-encodes a parameter with the OAuth 1.0a character set.
pub fn encode(value: &str) -> String {
	utf8_percent_encode(value, PARAMETER_ENCODE_SET).to_string()
}

fn signature_base_string(request: &RequestDescriptor, oauth_params: &[(String, String)]) -> String {
	let mut pairs: Vec<(String, String)> =
		oauth_params.iter().map(|(key, value)| (encode(key), encode(value))).collect();

	pairs.extend(request.url.query_pairs().map(|(key, value)| (encode(&key), encode(&value))));
	pairs.extend(request.params.iter().map(|(key, value)| (encode(key), encode(value))));
	pairs.sort_unstable();

	let parameter_string =
		pairs.iter().map(|(key, value)| format!("{key}={value}")).collect::<Vec<_>>().join("&");

	format!(
		"{}&{}&{}",
		request.method.as_str(),
		encode(&base_url(&request.url)),
		encode(&parameter_string),
	)
}

// Scheme://host[:non-default-port]/path with query and fragment stripped, per
// RFC 5849 §3.4.1.2. The url crate already lowercases the scheme and host and
// drops default ports.
fn base_url(url: &Url) -> String {
	let mut base = format!("{}://", url.scheme());

	if let Some(host) = url.host_str() {
		base.push_str(host);
	}
	if let Some(port) = url.port() {
		base.push_str(&format!(":{port}"));
	}

	base.push_str(url.path());
	base
}

fn authorization_header(oauth_params: &[(String, String)]) -> String {
	let mut pairs: Vec<(String, String)> =
		oauth_params.iter().map(|(key, value)| (encode(key), encode(value))).collect();

	pairs.sort_unstable();

	let fields =
		pairs.iter().map(|(key, value)| format!("{key}=\"{value}\"")).collect::<Vec<_>>().join(", ");

	format!("OAuth {fields}")
}

fn random_nonce(len: usize) -> String {
	rand::rng().sample_iter(Alphanumeric).take(len).map(char::from).collect()
}
