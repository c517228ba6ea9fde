//! Provider descriptor data structures and validation.
//!
//! A descriptor names the four provider endpoints plus the application's
//! callback URI in a transport-agnostic way; the builder validates HTTPS on
//! everything the bridge signs against before any flow can run.

// self
use crate::{_prelude::*, auth::ProviderId};

/// Errors raised while constructing or validating descriptors.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum DescriptorError {
	/// Request-token endpoint is required for leg 1.
	#[error("Missing request-token endpoint.")]
	MissingRequestTokenEndpoint,
	/// Authorize endpoint is required for the user hand-off.
	#[error("Missing authorize endpoint.")]
	MissingAuthorizeEndpoint,
	/// Access-token endpoint is required for leg 3.
	#[error("Missing access-token endpoint.")]
	MissingAccessTokenEndpoint,
	/// Expense-listing endpoint is required for resource fetches.
	#[error("Missing expenses endpoint.")]
	MissingExpensesEndpoint,
	/// Callback URI is required; leg 1 must send `oauth_callback`.
	#[error("Missing callback URI.")]
	MissingCallback,
	/// Provider endpoints must use HTTPS.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
}

/// Endpoint set declared by a provider descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEndpoints {
	/// Request-token endpoint (leg 1, signed POST).
	pub request_token: Url,
	/// Authorize page the user is redirected to.
	pub authorize: Url,
	/// Access-token endpoint (leg 3, signed POST).
	pub access_token: Url,
	/// Expense-listing endpoint (signed GET).
	pub expenses: Url,
}

/// Immutable provider descriptor consumed by flows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
	/// Descriptor identifier.
	pub id: ProviderId,
	/// Endpoint definitions exposed by the provider.
	pub endpoints: ProviderEndpoints,
	/// Redirect URI the provider sends the user back to; carried as
	/// `oauth_callback` during leg 1.
	pub callback: Url,
}
impl ProviderDescriptor {
	/// Creates a new builder for the provided identifier.
	pub fn builder(id: ProviderId) -> ProviderDescriptorBuilder {
		ProviderDescriptorBuilder::new(id)
	}

	fn validate(&self) -> Result<(), DescriptorError> {
		validate_endpoint("request-token", &self.endpoints.request_token)?;
		validate_endpoint("authorize", &self.endpoints.authorize)?;
		validate_endpoint("access-token", &self.endpoints.access_token)?;
		validate_endpoint("expenses", &self.endpoints.expenses)?;

		Ok(())
	}
}

/// Builder for [`ProviderDescriptor`] values.
#[derive(Debug)]
pub struct ProviderDescriptorBuilder {
	/// Identifier for the descriptor being constructed.
	pub id: ProviderId,
	/// Request-token endpoint.
	pub request_token_endpoint: Option<Url>,
	/// Authorize endpoint.
	pub authorize_endpoint: Option<Url>,
	/// Access-token endpoint.
	pub access_token_endpoint: Option<Url>,
	/// Expense-listing endpoint.
	pub expenses_endpoint: Option<Url>,
	/// Callback URI for the redirect back into the application.
	pub callback: Option<Url>,
}
impl ProviderDescriptorBuilder {
	/// Creates a new builder seeded with the provided identifier.
	pub fn new(id: ProviderId) -> Self {
		Self {
			id,
			request_token_endpoint: None,
			authorize_endpoint: None,
			access_token_endpoint: None,
			expenses_endpoint: None,
			callback: None,
		}
	}

	/// Sets the request-token endpoint.
	pub fn request_token_endpoint(mut self, url: Url) -> Self {
		self.request_token_endpoint = Some(url);

		self
	}

	/// Sets the authorize endpoint.
	pub fn authorize_endpoint(mut self, url: Url) -> Self {
		self.authorize_endpoint = Some(url);

		self
	}

	/// Sets the access-token endpoint.
	pub fn access_token_endpoint(mut self, url: Url) -> Self {
		self.access_token_endpoint = Some(url);

		self
	}

	/// Sets the expense-listing endpoint.
	pub fn expenses_endpoint(mut self, url: Url) -> Self {
		self.expenses_endpoint = Some(url);

		self
	}

	/// Sets the callback URI.
	pub fn callback(mut self, url: Url) -> Self {
		self.callback = Some(url);

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<ProviderDescriptor, DescriptorError> {
		let request_token =
			self.request_token_endpoint.ok_or(DescriptorError::MissingRequestTokenEndpoint)?;
		let authorize = self.authorize_endpoint.ok_or(DescriptorError::MissingAuthorizeEndpoint)?;
		let access_token =
			self.access_token_endpoint.ok_or(DescriptorError::MissingAccessTokenEndpoint)?;
		let expenses = self.expenses_endpoint.ok_or(DescriptorError::MissingExpensesEndpoint)?;
		let callback = self.callback.ok_or(DescriptorError::MissingCallback)?;
		let descriptor = ProviderDescriptor {
			id: self.id,
			endpoints: ProviderEndpoints { request_token, authorize, access_token, expenses },
			callback,
		};

		descriptor.validate()?;

		Ok(descriptor)
	}
}

// The callback points back at the application and is allowed to be a loopback
// HTTP URI during development; only provider endpoints are held to HTTPS.
fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), DescriptorError> {
	if url.scheme() != "https" {
		Err(DescriptorError::InsecureEndpoint { endpoint: name, url: url.to_string() })
	} else {
		Ok(())
	}
}
