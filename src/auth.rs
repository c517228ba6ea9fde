//! Auth-domain credentials, token models, and identifiers.

pub mod credentials;
pub mod id;
pub mod token;

pub use credentials::*;
pub use id::*;
pub use token::*;
