//! Developer portal login credentials.

// self
use crate::_prelude::*;

/// Email/password pair consumed by a single key exchange and never persisted.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credential {
	email: String,
	password: String,
}
impl Credential {
	/// Builds a credential from an email and password.
	pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
		Self { email: email.into(), password: password.into() }
	}

	/// Returns the account email.
	pub fn email(&self) -> &str {
		&self.email
	}

	/// Returns the account password. Callers must avoid logging this string.
	pub fn expose_password(&self) -> &str {
		&self.password
	}
}
impl Debug for Credential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credential")
			.field("email", &self.email)
			.field("password", &"<redacted>")
			.finish()
	}
}
