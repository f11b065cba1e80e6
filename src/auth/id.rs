//! Strongly typed key identifiers enforced across the provisioning domain.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

macro_rules! def_id {
	($name:ident, $doc:literal, $kind:literal, $allow_spaces:literal) => {
		#[doc = $doc]
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);
		impl $name {
			/// Creates a new identifier after validation.
			pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
				let view = value.as_ref();

				validate_view($kind, view, $allow_spaces)?;

				Ok(Self(view.to_owned()))
			}

			// Skips validation for compile-time defaults that are known to be valid.
			pub(crate) fn from_static(value: &'static str) -> Self {
				Self(value.to_owned())
			}
		}
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &Self::Target {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl TryFrom<String> for $name {
			type Error = IdentifierError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				validate_view($kind, &value, $allow_spaces)?;

				Ok(Self(value))
			}
		}
		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, concat!($kind, "({})"), self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::new(s)
			}
		}
	};
}

const IDENTIFIER_MAX_LEN: usize = 128;

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty or whitespace.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// Kind of identifier (key name, key scope).
		kind: &'static str,
	},
	/// The identifier has leading/trailing whitespace, or any whitespace where none is allowed.
	#[error("{kind} identifier contains disallowed whitespace.")]
	ContainsWhitespace {
		/// Kind of identifier (key name, key scope).
		kind: &'static str,
	},
	/// The identifier exceeded the allowed character count.
	#[error("{kind} identifier exceeds {max} characters.")]
	TooLong {
		/// Kind of identifier (key name, key scope).
		kind: &'static str,
		/// Maximum permitted character count.
		max: usize,
	},
}

def_id! { KeyName, "Name stamped on every key this crate provisions; used to recognize its own keys.", "KeyName", true }
def_id! { KeyScope, "Portal access scope requested for newly created keys (e.g. `clash`).", "KeyScope", false }

fn validate_view(kind: &'static str, view: &str, allow_spaces: bool) -> Result<(), IdentifierError> {
	if view.trim().is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if view.trim() != view || (!allow_spaces && view.chars().any(char::is_whitespace)) {
		return Err(IdentifierError::ContainsWhitespace { kind });
	}
	if view.chars().count() > IDENTIFIER_MAX_LEN {
		return Err(IdentifierError::TooLong { kind, max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn key_names_allow_inner_spaces_only() {
		let name = KeyName::new("Created with coc-broker").expect("Inner spaces should be allowed.");

		assert_eq!(name.as_ref(), "Created with coc-broker");
		assert!(KeyName::new(" padded").is_err(), "Leading whitespace must be rejected.");
		assert!(KeyName::new("padded ").is_err(), "Trailing whitespace must be rejected.");
		assert!(KeyName::new("   ").is_err());
	}

	#[test]
	fn scopes_reject_any_whitespace() {
		KeyScope::new("clash").expect("Plain scope should be valid.");

		assert!(KeyScope::new("clash royale").is_err());
		assert!(KeyScope::new("").is_err());
	}

	#[test]
	fn serde_round_trip_enforces_validation() {
		let scope: KeyScope =
			serde_json::from_str("\"clash\"").expect("Scope should deserialize successfully.");

		assert_eq!(scope.as_ref(), "clash");
		assert!(serde_json::from_str::<KeyScope>("\"with space\"").is_err());
		assert!(serde_json::from_str::<KeyName>("\"\"").is_err());
	}

	#[test]
	fn length_limits_count_characters() {
		let exact = "a".repeat(IDENTIFIER_MAX_LEN);

		KeyName::new(&exact).expect("Exact length should succeed.");

		let too_long = "a".repeat(IDENTIFIER_MAX_LEN + 1);

		assert!(matches!(KeyName::new(&too_long), Err(IdentifierError::TooLong { .. })));
	}

	#[test]
	fn borrow_supports_fast_lookup() {
		let map: HashMap<KeyName, u8> = HashMap::from_iter([(
			KeyName::new("Created with coc-broker").expect("Key name should be valid."),
			7_u8,
		)]);

		assert_eq!(map.get("Created with coc-broker"), Some(&7));
	}
}
