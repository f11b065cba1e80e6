//! Auth-domain values: portal credentials, validated key identifiers, session tokens, remote
//! keys, and redacted API secrets.

pub mod credential;
pub mod id;
pub mod key;
pub mod secret;
pub mod session;

pub use credential::*;
pub use id::*;
pub use key::*;
pub use secret::*;
pub use session::*;
