//! Credential storage, login, and token refresh invocation.
//!
//! Tokens are persisted under `~/.config/ridepool/credentials.json`,
//! encrypted with a machine-derived key.

mod crypto;
mod error;
mod login;
mod refresh;
mod store;
mod types;

pub use error::AuthError;
pub use login::{login_with_password, LoginRequest};
pub use refresh::build_http_client;
pub use refresh::{HttpTokenRefresher, TokenRefresher};
pub use store::{
    default_credentials_path, CredentialStore, FileCredentialStore, MemoryCredentialStore,
};
pub use types::{CredentialHealth, CredentialPair};
