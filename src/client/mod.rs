//! REST client for the prediction backend.
//!
//! - [`Backend`]: the operations the dashboard uses (login, profile, engine
//!   switch, batch upload), implemented over HTTP by [`ApiClient`]
//! - [`TokenStore`]: bearer token kept on disk between runs
//! - [`Session`]: login state built from the two

mod api;
mod error;
mod session;
mod token;

pub use api::{ApiClient, Backend, UserProfile, DEFAULT_TIMEOUT};
pub use error::ApiError;
pub use session::Session;
pub use token::{TokenStore, TOKEN_FILE};

#[cfg(test)]
pub(crate) use session::tests::MockBackend;
