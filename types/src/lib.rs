//! Core domain types for KamposXestion.
//!
//! This crate contains pure domain types with no IO, no async, and minimal
//! dependencies. Everything here can be used from any layer of the
//! application.
//!
//! The backend service owns the authoritative data; these types are the
//! client-side mirror of it:
//!
//! - [`CredentialPair`] - validated endpoint URL plus API key(s)
//! - [`Session`] - the opaque token pair issued on sign-in
//! - [`UserProfile`] - the denormalized `profiles` row
//! - [`ErrorKind`] - the typed classification of backend failures

mod credentials;
mod error;
mod profile;
mod session;

pub use credentials::{
    ApiKey, BackendUrl, CredentialError, CredentialPair, MIN_API_KEY_LEN, contains_placeholder,
};
pub use error::ErrorKind;
pub use profile::{DEFAULT_ROLE, UserId, UserProfile};
pub use session::{AccessToken, AuthUser, RefreshToken, Session, UserMetadata};
