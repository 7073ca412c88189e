//! Configuration resolution and persistence for KamposXestion.
//!
//! # Architecture
//!
//! Backend credentials can arrive through four doors, tried in strict
//! order by [`ConfigResolver`]:
//!
//! 1. [`StoreProvider`] - a value cached earlier in the persistent
//!    [`KeyStore`] (the fast path)
//! 2. [`RuntimeFileProvider`] - the `env-config.json` file the hosting
//!    platform substitutes at deploy time
//! 3. [`BuildTimeProvider`] - values embedded into the binary at compile
//!    time
//! 4. [`FallbackProvider`] - last-resort hardcoded constants, possibly
//!    non-functional
//!
//! A value is usable iff it is non-empty and free of unresolved `{{ }}`
//! deploy markers. Resolution from sources 2-4 writes the value back to the
//! store so the next lookup hits source 1. Resolution never fails: a total
//! miss logs a diagnostic error and returns whatever the fallback offers,
//! because crashing during construction would take the whole front-end
//! down with it.

pub mod keys;
mod provider;
mod resolver;
mod store;

pub use provider::{
    BuildTimeProvider, ConfigProvider, FallbackProvider, RuntimeFileProvider, StoreProvider,
};
pub use resolver::{ConfigResolver, is_valid_value};
pub use store::KeyStore;
