//! Guarded authentication operations for KamposXestion.
//!
//! # Operation state machine
//!
//! Every operation walks `Idle -> Pending -> {Succeeded, Failed, TimedOut}`.
//! Pending carries a wall-clock budget (registration and sign-in ~10s,
//! sign-out ~5s); when the backend has not answered inside it, the caller
//! stops waiting and reports [`kampos_types::ErrorKind::Timeout`]. The
//! in-flight request is *not* cancelled - a late completion may still land
//! in the persistent store after the caller moved on, a race the design
//! tolerates because every such write is idempotent.
//!
//! # Failure policy
//!
//! Backend rejections arrive already classified by `kampos-client`; this
//! crate maps each kind to a localized user-facing message exactly once, in
//! [`AuthError::user_message`]. Mirrored-profile write failures are logged
//! and swallowed - the identity is the source of truth. Nothing is retried
//! automatically; retry is always a manual user action.

pub mod diagnostics;
mod error;
mod guard;
mod service;

pub use error::AuthError;
pub use guard::{GuardBudgets, OpKind, OpState};
pub use service::{AuthService, RegisterOutcome};
