//! tokengate core: runtime-free token model, authorization decision, and errors.
//!
//! This crate defines the backing-file format, the immutable snapshot handed to
//! request handlers, and the pure `authorize` decision. It carries no runtime
//! or HTTP dependencies so the decision can be tested and reused on its own.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. A malformed token
//! file surfaces as `TokenGateError`, and `authorize` is total over its input.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod authorize;
pub mod error;
pub mod token;

/// Shared result type.
pub use error::{Result, TokenGateError};
pub use authorize::{authorize, AuthorizationResult};
pub use token::{Token, TokenSnapshot};
