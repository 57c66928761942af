//! tokengate gateway library entry.
//!
//! Wires the dynamic token store, its directory watch, the HTTP token
//! middleware, and the ops endpoints into one service. Consumed by the binary
//! (`main.rs`) and by integration tests.

pub mod app_state;
pub mod auth;
pub mod config;
pub mod error;
pub mod obs;
pub mod ops;
pub mod router;
pub mod store;
pub mod watch;
