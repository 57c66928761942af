//! Top-level facade crate for tokengate.
//!
//! Re-exports core types and the gateway library so users can depend on a single crate.

pub mod core {
    pub use tokengate_core::*;
}

pub mod gateway {
    pub use tokengate_gateway::*;
}
