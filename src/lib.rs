//! Pkgpluck library exports.
//!
//! The binary in `main.rs` is a thin CLI over these modules; they are public
//! so the integration tests under `tests/` can drive the pipeline directly.

pub mod config;
pub mod error;
pub mod fetch;
pub mod install;
pub mod place;
pub mod resolve;
pub mod session;
pub mod stream;
