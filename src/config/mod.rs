// src/config/mod.rs

//! Run configuration for `runmon`.
//!
//! - [`model`] holds the immutable [`RunConfig`].
//! - [`validate`] turns parsed CLI arguments into a `RunConfig`, enforcing
//!   the positional-argument and pattern rules.

pub mod model;
pub mod validate;

pub use model::RunConfig;
