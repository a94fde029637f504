//!
//! # Place21 Internal Utilities Crate
//!
//! Shared helpers for the placement crates:
//! serialization to and from files, error-reporting helpers,
//! and the [enumstr] enum/string-pairing macro.
//!

pub mod ser;
pub use ser::*;

pub mod error;
pub use error::*;

pub mod context;
pub use context::*;

pub mod enumstr;
pub use enumstr::*;
