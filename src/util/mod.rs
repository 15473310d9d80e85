//! Shared error type and validation helpers.

pub mod error;
pub(crate) mod validate;

pub use error::{Error, Result};
