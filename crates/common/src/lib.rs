//! Common types for the session layer crates

mod error;
mod secret;

pub use error::{Error, Result};
pub use secret::Secret;
