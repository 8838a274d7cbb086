//! Core infrastructure shared by every engine component.
//!
//! - [`types`]: storage types of raw, binned and histogram values
//! - [`constants`]: the `ALMOST_INF` sentinel and configuration defaults
//! - [`error`]: the crate error type and `Result` alias

pub mod constants;
pub mod error;
pub mod types;

pub use constants::*;
pub use error::{GbdtError, Result};
pub use types::*;
