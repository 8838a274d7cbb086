//! Configuration of the engine components.

pub mod core;

pub use self::core::{BinMapperConfig, GrowerConfig, GrowerConfigBuilder};
