//! Utility modules including in-memory backends and validation helpers

pub mod memory_store;
pub mod validation;

pub use memory_store::*;
pub use validation::*;
