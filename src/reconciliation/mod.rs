//! Reconciliation module: candidate arbitration, match engine, and coordinator

pub mod candidates;
pub mod coordinator;
pub mod engine;

pub use candidates::*;
pub use coordinator::*;
pub use engine::*;
