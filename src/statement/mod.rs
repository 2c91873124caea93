//! Statement parsing pipeline: raw export grid to canonical mutation drafts

pub mod parser;
pub mod row;

pub use parser::*;
pub use row::*;
