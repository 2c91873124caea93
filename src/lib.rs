//! # Reconciliation Core
//!
//! A bank-statement reconciliation library: parses loosely structured
//! statement export files into canonical bank mutations, stores them with
//! idempotent duplicate suppression, and arbitrates each outgoing movement
//! against candidate business records through one validated decision surface.
//!
//! ## Features
//!
//! - **Statement parsing**: tolerant row classification over raw spreadsheet
//!   grids (shifting columns, locale date formats, CR/DB marker conventions)
//! - **Idempotent import**: dedup-keyed batch upsert, safe to re-run on the
//!   same file
//! - **Candidate matching**: supplier payments, petty-cash transfers,
//!   operational bills, and ad hoc expenses behind a single match engine
//! - **Session coordination**: selection state and the unmatched → matched
//!   transition driven through an opaque ledger collaborator
//! - **Storage abstraction**: database-agnostic design with trait-based
//!   storage and collaborator seams
//!
//! ## Quick Start
//!
//! ```rust
//! use reconciliation_core::{
//!     CandidateProvider, ReconciliationCoordinator, SessionContext,
//!     utils::{MemoryCandidateSource, MemoryLedger, MemoryMutationStore},
//! };
//!
//! let store = MemoryMutationStore::new();
//! let provider = CandidateProvider::new(MemoryCandidateSource::new());
//! let ledger = MemoryLedger::new(store.clone());
//! let session = SessionContext::new("biz1", "acct1", "op1");
//!
//! let coordinator = ReconciliationCoordinator::new(store, provider, ledger, session);
//! # let _ = coordinator;
//! ```

pub mod reconciliation;
pub mod statement;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use reconciliation::*;
pub use statement::*;
pub use traits::*;
pub use types::*;
