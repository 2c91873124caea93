//! Traits for storage abstraction and external collaborators

use async_trait::async_trait;

use crate::reconciliation::CandidateLists;
use crate::types::*;

/// Storage abstraction for bank mutations
///
/// This trait allows the reconciliation core to work with any storage backend
/// (PostgreSQL, MySQL, SQLite, in-memory, etc.) by implementing these methods.
/// Implementations must treat `import_batch` as a single transaction: either
/// the whole batch is applied or none of it is.
#[async_trait]
pub trait MutationStore: Send + Sync {
    /// Bulk upsert keyed by dedup_key with conflict → ignore.
    ///
    /// Idempotent: re-importing an identical batch yields `inserted = 0`.
    /// Storage unavailability surfaces as `ReconError::Storage`, and the
    /// caller retries the whole batch; partial inserts are never acceptable.
    async fn import_batch(&mut self, records: &[MutationRecord]) -> ReconResult<ImportSummary>;

    /// List unmatched mutations for a business, ordered by transaction date
    /// descending
    async fn list_unmatched(
        &self,
        business_id: &str,
        direction: Direction,
    ) -> ReconResult<Vec<MutationRecord>>;

    /// Get a mutation by id
    async fn get_mutation(&self, mutation_id: &str) -> ReconResult<Option<MutationRecord>>;
}

/// Read-only source of matchable candidates for a business.
///
/// Owned by the upstream approval workflows; lists are trusted to already
/// exclude reconciled items, so no eligibility re-filtering happens here.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// Assemble the three candidate lists for a business
    async fn candidates_for(&self, business_id: &str) -> ReconResult<CandidateLists>;
}

/// External service performing the actual financial posting once a match is
/// decided.
///
/// The call is opaque and its idempotency is not guaranteed, so callers must
/// never retry silently; on failure the mutation stays unmatched and the
/// error message is surfaced verbatim. On success the mutation's status
/// becomes `Matched` on the next read.
#[async_trait]
pub trait LedgerCollaborator: Send + Sync {
    /// Submit one reconciliation action for posting
    async fn submit(&mut self, action: &ReconciliationAction) -> ReconResult<()>;
}

/// Access check consulted before candidate data is returned for a business.
///
/// Authentication itself is out of scope; this is the seam where the host
/// application plugs in its authorization decision.
pub trait BusinessAccess: Send + Sync {
    /// Whether the actor may see data for the business
    fn can_view(&self, actor_id: &str, business_id: &str) -> bool;
}

/// Permissive default access check that allows every actor
pub struct OpenAccess;

impl BusinessAccess for OpenAccess {
    fn can_view(&self, _actor_id: &str, _business_id: &str) -> bool {
        true
    }
}
