//! In-memory backends for testing and development

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::reconciliation::candidates::CandidateLists;
use crate::traits::*;
use crate::types::*;

#[derive(Debug, Default)]
struct StoreState {
    by_id: HashMap<String, MutationRecord>,
    /// dedup_key → mutation id, the uniqueness constraint imports rely on
    by_dedup: HashMap<String, String>,
}

/// In-memory mutation store for testing and development.
///
/// The whole state sits behind one lock, so `import_batch` is atomic the way
/// a database transaction would be.
#[derive(Debug, Clone, Default)]
pub struct MemoryMutationStore {
    state: Arc<RwLock<StoreState>>,
}

impl MemoryMutationStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) {
        let mut state = self.state.write().unwrap();
        state.by_id.clear();
        state.by_dedup.clear();
    }

    /// Flip a mutation to `Matched`, as the authoritative ledger side would.
    ///
    /// Exposed so collaborator test doubles can make a successful submission
    /// visible on the next read.
    pub fn mark_matched(&self, mutation_id: &str) -> ReconResult<()> {
        let mut state = self.state.write().unwrap();
        match state.by_id.get_mut(mutation_id) {
            Some(mutation) => {
                mutation.status = MutationStatus::Matched;
                Ok(())
            }
            None => Err(ReconError::MutationNotFound(mutation_id.to_string())),
        }
    }
}

#[async_trait]
impl MutationStore for MemoryMutationStore {
    async fn import_batch(&mut self, records: &[MutationRecord]) -> ReconResult<ImportSummary> {
        let mut state = self.state.write().unwrap();
        let mut inserted = 0;
        let mut skipped_duplicates = 0;

        for record in records {
            if state.by_dedup.contains_key(&record.dedup_key) {
                skipped_duplicates += 1;
                continue;
            }
            state
                .by_dedup
                .insert(record.dedup_key.clone(), record.id.clone());
            state.by_id.insert(record.id.clone(), record.clone());
            inserted += 1;
        }

        Ok(ImportSummary {
            inserted,
            skipped_duplicates,
        })
    }

    async fn list_unmatched(
        &self,
        business_id: &str,
        direction: Direction,
    ) -> ReconResult<Vec<MutationRecord>> {
        let state = self.state.read().unwrap();
        let mut unmatched: Vec<MutationRecord> = state
            .by_id
            .values()
            .filter(|m| {
                m.business_id == business_id
                    && m.direction == direction
                    && m.status == MutationStatus::Unmatched
            })
            .cloned()
            .collect();

        unmatched.sort_by(|a, b| b.transaction_date.cmp(&a.transaction_date));
        Ok(unmatched)
    }

    async fn get_mutation(&self, mutation_id: &str) -> ReconResult<Option<MutationRecord>> {
        Ok(self.state.read().unwrap().by_id.get(mutation_id).cloned())
    }
}

/// In-memory candidate source with preset lists per business
#[derive(Debug, Clone, Default)]
pub struct MemoryCandidateSource {
    lists: Arc<RwLock<HashMap<String, CandidateLists>>>,
}

impl MemoryCandidateSource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the candidate lists served for a business
    pub fn set_candidates(&self, business_id: &str, lists: CandidateLists) {
        self.lists
            .write()
            .unwrap()
            .insert(business_id.to_string(), lists);
    }
}

#[async_trait]
impl CandidateSource for MemoryCandidateSource {
    async fn candidates_for(&self, business_id: &str) -> ReconResult<CandidateLists> {
        Ok(self
            .lists
            .read()
            .unwrap()
            .get(business_id)
            .cloned()
            .unwrap_or_default())
    }
}

/// In-memory ledger collaborator sharing a [`MemoryMutationStore`]'s state.
///
/// On success it flips the mutation to `Matched` so the next queue read
/// observes the transition, mirroring the real collaborator being
/// authoritative for status. A failure message can be injected to exercise
/// collaborator-error paths.
#[derive(Debug, Clone)]
pub struct MemoryLedger {
    store: MemoryMutationStore,
    fail_with: Option<String>,
    submitted: Arc<RwLock<Vec<ReconciliationAction>>>,
}

impl MemoryLedger {
    /// Create a collaborator that accepts every action
    pub fn new(store: MemoryMutationStore) -> Self {
        Self {
            store,
            fail_with: None,
            submitted: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Create a collaborator that rejects every action with the message
    pub fn failing_with(store: MemoryMutationStore, message: impl Into<String>) -> Self {
        Self {
            store,
            fail_with: Some(message.into()),
            submitted: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Actions successfully submitted so far
    pub fn submitted(&self) -> Vec<ReconciliationAction> {
        self.submitted.read().unwrap().clone()
    }
}

#[async_trait]
impl LedgerCollaborator for MemoryLedger {
    async fn submit(&mut self, action: &ReconciliationAction) -> ReconResult<()> {
        if let Some(message) = &self.fail_with {
            return Err(ReconError::Collaborator(message.clone()));
        }

        self.store.mark_matched(&action.mutation_id)?;
        self.submitted.write().unwrap().push(action.clone());
        Ok(())
    }
}
