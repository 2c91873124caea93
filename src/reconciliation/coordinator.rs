//! Reconciliation coordinator: the session-scoped state machine
//!
//! Orchestrates import → list → select → match → persist → refresh and owns
//! the UI-facing selection state. A mutation has exactly two states,
//! `Unmatched → Matched`, and the only transition runs through a successful
//! ledger-collaborator call carrying an engine-produced action.

use std::collections::HashSet;

use crate::reconciliation::candidates::{CandidateProvider, FlaggedCandidate};
use crate::reconciliation::engine;
use crate::statement::{Cell, StatementParser};
use crate::traits::{CandidateSource, LedgerCollaborator, MutationStore};
use crate::types::*;

/// Coordinates one interactive reconciliation session for a bank account.
///
/// At most one mutation and one candidate are selected at a time per
/// coordinator instance; selecting a new mutation clears any previously
/// chosen candidate across all lists.
pub struct ReconciliationCoordinator<M, C, L>
where
    M: MutationStore,
    C: CandidateSource,
    L: LedgerCollaborator,
{
    parser: StatementParser,
    store: M,
    provider: CandidateProvider<C>,
    ledger: L,
    session: SessionContext,
    selected_mutation: Option<MutationRecord>,
    selected_candidate: Option<String>,
    /// Mutations with a collaborator call in flight; the only double-submit
    /// guard, not a server lock
    in_flight: HashSet<String>,
}

impl<M, C, L> ReconciliationCoordinator<M, C, L>
where
    M: MutationStore,
    C: CandidateSource,
    L: LedgerCollaborator,
{
    /// Create a coordinator for one session
    pub fn new(
        store: M,
        provider: CandidateProvider<C>,
        ledger: L,
        session: SessionContext,
    ) -> Self {
        Self {
            parser: StatementParser::new(),
            store,
            provider,
            ledger,
            session,
            selected_mutation: None,
            selected_candidate: None,
            in_flight: HashSet::new(),
        }
    }

    /// Replace the statement parser (fixed reference year, etc.)
    pub fn with_parser(mut self, parser: StatementParser) -> Self {
        self.parser = parser;
        self
    }

    /// The session this coordinator serves
    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Currently selected mutation, if any
    pub fn selected_mutation(&self) -> Option<&MutationRecord> {
        self.selected_mutation.as_ref()
    }

    /// Currently selected candidate id, if any
    pub fn selected_candidate(&self) -> Option<&str> {
        self.selected_candidate.as_deref()
    }

    /// Parse an uploaded statement grid and persist the surviving drafts.
    ///
    /// Parsing runs to completion before any row is persisted; a file-level
    /// rejection leaves nothing behind. The batch is transactional as a
    /// whole, so a `Storage` error means the entire import should be retried.
    pub async fn import_statement(
        &mut self,
        grid: &[Vec<Cell>],
        branch_id: Option<&str>,
    ) -> ReconResult<ImportSummary> {
        let drafts = self.parser.parse(
            grid,
            &self.session.business_id,
            branch_id,
            &self.session.actor_id,
        )?;
        self.store.import_batch(&drafts).await
    }

    /// The unmatched outflow queue for this session's business, newest first
    pub async fn unmatched_queue(&self) -> ReconResult<Vec<MutationRecord>> {
        self.store
            .list_unmatched(&self.session.business_id, Direction::Debit)
            .await
    }

    /// Select the mutation to reconcile next.
    ///
    /// Clears any previously chosen candidate.
    pub async fn select_mutation(&mut self, mutation_id: &str) -> ReconResult<()> {
        let mutation = self
            .store
            .get_mutation(mutation_id)
            .await?
            .ok_or_else(|| ReconError::MutationNotFound(mutation_id.to_string()))?;

        self.selected_candidate = None;
        self.selected_mutation = Some(mutation);
        Ok(())
    }

    /// Select a candidate for the currently selected mutation
    pub fn select_candidate(&mut self, candidate_id: &str) -> ReconResult<()> {
        if self.selected_mutation.is_none() {
            return Err(ReconError::Validation(
                "no mutation selected".to_string(),
            ));
        }
        self.selected_candidate = Some(candidate_id.to_string());
        Ok(())
    }

    /// Clear both selections
    pub fn clear_selection(&mut self) {
        self.selected_mutation = None;
        self.selected_candidate = None;
    }

    /// Candidate lists for the selected mutation, with advisory auto-match
    /// hints
    pub async fn candidates(&self) -> ReconResult<Vec<FlaggedCandidate>> {
        let mutation = self.require_selected()?;
        let lists = self
            .provider
            .list_candidates(&self.session.actor_id, &self.session.business_id)
            .await?;
        Ok(lists.flagged(mutation))
    }

    /// Submit one reconciliation decision for the selected mutation.
    ///
    /// The engine validates before any collaborator call. While the call is
    /// in flight, further submissions for the same mutation are rejected;
    /// the guard clears on completion, success or failure. On success the
    /// selection is cleared and the refreshed unmatched queue is returned,
    /// always as a full re-fetch, since one action may have server-side
    /// effects beyond the targeted mutation. On failure the mutation stays
    /// unmatched
    /// and the collaborator's error passes through verbatim; retry is the
    /// user's call, never automatic.
    pub async fn submit(&mut self, request: &MatchRequest) -> ReconResult<Vec<MutationRecord>> {
        let mutation = self.require_selected()?.clone();
        if self.in_flight.contains(&mutation.id) {
            return Err(ReconError::Validation(format!(
                "a submission for mutation '{}' is already in flight",
                mutation.id
            )));
        }

        let lists = self
            .provider
            .list_candidates(&self.session.actor_id, &self.session.business_id)
            .await?;
        let action = engine::build_action(&mutation, request, &lists, &self.session)?;

        self.in_flight.insert(mutation.id.clone());
        let outcome = self.ledger.submit(&action).await;
        self.in_flight.remove(&mutation.id);
        outcome?;

        self.clear_selection();
        self.unmatched_queue().await
    }

    /// Submit using the current candidate selection.
    ///
    /// Convenience over [`submit`](Self::submit) for UI flows that picked a
    /// candidate first.
    pub async fn submit_selected(
        &mut self,
        kind: ActionKind,
        category: Option<String>,
        description: Option<String>,
    ) -> ReconResult<Vec<MutationRecord>> {
        let request = MatchRequest {
            kind,
            candidate_id: self.selected_candidate.clone(),
            category,
            description,
        };
        self.submit(&request).await
    }

    fn require_selected(&self) -> ReconResult<&MutationRecord> {
        self.selected_mutation
            .as_ref()
            .ok_or_else(|| ReconError::Validation("no mutation selected".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconciliation::candidates::CandidateLists;
    use crate::utils::memory_store::{MemoryCandidateSource, MemoryLedger, MemoryMutationStore};
    use bigdecimal::BigDecimal;
    use chrono::NaiveDate;

    type MemoryCoordinator =
        ReconciliationCoordinator<MemoryMutationStore, MemoryCandidateSource, MemoryLedger>;

    fn petty_cash_candidate(id: &str, amount: i64) -> PettyCashCandidate {
        PettyCashCandidate {
            id: id.to_string(),
            kind: PettyCashKind::Reimburse,
            total_amount: BigDecimal::from(amount),
            branch_name: "Branch A".to_string(),
            requester: "dina".to_string(),
            approved_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        }
    }

    fn coordinator(ledger_failure: Option<&str>) -> MemoryCoordinator {
        let store = MemoryMutationStore::new();
        let source = MemoryCandidateSource::new();
        source.set_candidates(
            "biz1",
            CandidateLists {
                payments: vec![],
                petty_cash: vec![petty_cash_candidate("pc1", 500000)],
                ops_expenses: vec![],
            },
        );
        let ledger = match ledger_failure {
            Some(message) => MemoryLedger::failing_with(store.clone(), message),
            None => MemoryLedger::new(store.clone()),
        };

        ReconciliationCoordinator::new(
            store,
            CandidateProvider::new(source),
            ledger,
            SessionContext::new("biz1", "acct1", "op1"),
        )
        .with_parser(StatementParser::with_reference_year(2024))
    }

    fn statement_grid() -> Vec<Vec<Cell>> {
        vec![
            vec![Cell::from("Laporan Rekening Koran")],
            vec![Cell::from("Periode: Januari 2024")],
            vec![Cell::from(r#"05/01/2024,"Transfer Kas Cabang",123,"500.000 DB""#)],
            vec![Cell::from(r#"02/01/2024,"Bayar Listrik",123,"150.000 DB""#)],
            vec![Cell::from("Saldo Akhir,,,")],
        ]
    }

    #[tokio::test]
    async fn test_selecting_new_mutation_clears_candidate() {
        let mut coordinator = coordinator(None);
        coordinator
            .import_statement(&statement_grid(), None)
            .await
            .unwrap();

        let queue = coordinator.unmatched_queue().await.unwrap();
        coordinator.select_mutation(&queue[0].id).await.unwrap();
        coordinator.select_candidate("pc1").unwrap();
        assert_eq!(coordinator.selected_candidate(), Some("pc1"));

        coordinator.select_mutation(&queue[1].id).await.unwrap();
        assert_eq!(coordinator.selected_candidate(), None);
    }

    #[tokio::test]
    async fn test_candidate_selection_requires_mutation() {
        let mut coordinator = coordinator(None);
        let err = coordinator.select_candidate("pc1").unwrap_err();
        assert!(matches!(err, ReconError::Validation(_)));
    }

    #[tokio::test]
    async fn test_submit_without_selection_is_rejected() {
        let mut coordinator = coordinator(None);
        let request = MatchRequest::match_petty_cash("pc1");
        let err = coordinator.submit(&request).await.unwrap_err();
        assert!(matches!(err, ReconError::Validation(_)));
    }

    #[tokio::test]
    async fn test_successful_submit_refreshes_queue_and_clears_selection() {
        let mut coordinator = coordinator(None);
        coordinator
            .import_statement(&statement_grid(), None)
            .await
            .unwrap();

        let queue = coordinator.unmatched_queue().await.unwrap();
        assert_eq!(queue.len(), 2);
        // Newest first.
        assert_eq!(queue[0].description, "Transfer Kas Cabang");

        coordinator.select_mutation(&queue[0].id).await.unwrap();
        coordinator.select_candidate("pc1").unwrap();

        let refreshed = coordinator
            .submit_selected(ActionKind::MatchPettyCash, None, None)
            .await
            .unwrap();

        assert_eq!(refreshed.len(), 1);
        assert_eq!(refreshed[0].description, "Bayar Listrik");
        assert!(coordinator.selected_mutation().is_none());
        assert!(coordinator.selected_candidate().is_none());
    }

    #[tokio::test]
    async fn test_collaborator_failure_leaves_mutation_unmatched() {
        let mut coordinator = coordinator(Some("posting period closed"));
        coordinator
            .import_statement(&statement_grid(), None)
            .await
            .unwrap();

        let queue = coordinator.unmatched_queue().await.unwrap();
        coordinator.select_mutation(&queue[0].id).await.unwrap();

        let request = MatchRequest::match_petty_cash("pc1");
        let err = coordinator.submit(&request).await.unwrap_err();

        // The collaborator's message passes through verbatim.
        match err {
            ReconError::Collaborator(message) => assert_eq!(message, "posting period closed"),
            other => panic!("expected collaborator error, got {:?}", other),
        }

        // Nothing transitioned; the queue is unchanged and a retry stays
        // possible.
        let after = coordinator.unmatched_queue().await.unwrap();
        assert_eq!(after.len(), 2);
        assert!(coordinator.selected_mutation().is_some());
    }

    #[tokio::test]
    async fn test_validation_failure_precedes_collaborator_call() {
        // A failing ledger proves the engine rejected before any call.
        let mut coordinator = coordinator(Some("must never be reached"));
        coordinator
            .import_statement(&statement_grid(), None)
            .await
            .unwrap();

        let queue = coordinator.unmatched_queue().await.unwrap();
        coordinator.select_mutation(&queue[0].id).await.unwrap();

        let request = MatchRequest::match_payment("unknown");
        let err = coordinator.submit(&request).await.unwrap_err();
        assert!(matches!(err, ReconError::Validation(_)));
    }

    #[tokio::test]
    async fn test_record_expense_without_candidate() {
        let mut coordinator = coordinator(None);
        coordinator
            .import_statement(&statement_grid(), None)
            .await
            .unwrap();

        let queue = coordinator.unmatched_queue().await.unwrap();
        coordinator.select_mutation(&queue[1].id).await.unwrap();

        let refreshed = coordinator
            .submit_selected(ActionKind::RecordExpense, Some("Utilities".to_string()), None)
            .await
            .unwrap();
        assert_eq!(refreshed.len(), 1);
    }
}
