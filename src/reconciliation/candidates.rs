//! Candidate lists and the authorized candidate provider

use serde::{Deserialize, Serialize};

use crate::reconciliation::engine::suggested_match;
use crate::traits::{BusinessAccess, CandidateSource, OpenAccess};
use crate::types::*;
use crate::utils::validation::validate_business_id;

/// The three matchable candidate lists for a business.
///
/// Assembled by a [`CandidateSource`]; upstream approval workflows have
/// already excluded reconciled items, so nothing here re-filters on
/// eligibility.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CandidateLists {
    pub payments: Vec<PaymentCandidate>,
    pub petty_cash: Vec<PettyCashCandidate>,
    pub ops_expenses: Vec<OpsExpenseCandidate>,
}

impl CandidateLists {
    /// Create empty candidate lists
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any list contains a candidate
    pub fn is_empty(&self) -> bool {
        self.payments.is_empty() && self.petty_cash.is_empty() && self.ops_expenses.is_empty()
    }

    /// Whether the list matching the action kind contains the candidate id.
    ///
    /// `RecordExpense` has no backing list and always returns false.
    pub fn contains_for_kind(&self, kind: &ActionKind, candidate_id: &str) -> bool {
        match kind {
            ActionKind::MatchPayment => self.payments.iter().any(|c| c.id == candidate_id),
            ActionKind::MatchPettyCash => self.petty_cash.iter().any(|c| c.id == candidate_id),
            ActionKind::MatchExpense => self.ops_expenses.iter().any(|c| c.id == candidate_id),
            ActionKind::RecordExpense => false,
        }
    }

    /// All candidates as the tagged union, payments first
    pub fn all(&self) -> Vec<Candidate> {
        let mut all = Vec::with_capacity(
            self.payments.len() + self.petty_cash.len() + self.ops_expenses.len(),
        );
        all.extend(self.payments.iter().cloned().map(Candidate::Payment));
        all.extend(self.petty_cash.iter().cloned().map(Candidate::PettyCash));
        all.extend(self.ops_expenses.iter().cloned().map(Candidate::OpsExpense));
        all
    }

    /// All candidates with the advisory auto-match hint computed against a
    /// mutation. The hint is display-only and never auto-executed.
    pub fn flagged(&self, mutation: &MutationRecord) -> Vec<FlaggedCandidate> {
        self.all()
            .into_iter()
            .map(|candidate| {
                let suggested = suggested_match(mutation, &candidate);
                FlaggedCandidate {
                    candidate,
                    suggested_match: suggested,
                }
            })
            .collect()
    }
}

/// A candidate paired with its advisory auto-match hint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlaggedCandidate {
    pub candidate: Candidate,
    pub suggested_match: bool,
}

/// Serves candidate lists for a business after an access check.
///
/// Authorization policy is pluggable via [`BusinessAccess`]; the default is
/// permissive since authentication lives outside this crate.
pub struct CandidateProvider<S: CandidateSource> {
    source: S,
    access: Box<dyn BusinessAccess>,
}

impl<S: CandidateSource> CandidateProvider<S> {
    /// Create a provider with the permissive default access check
    pub fn new(source: S) -> Self {
        Self {
            source,
            access: Box::new(OpenAccess),
        }
    }

    /// Create a provider with a custom access check
    pub fn with_access(source: S, access: Box<dyn BusinessAccess>) -> Self {
        Self { source, access }
    }

    /// Assemble the three candidate lists for a business.
    ///
    /// Refuses with `ReconError::Unauthorized` when the actor may not view
    /// the business.
    pub async fn list_candidates(
        &self,
        actor_id: &str,
        business_id: &str,
    ) -> ReconResult<CandidateLists> {
        validate_business_id(business_id)?;
        if !self.access.can_view(actor_id, business_id) {
            return Err(ReconError::Unauthorized(business_id.to_string()));
        }
        self.source.candidates_for(business_id).await
    }
}
