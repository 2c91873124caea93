//! Pure match engine: validates one decision and produces one action
//!
//! No I/O happens here. The engine receives the selected mutation, the
//! UI-facing [`MatchRequest`], the candidate lists already fetched for the
//! mutation's business, and the session context, and either produces a fully
//! populated [`ReconciliationAction`] or a named validation failure.
//! Submission to the ledger collaborator is the coordinator's job, kept
//! separate for testability.

use crate::reconciliation::candidates::CandidateLists;
use crate::types::*;
use crate::utils::validation::{validate_category, validate_description};

/// Advisory auto-match hint: true when the mutation's outflow equals the
/// candidate's total. Display-only; amount equality is never enforced, since
/// partial and rounding matches are legitimate.
pub fn suggested_match(mutation: &MutationRecord, candidate: &Candidate) -> bool {
    mutation.amount.abs() == *candidate.total_amount()
}

/// Validate a match request against one mutation and produce the
/// reconciliation action to submit.
///
/// Exactly one mutation is the subject of any single call; there is no batch
/// matching. For the three `match_*` kinds the candidate id is mandatory and
/// must appear in the kind's list; for `record_expense` a non-empty category
/// is mandatory and the description defaults to the mutation's own.
pub fn build_action(
    mutation: &MutationRecord,
    request: &MatchRequest,
    candidates: &CandidateLists,
    session: &SessionContext,
) -> ReconResult<ReconciliationAction> {
    if mutation.status == MutationStatus::Matched {
        return Err(ReconError::Validation(format!(
            "mutation '{}' is already matched",
            mutation.id
        )));
    }
    if mutation.business_id != session.business_id {
        return Err(ReconError::Validation(format!(
            "mutation '{}' belongs to business '{}', not '{}'",
            mutation.id, mutation.business_id, session.business_id
        )));
    }

    let (candidate_id, category) = match request.kind {
        ActionKind::MatchPayment | ActionKind::MatchPettyCash | ActionKind::MatchExpense => {
            let candidate_id = request.candidate_id.as_deref().ok_or_else(|| {
                ReconError::Validation(format!(
                    "{} requires a candidate id",
                    request.kind.as_str()
                ))
            })?;
            if !candidates.contains_for_kind(&request.kind, candidate_id) {
                return Err(ReconError::Validation(format!(
                    "candidate '{}' is not available for {} on business '{}'",
                    candidate_id,
                    request.kind.as_str(),
                    mutation.business_id
                )));
            }
            (Some(candidate_id.to_string()), None)
        }
        ActionKind::RecordExpense => {
            let category = request
                .category
                .as_deref()
                .ok_or_else(|| {
                    ReconError::Validation("record_expense requires a category".to_string())
                })?
                .trim()
                .to_string();
            validate_category(&category)?;
            (None, Some(category))
        }
    };

    let description = match &request.description {
        Some(description) => {
            validate_description(description)?;
            description.clone()
        }
        None => mutation.description.clone(),
    };

    Ok(ReconciliationAction {
        mutation_id: mutation.id.clone(),
        kind: request.kind.clone(),
        candidate_id,
        category,
        description,
        business_id: session.business_id.clone(),
        account_id: session.account_id.clone(),
        actor_id: session.actor_id.clone(),
    })
}
