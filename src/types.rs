//! Core types and data structures for the reconciliation system

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Direction of a bank mutation from the account holder's point of view
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Money leaving the account (outflow)
    Debit,
    /// Money entering the account (inflow)
    Credit,
}

/// Reconciliation status of a bank mutation
///
/// `Unmatched` mutations are owned by this subsystem; once `Matched`, the
/// external ledger collaborator is authoritative and the status here is only
/// a cached view refreshed by re-query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MutationStatus {
    /// Awaiting a reconciliation decision
    Unmatched,
    /// Resolved against a business record (terminal)
    Matched,
}

/// One bank-statement line representing money moving through an account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationRecord {
    /// Unique identifier for the mutation
    pub id: String,
    /// Business the statement belongs to
    pub business_id: String,
    /// Destination branch, when the import targets one
    pub branch_id: Option<String>,
    /// Date the bank recorded the movement
    pub transaction_date: NaiveDate,
    /// Raw statement description
    pub description: String,
    /// Signed amount; negative = outflow
    pub amount: BigDecimal,
    /// Direction of the movement
    pub direction: Direction,
    /// Current reconciliation status
    pub status: MutationStatus,
    /// When the row was imported
    pub imported_at: NaiveDateTime,
    /// Who performed the import
    pub imported_by: String,
    /// Composite identity making re-import idempotent
    pub dedup_key: String,
}

impl MutationRecord {
    /// Create an unmatched draft for an outflow row parsed from a statement.
    ///
    /// `outflow` is the positive parsed amount; it is stored negated per the
    /// sign convention (negative = money leaving the account).
    pub fn draft(
        business_id: String,
        branch_id: Option<String>,
        transaction_date: NaiveDate,
        description: String,
        outflow: BigDecimal,
        imported_by: String,
    ) -> Self {
        let amount = -outflow;
        let dedup_key = Self::dedup_key(
            &business_id,
            transaction_date,
            &description,
            &amount,
            &Direction::Debit,
        );
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            business_id,
            branch_id,
            transaction_date,
            description,
            amount,
            direction: Direction::Debit,
            status: MutationStatus::Unmatched,
            imported_at: chrono::Utc::now().naive_utc(),
            imported_by,
            dedup_key,
        }
    }

    /// Compute the composite dedup key for a mutation.
    ///
    /// The key is unique per business: re-importing the same file reproduces
    /// the same keys and the store ignores the conflicts. The amount is
    /// normalized so `150000` and `150000.00` produce identical keys.
    pub fn dedup_key(
        business_id: &str,
        transaction_date: NaiveDate,
        description: &str,
        amount: &BigDecimal,
        direction: &Direction,
    ) -> String {
        let tag = match direction {
            Direction::Debit => "D",
            Direction::Credit => "C",
        };
        format!(
            "{}|{}|{}|{}|{}",
            business_id,
            transaction_date,
            description,
            amount.normalized(),
            tag
        )
    }

    /// Whether the mutation is still awaiting a reconciliation decision
    pub fn is_unmatched(&self) -> bool {
        self.status == MutationStatus::Unmatched
    }
}

/// Kind of petty-cash transfer a branch requested
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PettyCashKind {
    /// First cash allocation for a branch
    Initial,
    /// Top-up of spent petty cash
    Reimburse,
}

/// A supplier payment eligible to explain a mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentCandidate {
    pub id: String,
    pub payment_date: NaiveDate,
    pub total_paid: BigDecimal,
    pub supplier_name: String,
    pub payment_number: String,
}

/// A branch petty-cash transfer eligible to explain a mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PettyCashCandidate {
    pub id: String,
    pub kind: PettyCashKind,
    pub total_amount: BigDecimal,
    pub branch_name: String,
    pub requester: String,
    pub approved_date: NaiveDate,
}

/// A recorded operational bill eligible to explain a mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpsExpenseCandidate {
    pub id: String,
    pub category: String,
    pub amount: BigDecimal,
    pub description: String,
    pub payee: String,
    pub payment_date: NaiveDate,
}

/// A pending business-side record eligible to explain a mutation.
///
/// Candidates are immutable read views owned by upstream workflows; the
/// match engine never mutates them, only references their id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum Candidate {
    Payment(PaymentCandidate),
    PettyCash(PettyCashCandidate),
    OpsExpense(OpsExpenseCandidate),
}

impl Candidate {
    /// Identifier of the underlying business record
    pub fn id(&self) -> &str {
        match self {
            Candidate::Payment(c) => &c.id,
            Candidate::PettyCash(c) => &c.id,
            Candidate::OpsExpense(c) => &c.id,
        }
    }

    /// Monetary total of the underlying business record
    pub fn total_amount(&self) -> &BigDecimal {
        match self {
            Candidate::Payment(c) => &c.total_paid,
            Candidate::PettyCash(c) => &c.total_amount,
            Candidate::OpsExpense(c) => &c.amount,
        }
    }
}

/// Kind of reconciliation decision taken for a mutation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Match against a supplier payment
    MatchPayment,
    /// Match against a branch petty-cash transfer
    MatchPettyCash,
    /// Match against a recorded operational bill
    MatchExpense,
    /// Explain with a freshly typed ad hoc expense
    RecordExpense,
}

impl ActionKind {
    /// Whether this kind requires an existing candidate record
    pub fn requires_candidate(&self) -> bool {
        !matches!(self, ActionKind::RecordExpense)
    }

    /// Wire name of the kind, matching its serialized form
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::MatchPayment => "match_payment",
            ActionKind::MatchPettyCash => "match_petty_cash",
            ActionKind::MatchExpense => "match_expense",
            ActionKind::RecordExpense => "record_expense",
        }
    }
}

/// The UI-facing decision surface validated by the match engine.
///
/// Kept loosely typed on purpose: the engine, not the caller, enforces which
/// fields each kind requires, so a missing `candidate_id` is a named
/// validation failure rather than an unrepresentable state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRequest {
    pub kind: ActionKind,
    pub candidate_id: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
}

impl MatchRequest {
    /// Request a match against a supplier payment
    pub fn match_payment(candidate_id: impl Into<String>) -> Self {
        Self {
            kind: ActionKind::MatchPayment,
            candidate_id: Some(candidate_id.into()),
            category: None,
            description: None,
        }
    }

    /// Request a match against a petty-cash transfer
    pub fn match_petty_cash(candidate_id: impl Into<String>) -> Self {
        Self {
            kind: ActionKind::MatchPettyCash,
            candidate_id: Some(candidate_id.into()),
            category: None,
            description: None,
        }
    }

    /// Request a match against a recorded operational bill
    pub fn match_expense(candidate_id: impl Into<String>) -> Self {
        Self {
            kind: ActionKind::MatchExpense,
            candidate_id: Some(candidate_id.into()),
            category: None,
            description: None,
        }
    }

    /// Request an ad hoc expense; description falls back to the mutation's own
    pub fn record_expense(category: impl Into<String>, description: Option<String>) -> Self {
        Self {
            kind: ActionKind::RecordExpense,
            candidate_id: None,
            category: Some(category.into()),
            description,
        }
    }
}

/// One reconciliation decision, ready for submission to the ledger collaborator.
///
/// Created transiently by the match engine, submitted once, not stored
/// locally beyond submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationAction {
    pub mutation_id: String,
    pub kind: ActionKind,
    pub candidate_id: Option<String>,
    pub category: Option<String>,
    pub description: String,
    pub business_id: String,
    pub account_id: String,
    pub actor_id: String,
}

/// Session-scoped context passed into engine and coordinator calls.
///
/// Replaces ambient selection/user globals: one interactive session per bank
/// account, identified explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionContext {
    /// Business whose statements are being reconciled
    pub business_id: String,
    /// Bank account the statement file belongs to
    pub account_id: String,
    /// Operator performing the reconciliation
    pub actor_id: String,
}

impl SessionContext {
    /// Create a new session context
    pub fn new(
        business_id: impl Into<String>,
        account_id: impl Into<String>,
        actor_id: impl Into<String>,
    ) -> Self {
        Self {
            business_id: business_id.into(),
            account_id: account_id.into(),
            actor_id: actor_id.into(),
        }
    }
}

/// Outcome of a batch import
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    /// Rows newly persisted
    pub inserted: usize,
    /// Rows ignored because their dedup key already existed
    pub skipped_duplicates: usize,
}

/// Errors that can occur in the reconciliation system
#[derive(Debug, thiserror::Error)]
pub enum ReconError {
    #[error("invalid statement file: {0}")]
    FileFormat(String),
    #[error("no debit rows found in statement")]
    NoDebitRows,
    #[error("storage error: {0}")]
    Storage(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("ledger collaborator error: {0}")]
    Collaborator(String),
    #[error("not authorized to view business: {0}")]
    Unauthorized(String),
    #[error("mutation not found: {0}")]
    MutationNotFound(String),
}

/// Result type for reconciliation operations
pub type ReconResult<T> = Result<T, ReconError>;
