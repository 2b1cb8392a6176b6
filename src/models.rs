// Operation Model - record types and validation rules

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Date stamped onto imported records that carry no usable date of their own.
pub const IMPORT_FALLBACK_DATE: &str = "2024-01-01";

// ============================================================================
// OPERATION KIND
// ============================================================================

/// Direction of money movement for a single operation.
///
/// Crossing a file boundary the kind is a plain label (`"income"` /
/// `"expense"`); inside the crate it is always this closed enum, so an
/// unrecognized label is a detectable parse error rather than a silently
/// accepted free-form string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Income,
    Expense,
}

/// Raised when a storage label does not name a known operation kind.
#[derive(Error, Debug, PartialEq, Eq)]
#[error("unknown operation kind: {0:?}")]
pub struct UnknownKindError(pub String);

impl OperationKind {
    /// Label written to storage files.
    pub fn label(&self) -> &'static str {
        match self {
            OperationKind::Income => "income",
            OperationKind::Expense => "expense",
        }
    }

    /// Parse a storage label back into a kind.
    ///
    /// Callers decide what a failure means: the canonical loader skips the
    /// row, the import path falls back to `Expense`.
    pub fn from_label(label: &str) -> Result<Self, UnknownKindError> {
        match label {
            "income" => Ok(OperationKind::Income),
            "expense" => Ok(OperationKind::Expense),
            other => Err(UnknownKindError(other.to_string())),
        }
    }

    /// Sign applied to the amount when computing a balance.
    pub fn sign(&self) -> f64 {
        match self {
            OperationKind::Income => 1.0,
            OperationKind::Expense => -1.0,
        }
    }
}

// ============================================================================
// OPERATION
// ============================================================================

/// A single recorded financial operation.
///
/// Field declaration order matters: the canonical store writes its columns
/// in exactly this order (`id, amount, category, date, type, description`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Ledger-assigned identifier. Positive, unique, never reused.
    pub id: u64,

    /// Magnitude of the operation. Currency-agnostic, must be positive.
    pub amount: f64,

    /// Non-empty category name (trimmed on input by the ledger).
    pub category: String,

    /// Calendar date as `YYYY-MM-DD`. Kept as a string so date ranges can
    /// be compared lexicographically.
    pub date: String,

    #[serde(rename = "type")]
    pub kind: OperationKind,

    /// Free text, may be empty.
    #[serde(default)]
    pub description: String,
}

impl Operation {
    pub fn new(
        id: u64,
        amount: f64,
        category: impl Into<String>,
        date: impl Into<String>,
        kind: OperationKind,
        description: impl Into<String>,
    ) -> Self {
        Operation {
            id,
            amount,
            category: category.into(),
            date: date.into(),
            kind,
            description: description.into(),
        }
    }

    /// Check the business rules for this operation. Pure, no I/O.
    ///
    /// Category emptiness is deliberately not part of this check:
    /// `Ledger::add` rejects blank categories before an `Operation` is ever
    /// constructed, and a standalone operation with a blank category still
    /// passes here.
    pub fn validate(&self) -> bool {
        // Strictly positive; NaN fails this comparison too.
        if !(self.amount > 0.0) {
            return false;
        }

        if !date_matches_pattern(&self.date) {
            return false;
        }

        // The shape check alone accepts impossible dates like 2024-13-01,
        // so the string must also parse as a real calendar date.
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").is_ok()
    }
}

/// Fixed date shape: 4 digits, `-`, 2 digits, `-`, 2 digits.
fn date_matches_pattern(date: &str) -> bool {
    let bytes = date.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return false;
    }
    [0, 1, 2, 3, 5, 6, 8, 9]
        .iter()
        .all(|&i| bytes[i].is_ascii_digit())
}

// ============================================================================
// CANDIDATE RECORD
// ============================================================================

/// Semi-validated record produced by import, prior to promotion into a
/// ledger.
///
/// Fields carry defaults instead of guarantees: `id` is a placeholder (a
/// fresh id is assigned on promotion), `date` may be the import sentinel,
/// and `kind` falls back to `Expense` when the source label is unknown.
/// Promotion happens through `Ledger::add`, which runs full validation and
/// may still reject the record.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRecord {
    /// Placeholder identifier from the source file; never trusted.
    pub id: u64,
    pub amount: f64,
    pub category: String,
    pub date: String,
    pub kind: OperationKind,
    pub description: String,
}

// ============================================================================
// TESTS
// ============================================================================
