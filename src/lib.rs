// Pocket Ledger - Core Library
// Record management core for a personal finance ledger: entity model,
// validation, filtering/aggregation and CSV/JSON persistence.

pub mod analysis;
pub mod ledger;
pub mod models;
pub mod storage;

// Re-export commonly used types
pub use analysis::{category_totals, monthly_totals, top_expenses, CategoryTotal, MonthlyTotal};
pub use ledger::{Ledger, OperationFilter};
pub use models::{
    CandidateRecord, Operation, OperationKind, UnknownKindError, IMPORT_FALLBACK_DATE,
};
pub use storage::{ExchangeFormat, Storage, DEFAULT_DATA_FILE};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
