// Ledger - in-memory operation collection and id assignment

use crate::models::{CandidateRecord, Operation, OperationKind};

// ============================================================================
// OPERATION FILTER
// ============================================================================

/// Criteria for `Ledger::filter`.
///
/// Every criterion is optional; omitted ones impose no constraint and the
/// present ones are combined with AND. Date bounds are inclusive on both
/// ends and compare as strings, which is sound because `YYYY-MM-DD` orders
/// lexicographically.
#[derive(Debug, Clone, Default)]
pub struct OperationFilter {
    pub category: Option<String>,
    pub kind: Option<OperationKind>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl OperationFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: match a category exactly (compared after trimming).
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Builder pattern: restrict to one operation kind.
    pub fn with_kind(mut self, kind: OperationKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Builder pattern: earliest date to include.
    pub fn with_start_date(mut self, start_date: impl Into<String>) -> Self {
        self.start_date = Some(start_date.into());
        self
    }

    /// Builder pattern: latest date to include.
    pub fn with_end_date(mut self, end_date: impl Into<String>) -> Self {
        self.end_date = Some(end_date.into());
        self
    }

    fn matches(&self, op: &Operation) -> bool {
        if let Some(category) = &self.category {
            if op.category != category.trim() {
                return false;
            }
        }
        if let Some(kind) = self.kind {
            if op.kind != kind {
                return false;
            }
        }
        if let Some(start) = &self.start_date {
            if op.date.as_str() < start.as_str() {
                return false;
            }
        }
        if let Some(end) = &self.end_date {
            if op.date.as_str() > end.as_str() {
                return false;
            }
        }
        true
    }
}

// ============================================================================
// LEDGER
// ============================================================================

/// The in-memory, ordered collection of operations plus the id-assignment
/// counter.
///
/// A ledger owns its operations exclusively; nothing else mutates the
/// sequence. Insertion order is storage order. The counter is monotonic:
/// ids are never reused, even after a delete.
#[derive(Debug)]
pub struct Ledger {
    operations: Vec<Operation>,
    next_id: u64,
}

impl Ledger {
    /// Create an empty ledger with the counter at 1.
    pub fn new() -> Self {
        Ledger {
            operations: Vec::new(),
            next_id: 1,
        }
    }

    /// Rebuild a ledger from previously loaded state.
    ///
    /// `next_id` comes from the storage layer (`max(id) + 1`), which keeps
    /// id continuity across process runs.
    pub fn restore(operations: Vec<Operation>, next_id: u64) -> Self {
        Ledger {
            operations,
            next_id,
        }
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Id the next successful `add` will assign.
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Add a new operation.
    ///
    /// Category and description are trimmed first; a blank category is
    /// rejected here, before any `Operation` is constructed. On any failure
    /// the ledger is left unchanged and the id counter does not advance.
    pub fn add(
        &mut self,
        amount: f64,
        category: &str,
        date: &str,
        kind: OperationKind,
        description: &str,
    ) -> bool {
        let category = category.trim();
        if category.is_empty() {
            return false;
        }

        let operation = Operation::new(
            self.next_id,
            amount,
            category,
            date,
            kind,
            description.trim(),
        );
        if !operation.validate() {
            return false;
        }

        self.operations.push(operation);
        self.next_id += 1;
        true
    }

    /// Remove the operation with the given id. Returns false when no such
    /// operation exists; a missing id is not an error.
    pub fn delete(&mut self, id: u64) -> bool {
        match self.operations.iter().position(|op| op.id == id) {
            Some(index) => {
                self.operations.remove(index);
                true
            }
            None => false,
        }
    }

    /// Return the operations matching `filter`, in ledger order. The ledger
    /// itself is never mutated.
    pub fn filter(&self, filter: &OperationFilter) -> Vec<Operation> {
        self.operations
            .iter()
            .filter(|op| filter.matches(op))
            .cloned()
            .collect()
    }

    /// Signed sum over the given operations, or over the whole ledger when
    /// `None`. Income counts positive, expense negative; an empty slice
    /// sums to zero.
    pub fn balance(&self, operations: Option<&[Operation]>) -> f64 {
        let ops = operations.unwrap_or(&self.operations);
        ops.iter().map(|op| op.kind.sign() * op.amount).sum()
    }

    /// Distinct categories across all operations, sorted ascending.
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = self
            .operations
            .iter()
            .map(|op| op.category.clone())
            .collect();
        categories.sort();
        categories.dedup();
        categories
    }

    /// Promote imported candidates one at a time.
    ///
    /// Each candidate goes through `add`, so it is independently validated
    /// and gets a fresh id; its placeholder id is ignored. There is no
    /// batch atomicity: a rejected candidate does not roll back the ones
    /// merged before it. Returns how many were accepted.
    pub fn merge(&mut self, candidates: &[CandidateRecord]) -> usize {
        candidates
            .iter()
            .filter(|candidate| {
                self.add(
                    candidate.amount,
                    &candidate.category,
                    &candidate.date,
                    candidate.kind,
                    &candidate.description,
                )
            })
            .count()
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_ledger() -> Ledger {
        let mut ledger = Ledger::new();
        assert!(ledger.add(2000.0, "Salary", "2024-01-05", OperationKind::Income, ""));
        assert!(ledger.add(50.0, "Groceries", "2024-01-10", OperationKind::Expense, "weekly"));
        assert!(ledger.add(30.0, "Transport", "2024-02-01", OperationKind::Expense, ""));
        ledger
    }

    #[test]
    fn test_add_assigns_increasing_ids() {
        let ledger = sample_ledger();
        assert_eq!(ledger.len(), 3);

        let ids: Vec<u64> = ledger.operations().iter().map(|op| op.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(ledger.next_id(), 4);
    }

    #[test]
    fn test_add_trims_category_and_description() {
        let mut ledger = Ledger::new();
        assert!(ledger.add(10.0, "  Books  ", "2024-01-01", OperationKind::Expense, "  used  "));

        let op = &ledger.operations()[0];
        assert_eq!(op.category, "Books");
        assert_eq!(op.description, "used");
    }

    #[test]
    fn test_add_rejects_invalid_amount() {
        let mut ledger = Ledger::new();
        assert!(!ledger.add(0.0, "Books", "2024-01-01", OperationKind::Expense, ""));
        assert!(!ledger.add(-5.0, "Books", "2024-01-01", OperationKind::Expense, ""));
        assert!(ledger.is_empty());
        assert_eq!(ledger.next_id(), 1, "counter must not advance on failure");
    }

    #[test]
    fn test_add_rejects_blank_category() {
        let mut ledger = Ledger::new();
        assert!(!ledger.add(10.0, "   ", "2024-01-01", OperationKind::Expense, ""));
        assert!(ledger.is_empty());
        assert_eq!(ledger.next_id(), 1);
    }

    #[test]
    fn test_add_rejects_bad_date() {
        let mut ledger = Ledger::new();
        assert!(!ledger.add(10.0, "Books", "2024-13-01", OperationKind::Expense, ""));
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_delete_existing_and_missing() {
        let mut ledger = sample_ledger();

        assert!(ledger.delete(2));
        assert_eq!(ledger.len(), 2);
        assert!(ledger.operations().iter().all(|op| op.id != 2));

        assert!(!ledger.delete(99));
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_ids_never_reused_after_delete() {
        let mut ledger = sample_ledger();
        assert!(ledger.delete(3));

        assert!(ledger.add(15.0, "Coffee", "2024-02-02", OperationKind::Expense, ""));
        let last = ledger.operations().last().unwrap();
        assert_eq!(last.id, 4, "deleted ids must not be reassigned");
    }

    #[test]
    fn test_filter_by_kind_is_disjoint_complementary() {
        let ledger = sample_ledger();

        let income = ledger.filter(&OperationFilter::new().with_kind(OperationKind::Income));
        let expenses = ledger.filter(&OperationFilter::new().with_kind(OperationKind::Expense));

        assert!(income.iter().all(|op| op.kind == OperationKind::Income));
        assert!(expenses.iter().all(|op| op.kind == OperationKind::Expense));
        assert_eq!(income.len() + expenses.len(), ledger.len());
    }

    #[test]
    fn test_filter_by_category_trims_filter_value() {
        let ledger = sample_ledger();

        let matched = ledger.filter(&OperationFilter::new().with_category("  Groceries "));
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].category, "Groceries");
    }

    #[test]
    fn test_filter_date_bounds_are_inclusive() {
        let ledger = sample_ledger();

        let filter = OperationFilter::new()
            .with_start_date("2024-01-10")
            .with_end_date("2024-02-01");
        let matched = ledger.filter(&filter);

        let ids: Vec<u64> = matched.iter().map(|op| op.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_filter_combines_criteria_with_and() {
        let ledger = sample_ledger();

        let filter = OperationFilter::new()
            .with_kind(OperationKind::Expense)
            .with_end_date("2024-01-31");
        let matched = ledger.filter(&filter);

        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].category, "Groceries");
    }

    #[test]
    fn test_filter_never_mutates_ledger() {
        let ledger = sample_ledger();
        let before = ledger.operations().to_vec();

        let _ = ledger.filter(&OperationFilter::new().with_kind(OperationKind::Income));
        assert_eq!(ledger.operations(), before.as_slice());
    }

    #[test]
    fn test_balance_over_whole_ledger() {
        let ledger = sample_ledger();
        assert_eq!(ledger.balance(None), 2000.0 - 50.0 - 30.0);
    }

    #[test]
    fn test_balance_over_explicit_empty_slice_is_zero() {
        let ledger = sample_ledger();
        assert_eq!(ledger.balance(Some(&[])), 0.0);
    }

    #[test]
    fn test_balance_over_filtered_subset() {
        let ledger = sample_ledger();
        let expenses = ledger.filter(&OperationFilter::new().with_kind(OperationKind::Expense));
        assert_eq!(ledger.balance(Some(&expenses)), -80.0);
    }

    #[test]
    fn test_categories_sorted_and_deduplicated() {
        let mut ledger = sample_ledger();
        assert!(ledger.add(25.0, "Groceries", "2024-02-03", OperationKind::Expense, ""));

        assert_eq!(
            ledger.categories(),
            vec!["Groceries", "Salary", "Transport"]
        );
    }

    #[test]
    fn test_merge_assigns_fresh_ids_and_skips_invalid() {
        let mut ledger = sample_ledger();

        let candidates = vec![
            CandidateRecord {
                id: 77,
                amount: 10.0,
                category: "Coffee".to_string(),
                date: "2024-02-04".to_string(),
                kind: OperationKind::Expense,
                description: String::new(),
            },
            CandidateRecord {
                id: 0,
                amount: -3.0,
                category: "Broken".to_string(),
                date: "2024-02-04".to_string(),
                kind: OperationKind::Expense,
                description: String::new(),
            },
            CandidateRecord {
                id: 0,
                amount: 40.0,
                category: "Coffee".to_string(),
                date: "2024-02-05".to_string(),
                kind: OperationKind::Expense,
                description: String::new(),
            },
        ];

        // Middle candidate is rejected; the ones around it still merge.
        assert_eq!(ledger.merge(&candidates), 2);
        assert_eq!(ledger.len(), 5);

        let ids: Vec<u64> = ledger.operations().iter().map(|op| op.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5], "placeholder ids are ignored");
    }
}
