// Analysis - aggregate views over a ledger snapshot

use crate::models::{Operation, OperationKind};
use std::cmp::Ordering;
use std::collections::BTreeMap;

// ============================================================================
// VIEW TYPES
// ============================================================================

/// Income and expense totals for one calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyTotal {
    /// Month key in `YYYY-MM` form.
    pub month: String,
    pub income: f64,
    pub expense: f64,
}

/// Total expense amount for one category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}

// ============================================================================
// PROJECTIONS
// ============================================================================

/// Group operations by calendar month and kind, summing amounts.
///
/// The month is derived from the date's `YYYY-MM` prefix. Results come
/// back sorted by month ascending; an empty snapshot produces an empty
/// list rather than failing.
pub fn monthly_totals(operations: &[Operation]) -> Vec<MonthlyTotal> {
    let mut months: BTreeMap<&str, (f64, f64)> = BTreeMap::new();

    for op in operations {
        let month = op.date.get(..7).unwrap_or(op.date.as_str());
        let entry = months.entry(month).or_insert((0.0, 0.0));
        match op.kind {
            OperationKind::Income => entry.0 += op.amount,
            OperationKind::Expense => entry.1 += op.amount,
        }
    }

    months
        .into_iter()
        .map(|(month, (income, expense))| MonthlyTotal {
            month: month.to_string(),
            income,
            expense,
        })
        .collect()
}

/// Expense totals per category, sorted by category name ascending.
/// Income operations do not participate.
pub fn category_totals(operations: &[Operation]) -> Vec<CategoryTotal> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();

    for op in operations {
        if op.kind == OperationKind::Expense {
            *totals.entry(op.category.as_str()).or_insert(0.0) += op.amount;
        }
    }

    totals
        .into_iter()
        .map(|(category, total)| CategoryTotal {
            category: category.to_string(),
            total,
        })
        .collect()
}

/// The `n` largest expenses by amount, largest first.
///
/// The sort is stable, so expenses with equal amounts keep their original
/// ledger order. Income operations do not participate.
pub fn top_expenses(operations: &[Operation], n: usize) -> Vec<Operation> {
    let mut expenses: Vec<Operation> = operations
        .iter()
        .filter(|op| op.kind == OperationKind::Expense)
        .cloned()
        .collect();

    expenses.sort_by(|a, b| b.amount.partial_cmp(&a.amount).unwrap_or(Ordering::Equal));
    expenses.truncate(n);
    expenses
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn op(id: u64, amount: f64, category: &str, date: &str, kind: OperationKind) -> Operation {
        Operation::new(id, amount, category, date, kind, "")
    }

    fn snapshot() -> Vec<Operation> {
        vec![
            op(1, 2000.0, "Salary", "2024-01-05", OperationKind::Income),
            op(2, 50.0, "Groceries", "2024-01-10", OperationKind::Expense),
            op(3, 30.0, "Transport", "2024-01-20", OperationKind::Expense),
            op(4, 2100.0, "Salary", "2024-02-05", OperationKind::Income),
            op(5, 70.0, "Groceries", "2024-02-12", OperationKind::Expense),
        ]
    }

    #[test]
    fn test_monthly_totals_groups_by_month_and_kind() {
        let totals = monthly_totals(&snapshot());

        assert_eq!(
            totals,
            vec![
                MonthlyTotal {
                    month: "2024-01".to_string(),
                    income: 2000.0,
                    expense: 80.0,
                },
                MonthlyTotal {
                    month: "2024-02".to_string(),
                    income: 2100.0,
                    expense: 70.0,
                },
            ]
        );
    }

    #[test]
    fn test_monthly_totals_of_empty_snapshot() {
        assert!(monthly_totals(&[]).is_empty());
    }

    #[test]
    fn test_category_totals_covers_expenses_only() {
        let totals = category_totals(&snapshot());

        assert_eq!(
            totals,
            vec![
                CategoryTotal {
                    category: "Groceries".to_string(),
                    total: 120.0,
                },
                CategoryTotal {
                    category: "Transport".to_string(),
                    total: 30.0,
                },
            ]
        );
    }

    #[test]
    fn test_category_totals_of_income_only_snapshot() {
        let income = vec![op(1, 100.0, "Salary", "2024-01-05", OperationKind::Income)];
        assert!(category_totals(&income).is_empty());
    }

    #[test]
    fn test_top_expenses_orders_by_amount_descending() {
        let operations = vec![
            op(1, 10.0, "A", "2024-01-01", OperationKind::Expense),
            op(2, 50.0, "B", "2024-01-02", OperationKind::Expense),
            op(3, 30.0, "C", "2024-01-03", OperationKind::Expense),
        ];

        let top = top_expenses(&operations, 2);
        let amounts: Vec<f64> = top.iter().map(|op| op.amount).collect();
        assert_eq!(amounts, vec![50.0, 30.0]);
    }

    #[test]
    fn test_top_expenses_ignores_income_and_tolerates_large_n() {
        let top = top_expenses(&snapshot(), 10);

        assert_eq!(top.len(), 3);
        assert!(top.iter().all(|op| op.kind == OperationKind::Expense));
    }

    #[test]
    fn test_top_expenses_breaks_ties_by_original_order() {
        let operations = vec![
            op(1, 25.0, "First", "2024-01-01", OperationKind::Expense),
            op(2, 25.0, "Second", "2024-01-02", OperationKind::Expense),
            op(3, 25.0, "Third", "2024-01-03", OperationKind::Expense),
        ];

        let top = top_expenses(&operations, 2);
        let categories: Vec<&str> = top.iter().map(|op| op.category.as_str()).collect();
        assert_eq!(categories, vec!["First", "Second"]);
    }

    #[test]
    fn test_top_expenses_of_empty_snapshot() {
        assert!(top_expenses(&[], 5).is_empty());
    }
}
