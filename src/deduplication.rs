// 🔍 Duplicate Expense Detector - Don't import the same receipt twice
// A candidate is a duplicate when date, supplier and amount all match an
// existing expense: same date, similar supplier, exactly equal amount.

use crate::entities::{DuplicateExpense, ExpenseCandidate};
use crate::error::Result;
use crate::matching::{
    acceptance_threshold, levenshtein_distance, normalize_company_name,
    validate_threshold_percent, DEFAULT_THRESHOLD_PERCENT,
};
use serde::Serialize;
use tracing::debug;

// ============================================================================
// DUPLICATE CHECK RESULT
// ============================================================================

/// Outcome for one candidate of a batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateCheck<'a> {
    pub candidate: &'a ExpenseCandidate,

    /// Existing expense the candidate duplicates, if any
    pub duplicate: Option<&'a DuplicateExpense>,
}

impl DuplicateCheck<'_> {
    pub fn is_duplicate(&self) -> bool {
        self.duplicate.is_some()
    }
}

/// Batch summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateReport<'a> {
    pub checked: usize,
    pub duplicates: usize,
    pub results: Vec<DuplicateCheck<'a>>,
}

impl<'a> DuplicateReport<'a> {
    pub fn from_checks(results: Vec<DuplicateCheck<'a>>) -> Self {
        DuplicateReport {
            checked: results.len(),
            duplicates: results.iter().filter(|r| r.is_duplicate()).count(),
            results,
        }
    }
}

// ============================================================================
// DUPLICATE EXPENSE DETECTOR
// ============================================================================

#[derive(Debug, Clone)]
pub struct DuplicateExpenseDetector {
    /// Accepted supplier distance as a percentage of the shorter name (default: 30)
    pub supplier_threshold_percent: usize,
}

impl DuplicateExpenseDetector {
    /// Create detector with the default 30% supplier threshold
    pub fn new() -> Self {
        DuplicateExpenseDetector {
            supplier_threshold_percent: DEFAULT_THRESHOLD_PERCENT,
        }
    }

    pub fn with_supplier_threshold_percent(supplier_threshold_percent: usize) -> Result<Self> {
        validate_threshold_percent(supplier_threshold_percent, "supplier")?;
        Ok(DuplicateExpenseDetector {
            supplier_threshold_percent,
        })
    }

    /// Do two supplier names likely refer to the same company?
    ///
    /// Both names are normalized like client names (case, whitespace,
    /// AB/HB/KB suffixes). They are similar when their edit distance is within
    /// the threshold of the SHORTER name, which keeps the check symmetric.
    /// A blank name is never similar to anything.
    pub fn is_similar_supplier(&self, a: &str, b: &str) -> bool {
        let normalized_a = normalize_company_name(a);
        let normalized_b = normalize_company_name(b);

        if normalized_a.is_empty() || normalized_b.is_empty() {
            return false;
        }

        if normalized_a == normalized_b {
            return true;
        }

        let shorter = normalized_a
            .chars()
            .count()
            .min(normalized_b.chars().count());
        let threshold = acceptance_threshold(shorter, self.supplier_threshold_percent);

        levenshtein_distance(&normalized_a, &normalized_b) <= threshold
    }

    /// Find the first existing expense the candidate duplicates
    pub fn find_duplicate<'a>(
        &self,
        candidate: &ExpenseCandidate,
        existing: &'a [DuplicateExpense],
    ) -> Option<&'a DuplicateExpense> {
        let found = existing.iter().find(|expense| {
            // Cheap comparisons first
            expense.date == candidate.date
                && expense.amount == candidate.amount
                && self.is_similar_supplier(&expense.supplier, &candidate.supplier)
        });

        if let Some(expense) = found {
            debug!(
                date = %candidate.date,
                supplier = %candidate.supplier,
                amount = %candidate.amount,
                duplicate_of = %expense.id,
                "Duplicate expense"
            );
        }

        found
    }

    /// Check every candidate against the same existing expenses
    ///
    /// Output order follows `candidates`. Candidates are not compared with
    /// each other.
    pub fn find_duplicates<'a>(
        &self,
        candidates: &'a [ExpenseCandidate],
        existing: &'a [DuplicateExpense],
    ) -> Vec<DuplicateCheck<'a>> {
        candidates
            .iter()
            .map(|candidate| DuplicateCheck {
                candidate,
                duplicate: self.find_duplicate(candidate, existing),
            })
            .collect()
    }
}

impl Default for DuplicateExpenseDetector {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
