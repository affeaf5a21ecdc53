// 🧾 Expense records for receipt import
//
// DuplicateExpense: an expense already stored for the user
// ExpenseCandidate: what was just extracted from a receipt or bank export

use crate::error::{ImportError, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// An existing expense, loaded by the caller from the expense table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateExpense {
    pub id: String,

    /// Calendar date of the expense (ISO YYYY-MM-DD)
    pub date: NaiveDate,

    pub supplier: String,

    /// Exact decimal amount (never f64, 0.1 + 0.2 must equal 0.3)
    pub amount: Decimal,

    #[serde(default)]
    #[serde(deserialize_with = "empty_string_as_none")]
    pub category: Option<String>,
}

impl DuplicateExpense {
    /// This expense's own fields as an import candidate
    pub fn candidate(&self) -> ExpenseCandidate {
        ExpenseCandidate {
            date: self.date,
            supplier: self.supplier.clone(),
            amount: self.amount,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(ImportError::MissingField("id"));
        }
        if self.supplier.trim().is_empty() {
            return Err(ImportError::MissingField("supplier"));
        }
        Ok(())
    }
}

/// An expense about to be imported
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseCandidate {
    pub date: NaiveDate,
    pub supplier: String,
    pub amount: Decimal,
}

impl ExpenseCandidate {
    pub fn new(date: NaiveDate, supplier: impl Into<String>, amount: Decimal) -> Result<Self> {
        let candidate = ExpenseCandidate {
            date,
            supplier: supplier.into(),
            amount,
        };
        candidate.validate()?;
        Ok(candidate)
    }

    /// Build a candidate from raw extracted text
    ///
    /// Example:
    /// ```
    /// use gig_import::ExpenseCandidate;
    ///
    /// let candidate = ExpenseCandidate::parse("2024-03-15", "Thomann", "1249.00").unwrap();
    /// assert_eq!(candidate.supplier, "Thomann");
    /// assert!(ExpenseCandidate::parse("15/03/2024", "Thomann", "1249.00").is_err());
    /// ```
    pub fn parse(date: &str, supplier: &str, amount: &str) -> Result<Self> {
        let parsed_date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
            .map_err(|_| ImportError::InvalidDate(date.to_string()))?;

        let parsed_amount = Decimal::from_str(amount.trim())
            .map_err(|_| ImportError::InvalidAmount(amount.to_string()))?;

        ExpenseCandidate::new(parsed_date, supplier, parsed_amount)
    }

    pub fn validate(&self) -> Result<()> {
        if self.supplier.trim().is_empty() {
            return Err(ImportError::MissingField("supplier"));
        }
        Ok(())
    }
}

// CSV exports write a missing category as an empty column
fn empty_string_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}
