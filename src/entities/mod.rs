// Entity Models for import matching
//
// Records are owned by the caller (loaded fresh from the data store for each
// import) and only borrowed by the matchers.

pub mod client;
pub mod expense;

pub use client::{Client, ClientMatch, ClientMatcher};
pub use expense::{DuplicateExpense, ExpenseCandidate};
