// Gig Import - Core Library
// Matching and throttling used while importing invoices and receipts

pub mod clock;
pub mod config;
pub mod deduplication;
pub mod entities;
pub mod error;
pub mod loader;
pub mod matching;
pub mod rate_limit;

// Re-export commonly used types
pub use clock::{Clock, MockClock, SystemClock};
pub use config::{ImportConfig, PolicyConfig, PDF_IMPORT_ENDPOINT, TRANSLATE_ENDPOINT};
pub use deduplication::{DuplicateCheck, DuplicateExpenseDetector, DuplicateReport};
pub use entities::{Client, ClientMatch, ClientMatcher, DuplicateExpense, ExpenseCandidate};
pub use error::ImportError;
pub use loader::{load_candidates, load_clients, load_expenses};
pub use matching::{levenshtein_distance, normalize_company_name};
pub use rate_limit::{RateLimitDecision, RateLimitPolicy, RateLimiter};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
