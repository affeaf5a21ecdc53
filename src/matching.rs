// 🔤 Name Matching - Normalization + Levenshtein distance
// Shared by client matching (invoice import) and supplier comparison
// (receipt import).

use crate::error::{ImportError, Result};

/// Swedish company-form suffixes that carry no identity
///
/// "Spotify AB" and "Spotify" are the same counterparty.
pub const COMPANY_SUFFIXES: [&str; 4] = [" ab", " aktiebolag", " hb", " kb"];

/// Default acceptance ratio: distance may be up to 30% of the name length
pub const DEFAULT_THRESHOLD_PERCENT: usize = 30;

/// Above 100% any name would match any other of similar length
pub const MAX_THRESHOLD_PERCENT: usize = 100;

/// Normalize a company name for comparison
///
/// - Lowercase
/// - Trim and collapse whitespace runs to a single space
/// - Strip trailing company-form suffixes (AB, Aktiebolag, HB, KB)
///
/// Suffixes are stripped until none remain, so normalizing twice is a no-op.
/// No Unicode folding beyond lowercase: "Malmö" and "Malmo" stay distinct.
pub fn normalize_company_name(name: &str) -> String {
    let mut normalized = name
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    loop {
        match COMPANY_SUFFIXES
            .iter()
            .find(|suffix| normalized.ends_with(*suffix))
        {
            Some(suffix) => normalized.truncate(normalized.len() - suffix.len()),
            None => break,
        }
    }

    normalized
}

/// Calculate Levenshtein distance between two strings
///
/// Minimum number of single-character insertions, deletions or substitutions
/// turning `s1` into `s2`. Standard dynamic programming over two rolling rows
/// of the matrix, counted in chars.
pub fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();

    // Keep the shorter string on the row axis
    let (rows, cols) = if s1_chars.len() < s2_chars.len() {
        (&s1_chars, &s2_chars)
    } else {
        (&s2_chars, &s1_chars)
    };

    if rows.is_empty() {
        return cols.len();
    }

    let mut previous: Vec<usize> = (0..=rows.len()).collect();
    let mut current = vec![0; rows.len() + 1];

    for (j, col_char) in cols.iter().enumerate() {
        current[0] = j + 1;

        for (i, row_char) in rows.iter().enumerate() {
            let cost = if row_char == col_char { 0 } else { 1 };

            current[i + 1] = std::cmp::min(
                std::cmp::min(
                    previous[i + 1] + 1, // deletion
                    current[i] + 1,      // insertion
                ),
                previous[i] + cost, // substitution
            );
        }

        std::mem::swap(&mut previous, &mut current);
    }

    previous[rows.len()]
}

/// Largest accepted edit distance for a name of `len` chars
///
/// `ceil(len * percent / 100)` in integer arithmetic, so 30% of 10 chars is
/// exactly 3 and never 4 through float rounding.
pub fn acceptance_threshold(len: usize, percent: usize) -> usize {
    len.saturating_mul(percent).div_ceil(100)
}

/// Check a configured threshold percentage (1..=100)
pub fn validate_threshold_percent(percent: usize, name: &str) -> Result<()> {
    if percent == 0 || percent > MAX_THRESHOLD_PERCENT {
        return Err(ImportError::InvalidPolicy(format!(
            "{} threshold must be between 1% and {}%, got {}%",
            name, MAX_THRESHOLD_PERCENT, percent
        )));
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
