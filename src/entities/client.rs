// 🎻 Client Entity + fuzzy matching for invoice import
//
// "Client name is a VALUE (as printed on the PDF), Client id is IDENTITY"
//
// Problem solved:
// - "SPOTIFY AB", "Spotify", "spotify  ab" → same client
// - Typos from PDF text extraction ("Konserthusett") still find the client
// - A name that is only vaguely similar is NOT matched (no fabricated identity)

use crate::error::{ImportError, Result};
use crate::matching::{
    acceptance_threshold, levenshtein_distance, normalize_company_name,
    validate_threshold_percent, DEFAULT_THRESHOLD_PERCENT,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

// ============================================================================
// CLIENT ENTITY
// ============================================================================

/// A known client, loaded by the caller from the client table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    /// Stable identity (opaque, owned by the data store)
    pub id: String,

    /// Display name
    pub name: String,
}

impl Client {
    /// Create a client with a freshly minted UUID
    pub fn new(name: impl Into<String>) -> Self {
        Client {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
        }
    }

    /// Create a client with an existing id from the data store
    pub fn with_id(id: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        let client = Client {
            id: id.into(),
            name: name.into(),
        };
        client.validate()?;
        Ok(client)
    }

    /// Check required fields
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(ImportError::MissingField("id"));
        }
        Ok(())
    }
}

// ============================================================================
// MATCH RESULT
// ============================================================================

/// Accepted match with the numbers that justified it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientMatch<'a> {
    pub client: &'a Client,

    /// Levenshtein distance between the normalized names
    pub distance: usize,

    /// Largest distance that would have been accepted
    pub threshold: usize,
}

// ============================================================================
// CLIENT MATCHER
// ============================================================================

#[derive(Debug, Clone)]
pub struct ClientMatcher {
    /// Accepted distance as a percentage of the candidate length (default: 30)
    pub threshold_percent: usize,
}

impl ClientMatcher {
    /// Create matcher with the default 30% threshold
    pub fn new() -> Self {
        ClientMatcher {
            threshold_percent: DEFAULT_THRESHOLD_PERCENT,
        }
    }

    pub fn with_threshold_percent(threshold_percent: usize) -> Result<Self> {
        validate_threshold_percent(threshold_percent, "client")?;
        Ok(ClientMatcher { threshold_percent })
    }

    /// Find the client a free-text name most likely refers to
    ///
    /// Returns `None` for a blank name, an empty client list, or when the
    /// closest client is further away than the threshold.
    pub fn find_match<'a>(&self, candidate_name: &str, clients: &'a [Client]) -> Option<&'a Client> {
        self.find_match_scored(candidate_name, clients)
            .map(|m| m.client)
    }

    /// Same as `find_match`, but keeps the distance and threshold
    pub fn find_match_scored<'a>(
        &self,
        candidate_name: &str,
        clients: &'a [Client],
    ) -> Option<ClientMatch<'a>> {
        if candidate_name.trim().is_empty() || clients.is_empty() {
            return None;
        }

        let normalized_candidate = normalize_company_name(candidate_name);

        // Strictly smaller replaces best: ties keep the earliest client
        let mut best: Option<(&'a Client, usize)> = None;
        for client in clients {
            let distance =
                levenshtein_distance(&normalized_candidate, &normalize_company_name(&client.name));

            match best {
                Some((_, best_distance)) if distance >= best_distance => {}
                _ => best = Some((client, distance)),
            }
        }

        let (client, distance) = best?;
        let threshold = acceptance_threshold(
            normalized_candidate.chars().count(),
            self.threshold_percent,
        );

        if distance > threshold {
            debug!(
                candidate = candidate_name,
                closest = %client.name,
                distance,
                threshold,
                "No client match"
            );
            return None;
        }

        debug!(
            candidate = candidate_name,
            client_id = %client.id,
            distance,
            threshold,
            "Client matched"
        );

        Some(ClientMatch {
            client,
            distance,
            threshold,
        })
    }
}

impl Default for ClientMatcher {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
