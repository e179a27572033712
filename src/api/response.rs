//! Response Types
//!
//! The parts of the service's JSON responses the client unwraps.

use crate::error::{IndraError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `info/version`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionResponse {
    pub version: String,
}

/// A scored pair returned by the relatedness endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPair {
    pub t1: String,
    pub t2: String,
    pub score: f64,
}

/// Body of `relatedness`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelatednessResponse {
    pub pairs: Vec<ScoredPair>,
}

impl RelatednessResponse {
    /// Score of the first pair
    pub fn first_score(&self) -> Result<f64> {
        self.pairs
            .first()
            .map(|p| p.score)
            .ok_or_else(|| IndraError::missing_field("pairs[0].score"))
    }
}

/// Body of `vectors`, `neighbors/vectors` and `neighbors/relatedness`.
/// The shape of `terms` depends on the model (dense or sparse vectors,
/// neighbor lists) so it is kept as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermsResponse {
    pub terms: Value,
}

/// Result of a relatedness call dispatched from its arguments
#[derive(Debug, Clone, PartialEq)]
pub enum Relatedness {
    /// Score of a single pair
    Score(f64),

    /// Scores of each requested pair, in server order
    Pairs(Vec<ScoredPair>),

    /// Full one-to-many response body
    OneToMany(Value),
}

/// Decode a response body into one of the types above
pub fn decode<T: DeserializeOwned>(body: Value) -> Result<T> {
    serde_json::from_value(body)
        .map_err(|e| IndraError::Response(format!("Unexpected service response: {}", e)))
}
