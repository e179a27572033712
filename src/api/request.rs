//! Request Payloads
//!
//! Argument types accepted by the client and the JSON bodies built from them.

use crate::config::{ClientConfig, Defaults, ScoreFunction};
use crate::error::{IndraError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single value or a sequence of values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    /// A bare value, sent as a one-element sequence
    One(T),

    /// A sequence, sent unchanged
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    /// Normalize into a sequence
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

impl From<&str> for OneOrMany<String> {
    fn from(term: &str) -> Self {
        OneOrMany::One(term.to_string())
    }
}

impl From<String> for OneOrMany<String> {
    fn from(term: String) -> Self {
        OneOrMany::One(term)
    }
}

impl From<&String> for OneOrMany<String> {
    fn from(term: &String) -> Self {
        OneOrMany::One(term.clone())
    }
}

impl From<Vec<String>> for OneOrMany<String> {
    fn from(terms: Vec<String>) -> Self {
        OneOrMany::Many(terms)
    }
}

impl From<Vec<&str>> for OneOrMany<String> {
    fn from(terms: Vec<&str>) -> Self {
        OneOrMany::Many(terms.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for OneOrMany<String> {
    fn from(terms: &[&str]) -> Self {
        OneOrMany::Many(terms.iter().map(|t| t.to_string()).collect())
    }
}

impl From<&[String]> for OneOrMany<String> {
    fn from(terms: &[String]) -> Self {
        OneOrMany::Many(terms.to_vec())
    }
}

impl<const N: usize> From<[&str; N]> for OneOrMany<String> {
    fn from(terms: [&str; N]) -> Self {
        OneOrMany::Many(terms.iter().map(|t| t.to_string()).collect())
    }
}

impl<const N: usize> From<&[&str; N]> for OneOrMany<String> {
    fn from(terms: &[&str; N]) -> Self {
        OneOrMany::Many(terms.iter().map(|t| t.to_string()).collect())
    }
}

impl From<TermPair> for OneOrMany<TermPair> {
    fn from(pair: TermPair) -> Self {
        OneOrMany::One(pair)
    }
}

impl From<Vec<TermPair>> for OneOrMany<TermPair> {
    fn from(pairs: Vec<TermPair>) -> Self {
        OneOrMany::Many(pairs)
    }
}

impl From<&[TermPair]> for OneOrMany<TermPair> {
    fn from(pairs: &[TermPair]) -> Self {
        OneOrMany::Many(pairs.to_vec())
    }
}

/// A pair of terms to score
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TermPair {
    pub t1: String,
    pub t2: String,
}

impl TermPair {
    pub fn new(t1: impl Into<String>, t2: impl Into<String>) -> Self {
        Self {
            t1: t1.into(),
            t2: t2.into(),
        }
    }
}

impl<A: Into<String>, B: Into<String>> From<(A, B)> for TermPair {
    fn from((t1, t2): (A, B)) -> Self {
        Self::new(t1, t2)
    }
}

/// The three mutually exclusive request shapes
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RequestShape {
    /// Pairwise relatedness
    Pairs { pairs: Vec<TermPair> },

    /// Vectors and nearest neighbors
    Terms { terms: Vec<String> },

    /// One term against many
    OneToMany { one: String, many: Vec<String> },
}

/// Nearest-neighbor parameters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NeighborsParams {
    pub topk: u64,

    /// Always present on the wire, `null` when unset
    pub filter: Option<Value>,
}

/// JSON body of a single POST request: the client defaults plus the
/// call-specific fields
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestPayload {
    #[serde(flatten)]
    pub defaults: Defaults,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_function: Option<ScoreFunction>,

    #[serde(flatten)]
    pub shape: RequestShape,

    #[serde(flatten)]
    pub neighbors: Option<NeighborsParams>,
}

impl RequestPayload {
    fn from_config(config: &ClientConfig, shape: RequestShape) -> Self {
        Self {
            defaults: config.defaults.clone(),
            score_function: None,
            shape,
            neighbors: None,
        }
    }

    /// Pairwise relatedness payload; carries the score function
    pub fn pairs(config: &ClientConfig, pairs: impl Into<OneOrMany<TermPair>>) -> Self {
        let shape = RequestShape::Pairs {
            pairs: pairs.into().into_vec(),
        };
        Self::from_config(config, shape).with_score_function(config.score_function)
    }

    /// Terms payload, used by vectors and nearest neighbors
    pub fn terms(config: &ClientConfig, terms: impl Into<OneOrMany<String>>) -> Self {
        let shape = RequestShape::Terms {
            terms: terms.into().into_vec(),
        };
        Self::from_config(config, shape)
    }

    /// One-to-many relatedness payload; carries the score function
    pub fn one_to_many(
        config: &ClientConfig,
        one: impl Into<String>,
        many: impl Into<OneOrMany<String>>,
    ) -> Self {
        let shape = RequestShape::OneToMany {
            one: one.into(),
            many: many.into().into_vec(),
        };
        Self::from_config(config, shape).with_score_function(config.score_function)
    }

    pub fn with_score_function(mut self, score_function: ScoreFunction) -> Self {
        self.score_function = Some(score_function);
        self
    }

    pub fn with_neighbors(mut self, topk: u64, filter: Option<Value>) -> Self {
        self.neighbors = Some(NeighborsParams { topk, filter });
        self
    }
}

/// Arguments of a relatedness call where the request shape is picked from
/// whichever arguments are present
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelatednessArgs {
    pub t1: Option<String>,
    pub t2: Option<String>,
    pub pairs: Option<OneOrMany<TermPair>>,
    pub one: Option<String>,
    pub many: Option<OneOrMany<String>>,
}

/// A validated relatedness request
#[derive(Debug, Clone, PartialEq)]
pub enum RelatednessQuery {
    /// Two scalar terms
    Pair(TermPair),

    /// One or more pairs
    Pairs(OneOrMany<TermPair>),

    /// One term against many
    OneToMany {
        one: String,
        many: OneOrMany<String>,
    },
}

impl RelatednessArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn terms(mut self, t1: impl Into<String>, t2: impl Into<String>) -> Self {
        self.t1 = Some(t1.into());
        self.t2 = Some(t2.into());
        self
    }

    pub fn pairs(mut self, pairs: impl Into<OneOrMany<TermPair>>) -> Self {
        self.pairs = Some(pairs.into());
        self
    }

    pub fn one_to_many(
        mut self,
        one: impl Into<String>,
        many: impl Into<OneOrMany<String>>,
    ) -> Self {
        self.one = Some(one.into());
        self.many = Some(many.into());
        self
    }

    /// Pick the request shape. Exactly one of `t1`+`t2`, `pairs` or
    /// `one`+`many` must be given, with nothing else set.
    pub fn into_query(self) -> Result<RelatednessQuery> {
        match self {
            RelatednessArgs {
                t1: Some(t1),
                t2: Some(t2),
                pairs: None,
                one: None,
                many: None,
            } => Ok(RelatednessQuery::Pair(TermPair { t1, t2 })),
            RelatednessArgs {
                t1: None,
                t2: None,
                pairs: Some(pairs),
                one: None,
                many: None,
            } => Ok(RelatednessQuery::Pairs(pairs)),
            RelatednessArgs {
                t1: None,
                t2: None,
                pairs: None,
                one: Some(one),
                many: Some(many),
            } => Ok(RelatednessQuery::OneToMany { one, many }),
            _ => Err(IndraError::InvalidArgument(
                "relatedness expects exactly one of: 't1' and 't2', 'pairs', or 'one' and 'many'"
                    .to_string(),
            )),
        }
    }
}
