//! Endpoint Routing
//!
//! Maps each remote operation to its HTTP method and path.

use crate::error::{IndraError, Result};
use reqwest::{Method, Url};
use std::fmt;
use std::str::FromStr;

/// A remote endpoint of the Indra service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Relatedness,
    RelatednessOneToMany,
    Vectors,
    NeighborsRelatedness,
    NeighborsVectors,
    Version,
    Resources,
    ResourceInfo(String),
}

impl Endpoint {
    /// Path relative to the base URL, with a leading slash
    pub fn path(&self) -> String {
        match self {
            Endpoint::Relatedness => "/relatedness".to_string(),
            Endpoint::RelatednessOneToMany => "/relatedness/otm".to_string(),
            Endpoint::Vectors => "/vectors".to_string(),
            Endpoint::NeighborsRelatedness => "/neighbors/relatedness".to_string(),
            Endpoint::NeighborsVectors => "/neighbors/vectors".to_string(),
            Endpoint::Version => "/info/version".to_string(),
            Endpoint::Resources => "/info/resources".to_string(),
            Endpoint::ResourceInfo(resource) => format!("/info/resources/{}", resource),
        }
    }

    /// `GET` for the info endpoints, `POST` for everything else
    pub fn method(&self) -> Method {
        match self {
            Endpoint::Version | Endpoint::Resources | Endpoint::ResourceInfo(_) => Method::GET,
            _ => Method::POST,
        }
    }

    fn segments(&self) -> Vec<&str> {
        match self {
            Endpoint::Relatedness => vec!["relatedness"],
            Endpoint::RelatednessOneToMany => vec!["relatedness", "otm"],
            Endpoint::Vectors => vec!["vectors"],
            Endpoint::NeighborsRelatedness => vec!["neighbors", "relatedness"],
            Endpoint::NeighborsVectors => vec!["neighbors", "vectors"],
            Endpoint::Version => vec!["info", "version"],
            Endpoint::Resources => vec!["info", "resources"],
            Endpoint::ResourceInfo(resource) => vec!["info", "resources", resource.as_str()],
        }
    }

    /// Full URL for a base URL such as `http://localhost:8916`. A resource
    /// name is percent-encoded as a single path segment.
    pub fn url(&self, base_url: &str) -> Result<Url> {
        let mut url = Url::parse(base_url).map_err(|e| {
            IndraError::Config(format!("Invalid base URL '{}': {}", base_url, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| IndraError::Config(format!("Invalid base URL '{}'", base_url)))?
            .pop_if_empty()
            .extend(self.segments());
        Ok(url)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method(), self.path())
    }
}

/// Which nearest-neighbor endpoint to query
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum NeighborsType {
    /// Neighbors ranked by the configured score function
    Relatedness,

    /// Neighbors in vector space
    #[default]
    Vectors,
}

impl NeighborsType {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            NeighborsType::Relatedness => Endpoint::NeighborsRelatedness,
            NeighborsType::Vectors => Endpoint::NeighborsVectors,
        }
    }

    /// Only the relatedness endpoint takes a score function
    pub fn uses_score_function(&self) -> bool {
        matches!(self, NeighborsType::Relatedness)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NeighborsType::Relatedness => "RELATEDNESS",
            NeighborsType::Vectors => "VECTORS",
        }
    }
}

impl FromStr for NeighborsType {
    type Err = IndraError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "RELATEDNESS" => Ok(NeighborsType::Relatedness),
            "VECTORS" => Ok(NeighborsType::Vectors),
            _ => Err(IndraError::InvalidArgument(format!(
                "'{}' is not a valid neighbors type, expected RELATEDNESS or VECTORS",
                s
            ))),
        }
    }
}

impl fmt::Display for NeighborsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
