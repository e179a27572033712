//! indra-client - Client for the Indra semantic relatedness service
//!
//! Builds JSON requests from method arguments, sends them to an Indra server
//! and unwraps the relevant part of each response. [`IndraClient`] is async;
//! [`BlockingIndraClient`] drives the same calls to completion on its own
//! runtime.
//!
//! ```no_run
//! use indra_client::{BlockingIndraClient, ClientConfig, NeighborsType};
//!
//! # fn main() -> indra_client::Result<()> {
//! let client = BlockingIndraClient::new(ClientConfig::new("http://localhost"))?;
//! let score = client.relatedness("dog", "cat")?;
//! let neighbors = client.nearest_neighbors("dog", NeighborsType::Vectors, 5, None)?;
//! # Ok(())
//! # }
//! ```

use serde_json::Value;
use std::path::Path;

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod router;

pub use api::{
    OneOrMany, Relatedness, RelatednessArgs, RelatednessQuery, RequestPayload, ScoredPair,
    TermPair,
};
pub use config::{ClientConfig, ClientOptions, ConfigLoader, ScoreFunction};
pub use error::{IndraError, Result};
pub use router::{Endpoint, NeighborsType};

use api::response::{self, RelatednessResponse, TermsResponse, VersionResponse};
use client::HttpClient;

/// The main Indra client
pub struct IndraClient {
    /// Connection settings and request defaults
    config: ClientConfig,

    /// HTTP client
    http_client: HttpClient,
}

impl IndraClient {
    /// Create a client from a configuration
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http_client = HttpClient::new(config.headers())?;
        tracing::debug!(base_url = %config.base_url(), "created indra client");
        Ok(Self {
            config,
            http_client,
        })
    }

    /// Create a client from config files and `INDRA_*` environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        let _ = dotenvy::dotenv();
        Self::new(ConfigLoader::new()?.into_config())
    }

    /// Create a client from a specific config file
    pub fn with_config_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::new(ConfigLoader::from_path(path)?.into_config())
    }

    /// Current configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Merge options into the request defaults. Fails without changing
    /// anything if an extra key names a request field.
    pub fn configure(&mut self, options: ClientOptions) -> Result<()> {
        tracing::debug!(?options, "configuring indra client");
        self.config.apply(options)
    }

    /// Merge an arbitrary JSON options mapping into the request defaults
    pub fn configure_json(&mut self, options: Value) -> Result<()> {
        self.configure(ClientOptions::try_from(options)?)
    }

    /// Send a request to an endpoint. Info endpoints take no payload.
    async fn submit(&self, endpoint: &Endpoint, payload: Option<&RequestPayload>) -> Result<Value> {
        let url = endpoint.url(&self.config.base_url())?;
        self.http_client
            .submit(endpoint.method(), url.as_str(), payload)
            .await
    }

    /// Version of the remote service
    pub async fn service_version(&self) -> Result<String> {
        let body = self.submit(&Endpoint::Version, None).await?;
        Ok(response::decode::<VersionResponse>(body)?.version)
    }

    /// Resources (corpora and models) available on the service
    pub async fn resources(&self) -> Result<Value> {
        self.submit(&Endpoint::Resources, None).await
    }

    /// Details of a single resource
    pub async fn resource_info(&self, resource: &str) -> Result<Value> {
        self.submit(&Endpoint::ResourceInfo(resource.to_string()), None)
            .await
    }

    /// Vectors of one or more terms
    pub async fn vectors(&self, terms: impl Into<OneOrMany<String>>) -> Result<Value> {
        let payload = RequestPayload::terms(&self.config, terms);
        let body = self.submit(&Endpoint::Vectors, Some(&payload)).await?;
        Ok(response::decode::<TermsResponse>(body)?.terms)
    }

    /// Relatedness score of two terms
    pub async fn relatedness(&self, t1: impl Into<String>, t2: impl Into<String>) -> Result<f64> {
        let payload = RequestPayload::pairs(&self.config, TermPair::new(t1, t2));
        let body = self.submit(&Endpoint::Relatedness, Some(&payload)).await?;
        response::decode::<RelatednessResponse>(body)?.first_score()
    }

    /// Relatedness of each pair, in the order the service returns them
    pub async fn relatedness_pairs(
        &self,
        pairs: impl Into<OneOrMany<TermPair>>,
    ) -> Result<Vec<ScoredPair>> {
        let payload = RequestPayload::pairs(&self.config, pairs);
        let body = self.submit(&Endpoint::Relatedness, Some(&payload)).await?;
        Ok(response::decode::<RelatednessResponse>(body)?.pairs)
    }

    /// Relatedness of one term against many. Returns the full response body.
    pub async fn relatedness_one_to_many(
        &self,
        one: impl Into<String>,
        many: impl Into<OneOrMany<String>>,
    ) -> Result<Value> {
        let payload = RequestPayload::one_to_many(&self.config, one, many);
        self.submit(&Endpoint::RelatednessOneToMany, Some(&payload))
            .await
    }

    /// Relatedness call whose shape is picked from the arguments present.
    /// Any combination other than `t1`+`t2`, `pairs` or `one`+`many` fails.
    pub async fn relatedness_query(&self, args: RelatednessArgs) -> Result<Relatedness> {
        match args.into_query()? {
            RelatednessQuery::Pair(pair) => self
                .relatedness(pair.t1, pair.t2)
                .await
                .map(Relatedness::Score),
            RelatednessQuery::Pairs(pairs) => self
                .relatedness_pairs(pairs)
                .await
                .map(Relatedness::Pairs),
            RelatednessQuery::OneToMany { one, many } => self
                .relatedness_one_to_many(one, many)
                .await
                .map(Relatedness::OneToMany),
        }
    }

    /// Nearest neighbors of one or more terms. `topk` must be positive.
    pub async fn nearest_neighbors(
        &self,
        terms: impl Into<OneOrMany<String>>,
        neighbors_type: NeighborsType,
        topk: i64,
        filter: Option<Value>,
    ) -> Result<Value> {
        let topk = validate_topk(topk)?;

        let mut payload = RequestPayload::terms(&self.config, terms).with_neighbors(topk, filter);
        if neighbors_type.uses_score_function() {
            payload = payload.with_score_function(self.config.score_function);
        }

        let body = self
            .submit(&neighbors_type.endpoint(), Some(&payload))
            .await?;
        Ok(response::decode::<TermsResponse>(body)?.terms)
    }
}

fn validate_topk(topk: i64) -> Result<u64> {
    u64::try_from(topk)
        .ok()
        .filter(|&k| k > 0)
        .ok_or_else(|| {
            IndraError::InvalidArgument(format!(
                "'topk' must be an integer higher than 0, got {}",
                topk
            ))
        })
}

// =============================================================================
// Blocking Client
// =============================================================================

/// Synchronous wrapper around [`IndraClient`]. Each call blocks the current
/// thread until the response arrives. Must not be used from inside an async
/// runtime.
pub struct BlockingIndraClient {
    inner: IndraClient,
    runtime: tokio::runtime::Runtime,
}

impl BlockingIndraClient {
    /// Create a client from a configuration
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::from_async(IndraClient::new(config)?)
    }

    /// Create a client from config files and `INDRA_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_async(IndraClient::from_env()?)
    }

    /// Create a client from a specific config file
    pub fn with_config_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_async(IndraClient::with_config_path(path)?)
    }

    fn from_async(inner: IndraClient) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| IndraError::Request(format!("Failed to create runtime: {}", e)))?;

        Ok(Self { inner, runtime })
    }

    pub fn config(&self) -> &ClientConfig {
        self.inner.config()
    }

    pub fn configure(&mut self, options: ClientOptions) -> Result<()> {
        self.inner.configure(options)
    }

    pub fn configure_json(&mut self, options: Value) -> Result<()> {
        self.inner.configure_json(options)
    }

    pub fn service_version(&self) -> Result<String> {
        self.runtime.block_on(self.inner.service_version())
    }

    pub fn resources(&self) -> Result<Value> {
        self.runtime.block_on(self.inner.resources())
    }

    pub fn resource_info(&self, resource: &str) -> Result<Value> {
        self.runtime.block_on(self.inner.resource_info(resource))
    }

    pub fn vectors(&self, terms: impl Into<OneOrMany<String>>) -> Result<Value> {
        self.runtime.block_on(self.inner.vectors(terms))
    }

    pub fn relatedness(&self, t1: impl Into<String>, t2: impl Into<String>) -> Result<f64> {
        self.runtime.block_on(self.inner.relatedness(t1, t2))
    }

    pub fn relatedness_pairs(
        &self,
        pairs: impl Into<OneOrMany<TermPair>>,
    ) -> Result<Vec<ScoredPair>> {
        self.runtime.block_on(self.inner.relatedness_pairs(pairs))
    }

    pub fn relatedness_one_to_many(
        &self,
        one: impl Into<String>,
        many: impl Into<OneOrMany<String>>,
    ) -> Result<Value> {
        self.runtime
            .block_on(self.inner.relatedness_one_to_many(one, many))
    }

    pub fn relatedness_query(&self, args: RelatednessArgs) -> Result<Relatedness> {
        self.runtime.block_on(self.inner.relatedness_query(args))
    }

    pub fn nearest_neighbors(
        &self,
        terms: impl Into<OneOrMany<String>>,
        neighbors_type: NeighborsType,
        topk: i64,
        filter: Option<Value>,
    ) -> Result<Value> {
        self.runtime.block_on(
            self.inner
                .nearest_neighbors(terms, neighbors_type, topk, filter),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server, ServerGuard};
    use serde_json::json;

    fn config_for(server: &ServerGuard) -> ClientConfig {
        ClientConfig::new("http://127.0.0.1").with_port(server.socket_address().port())
    }

    #[test]
    fn test_validate_topk() {
        assert_eq!(validate_topk(5).unwrap(), 5);
        assert!(matches!(validate_topk(0), Err(IndraError::InvalidArgument(_))));
        assert!(matches!(validate_topk(-1), Err(IndraError::InvalidArgument(_))));
    }

    #[test]
    fn test_configure_json_merges_preprocessing() {
        let mut client = IndraClient::new(ClientConfig::default()).unwrap();
        client
            .configure_json(json!({"preprocessing": {"k": "v"}}))
            .unwrap();
        client
            .configure_json(json!({"preprocessing": {"k2": "v2"}}))
            .unwrap();

        let preprocessing = &client.config().defaults.preprocessing;
        assert_eq!(preprocessing.get("k"), Some(&json!("v")));
        assert_eq!(preprocessing.get("k2"), Some(&json!("v2")));
    }

    #[tokio::test]
    async fn test_service_version() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/info/version")
            .with_status(200)
            .with_body(r#"{"version": "1.0.2"}"#)
            .create_async()
            .await;

        let client = IndraClient::new(config_for(&server)).unwrap();
        assert_eq!(client.service_version().await.unwrap(), "1.0.2");
    }

    #[tokio::test]
    async fn test_relatedness_single_pair() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/relatedness")
            .match_body(Matcher::PartialJson(json!({
                "scoreFunction": "COSINE",
                "pairs": [{"t1": "dog", "t2": "cat"}]
            })))
            .with_status(200)
            .with_body(r#"{"pairs": [{"t1": "dog", "t2": "cat", "score": 0.76}]}"#)
            .create_async()
            .await;

        let client = IndraClient::new(config_for(&server)).unwrap();
        assert_eq!(client.relatedness("dog", "cat").await.unwrap(), 0.76);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_relatedness_query_one_to_many() {
        let mut server = Server::new_async().await;
        let body = json!({"one": "dog", "many": [{"t": "cat", "score": 0.7}]});
        let mock = server
            .mock("POST", "/relatedness/otm")
            .match_body(Matcher::PartialJson(json!({
                "scoreFunction": "COSINE",
                "one": "dog",
                "many": ["cat"]
            })))
            .with_status(200)
            .with_body(body.to_string())
            .create_async()
            .await;

        let client = IndraClient::new(config_for(&server)).unwrap();
        let result = client
            .relatedness_query(RelatednessArgs::new().one_to_many("dog", "cat"))
            .await
            .unwrap();

        assert_eq!(result, Relatedness::OneToMany(body));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_relatedness_query_rejects_mixed_arguments() {
        let client = IndraClient::new(ClientConfig::default()).unwrap();
        let args = RelatednessArgs::new()
            .terms("dog", "cat")
            .pairs(TermPair::new("a", "b"));

        let err = client.relatedness_query(args).await.unwrap_err();
        assert!(matches!(err, IndraError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_nearest_neighbors_relatedness_sends_score_function() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/neighbors/relatedness")
            .match_body(Matcher::PartialJson(json!({
                "terms": ["dog"],
                "topk": 3,
                "filter": null,
                "scoreFunction": "COSINE"
            })))
            .with_status(200)
            .with_body(r#"{"terms": {"dog": ["puppy", "cat", "pet"]}}"#)
            .create_async()
            .await;

        let client = IndraClient::new(config_for(&server)).unwrap();
        let terms = client
            .nearest_neighbors("dog", NeighborsType::Relatedness, 3, None)
            .await
            .unwrap();

        assert_eq!(terms["dog"], json!(["puppy", "cat", "pet"]));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_nearest_neighbors_rejects_topk_before_request() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let client = IndraClient::new(config_for(&server)).unwrap();
        for topk in [0, -1] {
            let err = client
                .nearest_neighbors("dog", NeighborsType::Vectors, topk, None)
                .await
                .unwrap_err();
            assert!(matches!(err, IndraError::InvalidArgument(_)));
        }
        mock.assert_async().await;
    }

    #[test]
    fn test_blocking_client() {
        let mut server = Server::new();
        let _m = server
            .mock("POST", "/vectors")
            .match_body(Matcher::PartialJson(json!({"terms": ["dog", "cat"]})))
            .with_status(200)
            .with_body(r#"{"terms": {"dog": [0.1], "cat": [0.2]}}"#)
            .create();

        let client = BlockingIndraClient::new(config_for(&server)).unwrap();
        let vectors = client.vectors(vec!["dog", "cat"]).unwrap();
        assert_eq!(vectors["cat"], json!([0.2]));
    }
}
