//! Client Settings
//!
//! Connection settings, default request parameters and the options mapping
//! accepted by `configure`.

use crate::error::{IndraError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Default service port
pub const DEFAULT_PORT: u16 = 8916;

/// Default host used when none is configured
pub const DEFAULT_HOST: &str = "http://localhost";

/// Default language code
pub const DEFAULT_LANGUAGE: &str = "en";

/// Default corpus name
pub const DEFAULT_CORPUS: &str = "googlenews300neg";

/// Default model name
pub const DEFAULT_MODEL: &str = "w2v";

/// Headers sent with every request
pub const DEFAULT_HEADERS: [(&str, &str); 3] = [
    ("accept", "application/json"),
    ("content-type", "application/json"),
    ("cache-control", "no-cache"),
];

/// Request body fields that `configure` must not set as extra keys
pub const RESERVED_KEYS: [&str; 14] = [
    "corpus",
    "model",
    "language",
    "mt",
    "termComposition",
    "translationComposition",
    "preprocessing",
    "scoreFunction",
    "pairs",
    "terms",
    "one",
    "many",
    "topk",
    "filter",
];

/// Scoring functions understood by the service
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum ScoreFunction {
    #[default]
    #[serde(rename = "COSINE")]
    Cosine,
    #[serde(rename = "ALPHASKEW")]
    AlphaSkew,
    #[serde(rename = "CHEBYSHEV")]
    Chebyshev,
    #[serde(rename = "CITYBLOCK")]
    CityBlock,
    #[serde(rename = "DICE")]
    Dice,
    #[serde(rename = "EUCLIDEAN")]
    Euclidean,
    #[serde(rename = "JACCARD")]
    Jaccard,
    #[serde(rename = "JACCARD2")]
    Jaccard2,
    #[serde(rename = "JENSENSHANNON")]
    JensenShannon,
}

impl ScoreFunction {
    /// Every score function, in declaration order
    pub const ALL: [ScoreFunction; 9] = [
        ScoreFunction::Cosine,
        ScoreFunction::AlphaSkew,
        ScoreFunction::Chebyshev,
        ScoreFunction::CityBlock,
        ScoreFunction::Dice,
        ScoreFunction::Euclidean,
        ScoreFunction::Jaccard,
        ScoreFunction::Jaccard2,
        ScoreFunction::JensenShannon,
    ];

    /// Name used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreFunction::Cosine => "COSINE",
            ScoreFunction::AlphaSkew => "ALPHASKEW",
            ScoreFunction::Chebyshev => "CHEBYSHEV",
            ScoreFunction::CityBlock => "CITYBLOCK",
            ScoreFunction::Dice => "DICE",
            ScoreFunction::Euclidean => "EUCLIDEAN",
            ScoreFunction::Jaccard => "JACCARD",
            ScoreFunction::Jaccard2 => "JACCARD2",
            ScoreFunction::JensenShannon => "JENSENSHANNON",
        }
    }
}

impl FromStr for ScoreFunction {
    type Err = IndraError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                IndraError::InvalidArgument(format!("'{}' is not a valid score function", s))
            })
    }
}

impl TryFrom<String> for ScoreFunction {
    type Error = IndraError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl fmt::Display for ScoreFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default parameters merged into every request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Defaults {
    /// Corpus the model was trained on
    pub corpus: String,

    /// Model name (e.g. "w2v", "glove", "esa")
    pub model: String,

    /// Language code of the terms
    pub language: String,

    /// Use machine translation for cross-language requests
    pub mt: bool,

    /// Strategy used to compose multi-word terms
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term_composition: Option<String>,

    /// Strategy used to compose translated terms
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation_composition: Option<String>,

    /// Preprocessing options, only sent when not empty
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub preprocessing: Map<String, Value>,

    /// Keys set through `configure` that have no dedicated field
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            corpus: DEFAULT_CORPUS.to_string(),
            model: DEFAULT_MODEL.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            mt: false,
            term_composition: None,
            translation_composition: None,
            preprocessing: Map::new(),
            extra: Map::new(),
        }
    }
}

/// Connection settings and request defaults for a client
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Scheme and host, e.g. "http://localhost"
    pub host: String,

    /// Service port
    pub port: u16,

    /// Parameters merged into every request
    pub defaults: Defaults,

    /// Score function sent with relatedness requests
    pub score_function: ScoreFunction,
}

impl ClientConfig {
    /// Create a configuration for a host, with every other setting defaulted
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    /// Set the port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the language
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.defaults.language = language.into();
        self
    }

    /// Set the corpus
    pub fn with_corpus(mut self, corpus: impl Into<String>) -> Self {
        self.defaults.corpus = corpus.into();
        self
    }

    /// Set the model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.defaults.model = model.into();
        self
    }

    /// Set the term composition strategy
    pub fn with_term_composition(mut self, composition: impl Into<String>) -> Self {
        self.defaults.term_composition = Some(composition.into());
        self
    }

    /// Set the translation composition strategy
    pub fn with_translation_composition(mut self, composition: impl Into<String>) -> Self {
        self.defaults.translation_composition = Some(composition.into());
        self
    }

    /// Enable or disable machine translation
    pub fn with_mt(mut self, mt: bool) -> Self {
        self.defaults.mt = mt;
        self
    }

    /// Set the score function
    pub fn with_score_function(mut self, score_function: ScoreFunction) -> Self {
        self.score_function = score_function;
        self
    }

    /// Replace the preprocessing options
    pub fn with_preprocessing(mut self, preprocessing: Map<String, Value>) -> Self {
        self.defaults.preprocessing = preprocessing;
        self
    }

    /// Base URL every endpoint path is appended to
    pub fn base_url(&self) -> String {
        format!("{}:{}", self.host.trim_end_matches('/'), self.port)
    }

    /// Headers sent with every request
    pub fn headers(&self) -> &'static [(&'static str, &'static str)] {
        &DEFAULT_HEADERS
    }

    /// Merge options into the stored defaults.
    ///
    /// Top-level keys replace the stored value. `preprocessing` entries are
    /// merged one by one into the existing preprocessing options. Extra keys
    /// that name a request field are rejected and nothing is changed.
    pub fn apply(&mut self, options: ClientOptions) -> Result<()> {
        if let Some(key) = options
            .extra
            .keys()
            .find(|key| RESERVED_KEYS.contains(&key.as_str()))
        {
            return Err(IndraError::InvalidArgument(format!(
                "'{}' is a request field and cannot be set through configure",
                key
            )));
        }

        let ClientOptions {
            corpus,
            model,
            language,
            mt,
            term_composition,
            translation_composition,
            score_function,
            preprocessing,
            extra,
        } = options;

        if let Some(corpus) = corpus {
            self.defaults.corpus = corpus;
        }
        if let Some(model) = model {
            self.defaults.model = model;
        }
        if let Some(language) = language {
            self.defaults.language = language;
        }
        if let Some(mt) = mt {
            self.defaults.mt = mt;
        }
        if let Some(term_composition) = term_composition {
            self.defaults.term_composition = term_composition;
        }
        if let Some(translation_composition) = translation_composition {
            self.defaults.translation_composition = translation_composition;
        }
        if let Some(score_function) = score_function {
            self.score_function = score_function;
        }
        if let Some(preprocessing) = preprocessing {
            self.defaults.preprocessing.extend(preprocessing);
        }
        self.defaults.extra.extend(extra);
        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            defaults: Defaults::default(),
            score_function: ScoreFunction::default(),
        }
    }
}

/// Options mapping accepted by `configure`. Absent keys leave the stored
/// value untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientOptions {
    pub corpus: Option<String>,
    pub model: Option<String>,
    pub language: Option<String>,
    pub mt: Option<bool>,

    /// `Some(None)` (an explicit `null`) clears the stored strategy
    #[serde(default, deserialize_with = "explicit_null")]
    pub term_composition: Option<Option<String>>,

    /// `Some(None)` (an explicit `null`) clears the stored strategy
    #[serde(default, deserialize_with = "explicit_null")]
    pub translation_composition: Option<Option<String>>,

    pub score_function: Option<ScoreFunction>,
    pub preprocessing: Option<Map<String, Value>>,

    /// Any other key, sent as-is with every request
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ClientOptions {
    /// Create an empty options mapping
    pub fn new() -> Self {
        Self::default()
    }

    pub fn corpus(mut self, corpus: impl Into<String>) -> Self {
        self.corpus = Some(corpus.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn mt(mut self, mt: bool) -> Self {
        self.mt = Some(mt);
        self
    }

    pub fn term_composition(mut self, composition: impl Into<String>) -> Self {
        self.term_composition = Some(Some(composition.into()));
        self
    }

    pub fn clear_term_composition(mut self) -> Self {
        self.term_composition = Some(None);
        self
    }

    pub fn translation_composition(mut self, composition: impl Into<String>) -> Self {
        self.translation_composition = Some(Some(composition.into()));
        self
    }

    pub fn clear_translation_composition(mut self) -> Self {
        self.translation_composition = Some(None);
        self
    }

    pub fn score_function(mut self, score_function: ScoreFunction) -> Self {
        self.score_function = Some(score_function);
        self
    }

    /// Add a single preprocessing option
    pub fn preprocessing(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.preprocessing
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    /// Add a key with no dedicated field
    pub fn extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Tell a present `null` apart from an absent key
fn explicit_null<'de, D>(deserializer: D) -> std::result::Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl TryFrom<Value> for ClientOptions {
    type Error = IndraError;

    fn try_from(value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(IndraError::InvalidArgument(
                "configuration options must be a JSON object".to_string(),
            ));
        }
        serde_json::from_value(value)
            .map_err(|e| IndraError::InvalidArgument(format!("Invalid configuration options: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url(), "http://localhost:8916");
        assert_eq!(config.defaults.language, "en");
        assert_eq!(config.defaults.corpus, "googlenews300neg");
        assert_eq!(config.defaults.model, "w2v");
        assert!(!config.defaults.mt);
        assert_eq!(config.score_function, ScoreFunction::Cosine);
    }

    #[test]
    fn test_builder_and_base_url() {
        let config = ClientConfig::new("http://indra.example.org/")
            .with_port(9000)
            .with_language("pt")
            .with_corpus("wiki-2018")
            .with_model("glove")
            .with_mt(true)
            .with_score_function(ScoreFunction::JensenShannon);

        assert_eq!(config.base_url(), "http://indra.example.org:9000");
        assert_eq!(config.defaults.language, "pt");
        assert_eq!(config.defaults.corpus, "wiki-2018");
        assert_eq!(config.defaults.model, "glove");
        assert!(config.defaults.mt);
        assert_eq!(config.score_function, ScoreFunction::JensenShannon);
    }

    #[test]
    fn test_compositions_omitted_when_absent() {
        let value = serde_json::to_value(Defaults::default()).unwrap();
        let obj = value.as_object().unwrap();
        assert!(!obj.contains_key("termComposition"));
        assert!(!obj.contains_key("translationComposition"));
        assert!(!obj.contains_key("preprocessing"));
        assert_eq!(
            value,
            json!({"corpus": "googlenews300neg", "model": "w2v", "language": "en", "mt": false})
        );
    }

    #[test]
    fn test_compositions_serialized_when_set() {
        let config = ClientConfig::default()
            .with_term_composition("SUM")
            .with_translation_composition("AVERAGE");
        let value = serde_json::to_value(&config.defaults).unwrap();
        assert_eq!(value["termComposition"], "SUM");
        assert_eq!(value["translationComposition"], "AVERAGE");
    }

    #[test]
    fn test_score_function_parse() {
        assert_eq!("COSINE".parse::<ScoreFunction>().unwrap(), ScoreFunction::Cosine);
        assert_eq!(
            "jensenshannon".parse::<ScoreFunction>().unwrap(),
            ScoreFunction::JensenShannon
        );
        assert!("MANHATTAN".parse::<ScoreFunction>().is_err());
        assert_eq!(serde_json::to_value(ScoreFunction::AlphaSkew).unwrap(), "ALPHASKEW");
        assert_eq!(ScoreFunction::Jaccard2.to_string(), "JACCARD2");
    }

    #[test]
    fn test_configure_merges_preprocessing() {
        let mut config = ClientConfig::default();
        config
            .apply(ClientOptions::try_from(json!({"preprocessing": {"k": "v"}})).unwrap())
            .unwrap();
        config
            .apply(ClientOptions::try_from(json!({"preprocessing": {"k2": "v2"}})).unwrap())
            .unwrap();

        assert_eq!(config.defaults.preprocessing.get("k"), Some(&json!("v")));
        assert_eq!(config.defaults.preprocessing.get("k2"), Some(&json!("v2")));
    }

    #[test]
    fn test_configure_replaces_top_level_keys() {
        let mut config = ClientConfig::default().with_term_composition("SUM");
        let options = ClientOptions::try_from(json!({
            "corpus": "wiki-2018",
            "mt": true,
            "scoreFunction": "DICE",
            "applyStemmer": 1
        }))
        .unwrap();
        config.apply(options).unwrap();

        assert_eq!(config.defaults.corpus, "wiki-2018");
        assert!(config.defaults.mt);
        assert_eq!(config.score_function, ScoreFunction::Dice);
        assert_eq!(config.defaults.term_composition.as_deref(), Some("SUM"));
        assert_eq!(config.defaults.extra.get("applyStemmer"), Some(&json!(1)));
        assert_eq!(config.defaults.model, "w2v");
    }

    #[test]
    fn test_options_reject_unknown_score_function() {
        let err = ClientOptions::try_from(json!({"scoreFunction": "NOPE"})).unwrap_err();
        assert!(matches!(err, IndraError::InvalidArgument(_)));
        assert!(ClientOptions::try_from(json!(["corpus"])).is_err());
    }

    #[test]
    fn test_configure_rejects_request_fields() {
        let mut config = ClientConfig::default();
        let options = ClientOptions::try_from(json!({
            "corpus": "wiki-2018",
            "pairs": [{"t1": "x", "t2": "y"}],
            "terms": ["zzz"]
        }))
        .unwrap();

        let err = config.apply(options).unwrap_err();
        assert!(matches!(err, IndraError::InvalidArgument(_)));
        assert_eq!(config, ClientConfig::default());

        for key in ["one", "many", "topk", "filter"] {
            let err = config
                .apply(ClientOptions::new().extra(key, 1))
                .unwrap_err();
            assert!(err.message().contains(key));
        }
        assert!(config.apply(ClientOptions::new().extra("corpus", "x")).is_err());
        assert!(config.defaults.extra.is_empty());

        let payload = crate::api::RequestPayload::terms(&config, "dog");
        let body = serde_json::to_string(&payload).unwrap();
        assert_eq!(body.matches("\"terms\"").count(), 1);
        assert!(!body.contains("\"pairs\""));
    }

    #[test]
    fn test_configure_clears_compositions_on_null() {
        let mut config = ClientConfig::default()
            .with_term_composition("SUM")
            .with_translation_composition("AVERAGE");

        config
            .apply(ClientOptions::try_from(json!({"model": "glove"})).unwrap())
            .unwrap();
        assert_eq!(config.defaults.term_composition.as_deref(), Some("SUM"));

        config
            .apply(ClientOptions::try_from(json!({"termComposition": null})).unwrap())
            .unwrap();
        assert_eq!(config.defaults.term_composition, None);
        assert_eq!(config.defaults.translation_composition.as_deref(), Some("AVERAGE"));

        config
            .apply(ClientOptions::new().clear_translation_composition())
            .unwrap();
        assert_eq!(config.defaults.translation_composition, None);

        let value = serde_json::to_value(&config.defaults).unwrap();
        assert!(value.get("termComposition").is_none());
        assert!(value.get("translationComposition").is_none());
    }
}
