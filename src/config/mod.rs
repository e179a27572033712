//! Configuration Module
//!
//! Client settings, request defaults and configuration loading.

pub mod loader;
pub mod settings;

pub use loader::ConfigLoader;
pub use settings::{
    ClientConfig, ClientOptions, Defaults, ScoreFunction, DEFAULT_CORPUS, DEFAULT_HEADERS,
    DEFAULT_HOST, DEFAULT_LANGUAGE, DEFAULT_MODEL, DEFAULT_PORT,
};
