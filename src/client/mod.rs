//! Client Module
//!
//! HTTP transport used by the Indra client.

pub mod http;

pub use http::HttpClient;
