//! API Module
//!
//! Request payloads and response types of the Indra service.

pub mod request;
pub mod response;

pub use request::{
    NeighborsParams, OneOrMany, RelatednessArgs, RelatednessQuery, RequestPayload, RequestShape,
    TermPair,
};
pub use response::{
    Relatedness, RelatednessResponse, ScoredPair, TermsResponse, VersionResponse,
};
