//! Router Module
//!
//! Endpoint selection for each client operation.

pub mod endpoint;

pub use endpoint::{Endpoint, NeighborsType};
