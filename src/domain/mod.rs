//! Domain layer for the suggestion engine
//!
//! Core models, the error taxonomy and the ports external collaborators
//! plug into.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{EngineError, EngineResult};
