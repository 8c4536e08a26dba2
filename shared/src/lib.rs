//! Shared types for the Climate Zone Engine
//!
//! Pure value types and validation shared by the detectors, the consensus
//! engine and any downstream consumer of a resolved climate zone.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
