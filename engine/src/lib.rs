//! Climate Zone Engine
//!
//! Resolves a latitude/longitude to a hardiness zone by running several
//! independent detectors concurrently and reconciling their votes into one
//! confidence-scored, cached result with an agricultural interpretation.

pub mod config;
pub mod error;
pub mod external;
pub mod reference;
pub mod services;

pub use config::Config;
pub use error::{EngineError, EngineResult};
pub use services::{ClimateZoneService, ConsensusEngine, Providers, ResultCache};
