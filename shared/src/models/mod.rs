//! Domain models for the Climate Zone Engine

mod agriculture;
mod climate;
mod result;
mod terrain;
mod vote;
mod weather;
mod zone;

pub use agriculture::*;
pub use climate::*;
pub use result::*;
pub use terrain::*;
pub use vote::*;
pub use weather::*;
pub use zone::*;
