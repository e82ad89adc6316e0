//! Domain records for the latch household aggregate
//!
//! Plain value records with structural equality and no behavior beyond
//! derived accessors. All mutation happens through the engine in
//! `latch-core`; everything here is data.

mod model;
mod rules;
mod snapshot;

pub use model::*;
pub use rules::*;
pub use snapshot::*;
