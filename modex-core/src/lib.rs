//! modex core - metadata value types and serialization contracts.
//!
//! Pure data structures with no behavior beyond lookup and dict round-trip.
//! The communication crates depend on this; nothing here performs I/O.

pub mod meta;
pub mod serial;

pub use meta::{
    ContinuousRestriction, DataCategory, DataDomain, DataFormat, DataRequirement,
    DiscreteRestriction,
};
pub use serial::{Dict, Serializable};
