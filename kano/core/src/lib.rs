//! Entity model for label-based reachability analysis.
//!
//! A run is described by three ordered lists: pods, namespaces, and policies. Each entity is
//! identified by its position in its list for the remainder of the pipeline; there is no separate
//! identifier type. Sets of pods (or policies) are represented as [`BitSet`]s over those positions
//! and reachability as square [`BitMatrix`] values.

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod bits;
mod error;
mod model;

pub use self::{
    bits::{BitMatrix, BitSet},
    error::ModelError,
    model::{Cluster, Direction, Namespace, Pod, Policy},
};
pub use kano_api::{labels::Map as LabelMap, Labels};
