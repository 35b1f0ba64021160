//! Kano reachability index
//!
//! Computes, from a [`Cluster`](kano_core::Cluster), the exact pairwise reachability between pods.
//! The pipeline runs strictly in one direction:
//!
//! ```text
//! [ Pod, Namespace ] -> [ SelectorIndex ] -> [ Resolver ] (per policy) -> [ Composer ] (fold)
//! ```
//!
//! - The [`SelectorIndex`] maps namespace names and label keys to the pods (or namespaces) that
//!   carry them. It is built once per run and never modified.
//! - The [`Resolver`] computes, for a single policy, the set of pods it selects and the set of
//!   peers it allows. Resolution is stateless, so policies may be resolved in any order.
//! - The [`Composer`] folds resolved policies *in input order*. A pod allows all traffic in both
//!   directions until the first policy selects it; from then on, each direction permits only the
//!   union of the allow-sets of the policies selecting it in that direction, plus itself. Because
//!   "first" is defined by input order, the fold is sequential.
//!
//! The final matrices combine both sides: a pod may send to a peer only if its own egress permits
//! the peer and the peer's ingress permits it.

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod compose;
mod group;
mod resolve;
mod selector;

#[cfg(test)]
mod tests;

pub use self::{
    compose::{Composer, Reachability},
    group::GroupIndex,
    resolve::{Resolved, Resolver},
    selector::SelectorIndex,
};
