//! Read-only queries over the matrices computed by [`kano_index::Reachability`].
//!
//! Every check returns indices in ascending order. None of them modify their inputs, and for
//! well-formed matrices only [`isolated_from`] can fail.

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod error;
mod isolation;
mod reach;
mod shadow;
mod tenant;

pub use self::{
    error::VerifyError,
    isolation::isolated_from,
    reach::{all_isolated, all_reachable, at_most, reachability_check, ISOLATION_THRESHOLD},
    shadow::{shadowed_policies, shadows},
    tenant::group_cross_check,
};
