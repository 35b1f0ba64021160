#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod cluster;
pub mod labels;
pub mod network_policy;

pub use self::{
    cluster::{ClusterManifest, NamespaceManifest, PodManifest, PolicyManifest},
    labels::{DuplicateLabel, Labels, Selector},
    network_policy::{NetworkPolicy, PolicyType},
};
