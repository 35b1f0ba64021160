/// Rejected entity-model input.
///
/// Only construction can fail; analysis over a constructed [`crate::Cluster`] is total.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("namespace {0:?} is declared more than once")]
    DuplicateNamespace(String),

    #[error("{kind} {index} has an empty namespace name")]
    EmptyName { kind: &'static str, index: usize },
}
