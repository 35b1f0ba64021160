#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    #[error("pod index {index} is out of range for {pods} pods")]
    PodOutOfRange { index: usize, pods: usize },
}
