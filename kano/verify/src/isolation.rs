use crate::VerifyError;
use kano_core::BitMatrix;

/// Returns the pods that `index`'s row does not reach.
///
/// Applied to the egress matrix, these are the pods `index` cannot send to.
pub fn isolated_from(matrix: &BitMatrix, index: usize) -> Result<Vec<usize>, VerifyError> {
    if index >= matrix.rows() {
        return Err(VerifyError::PodOutOfRange {
            index,
            pods: matrix.rows(),
        });
    }

    let mut unreachable = matrix[index].clone();
    unreachable.negate();
    Ok(unreachable.iter_ones().collect())
}
