use ndarray::Array1;

use super::vectorizer::SparseVector;

/// Scales a sparse vector to unit L2 norm in place. Zero vectors are left as is.
pub(crate) fn l2_normalize(vector: &mut SparseVector) {
    let norm: f64 = vector.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
    if norm > 1e-12 {
        for (_, v) in vector.iter_mut() {
            *v /= norm;
        }
    }
}

/// Dot product of dense weights with a sparse vector.
pub(crate) fn sparse_dot(weights: &Array1<f64>, x: &SparseVector) -> f64 {
    x.iter().map(|&(i, v)| weights[i] * v).sum()
}

/// Squared L2 norm of a sparse vector.
pub(crate) fn squared_norm(x: &SparseVector) -> f64 {
    x.iter().map(|(_, v)| v * v).sum()
}
