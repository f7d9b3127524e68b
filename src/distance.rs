//! Euclidean distance between points.
//!
//! Every distance in the merge engine (cluster-to-cluster, point-to-mean,
//! spatial index queries) goes through [`euclidean`], so equal coordinates
//! always produce bit-identical distances regardless of which path computed
//! them.

use ndarray::{ArrayBase, Data, Ix1};

/// Euclidean distance between two equal-length vectors.
#[inline]
pub fn euclidean<S1, S2>(a: &ArrayBase<S1, Ix1>, b: &ArrayBase<S2, Ix1>) -> f64
where
    S1: Data<Elem = f64>,
    S2: Data<Elem = f64>,
{
    squared_euclidean(a, b).sqrt()
}

/// Squared Euclidean distance.
#[inline]
pub fn squared_euclidean<S1, S2>(a: &ArrayBase<S1, Ix1>, b: &ArrayBase<S2, Ix1>) -> f64
where
    S1: Data<Elem = f64>,
    S2: Data<Elem = f64>,
{
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    #[test]
    fn test_euclidean_3_4_5() {
        let a = array![0.0, 0.0];
        let b = array![3.0, 4.0];
        assert_eq!(euclidean(&a, &b), 5.0);
        assert_eq!(squared_euclidean(&a, &b), 25.0);
    }

    #[test]
    fn test_euclidean_accepts_views() {
        let m = Array2::from_shape_vec((2, 2), vec![1.0, 1.0, 4.0, 5.0]).unwrap();
        assert_eq!(euclidean(&m.row(0), &m.row(1)), 5.0);
    }

    #[test]
    fn test_euclidean_symmetric() {
        let a = array![0.3, -1.7, 2.2];
        let b = array![5.0, 0.25, -3.5];
        assert_eq!(euclidean(&a, &b), euclidean(&b, &a));
    }
}
