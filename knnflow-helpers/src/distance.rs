use crate::Float;
use ndarray::ArrayView1;
use std::fmt::Debug;

/// A distance metric between two feature vectors of equal length.
///
/// Implementations may provide a cheaper "reduced distance" (`rdistance`)
/// that preserves the ordering of the true distance — for example the
/// squared Euclidean distance — which callers can use whenever only relative
/// comparisons matter.
pub trait Distance<F: Float>: Clone + Send + Sync + Debug {
    /// The true distance between `a` and `b`. Non-negative, and zero when
    /// the vectors are identical.
    fn distance(&self, a: ArrayView1<F>, b: ArrayView1<F>) -> F;

    /// A monotone surrogate of `distance`, cheaper to compute where the
    /// metric allows it. Defaults to the true distance.
    fn rdistance(&self, a: ArrayView1<F>, b: ArrayView1<F>) -> F {
        self.distance(a, b)
    }

    /// Converts a reduced distance back to the true distance.
    fn rdistance_to_distance(&self, rdist: F) -> F {
        rdist
    }

    /// Converts a true distance to its reduced form.
    fn distance_to_rdistance(&self, dist: F) -> F {
        dist
    }
}

/// Manhattan (L1) distance: the sum of absolute per-coordinate differences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct L1Dist;

impl<F: Float> Distance<F> for L1Dist {
    fn distance(&self, a: ArrayView1<F>, b: ArrayView1<F>) -> F {
        a.iter()
            .zip(b.iter())
            .map(|(&x, &y)| (x - y).abs())
            .sum()
    }
}

/// Euclidean (L2) distance. The reduced form is the squared distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct L2Dist;

impl<F: Float> Distance<F> for L2Dist {
    fn distance(&self, a: ArrayView1<F>, b: ArrayView1<F>) -> F {
        self.rdistance(a, b).sqrt()
    }

    fn rdistance(&self, a: ArrayView1<F>, b: ArrayView1<F>) -> F {
        a.iter()
            .zip(b.iter())
            .map(|(&x, &y)| (x - y) * (x - y))
            .sum()
    }

    fn rdistance_to_distance(&self, rdist: F) -> F {
        rdist.sqrt()
    }

    fn distance_to_rdistance(&self, dist: F) -> F {
        dist * dist
    }
}

/// Chebyshev (L-infinity) distance: the largest absolute per-coordinate
/// difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LInfDist;

impl<F: Float> Distance<F> for LInfDist {
    fn distance(&self, a: ArrayView1<F>, b: ArrayView1<F>) -> F {
        a.iter()
            .zip(b.iter())
            .map(|(&x, &y)| (x - y).abs())
            .fold(F::zero(), F::max)
    }
}

/// Minkowski (Lp) distance for an arbitrary exponent `p >= 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LpDist<F: Float>(pub F);

impl<F: Float> Distance<F> for LpDist<F> {
    fn distance(&self, a: ArrayView1<F>, b: ArrayView1<F>) -> F {
        a.iter()
            .zip(b.iter())
            .map(|(&x, &y)| (x - y).abs().powf(self.0))
            .sum::<F>()
            .powf(F::one() / self.0)
    }
}
