use ndarray::{NdFloat, ScalarOperand};

use num_traits::{FromPrimitive, NumCast, Signed};

use std::iter::Sum;
use std::str::FromStr;

// Include submodules
mod common;
mod distance;

// Re-export types from submodules
pub use common::{DataPoint, DistanceRecord};
pub use distance::{Distance, L1Dist, L2Dist, LInfDist, LpDist};

pub trait Float:
    NdFloat
    + FromPrimitive
    + Default
    + Signed
    + Sum
    + FromStr
    + ScalarOperand
    + std::marker::Unpin
{
    fn cast<T: NumCast>(x: T) -> Option<Self> {
        NumCast::from(x)
    }
}

impl Float for f32 {}

impl Float for f64 {}
