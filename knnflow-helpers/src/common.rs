use crate::Float;
use ndarray::Array1;
use std::cmp::Ordering;
use std::fmt::{Debug, Display, Formatter};

/// Represents a single data point with features and a label.
///
/// L: The type of the label (e.g., String, i32, enum).
/// F: The float type for the features (e.g., f32, f64).
#[derive(Debug, Clone)]
#[cfg_attr(
    feature = "serde",
    derive(serde_crate::Serialize, serde_crate::Deserialize),
    serde(crate = "serde_crate")
)]
pub struct DataPoint<L, F>
where
    L: Clone + Eq + std::hash::Hash + Debug,
    F: Float,
{
    pub features: Array1<F>,
    pub label: L,
}

impl<L, F> DataPoint<L, F>
where
    L: Clone + Eq + std::hash::Hash + Debug,
    F: Float,
{
    pub fn new(features: Array1<F>, label: L) -> Self {
        DataPoint { features, label }
    }
}

/// One candidate neighbor: the distance from a test point to a training
/// point, together with the training point's label.
///
/// This is the value shuttled between the map, combine and reduce stages of
/// the classification pipeline. Its `Display` form is `"<distance>,<label>"`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde_crate::Serialize, serde_crate::Deserialize),
    serde(crate = "serde_crate")
)]
pub struct DistanceRecord<L, F>
where
    L: Clone + Eq + std::hash::Hash + Debug,
    F: Float,
{
    pub distance: F,
    pub label: L,
}

impl<L, F> DistanceRecord<L, F>
where
    L: Clone + Eq + std::hash::Hash + Debug,
    F: Float,
{
    pub fn new(distance: F, label: L) -> Self {
        DistanceRecord { distance, label }
    }
}

impl<L, F> DistanceRecord<L, F>
where
    L: Clone + Eq + std::hash::Hash + Ord + Debug,
    F: Float,
{
    /// Total order over candidate neighbors: ascending by distance, then
    /// ascending by label.
    ///
    /// The label is the deterministic secondary key for equidistant
    /// candidates, so sorted candidate lists are reproducible across runs.
    /// Non-finite distances are rejected by the map stage before records are
    /// built, which keeps the `partial_cmp` fallback unreachable.
    pub fn order(&self, other: &Self) -> Ordering {
        self.distance
            .partial_cmp(&other.distance)
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.label.cmp(&other.label))
    }
}

impl<L, F> Display for DistanceRecord<L, F>
where
    L: Clone + Eq + std::hash::Hash + Debug + Display,
    F: Float,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.distance, self.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_distance_record_orders_by_distance() {
        let near = DistanceRecord::new(1.0, "B");
        let far = DistanceRecord::new(2.0, "A");
        assert_eq!(near.order(&far), Ordering::Less);
        assert_eq!(far.order(&near), Ordering::Greater);
    }

    #[test]
    fn test_distance_record_breaks_ties_by_label() {
        let a = DistanceRecord::new(1.5, "A");
        let b = DistanceRecord::new(1.5, "B");
        assert_eq!(a.order(&b), Ordering::Less);
        assert_eq!(a.order(&a.clone()), Ordering::Equal);
    }

    #[test]
    fn test_distance_record_display() {
        let rec = DistanceRecord::new(2.5, "spam".to_string());
        assert_eq!(rec.to_string(), "2.5,spam");
    }

    #[test]
    fn test_data_point_construction() {
        let dp = DataPoint::new(array![1.0, 2.0], "A");
        assert_eq!(dp.features.len(), 2);
        assert_eq!(dp.label, "A");
    }
}
