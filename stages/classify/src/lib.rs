use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::info;
use ndarray::Array1;

// These are the core components from our shared library.
use knnflow_helpers::{DataPoint, Distance, DistanceRecord, Float};

/// Errors that can occur while loading data or running the map stage.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifyError {
    /// A line could not be parsed into a feature vector (empty, wrong token
    /// count, or a token that is not a finite number).
    MalformedRecord(String),
    /// The test vector's arity does not match the training set's arity.
    ArityMismatch { expected: usize, found: usize },
    /// The training set contains no records.
    EmptyTrainingSet,
    /// A computed distance was NaN or infinite.
    InvalidDistance,
    /// An I/O failure while reading input.
    Io(String),
}

impl Display for ClassifyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ClassifyError::MalformedRecord(reason) => {
                write!(f, "Malformed record: {}", reason)
            }
            ClassifyError::ArityMismatch { expected, found } => write!(
                f,
                "Feature arity mismatch: training set has {} features, record has {}",
                expected, found
            ),
            ClassifyError::EmptyTrainingSet => write!(f, "The training set is empty"),
            ClassifyError::InvalidDistance => {
                write!(f, "Distance computation produced a non-finite value")
            }
            ClassifyError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl Error for ClassifyError {}

fn parse_token<F: Float>(token: &str, line_no: usize) -> Result<F, ClassifyError> {
    let value: F = token.parse().map_err(|_| {
        ClassifyError::MalformedRecord(format!("line {}: non-numeric token `{}`", line_no, token))
    })?;
    if !value.is_finite() {
        return Err(ClassifyError::MalformedRecord(format!(
            "line {}: non-finite value `{}`",
            line_no, token
        )));
    }
    Ok(value)
}

/// Parses a test line: every whitespace-separated token is a feature.
///
/// `line_no` is a 1-based line number used only in error messages.
pub fn parse_test_line<F: Float>(line: &str, line_no: usize) -> Result<Array1<F>, ClassifyError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.is_empty() {
        return Err(ClassifyError::MalformedRecord(format!(
            "line {}: empty line",
            line_no
        )));
    }
    let features = tokens
        .iter()
        .map(|t| parse_token(t, line_no))
        .collect::<Result<Vec<F>, _>>()?;
    Ok(Array1::from_vec(features))
}

/// Parses a training line: the trailing token is the label, everything
/// before it is the feature vector.
pub fn parse_training_line<F: Float>(
    line: &str,
    line_no: usize,
) -> Result<DataPoint<String, F>, ClassifyError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 2 {
        return Err(ClassifyError::MalformedRecord(format!(
            "line {}: expected at least one feature and a label, got {} token(s)",
            line_no,
            tokens.len()
        )));
    }
    let (label, features) = tokens.split_last().ok_or_else(|| {
        ClassifyError::MalformedRecord(format!("line {}: empty line", line_no))
    })?;
    let features = features
        .iter()
        .map(|t| parse_token(t, line_no))
        .collect::<Result<Vec<F>, _>>()?;
    Ok(DataPoint::new(Array1::from_vec(features), label.to_string()))
}

/// The labeled reference data, loaded once and shared read-only across all
/// map invocations on a worker.
///
/// Loading validates that every record has the same feature arity and that
/// the set is non-empty, so downstream stages never see a schema error.
#[derive(Debug, Clone)]
pub struct TrainingSet<F: Float> {
    points: Vec<DataPoint<String, F>>,
    arity: usize,
}

impl<F: Float> TrainingSet<F> {
    /// Builds a training set from already-parsed points, validating arity.
    pub fn from_points(points: Vec<DataPoint<String, F>>) -> Result<Self, ClassifyError> {
        let arity = match points.first() {
            Some(dp) => dp.features.len(),
            None => return Err(ClassifyError::EmptyTrainingSet),
        };
        for dp in &points {
            if dp.features.len() != arity {
                return Err(ClassifyError::ArityMismatch {
                    expected: arity,
                    found: dp.features.len(),
                });
            }
        }
        Ok(TrainingSet { points, arity })
    }

    /// Reads and parses the whole training file. Blank lines are ignored;
    /// any malformed line aborts the load.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, ClassifyError> {
        let mut points = Vec::new();
        let mut arity = None;
        for (idx, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| ClassifyError::Io(e.to_string()))?;
            if line.trim().is_empty() {
                continue;
            }
            let line_no = idx + 1;
            let dp = parse_training_line(&line, line_no)?;
            match arity {
                None => arity = Some(dp.features.len()),
                Some(expected) if expected != dp.features.len() => {
                    return Err(ClassifyError::ArityMismatch {
                        expected,
                        found: dp.features.len(),
                    });
                }
                Some(_) => {}
            }
            points.push(dp);
        }
        let set = Self::from_points(points)?;
        info!(
            "loaded training set: {} records, {} features",
            set.len(),
            set.arity()
        );
        Ok(set)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ClassifyError> {
        let file = File::open(path.as_ref()).map_err(|e| {
            ClassifyError::Io(format!("{}: {}", path.as_ref().display(), e))
        })?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false: construction rejects an empty set.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DataPoint<String, F>> {
        self.points.iter()
    }
}

/// The map stage: turns one test line into one `DistanceRecord` per
/// training record.
///
/// The caller keys the returned batch by the verbatim test line, so all
/// emissions for the same test record regroup at one reducer. The training
/// set is held in memory and reused across invocations rather than re-read
/// per record.
#[derive(Debug, Clone)]
pub struct Classify<F, D>
where
    F: Float,
    D: Distance<F>,
{
    training: TrainingSet<F>,
    distance: D,
}

impl<F, D> Classify<F, D>
where
    F: Float,
    D: Distance<F>,
{
    pub fn new(training: TrainingSet<F>, distance: D) -> Self {
        Classify { training, distance }
    }

    pub fn training(&self) -> &TrainingSet<F> {
        &self.training
    }

    /// Maps one test line to its distance records, in training-set order.
    ///
    /// Emits exactly `training.len()` records on success. A malformed line
    /// or an arity mismatch fails the whole record with a typed error;
    /// nothing is emitted for a failed record.
    pub fn map_line(
        &self,
        line: &str,
        line_no: usize,
    ) -> Result<Vec<DistanceRecord<String, F>>, ClassifyError> {
        let features = parse_test_line(line, line_no)?;
        if features.len() != self.training.arity() {
            return Err(ClassifyError::ArityMismatch {
                expected: self.training.arity(),
                found: features.len(),
            });
        }
        let mut records = Vec::with_capacity(self.training.len());
        for dp in self.training.iter() {
            let dist = self.distance.distance(dp.features.view(), features.view());
            if !dist.is_finite() {
                return Err(ClassifyError::InvalidDistance);
            }
            records.push(DistanceRecord::new(dist, dp.label.clone()));
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use knnflow_helpers::L2Dist;
    use ndarray::array;

    fn small_training_set() -> TrainingSet<f64> {
        TrainingSet::from_reader("0 0 A\n10 10 B\n1 1 A\n9 9 B\n".as_bytes()).unwrap()
    }

    #[test]
    fn test_parse_test_line_keeps_all_tokens() {
        let features: Array1<f64> = parse_test_line("0.5 1.5 2.5", 1).unwrap();
        assert_eq!(features, array![0.5, 1.5, 2.5]);
    }

    #[test]
    fn test_parse_test_line_rejects_non_numeric() {
        let result = parse_test_line::<f64>("0.5 oops 2.5", 3);
        match result {
            Err(ClassifyError::MalformedRecord(reason)) => {
                assert!(reason.contains("line 3"));
                assert!(reason.contains("oops"));
            }
            other => panic!("expected MalformedRecord, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_test_line_rejects_non_finite() {
        assert!(matches!(
            parse_test_line::<f64>("1.0 NaN", 1),
            Err(ClassifyError::MalformedRecord(_))
        ));
        assert!(matches!(
            parse_test_line::<f64>("1.0 inf", 1),
            Err(ClassifyError::MalformedRecord(_))
        ));
    }

    #[test]
    fn test_parse_training_line_splits_trailing_label() {
        let dp: DataPoint<String, f64> = parse_training_line("1 2 3 spam", 1).unwrap();
        assert_eq!(dp.features, array![1.0, 2.0, 3.0]);
        assert_eq!(dp.label, "spam");
    }

    #[test]
    fn test_parse_training_line_needs_features_and_label() {
        assert!(matches!(
            parse_training_line::<f64>("lonely", 1),
            Err(ClassifyError::MalformedRecord(_))
        ));
    }

    #[test]
    fn test_training_set_rejects_empty_input() {
        assert!(matches!(
            TrainingSet::<f64>::from_reader("".as_bytes()),
            Err(ClassifyError::EmptyTrainingSet)
        ));
    }

    #[test]
    fn test_training_set_rejects_mixed_arity() {
        let result = TrainingSet::<f64>::from_reader("1 2 A\n1 2 3 B\n".as_bytes());
        assert!(matches!(
            result,
            Err(ClassifyError::ArityMismatch {
                expected: 2,
                found: 3
            })
        ));
    }

    #[test]
    fn test_training_set_skips_blank_lines() {
        let set = TrainingSet::<f64>::from_reader("1 2 A\n\n  \n3 4 B\n".as_bytes()).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.arity(), 2);
    }

    #[test]
    fn test_map_line_emits_one_record_per_training_point() {
        let classify = Classify::new(small_training_set(), L2Dist);
        let records = classify.map_line("0.5 0.5", 1).unwrap();
        assert_eq!(records.len(), 4);
        // Training-set order is preserved.
        assert_eq!(records[0].label, "A");
        assert_eq!(records[1].label, "B");
        assert_abs_diff_eq!(records[0].distance, 0.5_f64.hypot(0.5), epsilon = 1e-12);
    }

    #[test]
    fn test_map_line_rejects_arity_mismatch() {
        let classify = Classify::new(small_training_set(), L2Dist);
        assert_eq!(
            classify.map_line("0.5 0.5 0.5", 1),
            Err(ClassifyError::ArityMismatch {
                expected: 2,
                found: 3
            })
        );
    }

    #[test]
    fn test_map_line_fails_malformed_record_without_emitting() {
        let classify = Classify::new(small_training_set(), L2Dist);
        assert!(matches!(
            classify.map_line("0.5 banana", 7),
            Err(ClassifyError::MalformedRecord(_))
        ));
    }
}
