//! k-nearest-neighbor classification as a map/combine/reduce data-flow.
//!
//! The three stages live in their own crates: `knn-classify` (map: one test
//! record against the whole training set), `knn-vote` (combine: worker-local
//! top-k pruning; reduce: global top-k and majority vote). This crate adds
//! the job configuration and an in-process [`Pipeline`] that composes the
//! stages deterministically for single-machine runs and tests.

pub mod config;
pub mod pipeline;

// Re-export the public surface of the stage crates.
pub use config::{ConfigError, JobConfig, DEFAULT_K};
pub use knn_classify::{
    parse_test_line, parse_training_line, Classify, ClassifyError, TrainingSet,
};
pub use knn_vote::{Tally, VoteError, Voter};
pub use knnflow_helpers::{
    DataPoint, Distance, DistanceRecord, Float, L1Dist, L2Dist, LInfDist, LpDist,
};
pub use pipeline::{Pipeline, PipelineError, RunStats};
