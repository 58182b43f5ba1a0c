use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};

use log::{debug, info, warn};

use knn_classify::{Classify, ClassifyError, TrainingSet};
use knn_vote::{VoteError, Voter};
use knnflow_helpers::{Distance, DistanceRecord, Float, L2Dist};

use crate::config::{ConfigError, JobConfig};

/// Errors surfacing from a pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineError {
    Config(ConfigError),
    Classify(ClassifyError),
    Vote(VoteError),
    Io(String),
}

impl Display for PipelineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineError::Config(e) => write!(f, "Configuration error: {}", e),
            PipelineError::Classify(e) => write!(f, "Classify stage error: {}", e),
            PipelineError::Vote(e) => write!(f, "Vote stage error: {}", e),
            PipelineError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl Error for PipelineError {}

impl From<ConfigError> for PipelineError {
    fn from(e: ConfigError) -> Self {
        PipelineError::Config(e)
    }
}

impl From<ClassifyError> for PipelineError {
    fn from(e: ClassifyError) -> Self {
        PipelineError::Classify(e)
    }
}

impl From<VoteError> for PipelineError {
    fn from(e: VoteError) -> Self {
        PipelineError::Vote(e)
    }
}

/// Counters for one pipeline run. Skipped records are counted here and
/// logged, never silently dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Non-blank test lines read.
    pub tests_seen: usize,
    /// Test lines skipped because they were malformed.
    pub tests_skipped: usize,
    /// Distance records emitted by the map stage.
    pub records_emitted: usize,
    /// Distinct test keys reduced (duplicate test lines share a key).
    pub groups: usize,
}

/// An in-process composition of the three pipeline stages.
///
/// This is a deterministic stand-in for a distributed execution substrate:
/// it maps every test line, groups emissions by the verbatim line (the test
/// key), runs the combine step once per group and the reduce step after
/// that, and writes one `<test line>\t<label>` output line per key, in key
/// order. Running it twice on the same input produces byte-identical
/// output.
///
/// The training set is loaded once and shared read-only across all map
/// invocations, rather than re-read per record.
#[derive(Debug, Clone)]
pub struct Pipeline<F, D>
where
    F: Float,
    D: Distance<F>,
{
    classify: Classify<F, D>,
    voter: Voter,
}

impl Pipeline<f64, L2Dist> {
    /// Builds a Euclidean-distance pipeline from a job configuration,
    /// loading the training set from the configured path.
    pub fn from_config(config: &JobConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        let training = TrainingSet::from_path(&config.train_path)?;
        let voter = Voter::new(config.k)?;
        Ok(Pipeline::new(Classify::new(training, L2Dist), voter))
    }

    /// Runs the job over the configured test and output files.
    pub fn run(&self, config: &JobConfig) -> Result<RunStats, PipelineError> {
        config.validate()?;
        let test = File::open(&config.test_path)
            .map_err(|e| PipelineError::Io(format!("{}: {}", config.test_path.display(), e)))?;
        let out = File::create(&config.output_path)
            .map_err(|e| PipelineError::Io(format!("{}: {}", config.output_path.display(), e)))?;
        self.run_readers(BufReader::new(test), BufWriter::new(out))
    }
}

impl<F, D> Pipeline<F, D>
where
    F: Float,
    D: Distance<F>,
{
    pub fn new(classify: Classify<F, D>, voter: Voter) -> Self {
        Pipeline { classify, voter }
    }

    /// Runs the full map/combine/reduce flow over `test`, writing one
    /// prediction line per test key to `out`.
    ///
    /// A malformed test line is skipped with a diagnostic and counted in
    /// the returned stats. An arity mismatch or I/O failure aborts the run.
    pub fn run_readers<R, W>(&self, test: R, mut out: W) -> Result<RunStats, PipelineError>
    where
        R: BufRead,
        W: Write,
    {
        let mut stats = RunStats::default();
        let mut groups: BTreeMap<String, Vec<DistanceRecord<String, F>>> = BTreeMap::new();

        // Map: one batch of distance records per test line, keyed by the
        // verbatim line. Identical lines merge into one group.
        for (idx, line) in test.lines().enumerate() {
            let line = line.map_err(|e| PipelineError::Io(e.to_string()))?;
            if line.trim().is_empty() {
                continue;
            }
            stats.tests_seen += 1;
            match self.classify.map_line(&line, idx + 1) {
                Ok(records) => {
                    stats.records_emitted += records.len();
                    groups.entry(line).or_default().extend(records);
                }
                Err(ClassifyError::MalformedRecord(reason)) => {
                    stats.tests_skipped += 1;
                    warn!("skipping malformed test record: {}", reason);
                }
                Err(e) => return Err(e.into()),
            }
        }

        // Combine, then reduce, in deterministic key order.
        for (key, records) in groups {
            let survivors = self.voter.partial(records);
            let tally = self.voter.finalize(survivors)?;
            if tally.neighbors < self.voter.k() {
                debug!(
                    "key `{}` voted over {} of {} requested neighbors",
                    key,
                    tally.neighbors,
                    self.voter.k()
                );
            }
            writeln!(out, "{}\t{}", key, tally.label)
                .map_err(|e| PipelineError::Io(e.to_string()))?;
            stats.groups += 1;
        }
        out.flush().map_err(|e| PipelineError::Io(e.to_string()))?;

        info!(
            "run complete: {} test records ({} skipped), {} emissions, {} keys",
            stats.tests_seen, stats.tests_skipped, stats.records_emitted, stats.groups
        );
        Ok(stats)
    }
}
