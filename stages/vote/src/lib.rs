use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::hash::Hash;

use knnflow_helpers::{DistanceRecord, Float};

/// Errors that can occur in the voting stages.
#[derive(Debug, Clone, PartialEq)]
pub enum VoteError {
    /// The neighbor count k must be at least 1.
    InvalidK,
    /// No candidates were received for a key.
    NoCandidates,
}

impl Display for VoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            VoteError::InvalidK => write!(f, "Neighbor count k must be at least 1"),
            VoteError::NoCandidates => {
                write!(f, "No candidates available to vote on for this key")
            }
        }
    }
}

impl Error for VoteError {}

/// The outcome of a majority vote for one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tally<L> {
    /// The winning label.
    pub label: L,
    /// How many of the consulted neighbors carried the winning label.
    pub votes: usize,
    /// How many neighbors were actually consulted. Less than k when the
    /// group had fewer than k candidates.
    pub neighbors: usize,
}

/// The combine and reduce stages of the pipeline: top-k selection over
/// candidate neighbors, then majority voting.
///
/// `partial` is the worker-local combine step and may run over any subset
/// of a key's group (or not at all); `finalize` runs once per key over the
/// globally complete group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Voter {
    k: usize,
}

impl Voter {
    /// Creates a voter consulting `k` nearest neighbors.
    ///
    /// # Errors
    ///
    /// Returns `VoteError::InvalidK` if `k` is 0.
    pub fn new(k: usize) -> Result<Self, VoteError> {
        if k == 0 {
            return Err(VoteError::InvalidK);
        }
        Ok(Voter { k })
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// Combine step: keeps the k smallest-distance records of the subset.
    ///
    /// Pruning-safe: for any partition of a group into subsets, the global
    /// top-k is contained in the union of the per-subset top-k's, so a
    /// record that could win globally is never discarded here. Subsets with
    /// fewer than k records are passed through whole.
    pub fn partial<L, F>(&self, mut records: Vec<DistanceRecord<L, F>>) -> Vec<DistanceRecord<L, F>>
    where
        L: Clone + Eq + Hash + Ord + Debug,
        F: Float,
    {
        records.sort_unstable_by(DistanceRecord::order);
        records.truncate(self.k);
        records
    }

    /// Reduce step: selects the global top-k and majority-votes the label.
    ///
    /// Ties are resolved deterministically: candidates are ordered by
    /// distance then label, and among labels with equal vote counts the
    /// lexicographically smallest wins. If fewer than k candidates survive,
    /// the vote is taken over all of them and `Tally::neighbors` records
    /// the shortfall.
    ///
    /// # Errors
    ///
    /// Returns `VoteError::NoCandidates` if `records` is empty.
    pub fn finalize<L, F>(
        &self,
        mut records: Vec<DistanceRecord<L, F>>,
    ) -> Result<Tally<L>, VoteError>
    where
        L: Clone + Eq + Hash + Ord + Debug,
        F: Float,
    {
        if records.is_empty() {
            return Err(VoteError::NoCandidates);
        }
        records.sort_unstable_by(DistanceRecord::order);
        records.truncate(self.k);
        let neighbors = records.len();

        let mut counts: HashMap<&L, usize> = HashMap::new();
        for record in &records {
            *counts.entry(&record.label).or_insert(0) += 1;
        }

        // Explicit label order makes the winner independent of map
        // iteration order.
        let mut pairs: Vec<(&L, usize)> = counts.into_iter().collect();
        pairs.sort_unstable_by(|a, b| a.0.cmp(b.0));

        let mut winner = &pairs[0];
        for pair in &pairs[1..] {
            if pair.1 > winner.1 {
                winner = pair;
            }
        }

        Ok(Tally {
            label: winner.0.clone(),
            votes: winner.1,
            neighbors,
        })
    }
}
