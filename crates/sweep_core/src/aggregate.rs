use tracing::warn;

use crate::collect::ShardOutcome;
use crate::error::DatabaseError;
use crate::row::RowSet;

/// A shard whose collection failed, kept for operator reporting.
#[derive(Debug, Clone)]
pub struct ShardFailure {
    pub shard: String,
    pub error: DatabaseError,
}

/// Cross-shard results keyed by shard name, plus the failures observed
/// while collecting.
///
/// Entries keep the order of the outcome set they were folded from, which
/// the dispatcher guarantees is discovery order, so rendering is
/// deterministic. Failed shards never appear among the results, but they
/// are never lost either: the failure list carries them so the caller can
/// report "M of N shards failed".
#[derive(Debug, Clone, Default)]
pub struct AggregatedResult {
    results: Vec<(String, RowSet)>,
    failures: Vec<ShardFailure>,
}

impl AggregatedResult {
    /// Fold the dispatcher's complete outcome set. The fold is
    /// order-independent over outcomes: each lands exactly once, either
    /// in the result map or in the failure list.
    pub fn from_outcomes(outcomes: Vec<ShardOutcome>) -> Self {
        let mut agg = AggregatedResult::default();
        for outcome in outcomes {
            match outcome {
                ShardOutcome::Success { shard, rows } => agg.insert(shard, rows),
                ShardOutcome::Failure { shard, error } => {
                    agg.failures.push(ShardFailure { shard, error })
                }
            }
        }
        agg
    }

    fn insert(&mut self, shard: String, rows: RowSet) {
        if let Some(slot) = self.results.iter_mut().find(|(name, _)| *name == shard) {
            // Shard names come from a database listing and cannot repeat;
            // seeing one twice means discovery is broken. Last write wins,
            // loudly.
            warn!(shard = %shard, "duplicate shard in outcome set, overwriting");
            slot.1 = rows;
        } else {
            self.results.push((shard, rows));
        }
    }

    pub fn get(&self, shard: &str) -> Option<&RowSet> {
        self.results
            .iter()
            .find(|(name, _)| name == shard)
            .map(|(_, rows)| rows)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RowSet)> {
        self.results
            .iter()
            .map(|(name, rows)| (name.as_str(), rows))
    }

    pub fn shards(&self) -> impl Iterator<Item = &str> {
        self.results.iter().map(|(name, _)| name.as_str())
    }

    /// Number of shards that produced rows.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn failures(&self) -> &[ShardFailure] {
        &self.failures
    }

    pub fn failed_count(&self) -> usize {
        self.failures.len()
    }

    /// Total shards observed: successes plus failures.
    pub fn total_count(&self) -> usize {
        self.results.len() + self.failures.len()
    }
}
