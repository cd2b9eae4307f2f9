//! Destinations for the records a run produces.

use crate::analysis::{GenerationSummary, ReactionNorm};
use crate::errors::DatabaseError;
use crate::simulation::ReplicateOutcome;

/// Receiver of per-generation summaries.
///
/// A single sink can serve several replicates. `begin_replicate` announces
/// which replicate the following records belong to; announcing the same
/// replicate again discards what was recorded for it, which is how a
/// failed attempt is thrown away before a retry. A sink that never sees
/// `begin_replicate` files everything under replicate 0.
pub trait OutputSink {
    /// Start, or restart, a replicate.
    fn begin_replicate(&mut self, _replicate: usize) -> Result<(), DatabaseError> {
        Ok(())
    }

    /// Called once per generation, and once more with `is_final` set after the
    /// last generation of a completed run.
    fn record_generation(&mut self, summary: &GenerationSummary) -> Result<(), DatabaseError>;

    /// Called once per completed run.
    fn record_reaction_norm(&mut self, norm: &ReactionNorm) -> Result<(), DatabaseError>;

    /// Final status of a replicate.
    fn record_outcome(&mut self, _outcome: &ReplicateOutcome) -> Result<(), DatabaseError> {
        Ok(())
    }

    /// Flush anything buffered.
    fn finish(&mut self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

impl<S: OutputSink + ?Sized> OutputSink for &mut S {
    fn begin_replicate(&mut self, replicate: usize) -> Result<(), DatabaseError> {
        (**self).begin_replicate(replicate)
    }

    fn record_generation(&mut self, summary: &GenerationSummary) -> Result<(), DatabaseError> {
        (**self).record_generation(summary)
    }

    fn record_reaction_norm(&mut self, norm: &ReactionNorm) -> Result<(), DatabaseError> {
        (**self).record_reaction_norm(norm)
    }

    fn record_outcome(&mut self, outcome: &ReplicateOutcome) -> Result<(), DatabaseError> {
        (**self).record_outcome(outcome)
    }

    fn finish(&mut self) -> Result<(), DatabaseError> {
        (**self).finish()
    }
}

/// A sink that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl OutputSink for NullSink {
    fn record_generation(&mut self, _summary: &GenerationSummary) -> Result<(), DatabaseError> {
        Ok(())
    }

    fn record_reaction_norm(&mut self, _norm: &ReactionNorm) -> Result<(), DatabaseError> {
        Ok(())
    }
}

/// Everything recorded for one replicate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplicateRecord {
    pub summaries: Vec<GenerationSummary>,
    pub reaction_norm: Option<ReactionNorm>,
    pub outcome: Option<ReplicateOutcome>,
}

impl ReplicateRecord {
    /// The summary flagged as final, if the run completed.
    pub fn final_summary(&self) -> Option<&GenerationSummary> {
        self.summaries.iter().rev().find(|s| s.is_final)
    }

    /// Occupancy of `patch` at every non-final generation.
    pub fn occupancy_series(&self, patch: usize) -> Vec<usize> {
        self.summaries
            .iter()
            .filter(|s| !s.is_final)
            .map(|s| s.patches.get(patch).map_or(0, |p| p.occupancy))
            .collect()
    }
}

/// Keeps every record in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    replicates: Vec<ReplicateRecord>,
    current: usize,
    finished: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replicates(&self) -> &[ReplicateRecord] {
        &self.replicates
    }

    pub fn replicate(&self, replicate: usize) -> Option<&ReplicateRecord> {
        self.replicates.get(replicate)
    }

    /// Summaries of the first replicate.
    pub fn summaries(&self) -> &[GenerationSummary] {
        self.replicates
            .first()
            .map(|r| r.summaries.as_slice())
            .unwrap_or(&[])
    }

    /// Occupancy of `patch` over the non-final generations of the first replicate.
    pub fn occupancy_series(&self, patch: usize) -> Vec<usize> {
        self.replicates
            .first()
            .map(|r| r.occupancy_series(patch))
            .unwrap_or_default()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn current_mut(&mut self) -> &mut ReplicateRecord {
        if self.replicates.len() <= self.current {
            self.replicates
                .resize_with(self.current + 1, ReplicateRecord::default);
        }
        &mut self.replicates[self.current]
    }
}

impl OutputSink for MemorySink {
    fn begin_replicate(&mut self, replicate: usize) -> Result<(), DatabaseError> {
        self.current = replicate;
        *self.current_mut() = ReplicateRecord::default();
        Ok(())
    }

    fn record_generation(&mut self, summary: &GenerationSummary) -> Result<(), DatabaseError> {
        self.current_mut().summaries.push(summary.clone());
        Ok(())
    }

    fn record_reaction_norm(&mut self, norm: &ReactionNorm) -> Result<(), DatabaseError> {
        self.current_mut().reaction_norm = Some(*norm);
        Ok(())
    }

    fn record_outcome(&mut self, outcome: &ReplicateOutcome) -> Result<(), DatabaseError> {
        self.current_mut().outcome = Some(*outcome);
        Ok(())
    }

    fn finish(&mut self) -> Result<(), DatabaseError> {
        self.finished = true;
        Ok(())
    }
}
