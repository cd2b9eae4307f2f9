//! SQLite recorder for generation summaries.

use crate::analysis::{GenerationSummary, ReactionNorm};
use crate::errors::DatabaseError;
use crate::simulation::{Configuration, ReplicateOutcome};
use crate::storage::{Database, OutputSink, RecordingStrategy};
use rusqlite::params;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// Counters kept while recording.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecorderStats {
    /// Summaries written, final ones included.
    pub generations_recorded: usize,
    /// Summaries the strategy skipped.
    pub generations_skipped: usize,
    pub outcomes_recorded: usize,
}

/// Sink that writes every recorded summary to a SQLite database.
///
/// Each summary is written in its own transaction so that a crashed run
/// leaves every finished generation readable.
#[derive(Debug)]
pub struct Recorder {
    db: Database,
    strategy: RecordingStrategy,
    replicate: usize,
    stats: RecorderStats,
}

impl Recorder {
    /// Create the database at `path` and store the run configuration.
    pub fn new(
        path: impl AsRef<Path>,
        config: &Configuration,
        strategy: RecordingStrategy,
    ) -> Result<Self, DatabaseError> {
        let db = Database::open(path)?;
        let mut recorder = Self {
            db,
            strategy,
            replicate: 0,
            stats: RecorderStats::default(),
        };

        let config_json = serde_json::to_string(config)
            .map_err(|e| DatabaseError::Serialization(e.to_string()))?;
        let created_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let exec = &config.execution;

        let meta_pairs = [
            ("population_size", exec.population_size.to_string()),
            ("generations", exec.generations.to_string()),
            ("lifetime", exec.lifetime.to_string()),
            ("regime", exec.regime.to_string()),
            (
                "seed",
                exec.seed
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "None".to_string()),
            ),
            ("patches", config.n_patches().to_string()),
            ("recording_strategy", recorder.strategy.to_string()),
            ("full_config_json", config_json),
            ("created_at", created_at.to_string()),
        ];
        for (key, value) in meta_pairs {
            recorder.set_metadata(key, &value)?;
        }
        Ok(recorder)
    }

    /// Store or overwrite a metadata entry.
    pub fn set_metadata(&mut self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.db
            .connection()
            .execute(
                "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
                params![key, value],
            )
            .map_err(|e| DatabaseError::Insert(e.to_string()))?;
        Ok(())
    }

    pub fn strategy(&self) -> &RecordingStrategy {
        &self.strategy
    }

    pub fn stats(&self) -> RecorderStats {
        self.stats
    }

    /// Replicate the following records are filed under.
    pub fn current_replicate(&self) -> usize {
        self.replicate
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Close the underlying database.
    pub fn close(self) -> Result<RecorderStats, DatabaseError> {
        let stats = self.stats;
        self.db.close()?;
        Ok(stats)
    }
}

impl OutputSink for Recorder {
    fn begin_replicate(&mut self, replicate: usize) -> Result<(), DatabaseError> {
        self.replicate = replicate;
        let tx = self.db.transaction()?;
        for table in ["gene_stats", "occupancy", "reaction_norms", "outcomes"] {
            tx.execute(
                &format!("DELETE FROM {table} WHERE replicate = ?1"),
                params![replicate as i64],
            )
            .map_err(|e| DatabaseError::Transaction(e.to_string()))?;
        }
        tx.commit()
            .map_err(|e| DatabaseError::Transaction(e.to_string()))
    }

    fn record_generation(&mut self, summary: &GenerationSummary) -> Result<(), DatabaseError> {
        if !summary.is_final && !self.strategy.should_record(summary.generation) {
            self.stats.generations_skipped += 1;
            return Ok(());
        }

        let replicate = self.replicate as i64;
        let generation = summary.generation as i64;
        let tx = self.db.transaction()?;
        {
            let mut stmt_genes = tx
                .prepare_cached(
                    "INSERT OR REPLACE INTO gene_stats
                    (replicate, generation, is_final, patch, gene, mean, std)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                )
                .map_err(|e| DatabaseError::Insert(e.to_string()))?;
            let mut stmt_occupancy = tx
                .prepare_cached(
                    "INSERT OR REPLACE INTO occupancy
                    (replicate, generation, is_final, patch, name, time, count)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                )
                .map_err(|e| DatabaseError::Insert(e.to_string()))?;

            for patch in &summary.patches {
                let index = patch.patch as i64;
                stmt_occupancy
                    .execute(params![
                        replicate,
                        generation,
                        summary.is_final,
                        index,
                        patch.name,
                        summary.time as i64,
                        patch.occupancy as i64
                    ])
                    .map_err(|e| DatabaseError::Insert(e.to_string()))?;

                for (gene, mean, std) in patch.genes() {
                    stmt_genes
                        .execute(params![
                            replicate,
                            generation,
                            summary.is_final,
                            index,
                            gene.name(),
                            mean,
                            std
                        ])
                        .map_err(|e| DatabaseError::Insert(e.to_string()))?;
                }
            }
        }
        tx.commit()
            .map_err(|e| DatabaseError::Transaction(e.to_string()))?;

        self.stats.generations_recorded += 1;
        debug!(
            replicate = self.replicate,
            generation = summary.generation,
            is_final = summary.is_final,
            "Recorded generation"
        );
        Ok(())
    }

    fn record_reaction_norm(&mut self, norm: &ReactionNorm) -> Result<(), DatabaseError> {
        self.db
            .connection()
            .execute(
                "INSERT OR REPLACE INTO reaction_norms (replicate, generation, i0, b, i0p, bp)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    self.replicate as i64,
                    norm.generation as i64,
                    norm.i0,
                    norm.b,
                    norm.i0p,
                    norm.bp
                ],
            )
            .map_err(|e| DatabaseError::Insert(e.to_string()))?;
        Ok(())
    }

    fn record_outcome(&mut self, outcome: &ReplicateOutcome) -> Result<(), DatabaseError> {
        self.db
            .connection()
            .execute(
                "INSERT OR REPLACE INTO outcomes (replicate, status, generation, attempts)
                VALUES (?1, ?2, ?3, ?4)",
                params![
                    self.replicate as i64,
                    outcome.status(),
                    outcome.generation() as i64,
                    outcome.attempts() as i64
                ],
            )
            .map_err(|e| DatabaseError::Insert(e.to_string()))?;
        self.stats.outcomes_recorded += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), DatabaseError> {
        self.db.checkpoint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::PatchSummary;
    use crate::genome::Gene;
    use tempfile::tempdir;

    fn summary(generation: usize, is_final: bool) -> GenerationSummary {
        let mut patch = PatchSummary::empty(0, "moderate");
        patch.occupancy = 12;
        patch.means[Gene::I0.index()] = 0.25;
        patch.std_devs[Gene::I0.index()] = 0.1;
        GenerationSummary {
            generation,
            time: 5 * generation as u64,
            is_final,
            patches: vec![patch, PatchSummary::empty(1, "warm")],
        }
    }

    fn count(recorder: &Recorder, table: &str) -> i64 {
        recorder
            .database()
            .connection()
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))
            .unwrap()
    }

    #[test]
    fn test_recorder_writes_metadata() {
        let dir = tempdir().unwrap();
        let recorder = Recorder::new(
            dir.path().join("meta.sqlite"),
            &Configuration::default(),
            RecordingStrategy::All,
        )
        .unwrap();
        let value: String = recorder
            .database()
            .connection()
            .query_row(
                "SELECT value FROM metadata WHERE key = 'population_size'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(value, "5000");
        recorder.close().unwrap();
    }

    #[test]
    fn test_recorder_flow() {
        let dir = tempdir().unwrap();
        let mut recorder = Recorder::new(
            dir.path().join("flow.sqlite"),
            &Configuration::default(),
            RecordingStrategy::All,
        )
        .unwrap();

        recorder.record_generation(&summary(0, false)).unwrap();
        recorder.record_generation(&summary(1, false)).unwrap();
        recorder.record_generation(&summary(1, true)).unwrap();

        // Three summaries of two patches with nine genes each
        assert_eq!(count(&recorder, "gene_stats"), 3 * 2 * 9);
        assert_eq!(count(&recorder, "occupancy"), 3 * 2);
        assert_eq!(recorder.stats().generations_recorded, 3);

        recorder.finish().unwrap();
        recorder.close().unwrap();
    }

    #[test]
    fn test_strategy_skips_but_keeps_final() {
        let dir = tempdir().unwrap();
        let mut recorder = Recorder::new(
            dir.path().join("sparse.sqlite"),
            &Configuration::default(),
            RecordingStrategy::EveryN(2),
        )
        .unwrap();

        for generation in 0..5 {
            recorder.record_generation(&summary(generation, false)).unwrap();
        }
        recorder.record_generation(&summary(5, true)).unwrap();

        let stats = recorder.stats();
        assert_eq!(stats.generations_recorded, 4);
        assert_eq!(stats.generations_skipped, 2);
        assert_eq!(count(&recorder, "occupancy"), 4 * 2);
    }

    #[test]
    fn test_restarting_replicate_discards_rows() {
        let dir = tempdir().unwrap();
        let mut recorder = Recorder::new(
            dir.path().join("retry.sqlite"),
            &Configuration::default(),
            RecordingStrategy::All,
        )
        .unwrap();

        recorder.begin_replicate(0).unwrap();
        recorder.record_generation(&summary(0, false)).unwrap();
        recorder.begin_replicate(1).unwrap();
        recorder.record_generation(&summary(0, false)).unwrap();
        recorder.record_generation(&summary(1, false)).unwrap();
        recorder.begin_replicate(1).unwrap();

        assert_eq!(recorder.current_replicate(), 1);
        assert_eq!(count(&recorder, "occupancy"), 2);
    }
}
