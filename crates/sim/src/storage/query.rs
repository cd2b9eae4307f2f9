//! Query interface for analyzing recorded simulation data.

use crate::analysis::{GenerationSummary, PatchSummary, ReactionNorm};
use crate::errors::DatabaseError;
use crate::genome::Gene;
use crate::simulation::{Configuration, ReplicateOutcome};
use crate::storage::Database;
use rusqlite::{params, OptionalExtension};
use std::collections::HashMap;

/// Query builder for analyzing simulation data.
pub struct QueryBuilder {
    db: Database,
}

impl QueryBuilder {
    /// Open a database for querying.
    pub fn new(db_path: impl AsRef<std::path::Path>) -> Result<Self, DatabaseError> {
        let db = Database::open(db_path)?;
        Ok(Self { db })
    }

    /// Get raw metadata value by key.
    pub fn get_metadata_value(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let mut stmt = self
            .db
            .connection()
            .prepare("SELECT value FROM metadata WHERE key = ?1")
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        stmt.query_row(params![key], |row| row.get(0))
            .optional()
            .map_err(|e| DatabaseError::Query(e.to_string()))
    }

    /// Get all metadata as a map.
    pub fn get_metadata(&self) -> Result<HashMap<String, String>, DatabaseError> {
        let mut stmt = self
            .db
            .connection()
            .prepare("SELECT key, value FROM metadata")
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        let mut meta = HashMap::new();
        for row in rows {
            let (k, v): (String, String) = row.map_err(|e| DatabaseError::Query(e.to_string()))?;
            meta.insert(k, v);
        }
        Ok(meta)
    }

    /// The configuration the run was started with.
    pub fn get_config(&self) -> Result<Configuration, DatabaseError> {
        let json = self
            .get_metadata_value("full_config_json")?
            .ok_or_else(|| DatabaseError::Query("no configuration recorded".to_string()))?;
        Configuration::from_json(&json).map_err(|e| DatabaseError::Serialization(e.to_string()))
    }

    /// Replicates with any recorded data, ascending.
    pub fn replicates(&self) -> Result<Vec<usize>, DatabaseError> {
        self.usize_column(
            "SELECT replicate FROM occupancy
             UNION SELECT replicate FROM outcomes
             ORDER BY replicate",
            params![],
        )
    }

    /// Non-final generations recorded for `replicate`, ascending.
    pub fn get_recorded_generations(&self, replicate: usize) -> Result<Vec<usize>, DatabaseError> {
        self.usize_column(
            "SELECT DISTINCT generation FROM occupancy
             WHERE replicate = ?1 AND is_final = 0
             ORDER BY generation",
            params![replicate as i64],
        )
    }

    /// Summary of a non-final generation.
    pub fn get_summary(
        &self,
        replicate: usize,
        generation: usize,
    ) -> Result<Option<GenerationSummary>, DatabaseError> {
        self.load_summary(replicate, Some(generation), false)
    }

    /// The summary recorded after the last generation of a completed run.
    pub fn get_final_summary(
        &self,
        replicate: usize,
    ) -> Result<Option<GenerationSummary>, DatabaseError> {
        self.load_summary(replicate, None, true)
    }

    /// Occupancy of `patch` at every recorded non-final generation.
    pub fn get_occupancy_series(
        &self,
        replicate: usize,
        patch: usize,
    ) -> Result<Vec<(usize, usize)>, DatabaseError> {
        let mut stmt = self
            .db
            .connection()
            .prepare(
                "SELECT generation, count FROM occupancy
                 WHERE replicate = ?1 AND patch = ?2 AND is_final = 0
                 ORDER BY generation",
            )
            .map_err(|e| DatabaseError::Query(e.to_string()))?;
        let rows = stmt
            .query_map(params![replicate as i64, patch as i64], |row| {
                Ok((row.get::<_, i64>(0)? as usize, row.get::<_, i64>(1)? as usize))
            })
            .map_err(|e| DatabaseError::Query(e.to_string()))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| DatabaseError::Query(e.to_string()))
    }

    pub fn get_reaction_norm(&self, replicate: usize) -> Result<Option<ReactionNorm>, DatabaseError> {
        self.db
            .connection()
            .query_row(
                "SELECT generation, i0, b, i0p, bp FROM reaction_norms WHERE replicate = ?1",
                params![replicate as i64],
                |row| {
                    Ok(ReactionNorm {
                        generation: row.get::<_, i64>(0)? as usize,
                        i0: row.get(1)?,
                        b: row.get(2)?,
                        i0p: row.get(3)?,
                        bp: row.get(4)?,
                    })
                },
            )
            .optional()
            .map_err(|e| DatabaseError::Query(e.to_string()))
    }

    /// Outcome of every replicate that finished, in replicate order.
    pub fn get_outcomes(&self) -> Result<Vec<(usize, ReplicateOutcome)>, DatabaseError> {
        let mut stmt = self
            .db
            .connection()
            .prepare(
                "SELECT replicate, status, generation, attempts FROM outcomes ORDER BY replicate",
            )
            .map_err(|e| DatabaseError::Query(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)? as usize,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)? as usize,
                    row.get::<_, i64>(3)? as usize,
                ))
            })
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        let mut outcomes = Vec::new();
        for row in rows {
            let (replicate, status, generation, attempts) =
                row.map_err(|e| DatabaseError::Query(e.to_string()))?;
            let outcome = ReplicateOutcome::from_parts(&status, generation, attempts)
                .ok_or_else(|| DatabaseError::Query(format!("unknown outcome status '{status}'")))?;
            outcomes.push((replicate, outcome));
        }
        Ok(outcomes)
    }

    fn usize_column(
        &self,
        sql: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<usize>, DatabaseError> {
        let mut stmt = self
            .db
            .connection()
            .prepare(sql)
            .map_err(|e| DatabaseError::Query(e.to_string()))?;
        let rows = stmt
            .query_map(params, |row| row.get::<_, i64>(0).map(|v| v as usize))
            .map_err(|e| DatabaseError::Query(e.to_string()))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| DatabaseError::Query(e.to_string()))
    }

    /// Rebuild a summary from its occupancy and gene rows. A final summary
    /// is looked up by flag alone since its generation is not known upfront.
    fn load_summary(
        &self,
        replicate: usize,
        generation: Option<usize>,
        is_final: bool,
    ) -> Result<Option<GenerationSummary>, DatabaseError> {
        let conn = self.db.connection();
        let replicate = replicate as i64;

        let generation = match generation {
            Some(g) => g as i64,
            None => {
                let found: Option<i64> = conn
                    .query_row(
                        "SELECT MAX(generation) FROM occupancy
                         WHERE replicate = ?1 AND is_final = ?2",
                        params![replicate, is_final],
                        |row| row.get(0),
                    )
                    .map_err(|e| DatabaseError::Query(e.to_string()))?;
                match found {
                    Some(g) => g,
                    None => return Ok(None),
                }
            }
        };

        let mut stmt = conn
            .prepare(
                "SELECT patch, name, time, count FROM occupancy
                 WHERE replicate = ?1 AND generation = ?2 AND is_final = ?3
                 ORDER BY patch",
            )
            .map_err(|e| DatabaseError::Query(e.to_string()))?;
        let rows = stmt
            .query_map(params![replicate, generation, is_final], |row| {
                Ok((
                    row.get::<_, i64>(0)? as usize,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)? as u64,
                    row.get::<_, i64>(3)? as usize,
                ))
            })
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        let mut time = 0;
        let mut patches = Vec::new();
        for row in rows {
            let (patch, name, t, occupancy) = row.map_err(|e| DatabaseError::Query(e.to_string()))?;
            time = t;
            let mut summary = PatchSummary::empty(patch, name);
            summary.occupancy = occupancy;
            patches.push(summary);
        }
        if patches.is_empty() {
            return Ok(None);
        }

        let mut stmt = conn
            .prepare(
                "SELECT patch, gene, mean, std FROM gene_stats
                 WHERE replicate = ?1 AND generation = ?2 AND is_final = ?3",
            )
            .map_err(|e| DatabaseError::Query(e.to_string()))?;
        let rows = stmt
            .query_map(params![replicate, generation, is_final], |row| {
                Ok((
                    row.get::<_, i64>(0)? as usize,
                    row.get::<_, String>(1)?,
                    row.get::<_, f64>(2)?,
                    row.get::<_, f64>(3)?,
                ))
            })
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        for row in rows {
            let (patch, gene, mean, std) = row.map_err(|e| DatabaseError::Query(e.to_string()))?;
            let gene: Gene = gene.parse().map_err(DatabaseError::Query)?;
            let slot = patches
                .iter_mut()
                .find(|p| p.patch == patch)
                .ok_or_else(|| DatabaseError::Query(format!("gene row for unknown patch {patch}")))?;
            slot.means[gene.index()] = mean;
            slot.std_devs[gene.index()] = std;
        }

        Ok(Some(GenerationSummary {
            generation: generation as usize,
            time,
            is_final,
            patches,
        }))
    }
}
