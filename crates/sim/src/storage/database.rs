//! Low-level database operations and schema management.

pub use crate::errors::DatabaseError;
use rusqlite::{Connection, Transaction};
use std::path::Path;
use tracing::warn;

/// Tables every database carries.
pub const TABLES: [&str; 5] = [
    "metadata",
    "gene_stats",
    "occupancy",
    "reaction_norms",
    "outcomes",
];

/// Database connection wrapper with schema management.
#[derive(Debug)]
pub struct Database {
    conn: Connection,
    db_path: String,
}

impl Database {
    /// Open (or create) a database at the specified path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DatabaseError> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        let conn =
            Connection::open(&path_str).map_err(|e| DatabaseError::Connection(e.to_string()))?;

        // Performance pragmas for faster bulk inserts
        conn.execute_batch(
            "PRAGMA synchronous = NORMAL;
             PRAGMA journal_mode = WAL;
             PRAGMA temp_store = MEMORY;
             PRAGMA cache_size = -64000;",
        )
        .map_err(|e| DatabaseError::Initialization(e.to_string()))?;

        let mut db = Self {
            conn,
            db_path: path_str,
        };

        db.initialize_schema()?;
        Ok(db)
    }

    fn initialize_schema(&mut self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(
                "-- Run configuration and bookkeeping
                CREATE TABLE IF NOT EXISTS metadata (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );

                -- One row per replicate, generation, patch and gene
                CREATE TABLE IF NOT EXISTS gene_stats (
                    replicate INTEGER NOT NULL,
                    generation INTEGER NOT NULL,
                    is_final INTEGER NOT NULL,
                    patch INTEGER NOT NULL,
                    gene TEXT NOT NULL,
                    mean REAL NOT NULL,
                    std REAL NOT NULL,
                    PRIMARY KEY (replicate, generation, is_final, patch, gene)
                );

                -- Patch occupancy; also carries the patch name and clock
                CREATE TABLE IF NOT EXISTS occupancy (
                    replicate INTEGER NOT NULL,
                    generation INTEGER NOT NULL,
                    is_final INTEGER NOT NULL,
                    patch INTEGER NOT NULL,
                    name TEXT NOT NULL,
                    time INTEGER NOT NULL,
                    count INTEGER NOT NULL,
                    PRIMARY KEY (replicate, generation, is_final, patch)
                );

                CREATE TABLE IF NOT EXISTS reaction_norms (
                    replicate INTEGER PRIMARY KEY,
                    generation INTEGER NOT NULL,
                    i0 REAL NOT NULL,
                    b REAL NOT NULL,
                    i0p REAL NOT NULL,
                    bp REAL NOT NULL
                );

                CREATE TABLE IF NOT EXISTS outcomes (
                    replicate INTEGER PRIMARY KEY,
                    status TEXT NOT NULL,
                    generation INTEGER NOT NULL,
                    attempts INTEGER NOT NULL
                );

                -- Indices
                CREATE INDEX IF NOT EXISTS idx_gene_stats_gen ON gene_stats(replicate, generation);
                CREATE INDEX IF NOT EXISTS idx_occupancy_patch ON occupancy(replicate, patch);",
            )
            .map_err(|e| DatabaseError::Initialization(e.to_string()))?;

        Ok(())
    }

    /// Begin a transaction for batched operations.
    pub fn transaction(&mut self) -> Result<Transaction<'_>, DatabaseError> {
        self.conn
            .transaction()
            .map_err(|e| DatabaseError::Transaction(e.to_string()))
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Flush the write-ahead log into the main file.
    pub fn checkpoint(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")
            .map_err(|e| DatabaseError::Transaction(e.to_string()))
    }

    /// Close the database and clean up WAL files.
    pub fn close(self) -> Result<(), DatabaseError> {
        if let Err(e) = self.conn.execute_batch(
            "PRAGMA wal_checkpoint(TRUNCATE);
             PRAGMA journal_mode = DELETE;",
        ) {
            warn!(path = %self.db_path, error = %e, "Failed to checkpoint WAL");
        }

        self.conn
            .close()
            .map_err(|(_conn, e)| DatabaseError::Close(e.to_string()))?;

        for suffix in &["-wal", "-shm"] {
            let fname = format!("{}{}", self.db_path, suffix);
            if let Err(e) = std::fs::remove_file(&fname) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(file = %fname, error = %e, "Failed to remove WAL file");
                }
            }
        }

        Ok(())
    }

    /// Row counts of the main tables.
    pub fn stats(&self) -> Result<DatabaseStats, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .map_err(|e| DatabaseError::Query(e.to_string()))?;
        let tables = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| DatabaseError::Query(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        let count = |table: &str| -> Result<usize, DatabaseError> {
            self.conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                    row.get::<_, i64>(0)
                })
                .map(|n| n as usize)
                .map_err(|e| DatabaseError::Query(e.to_string()))
        };

        Ok(DatabaseStats {
            gene_stat_records: count("gene_stats")?,
            occupancy_records: count("occupancy")?,
            replicates: count("outcomes")?,
            tables,
        })
    }
}

/// Database statistics.
#[derive(Debug, Clone)]
pub struct DatabaseStats {
    pub gene_stat_records: usize,
    pub occupancy_records: usize,
    /// Replicates with a recorded outcome
    pub replicates: usize,
    pub tables: Vec<String>,
}
