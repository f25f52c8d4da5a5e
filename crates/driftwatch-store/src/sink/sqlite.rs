//! SQLite results database

use crate::db;
use crate::errors::{from_rusqlite, Result};
use crate::sink::{canonical_json, finding_digest};
use driftwatch_core::errors::ExError;
use driftwatch_core::findings::Finding;
use driftwatch_core::store::FindingSink;
use driftwatch_core_types::RunId;
use rusqlite::{params, Connection};
use std::path::Path;

/// Appends findings to the `findings` table, tagged with the run id
///
/// Rows of one run are numbered from 0 in append order.
pub struct SqliteSink {
    conn: Connection,
    run_id: RunId,
    next_seq: i64,
}

impl SqliteSink {
    /// Open (and migrate) the database at `path`
    ///
    /// # Errors
    ///
    /// Returns `Io` or `Persistence` when the database cannot be opened or
    /// migrated.
    pub fn open(path: &Path, run_id: RunId) -> Result<Self> {
        Ok(Self::with_connection(db::open_results_db(path)?, run_id))
    }

    /// In-memory database (for testing)
    ///
    /// # Errors
    ///
    /// Returns `Persistence` when the schema cannot be created.
    pub fn in_memory(run_id: RunId) -> Result<Self> {
        let mut conn = db::open_in_memory()?;
        crate::migrations::apply_migrations(&mut conn)?;
        Ok(Self::with_connection(conn, run_id))
    }

    fn with_connection(conn: Connection, run_id: RunId) -> Self {
        Self {
            conn,
            run_id,
            next_seq: 0,
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Findings stored for `run_id`, in append order
    ///
    /// # Errors
    ///
    /// Returns `Persistence` on query failure and `Serialization` when a
    /// stored payload no longer decodes.
    pub fn findings_for_run(&self, run_id: &RunId) -> Result<Vec<Finding>> {
        let mut stmt = self
            .conn
            .prepare("SELECT payload FROM findings WHERE run_id = ?1 ORDER BY seq")
            .map_err(from_rusqlite)?;
        let payloads: Vec<String> = stmt
            .query_map([run_id.as_str()], |row| row.get(0))
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;

        payloads
            .iter()
            .map(|p| serde_json::from_str::<Finding>(p).map_err(ExError::from))
            .collect()
    }
}

impl FindingSink for SqliteSink {
    fn append(&mut self, finding: &Finding) -> Result<()> {
        let payload = canonical_json(finding)?;
        let digest = finding_digest(finding)?;
        let id = finding.resource_id();

        self.conn
            .execute(
                "INSERT INTO findings
                    (run_id, seq, kind, name, resource, attribute, digest, payload, recorded_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    self.run_id.as_str(),
                    self.next_seq,
                    finding.kind(),
                    finding.name(),
                    id.as_ref().map(|i| i.resource.as_str()),
                    id.as_ref().map(|i| i.attribute.as_str()),
                    digest,
                    payload,
                    chrono::Utc::now().to_rfc3339(),
                ],
            )
            .map_err(from_rusqlite)?;

        self.next_seq += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use driftwatch_core::findings::PopulationChange;
    use driftwatch_core::ResourceId;
    use tempfile::TempDir;

    #[test]
    fn test_append_and_read_back_in_order() {
        let run = RunId::from_string("run-1".into());
        let mut sink = SqliteSink::in_memory(run.clone()).unwrap();
        let population = Finding::population(
            &ResourceId::new("proj-a", "networks"),
            PopulationChange::Appeared,
        );

        sink.append(&population).unwrap();
        sink.append(&Finding::warning("quota")).unwrap();

        assert_eq!(
            sink.findings_for_run(&run).unwrap(),
            vec![population, Finding::warning("quota")]
        );

        let (resource, kind): (Option<String>, String) = sink
            .connection()
            .query_row(
                "SELECT resource, kind FROM findings WHERE seq = 0",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(resource.as_deref(), Some("proj-a"));
        assert_eq!(kind, "population_change_finding");
    }

    #[test]
    fn test_runs_share_a_database_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("findings.db");
        let first = RunId::from_string("run-1".into());
        let second = RunId::from_string("run-2".into());

        let mut sink = SqliteSink::open(&path, first.clone()).unwrap();
        sink.append(&Finding::warning("a")).unwrap();
        drop(sink);

        let mut sink = SqliteSink::open(&path, second.clone()).unwrap();
        sink.append(&Finding::warning("b")).unwrap();

        assert_eq!(sink.findings_for_run(&first).unwrap(), vec![Finding::warning("a")]);
        assert_eq!(sink.findings_for_run(&second).unwrap(), vec![Finding::warning("b")]);
    }

    #[test]
    fn test_identical_findings_share_a_digest() {
        let mut sink = SqliteSink::in_memory(RunId::new()).unwrap();
        sink.append(&Finding::warning("same")).unwrap();
        sink.append(&Finding::warning("same")).unwrap();

        let distinct: i64 = sink
            .connection()
            .query_row("SELECT COUNT(DISTINCT digest) FROM findings", [], |row| row.get(0))
            .unwrap();
        assert_eq!(distinct, 1);
    }
}
