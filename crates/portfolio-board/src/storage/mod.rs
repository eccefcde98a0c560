//! SQLite-backed decision mart: the board decision ledger and the portfolio read model.

mod schema;

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::workflows::board::{
    BoardDecisionRecord, DecisionId, DecisionLedger, DecisionOutcome, InitiativeId, LedgerError,
};
use crate::workflows::portfolio::{PortfolioError, PortfolioInitiative, PortfolioRepository};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to open decision mart at {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    #[error("failed to prepare decision mart schema: {0}")]
    Migration(String),
    #[error("decision mart query failed: {0}")]
    Query(#[from] rusqlite::Error),
    #[error("decision mart connection is poisoned")]
    Poisoned,
}

/// First rows of one table, for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableDump {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
}

/// Single-connection store. Writes are serialised through the mutex, so each append is atomic
/// with respect to concurrent callers.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| StorageError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self::initialise(conn)?;
        info!(path = %path.display(), "decision mart opened");
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(|source| StorageError::Open {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        Self::initialise(conn)
    }

    fn initialise(conn: Connection) -> Result<Self, StorageError> {
        schema::migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn.lock().map_err(|_| StorageError::Poisoned)
    }

    /// Loads the demo portfolio; returns the number of rows inserted.
    pub fn seed_sample_portfolio(&self) -> Result<usize, StorageError> {
        let mut conn = self.connection()?;
        let inserted = schema::seed(&mut conn)?;
        debug!(inserted, "sample portfolio seeded");
        Ok(inserted)
    }

    /// Every user table with at most `rows_per_table` rows each, ordered by table name.
    pub fn inspect(&self, rows_per_table: usize) -> Result<Vec<TableDump>, StorageError> {
        let conn = self.connection()?;
        let mut tables = conn.prepare(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )?;
        let names = tables
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let limit = i64::try_from(rows_per_table).unwrap_or(i64::MAX);
        let mut dumps = Vec::with_capacity(names.len());
        for name in names {
            let sql = format!("SELECT * FROM \"{}\" LIMIT ?1", name.replace('"', "\"\""));
            let mut statement = conn.prepare(&sql)?;
            let columns: Vec<String> = statement
                .column_names()
                .into_iter()
                .map(str::to_string)
                .collect();
            let width = columns.len();
            let rows = statement
                .query_map(params![limit], |row| {
                    (0..width)
                        .map(|index| row.get_ref(index).map(json_value))
                        .collect::<Result<Vec<_>, _>>()
                })?
                .collect::<Result<Vec<_>, _>>()?;
            dumps.push(TableDump {
                name,
                columns,
                rows,
            });
        }
        Ok(dumps)
    }

    pub fn decision(&self, id: &DecisionId) -> Result<Option<BoardDecisionRecord>, StorageError> {
        let conn = self.connection()?;
        let row = conn
            .query_row(
                "SELECT decision_id, initiative_id, composite_score, decision_outcome, board_rationale, timestamp
                 FROM Board_Decisions WHERE decision_id = ?1",
                params![id.0],
                DecisionRow::from_row,
            )
            .optional()?;
        Ok(row.and_then(|row| row.into_record().ok()))
    }
}

impl DecisionLedger for SqliteStore {
    fn append(&self, record: BoardDecisionRecord) -> Result<BoardDecisionRecord, LedgerError> {
        let conn = self.connection().map_err(unavailable)?;
        let result = conn.execute(
            "INSERT INTO Board_Decisions
             (decision_id, initiative_id, composite_score, decision_outcome, board_rationale, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.decision_id.0,
                record.initiative_id.0,
                record.composite_score,
                record.decision_outcome.label(),
                record.board_rationale,
                format_timestamp(record.timestamp),
            ],
        );

        match result {
            Ok(_) => Ok(record),
            Err(rusqlite::Error::SqliteFailure(failure, _))
                if failure.code == ErrorCode::ConstraintViolation =>
            {
                Err(LedgerError::Conflict)
            }
            Err(err) => Err(LedgerError::Unavailable(err.to_string())),
        }
    }

    fn recent(&self, limit: Option<usize>) -> Result<Vec<BoardDecisionRecord>, LedgerError> {
        let conn = self.connection().map_err(unavailable)?;
        let limit = limit.map_or(-1, |limit| i64::try_from(limit).unwrap_or(i64::MAX));
        let mut statement = conn
            .prepare(
                "SELECT decision_id, initiative_id, composite_score, decision_outcome, board_rationale, timestamp
                 FROM Board_Decisions
                 ORDER BY unixepoch(timestamp, 'subsec') DESC, rowid DESC
                 LIMIT ?1",
            )
            .map_err(|err| LedgerError::Unavailable(err.to_string()))?;

        let rows = statement
            .query_map(params![limit], DecisionRow::from_row)
            .and_then(|rows| rows.collect::<Result<Vec<_>, _>>())
            .map_err(|err| LedgerError::Unavailable(err.to_string()))?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let decision_id = row.decision_id.clone();
                match row.into_record() {
                    Ok(record) => Some(record),
                    Err(err) => {
                        warn!(%decision_id, error = %err, "skipping unreadable board decision");
                        None
                    }
                }
            })
            .collect())
    }
}

impl PortfolioRepository for SqliteStore {
    fn initiatives(&self, limit: usize) -> Result<Vec<PortfolioInitiative>, PortfolioError> {
        let conn = self
            .connection()
            .map_err(|err| PortfolioError::Unavailable(err.to_string()))?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut statement = conn
            .prepare(
                "SELECT pr.Project_ID, pr.Project_Name, pg.Program_Name,
                        bp.Planned_Benefit_Value, rr.Risk_Severity
                 FROM Projects pr
                 JOIN Benefit_Profiles bp ON pr.Project_ID = bp.Project_ID
                 JOIN Risk_Registers rr ON pr.Project_ID = rr.Project_ID
                 LEFT JOIN Programs pg ON pr.Program_ID = pg.Program_ID
                 ORDER BY pr.Project_ID
                 LIMIT ?1",
            )
            .map_err(|err| PortfolioError::Unavailable(err.to_string()))?;

        statement
            .query_map(params![limit], |row| {
                Ok(PortfolioInitiative {
                    project_id: row.get(0)?,
                    project_name: row.get(1)?,
                    program_name: row.get(2)?,
                    planned_benefit_value: row.get(3)?,
                    risk_severity: row.get(4)?,
                })
            })
            .and_then(|rows| rows.collect::<Result<Vec<_>, _>>())
            .map_err(|err| PortfolioError::Unavailable(err.to_string()))
    }
}

struct DecisionRow {
    decision_id: String,
    initiative_id: Option<String>,
    composite_score: Option<f64>,
    decision_outcome: Option<String>,
    board_rationale: Option<String>,
    timestamp: Option<String>,
}

impl DecisionRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            decision_id: row.get(0)?,
            initiative_id: row.get(1)?,
            composite_score: row.get(2)?,
            decision_outcome: row.get(3)?,
            board_rationale: row.get(4)?,
            timestamp: row.get(5)?,
        })
    }

    fn into_record(self) -> Result<BoardDecisionRecord, LedgerError> {
        let corrupt = |what: &str| LedgerError::Corrupt(format!("{} ({what})", self.decision_id));

        let composite_score = self
            .composite_score
            .ok_or_else(|| corrupt("missing composite score"))?;
        let decision_outcome = self
            .decision_outcome
            .as_deref()
            .and_then(DecisionOutcome::parse)
            .ok_or_else(|| corrupt("unknown decision outcome"))?;
        let timestamp = self
            .timestamp
            .as_deref()
            .and_then(parse_timestamp)
            .ok_or_else(|| corrupt("unreadable timestamp"))?;

        Ok(BoardDecisionRecord {
            decision_id: DecisionId(self.decision_id.clone()),
            initiative_id: InitiativeId(self.initiative_id.clone().unwrap_or_default()),
            composite_score,
            decision_outcome,
            board_rationale: self.board_rationale.clone().unwrap_or_default(),
            timestamp,
        })
    }
}

fn unavailable(err: StorageError) -> LedgerError {
    LedgerError::Unavailable(err.to_string())
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Accepts RFC 3339 and SQLite's `CURRENT_TIMESTAMP` form (UTC, no zone suffix).
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|parsed| parsed.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

fn json_value(value: ValueRef<'_>) -> serde_json::Value {
    match value {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Integer(number) => serde_json::Value::from(number),
        ValueRef::Real(number) => serde_json::Value::from(number),
        ValueRef::Text(bytes) => serde_json::Value::from(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => serde_json::Value::from(format!("<{} bytes>", bytes.len())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(id: &str, seconds: i64, outcome: DecisionOutcome) -> BoardDecisionRecord {
        BoardDecisionRecord {
            decision_id: DecisionId(id.to_string()),
            initiative_id: InitiativeId("INIT-42".to_string()),
            composite_score: 4.15,
            decision_outcome: outcome,
            board_rationale: "Strong strategic fit".to_string(),
            timestamp: Utc
                .timestamp_opt(1_790_000_000 + seconds, 250_000)
                .single()
                .expect("valid timestamp"),
        }
    }

    #[test]
    fn append_then_list_newest_first() {
        let store = SqliteStore::open_in_memory().expect("store opens");
        store
            .append(record("BD-1", 0, DecisionOutcome::Approve))
            .expect("appended");
        store
            .append(record("BD-2", 60, DecisionOutcome::Defer))
            .expect("appended");
        store
            .append(record("BD-3", 30, DecisionOutcome::Reject))
            .expect("appended");

        let listed = store.recent(None).expect("listed");
        let ids: Vec<_> = listed.iter().map(|r| r.decision_id.0.as_str()).collect();
        assert_eq!(ids, vec!["BD-2", "BD-3", "BD-1"]);
        assert_eq!(listed[0].decision_outcome, DecisionOutcome::Defer);
        assert_eq!(listed[0], record("BD-2", 60, DecisionOutcome::Defer));

        assert_eq!(store.recent(Some(2)).expect("listed").len(), 2);
    }

    #[test]
    fn identical_timestamps_fall_back_to_insertion_order() {
        let store = SqliteStore::open_in_memory().expect("store opens");
        store
            .append(record("BD-A", 0, DecisionOutcome::Approve))
            .expect("appended");
        store
            .append(record("BD-B", 0, DecisionOutcome::Approve))
            .expect("appended");

        let listed = store.recent(None).expect("listed");
        assert_eq!(listed[0].decision_id.0, "BD-B");
    }

    #[test]
    fn duplicate_ids_conflict_and_leave_original_untouched() {
        let store = SqliteStore::open_in_memory().expect("store opens");
        store
            .append(record("BD-1", 0, DecisionOutcome::Approve))
            .expect("appended");

        match store.append(record("BD-1", 10, DecisionOutcome::Reject)) {
            Err(LedgerError::Conflict) => {}
            other => panic!("expected conflict, got {other:?}"),
        }

        let stored = store
            .decision(&DecisionId("BD-1".to_string()))
            .expect("query")
            .expect("present");
        assert_eq!(stored.decision_outcome, DecisionOutcome::Approve);
    }

    #[test]
    fn legacy_rows_with_sqlite_timestamps_are_readable() {
        let store = SqliteStore::open_in_memory().expect("store opens");
        {
            let conn = store.connection().expect("connection");
            conn.execute(
                "INSERT INTO Board_Decisions (decision_id, initiative_id, composite_score, decision_outcome, board_rationale)
                 VALUES ('legacy-1', 'INIT-1', 3.4, 'Approve with conditions', 'imported')",
                [],
            )
            .expect("legacy insert");
        }

        let listed = store.recent(None).expect("listed");
        assert_eq!(listed[0].decision_outcome, DecisionOutcome::ApproveWithConditions);
    }

    #[test]
    fn unreadable_rows_are_skipped_without_hiding_the_rest() {
        let store = SqliteStore::open_in_memory().expect("store opens");
        store
            .append(record("BD-1", 0, DecisionOutcome::Approve))
            .expect("appended");
        {
            let conn = store.connection().expect("connection");
            conn.execute(
                "INSERT INTO Board_Decisions (decision_id, initiative_id, composite_score, decision_outcome)
                 VALUES ('chat-1', 'INIT-1', 4.2, 'Approved')",
                [],
            )
            .expect("insert");
        }

        let listed = store.recent(None).expect("listed");
        let ids: Vec<_> = listed.iter().map(|r| r.decision_id.0.as_str()).collect();
        assert_eq!(ids, vec!["BD-1"]);
        assert_eq!(
            store
                .decision(&DecisionId("chat-1".to_string()))
                .expect("query"),
            None
        );
    }

    #[test]
    fn mixed_timestamp_formats_list_by_recency() {
        let store = SqliteStore::open_in_memory().expect("store opens");
        {
            let conn = store.connection().expect("connection");
            conn.execute(
                "INSERT INTO Board_Decisions (decision_id, initiative_id, composite_score, decision_outcome, timestamp)
                 VALUES ('legacy-late', 'INIT-1', 3.4, 'Defer', '2026-10-17 23:00:00')",
                [],
            )
            .expect("legacy insert");
        }
        let mut early = record("new-early", 0, DecisionOutcome::Approve);
        early.timestamp = Utc
            .with_ymd_and_hms(2026, 10, 17, 1, 0, 0)
            .single()
            .expect("valid timestamp");
        store.append(early).expect("appended");
        let mut next_day = record("new-next-day", 0, DecisionOutcome::Reject);
        next_day.timestamp = Utc
            .with_ymd_and_hms(2026, 10, 18, 0, 30, 0)
            .single()
            .expect("valid timestamp");
        store.append(next_day).expect("appended");

        let listed = store.recent(None).expect("listed");
        let ids: Vec<_> = listed.iter().map(|r| r.decision_id.0.as_str()).collect();
        assert_eq!(ids, vec!["new-next-day", "legacy-late", "new-early"]);
        assert_eq!(store.recent(Some(1)).expect("listed")[0].decision_id.0, "new-next-day");
    }

    #[test]
    fn portfolio_query_joins_benefit_and_risk() {
        let store = SqliteStore::open_in_memory().expect("store opens");
        assert!(store.seed_sample_portfolio().expect("seeded") > 0);
        assert_eq!(store.seed_sample_portfolio().expect("reseeded"), 0);
        {
            let conn = store.connection().expect("connection");
            conn.execute(
                "INSERT INTO Projects (Project_ID, Project_Name) VALUES (999, 'Unprofiled')",
                [],
            )
            .expect("insert");
        }

        let rows = store.initiatives(100).expect("queried");
        assert_eq!(rows.len(), 5);
        assert!(rows.iter().all(|row| row.project_id != 999));
        assert_eq!(rows[0].project_name, "Claims Platform Renewal");
        assert_eq!(rows[0].program_name.as_deref(), Some("Digital Claims"));
        assert_eq!(rows[0].planned_benefit_value, Some(4_200_000.0));

        assert_eq!(store.initiatives(2).expect("queried").len(), 2);
    }

    #[test]
    fn inspect_dumps_every_table() {
        let store = SqliteStore::open_in_memory().expect("store opens");
        store.seed_sample_portfolio().expect("seeded");

        let dumps = store.inspect(2).expect("inspected");
        let names: Vec<_> = dumps.iter().map(|dump| dump.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Benefit_Profiles",
                "Board_Decisions",
                "Programs",
                "Projects",
                "Risk_Registers"
            ]
        );
        let projects = dumps
            .iter()
            .find(|dump| dump.name == "Projects")
            .expect("projects table");
        assert_eq!(projects.rows.len(), 2);
        assert_eq!(projects.columns[1], "Project_Name");
    }

    #[test]
    fn decisions_survive_reopening_the_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("mart.db");

        {
            let store = SqliteStore::open(&path).expect("store opens");
            store
                .append(record("BD-1", 0, DecisionOutcome::Approve))
                .expect("appended");
        }

        let reopened = SqliteStore::open(&path).expect("store reopens");
        let listed = reopened.recent(None).expect("listed");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].decision_id.0, "BD-1");
    }
}
