use rusqlite::{params, Connection};

use super::StorageError;

/// Decision mart tables. Column names match the dashboard's existing mart so an existing
/// database file opens unchanged.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS Programs (
    Program_ID INTEGER PRIMARY KEY,
    Program_Name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS Projects (
    Project_ID INTEGER PRIMARY KEY,
    Project_Name TEXT NOT NULL,
    Program_ID INTEGER
);

CREATE TABLE IF NOT EXISTS Benefit_Profiles (
    Project_ID INTEGER PRIMARY KEY,
    Planned_Benefit_Value REAL
);

CREATE TABLE IF NOT EXISTS Risk_Registers (
    Project_ID INTEGER PRIMARY KEY,
    Risk_Severity TEXT
);

CREATE TABLE IF NOT EXISTS Board_Decisions (
    decision_id TEXT PRIMARY KEY,
    initiative_id TEXT,
    composite_score REAL,
    decision_outcome TEXT,
    board_rationale TEXT,
    timestamp DATETIME DEFAULT CURRENT_TIMESTAMP
);
"#;

pub(super) fn migrate(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(SCHEMA)
        .map_err(|err| StorageError::Migration(err.to_string()))
}

const PROGRAMS: [(i64, &str); 2] = [(1, "Digital Claims"), (2, "Data Foundations")];

/// (project id, name, program id, planned benefit, risk severity)
const PROJECTS: [(i64, &str, i64, f64, &str); 5] = [
    (101, "Claims Platform Renewal", 1, 4_200_000.0, "Medium"),
    (102, "Broker Portal Modernisation", 1, 1_350_000.0, "Low"),
    (103, "Fraud Analytics Uplift", 1, 2_100_000.0, "High"),
    (201, "Enterprise Data Lake", 2, 3_000_000.0, "High"),
    (202, "Regulatory Reporting Automation", 2, 900_000.0, "Critical"),
];

/// Inserts the demo portfolio. Rows that already exist are left untouched.
pub(super) fn seed(conn: &mut Connection) -> Result<usize, StorageError> {
    let tx = conn.transaction()?;
    let mut inserted = 0;

    for (id, name) in PROGRAMS {
        inserted += tx.execute(
            "INSERT OR IGNORE INTO Programs (Program_ID, Program_Name) VALUES (?1, ?2)",
            params![id, name],
        )?;
    }

    for (id, name, program, benefit, risk) in PROJECTS {
        inserted += tx.execute(
            "INSERT OR IGNORE INTO Projects (Project_ID, Project_Name, Program_ID) VALUES (?1, ?2, ?3)",
            params![id, name, program],
        )?;
        inserted += tx.execute(
            "INSERT OR IGNORE INTO Benefit_Profiles (Project_ID, Planned_Benefit_Value) VALUES (?1, ?2)",
            params![id, benefit],
        )?;
        inserted += tx.execute(
            "INSERT OR IGNORE INTO Risk_Registers (Project_ID, Risk_Severity) VALUES (?1, ?2)",
            params![id, risk],
        )?;
    }

    tx.commit()?;
    Ok(inserted)
}
