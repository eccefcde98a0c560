//! CSV score sheets exported from portfolio tooling, one initiative per row.
//!
//! Expected headers: `initiative_id`, `initiative_name`, and one column per criterion (the
//! `_score` suffix is optional). Unknown columns are ignored. Row-level rating problems are
//! kept per row so one bad line never hides the rest of the sheet.

use std::io::Read;
use std::path::Path;

use super::domain::{Initiative, InitiativeId};
use super::evaluation::{Criterion, CriterionScores, ValidationError};

#[derive(Debug, thiserror::Error)]
pub enum ScoreSheetError {
    #[error("failed to read score sheet: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid score sheet CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// One parsed row; `line` is the 1-based line number including the header.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreSheetRow {
    pub line: usize,
    pub initiative: Initiative,
    pub scores: Result<CriterionScores, ValidationError>,
}

pub struct ScoreSheetImporter;

impl ScoreSheetImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<ScoreSheetRow>, ScoreSheetError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<ScoreSheetRow>, ScoreSheetError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = csv_reader.headers()?.clone();
        let columns: Vec<Column> = headers.iter().map(Column::from_header).collect();

        let mut rows = Vec::new();
        for (index, record) in csv_reader.records().enumerate() {
            let record = record?;
            let mut initiative = Initiative::default();
            let mut entries = Vec::new();
            let mut unreadable = None;

            for (column, cell) in columns.iter().zip(record.iter()) {
                match column {
                    Column::Id => initiative.id = InitiativeId(cell.to_string()),
                    Column::Name => initiative.name = cell.to_string(),
                    Column::Score(criterion) => {
                        if cell.is_empty() {
                            continue;
                        }
                        match cell.parse::<f64>() {
                            Ok(value) => entries.push((criterion.key(), value)),
                            Err(_) if unreadable.is_none() => {
                                unreadable = Some(ValidationError::UnreadableScore {
                                    criterion: *criterion,
                                    raw: cell.to_string(),
                                });
                            }
                            Err(_) => {}
                        }
                    }
                    Column::Ignored => {}
                }
            }

            let scores = match unreadable {
                Some(err) => Err(err),
                None => CriterionScores::from_entries(entries),
            };

            rows.push(ScoreSheetRow {
                line: index + 2,
                initiative,
                scores,
            });
        }

        Ok(rows)
    }
}

enum Column {
    Id,
    Name,
    Score(Criterion),
    Ignored,
}

impl Column {
    fn from_header(header: &str) -> Self {
        let normalized = header.trim().trim_start_matches('\u{feff}').to_ascii_lowercase();
        match normalized.as_str() {
            "initiative_id" | "id" | "project_id" => Column::Id,
            "initiative_name" | "name" | "project_name" => Column::Name,
            other => Criterion::from_key(other)
                .map(Column::Score)
                .unwrap_or(Column::Ignored),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const HEADER: &str = "initiative_id,initiative_name,strategic_alignment,benefit_value,delivery_risk,dependency_complexity,capacity_availability,regulatory_impact,notes\n";

    #[test]
    fn parses_valid_rows_with_line_numbers() {
        let csv = format!("{HEADER}INIT-1,Claims Renewal,5,4,3,4,3,5,flagship\nINIT-2,Data Lake,3,3,3,3,3,3,\n");
        let rows = ScoreSheetImporter::from_reader(Cursor::new(csv)).expect("parses");

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].line, 2);
        assert_eq!(rows[0].initiative.id, InitiativeId("INIT-1".to_string()));
        assert_eq!(rows[0].initiative.name, "Claims Renewal");
        let scores = rows[0].scores.as_ref().expect("valid scores");
        assert_eq!(scores.get(Criterion::StrategicAlignment), 5);
        assert_eq!(rows[1].line, 3);
    }

    #[test]
    fn keeps_row_level_errors() {
        let csv = format!("{HEADER}INIT-3,Broken,6,4,3,4,3,5,\nINIT-4,Gap,5,4,,4,3,5,\nINIT-5,Typo,5,four,3,4,3,5,\n");
        let rows = ScoreSheetImporter::from_reader(Cursor::new(csv)).expect("parses");

        assert!(matches!(
            rows[0].scores,
            Err(ValidationError::ScoreOutOfRange {
                criterion: Criterion::StrategicAlignment,
                ..
            })
        ));
        assert!(matches!(
            rows[1].scores,
            Err(ValidationError::MissingCriterion {
                criterion: Criterion::DeliveryRisk
            })
        ));
        match &rows[2].scores {
            Err(ValidationError::UnreadableScore { criterion, raw }) => {
                assert_eq!(*criterion, Criterion::BenefitValue);
                assert_eq!(raw, "four");
            }
            other => panic!("expected unreadable score, got {other:?}"),
        }
    }

    #[test]
    fn accepts_score_suffix_and_bom_headers() {
        let csv = "\u{feff}id,name,strategic_alignment_score,expected_benefit_value_score,delivery_risk_score,dependency_complexity_score,capacity_availability_score,regulatory_impact_score\nP-9,Portal,1,1,1,1,1,1\n";
        let rows = ScoreSheetImporter::from_reader(Cursor::new(csv)).expect("parses");
        assert_eq!(rows[0].initiative.id.0, "P-9");
        assert!(rows[0].scores.is_ok());
    }

    #[test]
    fn from_path_propagates_io_errors() {
        match ScoreSheetImporter::from_path("./does-not-exist.csv") {
            Err(ScoreSheetError::Io(_)) => {}
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
