//! CSV import of laboratory defect catalogues (`name,category,weight`).

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use tracing::info;

use super::defects::{DefectCategory, DefectConfiguration, DefectError, DefectThresholds};

#[derive(Debug)]
pub enum CatalogueImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    UnknownCategory { line: usize, value: String },
    Defect { line: usize, source: DefectError },
}

impl std::fmt::Display for CatalogueImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogueImportError::Io(err) => write!(f, "failed to read defect catalogue: {}", err),
            CatalogueImportError::Csv(err) => write!(f, "invalid defect catalogue CSV: {}", err),
            CatalogueImportError::UnknownCategory { line, value } => write!(
                f,
                "line {}: unknown defect category '{}' (expected primary or secondary)",
                line, value
            ),
            CatalogueImportError::Defect { line, source } => write!(f, "line {}: {}", line, source),
        }
    }
}

impl std::error::Error for CatalogueImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogueImportError::Io(err) => Some(err),
            CatalogueImportError::Csv(err) => Some(err),
            CatalogueImportError::UnknownCategory { .. } => None,
            CatalogueImportError::Defect { source, .. } => Some(source),
        }
    }
}

impl From<std::io::Error> for CatalogueImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for CatalogueImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

#[derive(Debug, Deserialize)]
struct CatalogueRow {
    #[serde(alias = "Name")]
    name: String,
    #[serde(alias = "Category")]
    category: String,
    #[serde(alias = "Weight", deserialize_with = "decimal_comma")]
    weight: f64,
}

/// Accepts `0.2` as well as the `0,2` spelling common in laboratory spreadsheets.
fn decimal_comma<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.trim()
        .replace(',', ".")
        .parse::<f64>()
        .map_err(serde::de::Error::custom)
}

fn parse_category(value: &str) -> Option<DefectCategory> {
    match value.trim().to_ascii_lowercase().as_str() {
        "primary" | "1" | "category 1" | "cat1" => Some(DefectCategory::Primary),
        "secondary" | "2" | "category 2" | "cat2" => Some(DefectCategory::Secondary),
        _ => None,
    }
}

pub fn defects_from_path<P: AsRef<Path>>(
    path: P,
    thresholds: DefectThresholds,
) -> Result<DefectConfiguration, CatalogueImportError> {
    let file = std::fs::File::open(path)?;
    defects_from_reader(file, thresholds)
}

/// Build a validated configuration from CSV rows, in file order within each category. Errors
/// carry the line a record starts on, so quoted multi-line names do not shift the count.
pub fn defects_from_reader<R: Read>(
    reader: R,
    thresholds: DefectThresholds,
) -> Result<DefectConfiguration, CatalogueImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut config = DefectConfiguration {
        defects: Vec::new(),
        thresholds,
    };

    let headers = csv_reader.headers()?.clone();
    for record in csv_reader.records() {
        let record = record?;
        let line = record
            .position()
            .map_or(0, |position| position.line() as usize);
        let entry: CatalogueRow = record.deserialize(Some(&headers))?;
        let category =
            parse_category(&entry.category).ok_or_else(|| CatalogueImportError::UnknownCategory {
                line,
                value: entry.category.clone(),
            })?;
        config
            .add_defect(entry.name, category, entry.weight)
            .map_err(|source| CatalogueImportError::Defect { line, source })?;
    }

    info!(defects = config.defects.len(), "imported defect catalogue");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn imports_rows_in_order_per_category() {
        let csv = "name,category,weight\n\
Full Black,primary,1\n\
Broken,secondary,\"0,2\"\n\
Full Sour,Primary,1.0\n";
        let config = defects_from_reader(Cursor::new(csv), DefectThresholds::default())
            .expect("catalogue imports");

        let primary: Vec<_> = config
            .defects_in(DefectCategory::Primary)
            .map(|defect| (defect.name.as_str(), defect.display_order))
            .collect();
        assert_eq!(primary, vec![("Full Black", 0), ("Full Sour", 1)]);
        let broken = config
            .defects_in(DefectCategory::Secondary)
            .next()
            .expect("secondary defect");
        assert_eq!(broken.weight, 0.2);
        assert_eq!(broken.display_order, 0);
    }

    #[test]
    fn capitalised_headers_are_accepted() {
        let csv = "Name,Category,Weight\nShell,2,0.2\n";
        let config = defects_from_reader(Cursor::new(csv), DefectThresholds::default())
            .expect("catalogue imports");
        assert_eq!(config.defects[0].category, DefectCategory::Secondary);
    }

    #[test]
    fn reports_the_offending_line() {
        let csv = "name,category,weight\nFull Black,primary,1\nFloater,tertiary,0.2\n";
        match defects_from_reader(Cursor::new(csv), DefectThresholds::default()) {
            Err(CatalogueImportError::UnknownCategory { line, value }) => {
                assert_eq!(line, 3);
                assert_eq!(value, "tertiary");
            }
            other => panic!("expected unknown category, got {other:?}"),
        }

        let csv = "name,category,weight\nFull Black,primary,0\n";
        match defects_from_reader(Cursor::new(csv), DefectThresholds::default()) {
            Err(CatalogueImportError::Defect {
                line: 2,
                source: DefectError::NonPositiveWeight { .. },
            }) => {}
            other => panic!("expected zero weight rejection, got {other:?}"),
        }
    }

    #[test]
    fn multi_line_names_do_not_shift_line_numbers() {
        let csv = "name,category,weight\n\"Full\nBlack\",primary,1\nFloater,tertiary,0.2\n";
        match defects_from_reader(Cursor::new(csv), DefectThresholds::default()) {
            Err(CatalogueImportError::UnknownCategory { line, .. }) => assert_eq!(line, 4),
            other => panic!("expected unknown category, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_rows_are_rejected() {
        let csv = "name,category,weight\nShell,secondary,0.2\nshell,secondary,0.2\n";
        assert!(matches!(
            defects_from_reader(Cursor::new(csv), DefectThresholds::default()),
            Err(CatalogueImportError::Defect {
                source: DefectError::DuplicateName { .. },
                ..
            })
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        match defects_from_path("./no-such-catalogue.csv", DefectThresholds::default()) {
            Err(CatalogueImportError::Io(_)) => {}
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
