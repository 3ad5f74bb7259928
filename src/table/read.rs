use super::{Cell, Table};
use crate::error::{Error, Result};
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;
use tracing::debug;

/// Extensions handed to the workbook reader. Matches what `calamine`
/// can actually open; anything else is a fatal `UnsupportedFormat`.
const WORKBOOK_EXTENSIONS: &[&str] = &["xls", "xlsx", "xlsm", "xlsb", "ods"];

/// Load the roster at `path`, selecting the reader by file extension.
pub fn read_roster(path: &Path) -> Result<Table> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    debug!(path = %path.display(), %extension, "reading roster");

    let table = if extension == "csv" {
        read_csv(path)?
    } else if WORKBOOK_EXTENSIONS.contains(&extension.as_str()) {
        read_workbook(path)?
    } else {
        return Err(Error::UnsupportedFormat {
            path: path.to_path_buf(),
            extension,
        });
    };

    if table.is_empty() {
        return Err(Error::EmptyRoster(path.to_path_buf()));
    }
    debug!(
        rows = table.row_count(),
        columns = table.headers().len(),
        "roster loaded"
    );
    Ok(table)
}

fn read_csv(path: &Path) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new().from_path(path)?;

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut table = Table::new(headers);

    for record in reader.records() {
        let record = record?;
        let row = record
            .iter()
            .map(|field| {
                if field.is_empty() {
                    Cell::Missing
                } else {
                    Cell::Text(field.to_string())
                }
            })
            .collect();
        table.push_row(row);
    }
    Ok(table)
}

fn read_workbook(path: &Path) -> Result<Table> {
    let mut workbook = open_workbook_auto(path)?;
    let sheet_names = workbook.sheet_names().to_vec();
    let first_sheet = sheet_names
        .first()
        .ok_or_else(|| Error::EmptyRoster(path.to_path_buf()))?;

    let range = workbook.worksheet_range(first_sheet)?;
    let mut rows = range.rows();

    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row
            .iter()
            .enumerate()
            .map(|(i, cell)| match cell {
                Data::Empty => format!("Column{}", i + 1),
                other => convert_cell(other).display(),
            })
            .collect(),
        None => return Err(Error::EmptyRoster(path.to_path_buf())),
    };

    let mut table = Table::new(headers);
    for row in rows {
        table.push_row(row.iter().map(convert_cell).collect());
    }
    Ok(table)
}

fn convert_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Missing,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => match dt.as_datetime() {
            // Rosters mostly carry plain dates; keep midnight timestamps short.
            Some(ndt) if ndt.time() == chrono::NaiveTime::MIN => {
                Cell::Text(ndt.format("%m/%d/%Y").to_string())
            }
            Some(ndt) => Cell::Text(ndt.format("%m/%d/%Y %H:%M").to_string()),
            None => Cell::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(_) => Cell::Missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn csv_round() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("roster.csv");
        fs::write(&path, "Name,Class,Notes\nAnn,A,\nBob,B,allergic\n").unwrap();

        let table = read_roster(&path).unwrap();
        assert_eq!(table.headers(), ["Name", "Class", "Notes"]);
        assert_eq!(table.row_count(), 2);
        assert!(table.rows()[0][2].is_missing());
        assert_eq!(table.rows()[1][2], Cell::Text("allergic".into()));
    }

    #[test]
    fn unknown_extension_is_fatal() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("roster.txt");
        fs::write(&path, "Name\nAnn\n").unwrap();

        let err = read_roster(&path).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat { extension, .. } if extension == "txt"));
    }

    #[test]
    fn header_only_csv_is_empty() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("roster.csv");
        fs::write(&path, "Name,Class\n").unwrap();

        let err = read_roster(&path).unwrap_err();
        assert!(matches!(err, Error::EmptyRoster(_)));
    }
}
