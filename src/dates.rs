use crate::error::Result;
use crate::table::Table;
use chrono::{NaiveDate, NaiveDateTime};
use tracing::warn;

/// Date shapes we accept from the roster's free-text date column. Source
/// spreadsheets are operator-authored, so cover the usual US and ISO forms.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    // two-digit years before any `%Y` slash form: `%Y` happily reads
    // "3/9/26" as the year 3
    "%m/%d/%y",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

/// Try each known format against the trimmed input.
pub fn parse_free_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date);
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt.date());
        }
    }
    None
}

/// The centered label under the document title: the first non-missing value
/// of `date_column`, reformatted with `date_format`. Unparseable text is
/// shown as-is rather than failing the run; an all-missing column yields no
/// label.
pub fn session_date_label(
    table: &Table,
    date_column: &str,
    date_format: &str,
) -> Result<Option<String>> {
    let idx = table.require_column(date_column)?;

    let raw = table
        .rows()
        .iter()
        .map(|row| &row[idx])
        .find(|cell| !cell.is_missing())
        .map(|cell| cell.display());

    Ok(raw.map(|text| match parse_free_date(&text) {
        Some(date) => date.format(date_format).to_string(),
        None => {
            warn!(%text, "could not parse session date, using raw text");
            text
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::table::Cell;

    #[test]
    fn common_shapes_parse() {
        let expected = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        for text in [
            "2026-03-09",
            "03/09/2026",
            "3/9/26",
            "March 9, 2026",
            "Mar 9, 2026",
            "9 March 2026",
            "2026-03-09 14:30:00",
        ] {
            assert_eq!(parse_free_date(text), Some(expected), "failed on {text}");
        }
        assert_eq!(parse_free_date("next tuesday"), None);
    }

    fn dated_table(values: Vec<Cell>) -> Table {
        Table::from_rows(
            vec!["Date".into()],
            values.into_iter().map(|c| vec![c]).collect(),
        )
    }

    #[test]
    fn first_non_missing_value_is_used() {
        let table = dated_table(vec![Cell::Missing, Cell::Text("2026-03-09".into())]);
        let label = session_date_label(&table, "Date", "%m/%d/%Y").unwrap();
        assert_eq!(label.as_deref(), Some("03/09/2026"));
    }

    #[test]
    fn unparseable_text_degrades_to_raw() {
        let table = dated_table(vec![Cell::Text("week of finals".into())]);
        let label = session_date_label(&table, "Date", "%m/%d/%Y").unwrap();
        assert_eq!(label.as_deref(), Some("week of finals"));
    }

    #[test]
    fn all_missing_yields_no_label() {
        let table = dated_table(vec![Cell::Missing]);
        let label = session_date_label(&table, "Date", "%m/%d/%Y").unwrap();
        assert_eq!(label, None);
    }

    #[test]
    fn absent_column_is_fatal() {
        let table = dated_table(vec![Cell::Missing]);
        let err = session_date_label(&table, "When", "%m/%d/%Y").unwrap_err();
        assert!(matches!(err, Error::MissingColumn(c) if c == "When"));
    }
}
