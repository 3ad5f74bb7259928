use crate::error::{Error, Result};
use crate::table::Table;

/// One logical roster row, ready to draw: the normal cells, the optional
/// spanning overflow content, and the banding shade both share.
#[derive(Debug, Clone, PartialEq)]
pub struct RowPlan {
    pub cells: Vec<String>,
    pub extra: Option<String>,
    pub shaded: bool,
}

/// A session table reduced to drawing instructions, independent of page
/// geometry so the splitting rules can be tested without a PDF in hand.
#[derive(Debug, Clone, PartialEq)]
pub struct TablePlan {
    pub columns: Vec<String>,
    pub rows: Vec<RowPlan>,
}

/// Split `table` into normal columns and spanning extra-row columns.
///
/// Extra columns leave the normal grid entirely; their content is emitted
/// as one full-width row under the parent, and only when at least one extra
/// value is non-missing. Banding alternates over logical rows (the parent
/// rows), not over emitted rows, so a spanning row always matches its
/// parent's shade. The first data row is shaded.
pub fn plan_table(table: &Table, extra_columns: &[String]) -> Result<TablePlan> {
    let extra_indices = extra_columns
        .iter()
        .map(|c| table.require_column(c))
        .collect::<Result<Vec<_>>>()?;

    let normal_indices: Vec<usize> = (0..table.headers().len())
        .filter(|i| !extra_indices.contains(i))
        .collect();
    if normal_indices.is_empty() {
        return Err(Error::EmptyProjection);
    }

    let columns: Vec<String> = normal_indices
        .iter()
        .map(|&i| table.headers()[i].clone())
        .collect();

    let rows = table
        .rows()
        .iter()
        .enumerate()
        .map(|(row_idx, row)| {
            let cells = normal_indices.iter().map(|&i| row[i].display()).collect();

            let segments: Vec<String> = extra_indices
                .iter()
                .filter(|&&i| !row[i].is_missing())
                .map(|&i| format!("{}: {}", table.headers()[i], row[i].display()))
                .collect();
            let extra = if segments.is_empty() {
                None
            } else {
                Some(segments.join(", "))
            };

            RowPlan {
                cells,
                extra,
                shaded: row_idx % 2 == 0,
            }
        })
        .collect();

    Ok(TablePlan { columns, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Cell;

    fn roster() -> Table {
        Table::from_rows(
            vec!["Name".into(), "Class".into(), "Notes".into()],
            vec![
                vec![
                    Cell::Text("Ann".into()),
                    Cell::Text("A".into()),
                    Cell::Text("needs aisle seat".into()),
                ],
                vec![
                    Cell::Text("Bob".into()),
                    Cell::Text("A".into()),
                    Cell::Missing,
                ],
                vec![
                    Cell::Text("Cy".into()),
                    Cell::Text("B".into()),
                    Cell::Text("late start".into()),
                ],
            ],
        )
    }

    #[test]
    fn simple_mode_keeps_every_column() {
        let plan = plan_table(&roster(), &[]).unwrap();
        assert_eq!(plan.columns, ["Name", "Class", "Notes"]);
        assert!(plan.rows.iter().all(|r| r.extra.is_none()));
    }

    #[test]
    fn missing_cells_render_as_empty_strings() {
        let plan = plan_table(&roster(), &[]).unwrap();
        assert_eq!(plan.rows[1].cells, ["Bob", "A", ""]);
    }

    #[test]
    fn extra_rows_only_emitted_when_non_missing() {
        let plan = plan_table(&roster(), &["Notes".into()]).unwrap();

        assert_eq!(plan.columns, ["Name", "Class"]);
        assert_eq!(
            plan.rows[0].extra.as_deref(),
            Some("Notes: needs aisle seat")
        );
        assert_eq!(plan.rows[1].extra, None);
        assert_eq!(plan.rows[2].extra.as_deref(), Some("Notes: late start"));
    }

    #[test]
    fn banding_follows_logical_rows_not_emitted_rows() {
        let plan = plan_table(&roster(), &["Notes".into()]).unwrap();
        // row 0 emits two table rows (normal + spanning); row 1 still takes
        // the opposite shade
        assert!(plan.rows[0].shaded);
        assert!(!plan.rows[1].shaded);
        assert!(plan.rows[2].shaded);
    }

    #[test]
    fn unknown_extra_column_fails() {
        let err = plan_table(&roster(), &["Allergies".into()]).unwrap_err();
        assert!(matches!(err, Error::MissingColumn(c) if c == "Allergies"));
    }

    #[test]
    fn all_columns_extra_is_an_empty_projection() {
        let err = plan_table(
            &roster(),
            &["Name".into(), "Class".into(), "Notes".into()],
        )
        .unwrap_err();
        assert!(matches!(err, Error::EmptyProjection));
    }
}
