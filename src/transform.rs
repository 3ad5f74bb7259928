use crate::config::MergeRule;
use crate::error::{Error, Result};
use crate::table::{Cell, Table};
use tracing::debug;

/// Apply the configured merge rules in order, each against the table as
/// modified by the previous ones, so a later rule may reference a column an
/// earlier rule created. The input table is never touched; an empty rule
/// list returns an equal copy.
pub fn apply_merge_rules(table: &Table, rules: &[MergeRule]) -> Result<Table> {
    let mut current = table.clone();
    for rule in rules {
        current = apply_rule(&current, rule)?;
    }
    Ok(current)
}

fn apply_rule(table: &Table, rule: &MergeRule) -> Result<Table> {
    if table.column_index(&rule.new_name).is_some() {
        return Err(Error::DuplicateColumn(rule.new_name.clone()));
    }
    let source_indices = rule
        .old_columns
        .iter()
        .map(|c| table.require_column(c))
        .collect::<Result<Vec<_>>>()?;

    debug!(
        new = %rule.new_name,
        old = ?rule.old_columns,
        "merging columns"
    );

    let kept: Vec<usize> = (0..table.headers().len())
        .filter(|i| !source_indices.contains(i))
        .collect();

    let mut headers: Vec<String> = kept.iter().map(|&i| table.headers()[i].clone()).collect();
    headers.push(rule.new_name.clone());

    let rows = table
        .rows()
        .iter()
        .map(|row| {
            let mut out: Vec<Cell> = kept.iter().map(|&i| row[i].clone()).collect();
            out.push(merge_cells(row, &source_indices, &rule.separator));
            out
        })
        .collect();

    Ok(Table::from_rows(headers, rows))
}

/// Join the non-missing source values with the separator. A row with every
/// source missing yields a missing cell, which renders as an empty string.
fn merge_cells(row: &[Cell], source_indices: &[usize], separator: &str) -> Cell {
    let parts: Vec<String> = source_indices
        .iter()
        .filter(|&&i| !row[i].is_missing())
        .map(|&i| row[i].display())
        .collect();

    if parts.is_empty() {
        Cell::Missing
    } else {
        Cell::Text(parts.join(separator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(new: &str, old: &[&str], sep: &str) -> MergeRule {
        MergeRule {
            new_name: new.to_string(),
            old_columns: old.iter().map(|s| s.to_string()).collect(),
            separator: sep.to_string(),
        }
    }

    fn names_table() -> Table {
        Table::from_rows(
            vec!["First".into(), "Last".into(), "Class".into()],
            vec![
                vec![
                    Cell::Text("Ann".into()),
                    Cell::Text("Lee".into()),
                    Cell::Text("A".into()),
                ],
                vec![
                    Cell::Text("Bob".into()),
                    Cell::Missing,
                    Cell::Text("B".into()),
                ],
            ],
        )
    }

    #[test]
    fn empty_rule_list_returns_equal_table() {
        let table = names_table();
        let out = apply_merge_rules(&table, &[]).unwrap();
        assert_eq!(out, table);
    }

    #[test]
    fn merge_joins_and_skips_missing() {
        let table = names_table();
        let out = apply_merge_rules(&table, &[rule("Name", &["First", "Last"], " ")]).unwrap();

        assert_eq!(out.headers(), ["Class", "Name"]);
        assert_eq!(out.rows()[0][1], Cell::Text("Ann Lee".into()));
        assert_eq!(out.rows()[1][1], Cell::Text("Bob".into()));
    }

    #[test]
    fn all_sources_missing_yields_empty_value() {
        let table = Table::from_rows(
            vec!["First".into(), "Last".into()],
            vec![vec![Cell::Missing, Cell::Missing]],
        );
        let out = apply_merge_rules(&table, &[rule("Name", &["First", "Last"], " ")]).unwrap();
        assert_eq!(out.rows()[0][0].display(), "");
    }

    #[test]
    fn single_source_acts_as_rename() {
        let table = names_table();
        let out = apply_merge_rules(&table, &[rule("Given", &["First"], " ")]).unwrap();
        assert_eq!(out.headers(), ["Last", "Class", "Given"]);
        assert_eq!(out.rows()[0][2], Cell::Text("Ann".into()));
    }

    #[test]
    fn duplicate_target_fails_and_leaves_input_alone() {
        let table = names_table();
        let err = apply_merge_rules(&table, &[rule("Class", &["First"], " ")]).unwrap_err();
        assert!(matches!(err, Error::DuplicateColumn(c) if c == "Class"));
        assert_eq!(table, names_table());
    }

    #[test]
    fn missing_source_column_fails() {
        let table = names_table();
        let err = apply_merge_rules(&table, &[rule("Name", &["First", "Middle"], " ")]).unwrap_err();
        assert!(matches!(err, Error::MissingColumn(c) if c == "Middle"));
    }

    #[test]
    fn later_rule_sees_earlier_result() {
        let table = names_table();
        let rules = [
            rule("Name", &["First", "Last"], " "),
            rule("Label", &["Name", "Class"], " - "),
        ];
        let out = apply_merge_rules(&table, &rules).unwrap();
        assert_eq!(out.headers(), ["Label"]);
        assert_eq!(out.rows()[0][0], Cell::Text("Ann Lee - A".into()));
    }
}
