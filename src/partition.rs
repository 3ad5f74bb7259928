use crate::error::Result;
use crate::table::Table;
use std::collections::HashMap;
use tracing::debug;

/// One session's slice of the roster, keyed by the class-column value.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionGroup {
    pub key: String,
    pub table: Table,
}

/// Split `table` into one group per distinct `class_column` value, each
/// projected to `columns_to_print`. Group order is first appearance of the
/// key; row order within a group is the original roster order. Both the
/// class column and every projection column must exist.
pub fn split_sessions(
    table: &Table,
    class_column: &str,
    columns_to_print: &[String],
) -> Result<Vec<SessionGroup>> {
    let class_idx = table.require_column(class_column)?;
    for column in columns_to_print {
        table.require_column(column)?;
    }

    let mut order: Vec<String> = Vec::new();
    let mut buckets: HashMap<String, Vec<usize>> = HashMap::new();

    for (row_idx, row) in table.rows().iter().enumerate() {
        let key = row[class_idx].display();
        buckets
            .entry(key.clone())
            .or_insert_with(|| {
                order.push(key);
                Vec::new()
            })
            .push(row_idx);
    }

    let mut groups = Vec::with_capacity(order.len());
    for key in order {
        let row_indices = &buckets[&key];
        let rows = row_indices
            .iter()
            .map(|&i| table.rows()[i].clone())
            .collect();
        let session = Table::from_rows(table.headers().to_vec(), rows)
            .project(columns_to_print)?;
        debug!(session = %key, rows = session.row_count(), "partitioned session");
        groups.push(SessionGroup {
            key,
            table: session,
        });
    }
    Ok(groups)
}
