use super::model::FeatureTable;

// ---------------------------------------------------------------------------
// Missing-value filtering
// ---------------------------------------------------------------------------

/// Drop every row that holds at least one missing cell.
///
/// Returns the filtered table and the number of rows removed. Column order
/// and the relative order of surviving rows are preserved.
pub fn drop_incomplete_rows(table: FeatureTable) -> (FeatureTable, usize) {
    let FeatureTable { columns, rows } = table;
    let before = rows.len();
    let rows: Vec<_> = rows
        .into_iter()
        .filter(|row| !row.iter().any(|cell| cell.is_missing()))
        .collect();
    let dropped = before - rows.len();
    (FeatureTable { columns, rows }, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Cell;

    fn table(rows: Vec<Vec<Cell>>) -> FeatureTable {
        FeatureTable::new(vec!["a".into(), "b".into()], rows)
    }

    #[test]
    fn keeps_complete_rows_in_order() {
        let (out, dropped) = drop_incomplete_rows(table(vec![
            vec![Cell::Integer(1), Cell::Float(0.5)],
            vec![Cell::Null, Cell::Float(0.5)],
            vec![Cell::Integer(3), Cell::String("x".into())],
            vec![Cell::Integer(4), Cell::Float(f64::NAN)],
        ]));
        assert_eq!(dropped, 2);
        assert_eq!(out.len(), 2);
        assert_eq!(out.rows[0][0], Cell::Integer(1));
        assert_eq!(out.rows[1][0], Cell::Integer(3));
        assert_eq!(out.columns, vec!["a", "b"]);
    }

    #[test]
    fn all_incomplete_leaves_empty_table() {
        let (out, dropped) = drop_incomplete_rows(table(vec![vec![Cell::Integer(1)]]));
        assert_eq!(dropped, 1);
        assert!(out.is_empty());
    }
}
