use crate::models::SeriesTable;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Summary statistics for one column of a [`SeriesTable`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Summary {
    pub column: String,
    pub count: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    /// Most recent observation.
    pub last: Option<(NaiveDate, f64)>,
}

/// Compute statistics per column, in column order.
pub fn column_summary(table: &SeriesTable) -> Vec<Summary> {
    let mut out = Vec::with_capacity(table.width());
    for (idx, column) in table.columns.iter().enumerate() {
        let mut vals: Vec<f64> = table.values.iter().map(|row| row[idx]).collect();
        let last = table.dates.last().copied().zip(vals.last().copied());
        vals.sort_by(|a, b| a.total_cmp(b));
        let count = vals.len();
        let min = vals.first().cloned();
        let max = vals.last().cloned();
        let mean = if count > 0 {
            Some(vals.iter().copied().sum::<f64>() / count as f64)
        } else {
            None
        };
        let median = if count == 0 {
            None
        } else if count % 2 == 1 {
            Some(vals[count / 2])
        } else {
            Some((vals[count / 2 - 1] + vals[count / 2]) / 2.0)
        };
        out.push(Summary {
            column: column.clone(),
            count,
            min,
            max,
            mean,
            median,
            last,
        });
    }
    out
}
