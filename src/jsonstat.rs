//! JSON-stat 2.0 dataset as served by the Eurostat statistics API, and its
//! flattening into the header-plus-rows layout of [`RawTable`].
//!
//! The flattened table mirrors Eurostat's TSV bulk format: one text column per
//! non-time dimension (the geo column headed `geo\TIME_PERIOD`), followed by
//! one value column per time period.

use crate::error::ApiError;
use crate::models::{GEO, GEO_TIME_HEADER, RawCell, RawTable};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonStat {
    #[serde(default)]
    pub label: Option<String>,
    pub id: Vec<String>,
    pub size: Vec<usize>,
    pub dimension: HashMap<String, Dimension>,
    #[serde(default)]
    pub value: Values,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dimension {
    #[serde(default)]
    pub label: Option<String>,
    pub category: Category,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub index: Option<CategoryIndex>,
    #[serde(default)]
    pub label: Option<HashMap<String, String>>,
}

/// Category positions: an object `{code: position}` or an ordered array of codes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryIndex {
    Map(HashMap<String, usize>),
    List(Vec<String>),
}

/// Observations: sparse `{"flat index": value}` or a dense array.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Values {
    Sparse(HashMap<String, Option<f64>>),
    Dense(Vec<Option<f64>>),
}

impl Default for Values {
    fn default() -> Self {
        Values::Sparse(HashMap::new())
    }
}

impl Values {
    fn get(&self, flat: usize) -> Option<f64> {
        match self {
            Values::Sparse(m) => m.get(&flat.to_string()).copied().flatten(),
            Values::Dense(v) => v.get(flat).copied().flatten(),
        }
    }
}

impl Category {
    /// Category codes ordered by position.
    fn codes(&self) -> Result<Vec<String>, ApiError> {
        match (&self.index, &self.label) {
            (Some(CategoryIndex::List(codes)), _) => Ok(codes.clone()),
            (Some(CategoryIndex::Map(m)), _) => {
                let mut codes = vec![None; m.len()];
                for (code, &pos) in m {
                    let slot = codes.get_mut(pos).ok_or_else(|| {
                        ApiError::Shape(format!("category {code} has position {pos} out of range"))
                    })?;
                    *slot = Some(code.clone());
                }
                codes
                    .into_iter()
                    .collect::<Option<Vec<_>>>()
                    .ok_or_else(|| ApiError::Shape("duplicate category positions".into()))
            }
            // A single-category dimension may omit the index.
            (None, Some(labels)) if labels.len() == 1 => Ok(labels.keys().cloned().collect()),
            (None, _) => Err(ApiError::Shape("category without index".into())),
        }
    }
}

impl JsonStat {
    /// Flatten the cube into a [`RawTable`].
    ///
    /// One row per combination of non-time categories, in row-major order of
    /// `id`; one value cell per time period. Absent observations are
    /// [`RawCell::Missing`].
    pub fn to_raw_table(&self) -> Result<RawTable, ApiError> {
        if self.id.len() != self.size.len() {
            return Err(ApiError::Shape(format!(
                "{} dimension ids but {} sizes",
                self.id.len(),
                self.size.len()
            )));
        }
        let mut codes: Vec<Vec<String>> = Vec::with_capacity(self.id.len());
        for (name, &size) in self.id.iter().zip(&self.size) {
            let dim = self
                .dimension
                .get(name)
                .ok_or_else(|| ApiError::Shape(format!("dimension {name} not described")))?;
            let c = dim.category.codes()?;
            if c.len() != size {
                return Err(ApiError::Shape(format!(
                    "dimension {name}: size {size} but {} categories",
                    c.len()
                )));
            }
            codes.push(c);
        }

        let time_axis = self
            .id
            .iter()
            .position(|d| d == "time" || d == "TIME_PERIOD")
            .ok_or_else(|| ApiError::Shape("no time dimension".into()))?;

        // Row-major strides: the last dimension varies fastest.
        let mut strides = vec![1usize; self.size.len()];
        for i in (0..self.size.len().saturating_sub(1)).rev() {
            strides[i] = strides[i + 1] * self.size[i + 1];
        }

        let other_axes: Vec<usize> = (0..self.id.len()).filter(|&i| i != time_axis).collect();
        let mut header: Vec<String> = other_axes
            .iter()
            .map(|&i| {
                if self.id[i] == GEO {
                    GEO_TIME_HEADER.to_string()
                } else {
                    self.id[i].clone()
                }
            })
            .collect();
        header.extend(codes[time_axis].iter().cloned());

        let row_count: usize = other_axes.iter().map(|&i| self.size[i]).product();
        if self.size.contains(&0) {
            return Ok(RawTable::new(header, Vec::new()));
        }
        let mut rows = Vec::with_capacity(row_count);
        let mut pos = vec![0usize; other_axes.len()];
        for _ in 0..row_count {
            let mut row: Vec<RawCell> = other_axes
                .iter()
                .zip(&pos)
                .map(|(&axis, &p)| RawCell::Text(codes[axis][p].clone()))
                .collect();
            let base: usize = other_axes
                .iter()
                .zip(&pos)
                .map(|(&axis, &p)| p * strides[axis])
                .sum();
            for t in 0..self.size[time_axis] {
                row.push(self.value.get(base + t * strides[time_axis]).into());
            }
            rows.push(row);

            // Odometer increment over the non-time axes.
            for k in (0..pos.len()).rev() {
                pos[k] += 1;
                if pos[k] < self.size[other_axes[k]] {
                    break;
                }
                pos[k] = 0;
            }
        }
        Ok(RawTable::new(header, rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_and_map_indices_agree() {
        let a: Category =
            serde_json::from_str(r#"{"index":{"PL":1,"DE":0}}"#).unwrap();
        let b: Category = serde_json::from_str(r#"{"index":["DE","PL"]}"#).unwrap();
        assert_eq!(a.codes().unwrap(), b.codes().unwrap());
    }

    #[test]
    fn single_category_without_index() {
        let c: Category = serde_json::from_str(r#"{"label":{"M":"Monthly"}}"#).unwrap();
        assert_eq!(c.codes().unwrap(), vec!["M".to_string()]);
    }

    #[test]
    fn position_out_of_range_is_rejected() {
        let c: Category = serde_json::from_str(r#"{"index":{"PL":3}}"#).unwrap();
        assert!(c.codes().is_err());
    }
}
