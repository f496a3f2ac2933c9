use std::collections::{BTreeMap, BTreeSet};

use crate::error::{PipelineError, PipelineResult};

use super::filter::FilterSelection;
use super::model::{CellValue, Dataset, Record, Schema};

// ---------------------------------------------------------------------------
// Table capability
// ---------------------------------------------------------------------------

/// The operations the chart pipeline needs from a tabular engine.
///
/// Implementors only supply row access; grouping, filtering and column
/// extraction are provided on top of it, so the pipeline does not care
/// whether rows are owned ([`Dataset`]) or borrowed ([`View`]).
pub trait Table {
    fn schema(&self) -> &Schema;

    fn num_rows(&self) -> usize;

    /// Row `i` of this table (0-based, `i < num_rows()`).
    fn record(&self, i: usize) -> &Record;

    /// Position of the underlying dataset row for row `i`.
    fn source_index(&self, i: usize) -> usize;

    /// The owning dataset.
    fn dataset(&self) -> &Dataset;

    fn rows(&self) -> Box<dyn Iterator<Item = &Record> + '_> {
        Box::new((0..self.num_rows()).map(move |i| self.record(i)))
    }

    fn column_index(&self, column: &str) -> PipelineResult<usize> {
        self.schema()
            .index_of(column)
            .ok_or_else(|| PipelineError::UnknownColumn(column.to_string()))
    }

    /// Rows satisfying every active predicate of `selection`.
    fn filter(&self, selection: &FilterSelection) -> PipelineResult<View<'_>> {
        let predicates = selection.resolve(self.schema())?;
        let indices = (0..self.num_rows())
            .filter(|&i| {
                let record = self.record(i);
                predicates.iter().all(|(col, value)| &record[*col] == *value)
            })
            .map(|i| self.source_index(i))
            .collect();
        Ok(View {
            dataset: self.dataset(),
            indices,
        })
    }

    /// Distinct values observed in `column`, nulls included.
    fn distinct(&self, column: &str) -> PipelineResult<BTreeSet<CellValue>> {
        let idx = self.column_index(column)?;
        Ok(self.rows().map(|r| r[idx].clone()).collect())
    }

    /// Row count per value of `column`.
    fn group_by_count(&self, column: &str) -> PipelineResult<BTreeMap<CellValue, usize>> {
        let idx = self.column_index(column)?;
        let mut counts = BTreeMap::new();
        for record in self.rows() {
            *counts.entry(record[idx].clone()).or_insert(0) += 1;
        }
        Ok(counts)
    }

    /// Mean of `value` per value of `key`. Nulls in `value` are skipped; a
    /// group without any numeric value maps to `None`.
    fn group_by_mean(
        &self,
        key: &str,
        value: &str,
    ) -> PipelineResult<BTreeMap<CellValue, Option<f64>>> {
        let key_idx = self.column_index(key)?;
        let value_idx = self.column_index(value)?;
        let mut sums: BTreeMap<CellValue, (f64, usize)> = BTreeMap::new();
        for record in self.rows() {
            let entry = sums.entry(record[key_idx].clone()).or_insert((0.0, 0));
            if let Some(v) = record[value_idx].as_f64() {
                entry.0 += v;
                entry.1 += 1;
            }
        }
        Ok(sums
            .into_iter()
            .map(|(k, (sum, n))| (k, (n > 0).then(|| sum / n as f64)))
            .collect())
    }

    /// A numeric column as row-aligned optional values.
    fn column_f64(&self, column: &str) -> PipelineResult<Vec<Option<f64>>> {
        let idx = self.column_index(column)?;
        self.rows()
            .map(|r| match &r[idx] {
                CellValue::Text(_) => Err(PipelineError::NotNumeric(column.to_string())),
                cell => Ok(cell.as_f64()),
            })
            .collect()
    }

    /// Rows rendered for display, in schema order.
    fn to_rows(&self) -> Vec<Vec<String>> {
        self.rows()
            .map(|r| r.iter().map(CellValue::display_cell).collect())
            .collect()
    }
}

impl Table for Dataset {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn num_rows(&self) -> usize {
        self.records.len()
    }

    fn record(&self, i: usize) -> &Record {
        &self.records[i]
    }

    fn source_index(&self, i: usize) -> usize {
        i
    }

    fn dataset(&self) -> &Dataset {
        self
    }
}

// ---------------------------------------------------------------------------
// View – read-only projection of a dataset
// ---------------------------------------------------------------------------

/// A filtered subset of a [`Dataset`]; rows are referenced, never copied.
#[derive(Debug, Clone)]
pub struct View<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
}

impl View<'_> {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

impl Table for View<'_> {
    fn schema(&self) -> &Schema {
        &self.dataset.schema
    }

    fn num_rows(&self) -> usize {
        self.indices.len()
    }

    fn record(&self, i: usize) -> &Record {
        &self.dataset.records[self.indices[i]]
    }

    fn source_index(&self, i: usize) -> usize {
        self.indices[i]
    }

    fn dataset(&self) -> &Dataset {
        self.dataset
    }
}
