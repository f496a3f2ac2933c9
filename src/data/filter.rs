use std::collections::BTreeSet;
use std::fmt;

use crate::error::{PipelineError, PipelineResult};

use super::model::{CellValue, Schema, GENDER, MARITAL_STATUS};
use super::table::Table;

// ---------------------------------------------------------------------------
// Filter predicate: one equality constraint per dimension
// ---------------------------------------------------------------------------

/// Selection for a single filter dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterChoice {
    /// No constraint: every row passes.
    #[default]
    All,
    /// Only rows whose value equals this one. `Only(Null)` keeps rows with a
    /// missing value.
    Only(CellValue),
}

impl FilterChoice {
    pub fn only(value: &str) -> Self {
        FilterChoice::Only(CellValue::text(value))
    }

    /// Parse a user-provided label, treating `All` (any case) as no constraint
    /// and `<null>` as the missing-value group.
    pub fn parse(label: &str) -> Self {
        if label.eq_ignore_ascii_case("all") {
            FilterChoice::All
        } else if label == CellValue::Null.to_string() {
            FilterChoice::Only(CellValue::Null)
        } else {
            FilterChoice::only(label)
        }
    }
}

impl fmt::Display for FilterChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterChoice::All => write!(f, "All"),
            FilterChoice::Only(v) => write!(f, "{v}"),
        }
    }
}

/// The two dashboard filters. Both default to `All`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    pub marital_status: FilterChoice,
    pub gender: FilterChoice,
}

impl FilterSelection {
    /// Active predicates as (column index, expected value) pairs.
    pub fn resolve<'a>(&'a self, schema: &Schema) -> PipelineResult<Vec<(usize, &'a CellValue)>> {
        let mut predicates = Vec::new();
        for (column, choice) in [(MARITAL_STATUS, &self.marital_status), (GENDER, &self.gender)] {
            if let FilterChoice::Only(value) = choice {
                let idx = schema
                    .index_of(column)
                    .ok_or_else(|| PipelineError::UnknownColumn(column.to_string()))?;
                predicates.push((idx, value));
            }
        }
        Ok(predicates)
    }

    pub fn is_unconstrained(&self) -> bool {
        self.marital_status == FilterChoice::All && self.gender == FilterChoice::All
    }
}

// ---------------------------------------------------------------------------
// Filter domains: what each selector offers
// ---------------------------------------------------------------------------

/// Distinct observed values for each filter dimension.
#[derive(Debug, Clone, Default)]
pub struct FilterDomains {
    pub marital_status: BTreeSet<CellValue>,
    pub gender: BTreeSet<CellValue>,
}

impl FilterDomains {
    pub fn from_table<T: Table + ?Sized>(table: &T) -> PipelineResult<Self> {
        Ok(FilterDomains {
            marital_status: table.distinct(MARITAL_STATUS)?,
            gender: table.distinct(GENDER)?,
        })
    }

    /// Selector entries for a dimension: `All` first, then observed values.
    pub fn options(values: &BTreeSet<CellValue>) -> Vec<FilterChoice> {
        std::iter::once(FilterChoice::All)
            .chain(values.iter().cloned().map(FilterChoice::Only))
            .collect()
    }

    pub fn marital_status_options(&self) -> Vec<FilterChoice> {
        Self::options(&self.marital_status)
    }

    pub fn gender_options(&self) -> Vec<FilterChoice> {
        Self::options(&self.gender)
    }

    /// Drop choices that no longer exist, e.g. after loading another file.
    pub fn sanitize(&self, selection: &FilterSelection) -> FilterSelection {
        let keep = |choice: &FilterChoice, values: &BTreeSet<CellValue>| match choice {
            FilterChoice::Only(v) if !values.contains(v) => FilterChoice::All,
            other => other.clone(),
        };
        FilterSelection {
            marital_status: keep(&selection.marital_status, &self.marital_status),
            gender: keep(&selection.gender, &self.gender),
        }
    }
}
