use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Column catalogue
// ---------------------------------------------------------------------------

pub const MARITAL_STATUS: &str = "MaritalStatus";
pub const GENDER: &str = "Gender";
pub const EDUCATION: &str = "EnglishEducation";
pub const YEARLY_INCOME: &str = "YearlyIncome(USD)";
pub const TOTAL_CHILDREN: &str = "TotalChildren";
pub const CHILDREN_AT_HOME: &str = "NumberChildrenAtHome";
pub const CARS_OWNED: &str = "NumberCarsOwned";
pub const ANNUAL_SALES: &str = "AnnualSales(USD)";
pub const MIN_PAYMENT: &str = "MinPaymentAmount(USD)";
pub const ANNUAL_REVENUE: &str = "AnnualRevenue(USD)";
pub const HOUSE_OWNER: &str = "HouseOwnerFlag";

/// Columns cast to `f64` right after loading.
pub const NUMERIC_COLUMNS: [&str; 8] = [
    YEARLY_INCOME,
    TOTAL_CHILDREN,
    CHILDREN_AT_HOME,
    CARS_OWNED,
    ANNUAL_SALES,
    MIN_PAYMENT,
    ANNUAL_REVENUE,
    HOUSE_OWNER,
];

/// Categorical columns the dashboard groups or filters by.
pub const CATEGORICAL_COLUMNS: [&str; 3] = [MARITAL_STATUS, GENDER, EDUCATION];

/// Regression feature vector, in assembly order.
pub const FEATURE_COLUMNS: [&str; 7] = [
    YEARLY_INCOME,
    TOTAL_CHILDREN,
    CHILDREN_AT_HOME,
    CARS_OWNED,
    MIN_PAYMENT,
    ANNUAL_REVENUE,
    HOUSE_OWNER,
];

/// Regression label.
pub const LABEL_COLUMN: &str = ANNUAL_SALES;

/// Every column the input file must provide.
pub fn required_columns() -> impl Iterator<Item = &'static str> {
    CATEGORICAL_COLUMNS.into_iter().chain(NUMERIC_COLUMNS)
}

// ---------------------------------------------------------------------------
// CellValue – a single cell of the table
// ---------------------------------------------------------------------------

/// A loaded cell. Numeric catalogue columns hold `Number`, everything else
/// stays `Text`; empty or unparsable cells are `Null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Number(f64),
    Text(String),
}

// -- Manual Eq/Ord so CellValue can key a BTreeMap --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn rank(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Number(_) => 1,
                Text(_) => 2,
            }
        }
        match (self, other) {
            (Number(a), Number(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => rank(self).cmp(&rank(other)),
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::Text(s) => s.hash(state),
            CellValue::Number(f) => f.to_bits().hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Number(v) => write!(f, "{v}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Raw text cell: empty strings become `Null`.
    pub fn text(s: &str) -> Self {
        if s.is_empty() {
            CellValue::Null
        } else {
            CellValue::Text(s.to_string())
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Text shown in the table widget; nulls render as blank cells.
    pub fn display_cell(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            other => other.to_string(),
        }
    }
}

/// Cast a cell to a double. Surrounding whitespace is ignored; anything that
/// does not parse, and `NaN` / infinities, become `Null` instead of failing
/// the load.
pub fn coerce_numeric(value: &CellValue) -> CellValue {
    let parsed = match value {
        CellValue::Number(v) => Some(*v),
        CellValue::Text(s) => s.trim().parse::<f64>().ok(),
        CellValue::Null => None,
    };
    match parsed {
        Some(v) if v.is_finite() => CellValue::Number(v),
        _ => CellValue::Null,
    }
}

// ---------------------------------------------------------------------------
// Schema / Record / Dataset
// ---------------------------------------------------------------------------

/// Header names in input order plus a name lookup.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    names: Vec<String>,
    index: BTreeMap<String, usize>,
}

impl Schema {
    pub fn new(names: Vec<String>) -> Self {
        let index = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), i))
            .collect();
        Schema { names, index }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Catalogue columns absent from this schema.
    pub fn missing_required(&self) -> Vec<&'static str> {
        required_columns()
            .filter(|c| self.index_of(c).is_none())
            .collect()
    }
}

/// One row, aligned with the dataset schema.
pub type Record = Vec<CellValue>;

/// The full loaded table.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub schema: Schema,
    pub records: Vec<Record>,
}

impl Dataset {
    /// Build a dataset and cast the numeric catalogue columns.
    pub fn from_records(headers: Vec<String>, records: Vec<Record>) -> Self {
        let mut dataset = Dataset {
            schema: Schema::new(headers),
            records,
        };
        dataset.coerce_numeric_columns();
        dataset
    }

    fn coerce_numeric_columns(&mut self) {
        let indices: Vec<usize> = NUMERIC_COLUMNS
            .iter()
            .filter_map(|c| self.schema.index_of(c))
            .collect();
        for record in &mut self.records {
            for &i in &indices {
                if let Some(cell) = record.get_mut(i) {
                    *cell = coerce_numeric(cell);
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coercion_turns_garbage_into_null() {
        assert_eq!(coerce_numeric(&CellValue::text(" 42.5 ")), CellValue::Number(42.5));
        assert_eq!(coerce_numeric(&CellValue::text("n/a")), CellValue::Null);
        assert_eq!(coerce_numeric(&CellValue::Null), CellValue::Null);
    }

    #[test]
    fn non_finite_numbers_become_null() {
        for raw in ["NaN", "inf", "-Infinity", "infinity"] {
            assert_eq!(coerce_numeric(&CellValue::text(raw)), CellValue::Null, "{raw}");
        }
        assert_eq!(coerce_numeric(&CellValue::Number(f64::NAN)), CellValue::Null);
        assert_eq!(coerce_numeric(&CellValue::Number(f64::INFINITY)), CellValue::Null);
    }

    #[test]
    fn only_numeric_catalogue_columns_are_cast() {
        let headers = vec![GENDER.to_string(), YEARLY_INCOME.to_string(), "Zip".to_string()];
        let ds = Dataset::from_records(
            headers,
            vec![vec![CellValue::text("F"), CellValue::text("100"), CellValue::text("12345")]],
        );
        assert_eq!(ds.records[0][0], CellValue::Text("F".into()));
        assert_eq!(ds.records[0][1], CellValue::Number(100.0));
        assert_eq!(ds.records[0][2], CellValue::Text("12345".into()));
    }

    #[test]
    fn null_sorts_first() {
        let mut v = vec![
            CellValue::Text("b".into()),
            CellValue::Null,
            CellValue::Number(1.0),
            CellValue::Text("a".into()),
        ];
        v.sort();
        assert_eq!(
            v,
            vec![
                CellValue::Null,
                CellValue::Number(1.0),
                CellValue::Text("a".into()),
                CellValue::Text("b".into()),
            ]
        );
    }

    #[test]
    fn missing_required_columns_are_reported() {
        let schema = Schema::new(vec![GENDER.to_string()]);
        let missing = schema.missing_required();
        assert!(missing.contains(&MARITAL_STATUS));
        assert!(!missing.contains(&GENDER));
    }
}
