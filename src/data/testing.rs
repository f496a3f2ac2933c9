//! Shared fixtures for unit tests.

use super::model::*;

pub const HEADERS: [&str; 11] = [
    MARITAL_STATUS,
    GENDER,
    EDUCATION,
    YEARLY_INCOME,
    TOTAL_CHILDREN,
    CHILDREN_AT_HOME,
    CARS_OWNED,
    ANNUAL_SALES,
    MIN_PAYMENT,
    ANNUAL_REVENUE,
    HOUSE_OWNER,
];

pub const ROWS: [[&str; 11]; 4] = [
    ["M", "F", "Graduate Degree", "40000", "2", "1", "1", "1200", "50", "30000", "1"],
    ["M", "M", "Bachelors", "60000", "3", "0", "2", "1900", "75", "45000", "0"],
    ["S", "F", "High School", "30000", "0", "0", "0", "800", "25", "20000", "0"],
    ["S", "M", "Bachelors", "90000", "1", "1", "3", "2600", "110", "70000", "1"],
];

/// Four customers: two marital statuses, two genders, distinct numbers.
pub fn sample_dataset() -> Dataset {
    let headers = HEADERS.iter().map(|h| h.to_string()).collect();
    let records = ROWS
        .iter()
        .map(|row| row.iter().map(|c| CellValue::text(c)).collect())
        .collect();
    Dataset::from_records(headers, records)
}

/// The same rows as delimited text.
pub fn sample_csv(delimiter: char) -> String {
    let sep = delimiter.to_string();
    let sep = sep.as_str();
    let mut out = HEADERS.join(sep);
    out.push('\n');
    for row in ROWS {
        out.push_str(&row.join(sep));
        out.push('\n');
    }
    out
}
