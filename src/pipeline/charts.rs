use serde::Serialize;

use crate::data::filter::FilterSelection;
use crate::data::model::{
    Dataset, ANNUAL_SALES, EDUCATION, GENDER, MARITAL_STATUS, YEARLY_INCOME,
};
use crate::data::table::Table;
use crate::error::PipelineResult;

use super::aggregate::{histogram, AggregateSeries, HistogramBin};
use super::regression::{fit_and_predict, RegressionArtifact};
use super::PipelineOptions;

// ---------------------------------------------------------------------------
// Chart bundle: everything one render pass produces
// ---------------------------------------------------------------------------

/// Rows of the filtered view under the original header names.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TableData {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartKind {
    Histogram { bins: Vec<HistogramBin> },
    Bar { series: AggregateSeries },
    Pie { series: AggregateSeries },
    Scatter { points: Vec<[f64; 2]> },
    Line { points: Vec<[f64; 2]> },
}

impl ChartKind {
    /// Number of plotted marks.
    pub fn len(&self) -> usize {
        match self {
            ChartKind::Histogram { bins } => bins.len(),
            ChartKind::Bar { series } | ChartKind::Pie { series } => series.entries.len(),
            ChartKind::Scatter { points } | ChartKind::Line { points } => points.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    #[serde(flatten)]
    pub kind: ChartKind,
}

impl Chart {
    fn new(title: &str, x_label: &str, y_label: &str, kind: ChartKind) -> Self {
        Chart {
            title: title.to_string(),
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            kind,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ChartBundle {
    pub selection: String,
    pub table: TableData,
    /// Charts in display order.
    pub charts: Vec<Chart>,
    /// Absent when the view was too small to fit a model.
    pub regression: Option<RegressionArtifact>,
}

// ---------------------------------------------------------------------------
// render
// ---------------------------------------------------------------------------

/// Run the whole pipeline for one filter selection.
///
/// Every chart except "Average Yearly Income by Education Level" is computed
/// from the filtered view; that one always uses the full dataset. A
/// regression that cannot be fitted leaves the two prediction charts empty.
pub fn render(
    dataset: &Dataset,
    selection: &FilterSelection,
    options: &PipelineOptions,
) -> PipelineResult<ChartBundle> {
    let view = dataset.filter(selection)?;
    log::info!(
        "rendering {} of {} rows (marital status: {}, gender: {})",
        view.num_rows(),
        dataset.len(),
        selection.marital_status,
        selection.gender
    );
    if view.is_empty() {
        log::warn!("no rows match the current filters; charts will be empty");
    }

    let table = TableData {
        columns: view.schema().names().to_vec(),
        rows: view.to_rows(),
    };

    let income = view.column_f64(YEARLY_INCOME)?;
    let sales = view.column_f64(ANNUAL_SALES)?;

    let income_histogram = Chart::new(
        "Yearly Income Distribution",
        YEARLY_INCOME,
        "count",
        ChartKind::Histogram {
            bins: histogram(&income, options.histogram_bins),
        },
    );

    let marital = Chart::new(
        "Marital Status",
        MARITAL_STATUS,
        "count",
        ChartKind::Bar {
            series: AggregateSeries::from_counts(MARITAL_STATUS, view.group_by_count(MARITAL_STATUS)?),
        },
    );

    let gender = Chart::new(
        "Gender",
        GENDER,
        "count",
        ChartKind::Pie {
            series: AggregateSeries::from_counts(GENDER, view.group_by_count(GENDER)?),
        },
    );

    let income_vs_sales = Chart::new(
        "Yearly Income vs. Annual Sales",
        "Yearly Income In USD",
        "Annual Sales In USD",
        ChartKind::Scatter {
            points: pairs(&income, &sales),
        },
    );

    let income_by_education = Chart::new(
        "Average Yearly Income by Education Level In USD",
        EDUCATION,
        "avg(YearlyIncome(USD))",
        ChartKind::Bar {
            series: AggregateSeries::from_means(
                EDUCATION,
                dataset.group_by_mean(EDUCATION, YEARLY_INCOME)?,
            ),
        },
    );

    let regression = match fit_and_predict(&view, options.reg_param) {
        Ok(artifact) => Some(artifact),
        Err(e) => {
            log::warn!("skipping sales prediction: {e}");
            None
        }
    };
    let predicted: Vec<[f64; 2]> = regression
        .as_ref()
        .map(|r| r.predictions.iter().map(|p| [p.actual, p.predicted]).collect())
        .unwrap_or_default();
    let mut predicted_line = predicted.clone();
    predicted_line.sort_by(|a, b| a[0].total_cmp(&b[0]));

    let prediction_line = Chart::new(
        "Predicted Sales",
        "Annual Sales In USD",
        "Predicted Sales",
        ChartKind::Line {
            points: predicted_line,
        },
    );
    let prediction_scatter = Chart::new(
        "Predicted vs Actual Annual Sales In USD",
        "Annual Sales In USD",
        "Predicted Sales",
        ChartKind::Scatter { points: predicted },
    );

    Ok(ChartBundle {
        selection: format!(
            "MaritalStatus={}, Gender={}",
            selection.marital_status, selection.gender
        ),
        table,
        charts: vec![
            income_histogram,
            marital,
            gender,
            income_vs_sales,
            income_by_education,
            prediction_line,
            prediction_scatter,
        ],
        regression,
    })
}

/// Zip two optional columns, keeping rows where both sides are present.
fn pairs(xs: &[Option<f64>], ys: &[Option<f64>]) -> Vec<[f64; 2]> {
    xs.iter()
        .zip(ys)
        .filter_map(|(x, y)| Some([(*x)?, (*y)?]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::FilterChoice;
    use crate::data::model::CellValue;
    use crate::data::testing::{sample_dataset, HEADERS};

    fn married() -> FilterSelection {
        FilterSelection {
            marital_status: FilterChoice::only("M"),
            gender: FilterChoice::All,
        }
    }

    fn chart<'a>(bundle: &'a ChartBundle, title: &str) -> &'a Chart {
        bundle
            .charts
            .iter()
            .find(|c| c.title == title)
            .unwrap_or_else(|| panic!("no chart titled {title}"))
    }

    #[test]
    fn bundle_has_charts_in_display_order() {
        let ds = sample_dataset();
        let bundle = render(&ds, &FilterSelection::default(), &PipelineOptions::default()).unwrap();
        let kinds: Vec<&str> = bundle
            .charts
            .iter()
            .map(|c| match c.kind {
                ChartKind::Histogram { .. } => "histogram",
                ChartKind::Bar { .. } => "bar",
                ChartKind::Pie { .. } => "pie",
                ChartKind::Scatter { .. } => "scatter",
                ChartKind::Line { .. } => "line",
            })
            .collect();
        assert_eq!(
            kinds,
            vec!["histogram", "bar", "pie", "scatter", "bar", "line", "scatter"]
        );
        assert_eq!(bundle.table.rows.len(), 4);
    }

    #[test]
    fn table_keeps_original_header_names() {
        let ds = sample_dataset();
        let bundle = render(&ds, &married(), &PipelineOptions::default()).unwrap();
        assert_eq!(bundle.table.columns, HEADERS.map(String::from).to_vec());
    }

    #[test]
    fn married_filter_yields_matching_rows_only() {
        let ds = sample_dataset();
        let bundle = render(&ds, &married(), &PipelineOptions::default()).unwrap();
        assert_eq!(bundle.table.rows.len(), 2);
        assert!(bundle.table.rows.iter().all(|r| r[0] == "M"));

        let ChartKind::Bar { series } = &chart(&bundle, "Marital Status").kind else {
            panic!("marital status chart is not a bar chart");
        };
        assert_eq!(series.entries, vec![(CellValue::Text("M".into()), 2.0)]);
    }

    #[test]
    fn counts_sum_to_view_size() {
        let ds = sample_dataset();
        let sel = FilterSelection {
            marital_status: FilterChoice::All,
            gender: FilterChoice::only("F"),
        };
        let bundle = render(&ds, &sel, &PipelineOptions::default()).unwrap();
        let ChartKind::Pie { series } = &chart(&bundle, "Gender").kind else {
            panic!("gender chart is not a pie chart");
        };
        assert_eq!(series.total() as usize, bundle.table.rows.len());
    }

    #[test]
    fn education_means_ignore_filters() {
        let ds = sample_dataset();
        let title = "Average Yearly Income by Education Level In USD";
        let full = render(&ds, &FilterSelection::default(), &PipelineOptions::default()).unwrap();
        let filtered = render(&ds, &married(), &PipelineOptions::default()).unwrap();
        assert_eq!(chart(&full, title), chart(&filtered, title));

        let ChartKind::Bar { series } = &chart(&filtered, title).kind else {
            panic!("education chart is not a bar chart");
        };
        assert_eq!(series.entries.len(), 3);
        assert!(series
            .entries
            .contains(&(CellValue::Text("Bachelors".into()), 75_000.0)));
    }

    #[test]
    fn empty_view_renders_empty_charts() {
        let ds = sample_dataset();
        let sel = FilterSelection {
            marital_status: FilterChoice::only("Widowed"),
            gender: FilterChoice::All,
        };
        let bundle = render(&ds, &sel, &PipelineOptions::default()).unwrap();
        assert!(bundle.table.rows.is_empty());
        assert!(bundle.regression.is_none());
        for c in &bundle.charts {
            if c.title.starts_with("Average Yearly Income") {
                continue;
            }
            assert!(c.kind.is_empty(), "{} should be empty", c.title);
        }
    }

    #[test]
    fn prediction_line_is_sorted_by_actual_sales() {
        let ds = sample_dataset();
        let bundle = render(&ds, &FilterSelection::default(), &PipelineOptions::default()).unwrap();
        let ChartKind::Line { points } = &chart(&bundle, "Predicted Sales").kind else {
            panic!("prediction chart is not a line chart");
        };
        assert_eq!(points.len(), 4);
        assert!(points.windows(2).all(|w| w[0][0] <= w[1][0]));
    }

    #[test]
    fn bundle_serializes_to_json() {
        let ds = sample_dataset();
        let bundle = render(&ds, &married(), &PipelineOptions::default()).unwrap();
        let json = serde_json::to_value(&bundle).unwrap();
        assert_eq!(json["charts"][0]["kind"], "histogram");
        assert_eq!(json["charts"][1]["series"]["entries"][0][0], "M");
        assert_eq!(json["table"]["columns"][0], "MaritalStatus");
    }
}
