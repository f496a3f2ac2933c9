/// Chart pipeline: filter → aggregate → model → chart bundle.
///
/// [`charts::render`] is a pure function of the dataset, the filter
/// selection and [`PipelineOptions`]; the UI calls it again whenever a
/// selector changes.

pub mod aggregate;
pub mod charts;
pub mod regression;

/// Bin count for the income histogram.
pub const DEFAULT_HISTOGRAM_BINS: usize = 20;
/// L2 strength for the sales model.
pub const DEFAULT_REG_PARAM: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineOptions {
    pub histogram_bins: usize,
    pub reg_param: f64,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
            reg_param: DEFAULT_REG_PARAM,
        }
    }
}
