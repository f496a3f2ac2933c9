//! Command-line configuration.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;

use crate::data::filter::{FilterChoice, FilterSelection};
use crate::data::loader::LoadOptions;
use crate::pipeline::{PipelineOptions, DEFAULT_HISTOGRAM_BINS, DEFAULT_REG_PARAM};

/// Customer dashboard: filters, descriptive charts and a sales model.
///
/// Examples:
///   customer-dashboard --data joined_df3.csv
///   customer-dashboard --data customers.tsv --bins 40
///   customer-dashboard --export bundle.json --marital-status M --gender F
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Input table (.csv, .tsv, .txt, .json, .parquet)
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "joined_df3.csv",
        env = "DASHBOARD_DATA"
    )]
    pub data: PathBuf,

    /// Field separator for delimited text (defaults to ',' or tab for .tsv)
    #[arg(long, value_name = "CHAR")]
    pub delimiter: Option<char>,

    /// Number of bins in the income histogram
    #[arg(long, value_name = "N", default_value_t = DEFAULT_HISTOGRAM_BINS, value_parser = parse_bins)]
    pub bins: usize,

    /// L2 regularization strength of the sales model
    #[arg(long, value_name = "LAMBDA", default_value_t = DEFAULT_REG_PARAM, value_parser = parse_reg_param)]
    pub reg_param: f64,

    /// Write the chart bundle as JSON to FILE and exit instead of opening a window
    #[arg(long, value_name = "FILE")]
    pub export: Option<PathBuf>,

    /// Marital status filter used with --export ("All" for no constraint)
    #[arg(long, default_value = "All", requires = "export")]
    pub marital_status: String,

    /// Gender filter used with --export ("All" for no constraint)
    #[arg(long, default_value = "All", requires = "export")]
    pub gender: String,
}

impl Args {
    pub fn load_options(&self) -> Result<LoadOptions> {
        let delimiter = match self.delimiter {
            None => None,
            Some(c) if c.is_ascii() => Some(c as u8),
            Some(c) => bail!("delimiter must be a single ASCII character, got '{c}'"),
        };
        Ok(LoadOptions { delimiter })
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            histogram_bins: self.bins,
            reg_param: self.reg_param,
        }
    }

    pub fn selection(&self) -> FilterSelection {
        FilterSelection {
            marital_status: FilterChoice::parse(&self.marital_status),
            gender: FilterChoice::parse(&self.gender),
        }
    }
}

fn parse_bins(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("bin count must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

fn parse_reg_param(s: &str) -> Result<f64, String> {
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        Ok(v) => Err(format!("regularization must be finite and non-negative, got {v}")),
        Err(e) => Err(e.to_string()),
    }
}
