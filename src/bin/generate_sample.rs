//! Writes a synthetic customer table with every column the dashboard reads.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

#[derive(Parser, Debug)]
#[command(about = "Generate sample customer data for the dashboard")]
struct Args {
    /// Output CSV path
    #[arg(short, long, default_value = "joined_df3.csv")]
    output: PathBuf,

    /// Number of customers
    #[arg(short, long, default_value_t = 500)]
    rows: usize,

    /// RNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

const HEADER: [&str; 12] = [
    "CustomerKey",
    "MaritalStatus",
    "Gender",
    "EnglishEducation",
    "YearlyIncome(USD)",
    "TotalChildren",
    "NumberChildrenAtHome",
    "NumberCarsOwned",
    "HouseOwnerFlag",
    "AnnualSales(USD)",
    "MinPaymentAmount(USD)",
    "AnnualRevenue(USD)",
];

/// (education, base income in thousands)
const EDUCATION: [(&str, f64); 5] = [
    ("Partial High School", 30.0),
    ("High School", 40.0),
    ("Partial College", 55.0),
    ("Bachelors", 70.0),
    ("Graduate Degree", 90.0),
];

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = StdRng::seed_from_u64(args.seed);

    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    writer.write_record(HEADER)?;

    for key in 0..args.rows {
        let marital = *["M", "S"].choose(&mut rng).context("empty choice")?;
        let gender = *["M", "F"].choose(&mut rng).context("empty choice")?;
        let (education, base) = *EDUCATION.choose(&mut rng).context("empty choice")?;

        let income = ((base + rng.random_range(-15.0..25.0)) * 1000.0 / 10_000.0).round() * 10_000.0;
        let total_children: u32 = rng.random_range(0..=5);
        let at_home: u32 = rng.random_range(0..=total_children);
        let cars: u32 = rng.random_range(0..=4);
        let house_owner: u32 = u32::from(rng.random_bool(0.65));

        let sales = 0.02 * income + 150.0 * cars as f64 - 80.0 * at_home as f64
            + 300.0 * house_owner as f64
            + rng.random_range(-400.0..400.0);
        let sales = sales.max(0.0).round();
        let min_payment = (sales * rng.random_range(0.03..0.06)).round();
        let revenue = (sales * rng.random_range(20.0..40.0)).round();

        writer.write_record([
            (11_000 + key).to_string(),
            marital.to_string(),
            gender.to_string(),
            education.to_string(),
            income.to_string(),
            total_children.to_string(),
            at_home.to_string(),
            cars.to_string(),
            house_owner.to_string(),
            sales.to_string(),
            min_payment.to_string(),
            revenue.to_string(),
        ])?;
    }
    writer.flush()?;

    println!("Wrote {} customers to {}", args.rows, args.output.display());
    Ok(())
}
