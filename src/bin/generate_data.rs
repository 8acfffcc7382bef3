//! Generates synthetic symptom descriptions and triage labels.
//!
//! Writes a CSV with columns `id,text,label`; labels are self-monitor,
//! doctor, urgent-care and emergency.

use std::path::PathBuf;

use clap::Parser;
use log::info;
use triage::data::synthetic::{self, Distribution};
use triage::data::{write_csv, ValidationReport};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Total number of rows to generate
    #[arg(short, long, default_value_t = 5000)]
    n: usize,

    /// Output CSV path
    #[arg(short, long, default_value = "data/raw.csv")]
    out: PathBuf,

    /// Random seed
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Class distribution
    #[arg(short, long, default_value = "balanced", value_parser = ["balanced", "realistic"])]
    balance: String,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let distribution = match args.balance.as_str() {
        "realistic" => Distribution::Realistic,
        _ => Distribution::Balanced,
    };

    info!(
        "Generating {} rows ({:?} distribution, seed {})",
        args.n, distribution, args.seed
    );
    let records = synthetic::generate(args.n, distribution, args.seed);

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)?;
    }
    write_csv(&args.out, &records)?;

    println!("Wrote {} rows to {}", records.len(), args.out.display());
    println!("Label distribution after shuffle:");
    print!("{}", ValidationReport::for_records(&records));
    Ok(())
}
