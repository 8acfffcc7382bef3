//! Sanity-checks a labeled dataset CSV: schema, row counts, label balance and
//! missing text values, plus a few sample rows.

use std::path::PathBuf;

use clap::Parser;
use triage::data::{read_csv, ValidationReport};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Labeled dataset CSV (id,text,label)
    #[arg(short, long, default_value = "data/raw.csv")]
    data: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let records = read_csv(&args.data)?;
    print!("{}", ValidationReport::for_records(&records));

    println!("\nSample rows:");
    for record in records.iter().take(5) {
        println!("  {:>5}  {:<14}  {}", record.id, record.label.as_str(), record.text);
    }
    Ok(())
}
