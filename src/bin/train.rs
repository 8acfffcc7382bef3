//! Fits the tf-idf vectorizer and linear classifier on a labeled dataset and
//! saves both artifacts (plus their digest manifest) for the server to load.

use std::path::PathBuf;

use clap::Parser;
use log::info;
use triage::classifier::ArtifactStore;
use triage::data::read_csv;
use triage::train::{train, TrainConfig};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Labeled dataset CSV (id,text,label)
    #[arg(short, long, default_value = "data/raw.csv")]
    data: PathBuf,

    /// Directory to write the model artifacts to
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Vocabulary size cap
    #[arg(long, default_value_t = triage::classifier::DEFAULT_MAX_FEATURES)]
    max_features: usize,

    /// Training iteration budget
    #[arg(long, default_value_t = 1000)]
    epochs: usize,

    /// Seed for the train/test split and shuffling
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let records = read_csv(&args.data)?;
    info!("Loaded {} rows from {}", records.len(), args.data.display());

    let cfg = TrainConfig {
        max_features: args.max_features,
        epochs: args.epochs,
        seed: args.seed,
        ..TrainConfig::default()
    };
    let (pipeline, report) = train(&records, &cfg)?;
    println!("{}", report);

    let store = match args.model_dir {
        Some(dir) => ArtifactStore::new(dir)?,
        None => ArtifactStore::new_default()?,
    };
    store.save(&pipeline)?;
    println!("Model and vectorizer saved in {}", store.model_dir().display());
    Ok(())
}
