use std::path::PathBuf;

use clap::Parser;
use log::info;
use triage::{build_router, AppState, ArtifactStore, TokenConfig};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to bind the HTTP server to
    #[arg(short, long, default_value = "0.0.0.0:8000")]
    listen: String,

    /// Directory holding the trained model artifacts
    #[arg(short, long)]
    model_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let store = match args.model_dir {
        Some(dir) => ArtifactStore::new(dir)?,
        None => ArtifactStore::new_default()?,
    };

    // Fail fast: a server with missing or corrupt artifacts must not accept
    // traffic.
    info!("Loading model artifacts from {:?}", store.model_dir());
    let pipeline = store.load()?;
    let pipeline_info = pipeline.info();
    info!(
        "Pipeline ready: {} features, classes {:?}",
        pipeline_info.num_features, pipeline_info.class_labels
    );

    let state = AppState::new(pipeline, TokenConfig::from_env());
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&args.listen).await?;
    info!("triage-server listening on {}", args.listen);
    axum::serve(listener, app).await?;

    Ok(())
}
