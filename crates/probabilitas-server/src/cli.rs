use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "probabilitas-server")]
#[command(
    author,
    version,
    about = "Naive Bayes expert-system API and report server"
)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "PROBABILITAS_CONFIG", default_value = "probabilitas.yaml")]
    pub config: String,

    /// Listen address
    #[arg(short, long)]
    pub listen: Option<String>,

    /// Listen port
    #[arg(short = 'P', long)]
    pub port: Option<u16>,

    /// Snapshot file to load at start and save on shutdown
    #[arg(short, long)]
    pub data_file: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
