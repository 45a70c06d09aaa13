use clap::Parser;

#[derive(Parser)]
pub struct Cli {
    /// Redis store url
    #[arg(short = 's', long, default_value = "redis://localhost:6379")]
    pub redis_store_url: String,

    /// Directory holding the per-package compose override files
    #[arg(short = 'c', long, default_value = "/usr/src/dappnode/DNCORE")]
    pub compose_dir: String,

    /// Networks to reconcile, comma separated (defaults to all)
    #[arg(short = 'n', long, value_delimiter = ',')]
    pub networks: Vec<String>,
}
