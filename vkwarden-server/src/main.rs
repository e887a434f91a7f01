use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};
use tracing_log::LogTracer;
use tracing_subscriber::{fmt, EnvFilter};

mod server;

use server::run_server;

#[derive(Parser, Debug, Clone)]
#[command(name = "vkwarden")]
#[command(author, version, about = "VK community conversation moderator")]
pub struct Args {
    /// JSON config file; missing means built-in defaults.
    #[arg(long, default_value = "vkwarden.json")]
    pub config: PathBuf,

    /// Overrides `group_id` from the config file.
    #[arg(long)]
    pub group_id: Option<u64>,

    /// Overrides `reference_community` from the config file.
    #[arg(long)]
    pub reference_community: Option<String>,

    /// Overrides `reconcile_interval_secs` from the config file.
    #[arg(long)]
    pub reconcile_interval: Option<u64>,

    /// Alternative VK API root, e.g. a local stub.
    #[arg(long)]
    pub api_base: Option<String>,
}

fn init_tracing() {
    // Route `log` records from dependencies (reqwest, hyper) through tracing.
    if let Err(e) = LogTracer::init() {
        eprintln!("log bridge already installed: {e}");
    }
    let filter = EnvFilter::from_default_env()
        .add_directive("vkwarden=info".parse().unwrap_or_default())
        .add_directive("vkwarden_core=info".parse().unwrap_or_default());
    let sub = fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(sub)
        .expect("Failed to set global subscriber");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    init_tracing();
    let args = Args::parse();
    info!("vkwarden starting. config={}", args.config.display());

    if let Err(e) = run_server(args).await {
        error!("Server error: {:?}", e);
        std::process::exit(1);
    }
    Ok(())
}
