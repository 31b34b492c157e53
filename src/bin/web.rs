//! HTTP entry point for ecosim.
//!
//! Run with: cargo run --features web --bin ecosim-web
//!
//! Then POST `{ "state": ..., "populations": [...] }` to
//! http://127.0.0.1:8080/simulateEcosystem

use clap::Parser;
use ecosim::{web::run_server, Config};
use std::net::SocketAddr;

#[derive(Parser)]
#[command(name = "ecosim-web")]
#[command(about = "ecosim HTTP server - three-species population dynamics over JSON")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Address to bind the server to
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    bind: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = load_config(&args.config);

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.log_level.as_str()),
    )
    .init();

    let bind: SocketAddr = args
        .bind
        .parse()
        .map_err(|e| format!("Invalid bind address '{}': {}", args.bind, e))?;

    run_server(config, bind).await
}

/// Load configuration from file or use default
fn load_config(config_path: &str) -> Config {
    match Config::from_file(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Using default configuration ({}: {})", config_path, e);
            Config::default()
        }
    }
}
