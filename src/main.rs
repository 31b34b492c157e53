//! ecosim - CLI Entry Point
//!
//! Three-species predator-prey population dynamics.

use clap::{Parser, Subcommand, ValueEnum};
use ecosim::export::{ExportFormat, ExportSystem};
use ecosim::{benchmark, Config, Perturber, Rk4Integrator, Species, TrajectorySummary};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "ecosim")]
#[command(version)]
#[command(about = "Prey / lower predator / apex predator population dynamics with RK4")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Csv,
}

impl From<Format> for ExportFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Json => ExportFormat::Json,
            Format::Csv => ExportFormat::Csv,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation
    Run {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Write the trajectory to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (defaults to the output file extension)
        #[arg(short, long, value_enum)]
        format: Option<Format>,

        /// Jitter every parameter log-normally before running
        #[arg(long)]
        randomize: bool,

        /// Random seed for --randomize
        #[arg(long)]
        seed: Option<u64>,

        /// Quiet mode (minimal output)
        #[arg(short, long)]
        quiet: bool,
    },

    /// Generate default configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "config.yaml")]
        output: PathBuf,
    },

    /// Write a log-normally jittered copy of a configuration
    Randomize {
        /// Configuration file to jitter
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Output path
        #[arg(short, long)]
        output: PathBuf,

        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Run performance benchmark
    Benchmark {
        /// Number of runs of the configured scenario
        #[arg(short, long, default_value = "1000")]
        runs: u32,

        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,
    },
}

impl Commands {
    /// Configuration file the command reads, if any
    fn config_path(&self) -> Option<&Path> {
        match self {
            Commands::Run { config, .. }
            | Commands::Randomize { config, .. }
            | Commands::Benchmark { config, .. } => Some(config),
            Commands::Init { .. } => None,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Config is read before logging starts so its log level applies
    let config_path = cli.command.config_path().map(Path::to_path_buf);
    let loaded = read_config(config_path.as_deref())?;
    let log_level = log_filter(loaded.as_ref());

    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    match &config_path {
        Some(path) if loaded.is_some() => log::info!("Loaded config from: {:?}", path),
        Some(_) => log::info!("Using default configuration"),
        None => {}
    }
    let config = loaded.unwrap_or_default();

    match cli.command {
        Commands::Run {
            output,
            format,
            randomize,
            seed,
            quiet,
            ..
        } => run_simulation(config, output, format, randomize, seed, quiet),

        Commands::Init { output } => generate_config(output),

        Commands::Randomize { output, seed, .. } => randomize_config(config, output, seed),

        Commands::Benchmark { runs, .. } => run_benchmark(runs, config),
    }
}

/// Parse the config file if the command names one that exists
fn read_config(path: Option<&Path>) -> Result<Option<Config>, Box<dyn std::error::Error>> {
    match path {
        Some(path) if path.exists() => Ok(Some(Config::from_file(path)?)),
        _ => Ok(None),
    }
}

fn log_filter(config: Option<&Config>) -> &str {
    config.map_or("info", |config| config.logging.log_level.as_str())
}

fn perturber(seed: Option<u64>) -> Perturber {
    match seed {
        Some(s) => Perturber::new_with_seed(s),
        None => Perturber::new(),
    }
}

fn run_simulation(
    mut config: Config,
    output: Option<PathBuf>,
    format: Option<Format>,
    randomize: bool,
    seed: Option<u64>,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if randomize {
        let mut p = perturber(seed);
        println!("Randomizing parameters (seed {})", p.seed());
        let request = p.jitter_request(&config.request());
        config = config.with_request(request);
    }

    let (sim_config, initial) = config.scenario()?;
    let names = config.simulation.names.clone();

    if !quiet {
        println!("Starting simulation");
        println!("  {}: {}", names.prey, initial.prey);
        println!("  {}: {}", names.lower_predator, initial.lower_predator);
        println!("  {}: {}", names.apex_predator, initial.apex_predator);
        println!(
            "  Horizon: {} in {} steps of {}",
            sim_config.horizon(),
            sim_config.step_count(),
            sim_config.step_size()
        );
        println!();
    }

    let start = Instant::now();
    let trajectory = Rk4Integrator::new(config.safety.limits()).run(&sim_config, initial)?;
    let elapsed = start.elapsed();

    let summary = TrajectorySummary::from_trajectory(&trajectory);
    println!("=== Simulation Complete ===");
    println!("Time: {:.3}ms", elapsed.as_secs_f64() * 1000.0);
    println!("{}", summary.summary());

    if !quiet {
        for (species, name) in Species::ALL.into_iter().zip(names.as_array()) {
            let stats = summary.get(species);
            println!(
                "  {:<12} final {:>10.2} | min {:>10.2} | max {:>10.2} at t={:.2}{}",
                name,
                stats.final_value,
                stats.min,
                stats.max,
                stats.peak_time,
                if stats.extinct { " | extinct" } else { "" }
            );
        }
    }

    if let Some(path) = output {
        let format = format
            .map(ExportFormat::from)
            .unwrap_or_else(|| ExportFormat::from_path(&path));
        ExportSystem::export(&trajectory, Some(&names), format, &path)?;
        println!("Trajectory: {:?}", path);
    }

    Ok(())
}

fn generate_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    config.save(&output)?;
    println!("Configuration saved to: {:?}", output);
    Ok(())
}

fn randomize_config(
    config: Config,
    output: PathBuf,
    seed: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut p = perturber(seed);
    let request = p.jitter_request(&config.request());
    let jittered = config.with_request(request);

    if let Err(e) = jittered.validate() {
        log::warn!("Randomized configuration does not validate: {}", e);
    }

    jittered.save(&output)?;
    println!("Randomized configuration (seed {}) saved to: {:?}", p.seed(), output);
    Ok(())
}

fn run_benchmark(runs: u32, config: Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== ecosim Benchmark ===");
    println!("Runs: {}", runs);
    println!();

    let result = benchmark(&config.request(), runs)?;
    println!("{}", result);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path_per_command() {
        let cli = Cli::try_parse_from(["ecosim", "run", "-c", "scenario.yaml"]).unwrap();
        assert_eq!(cli.command.config_path(), Some(Path::new("scenario.yaml")));

        let cli = Cli::try_parse_from(["ecosim", "benchmark"]).unwrap();
        assert_eq!(cli.command.config_path(), Some(Path::new("config.yaml")));

        let cli = Cli::try_parse_from(["ecosim", "init"]).unwrap();
        assert_eq!(cli.command.config_path(), None);
    }

    #[test]
    fn test_config_log_level_read_before_logging() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let mut config = Config::default();
        config.logging.log_level = "debug".to_string();
        config.save(&path).unwrap();

        let arg = path.to_string_lossy().into_owned();
        let cli = Cli::try_parse_from(["ecosim", "run", "--config", arg.as_str()]).unwrap();
        let loaded = read_config(cli.command.config_path()).unwrap();
        assert_eq!(log_filter(loaded.as_ref()), "debug");

        let missing = dir.path().join("missing.yaml");
        let loaded = read_config(Some(&missing)).unwrap();
        assert!(loaded.is_none());
        assert_eq!(log_filter(loaded.as_ref()), "info");
    }
}
