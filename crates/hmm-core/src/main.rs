//! `hmm`: command-line wrapper around the engine's entry points.
//!
//! Payloads are JSON on stdout; logs go to stderr.

use clap::{Args, Parser, Subcommand};
use hmm_core::config::EngineConfig;
use hmm_core::exit_codes::ExitCode;
use hmm_core::logging::{init_logging, LogConfig, LogFormat, LogLevel};
use hmm_core::{scenario, simulate, HmmError, ZeroOccupancyPolicy};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::path::PathBuf;
use tracing::error;

/// Hidden Markov model engine
#[derive(Parser)]
#[command(name = "hmm")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

#[derive(Args, Debug)]
struct GlobalOpts {
    /// Engine config file (TOML)
    #[arg(long, global = true, env = "HMM_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    /// Log format on stderr (human, jsonl)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    /// Pretty-print the JSON payload
    #[arg(long, global = true)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate the reference two-state Gaussian model
    Simulate(SimulateArgs),

    /// Simulate, decode, then re-learn the reference model
    Scenario(ScenarioArgs),
}

#[derive(Args, Debug)]
struct SimulateArgs {
    /// Number of steps
    #[arg(long, default_value_t = 250)]
    length: usize,

    /// RNG seed
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Pin the first latent state
    #[arg(long)]
    initial_state: Option<usize>,
}

#[derive(Args, Debug)]
struct ScenarioArgs {
    /// Number of simulated steps
    #[arg(long, default_value_t = 250)]
    length: usize,

    /// RNG seed
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Override the Baum-Welch iteration limit
    #[arg(long)]
    max_iterations: Option<usize>,

    /// Override the convergence tolerance
    #[arg(long)]
    tolerance: Option<f64>,

    /// Override the zero-occupancy policy (keep_previous, uniform)
    #[arg(long)]
    zero_occupancy: Option<ZeroOccupancyPolicy>,
}

#[derive(Serialize)]
struct ErrorPayload {
    error: String,
    code: &'static str,
    exit_code: i32,
}

fn main() {
    let cli = Cli::parse();

    let config = match EngineConfig::resolve(cli.global.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            init_logging(&LogConfig::default());
            let code = report_error(&cli.global, &HmmError::from(err));
            std::process::exit(code.as_i32());
        }
    };

    let log_config = config
        .log
        .clone()
        .with_overrides(cli.global.log_level, cli.global.log_format);
    init_logging(&log_config);

    let exit_code = match &cli.command {
        Commands::Simulate(args) => run_simulate(&cli.global, args),
        Commands::Scenario(args) => run_scenario(&cli.global, &config, args),
    };
    std::process::exit(exit_code.as_i32());
}

fn run_simulate(global: &GlobalOpts, args: &SimulateArgs) -> ExitCode {
    let result = scenario::reference_model().and_then(|model| {
        let mut rng = StdRng::seed_from_u64(args.seed);
        simulate(&model, args.length, args.initial_state, &mut rng)
    });
    match result {
        Ok(trajectory) => emit(global, &trajectory),
        Err(err) => report_error(global, &err),
    }
}

fn run_scenario(global: &GlobalOpts, config: &EngineConfig, args: &ScenarioArgs) -> ExitCode {
    let mut fit_config = config.fit;
    if let Some(n) = args.max_iterations {
        fit_config.max_iterations = n;
    }
    if let Some(tol) = args.tolerance {
        fit_config.tolerance = tol;
    }
    if let Some(policy) = args.zero_occupancy {
        fit_config.zero_occupancy = policy;
    }

    match scenario::run(args.length, args.seed, &fit_config) {
        Ok(report) => emit(global, &report),
        Err(err) => report_error(global, &err),
    }
}

fn emit<T: Serialize>(global: &GlobalOpts, payload: &T) -> ExitCode {
    let rendered = if global.pretty {
        serde_json::to_string_pretty(payload)
    } else {
        serde_json::to_string(payload)
    };
    match rendered {
        Ok(json) => {
            println!("{}", json);
            ExitCode::Ok
        }
        Err(err) => {
            error!(error = %err, "failed to serialize payload");
            ExitCode::IoError
        }
    }
}

fn report_error(global: &GlobalOpts, err: &HmmError) -> ExitCode {
    let code = ExitCode::from(err);
    error!(error = %err, code = code.code_name(), "command failed");
    let payload = ErrorPayload {
        error: err.to_string(),
        code: code.code_name(),
        exit_code: code.as_i32(),
    };
    // the payload's own exit code is already decided
    let _ = emit(global, &payload);
    code
}
