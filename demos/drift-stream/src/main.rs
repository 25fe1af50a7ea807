//! DEDSTA drift demo
//!
//! Streams a synthetic signal through the estimator: a stationary phase,
//! a linear trend, then a new stationary level. Every `--query-every`
//! observations it prints the estimated nonstationarity, the adapted
//! reservoir size and where the density peaks.

use anyhow::Context;
use clap::Parser;
use colored::*;
use dedsta::{DedstaConfig, DensityEstimator, EvaluationReport};
use dedsta_stats::{linspace, Kernel, MIN_OBSERVATIONS};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Grid resolution for density queries.
const GRID_POINTS: usize = 201;

/// DEDSTA drift demo CLI
#[derive(Parser)]
#[command(name = "drift-stream")]
#[command(about = "Stream a drifting signal through the DEDSTA estimator", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "DEDSTA_CONFIG")]
    config: Option<String>,

    /// Number of observations to generate
    #[arg(short = 'n', long, default_value_t = 3000)]
    observations: usize,

    /// Query the density every N observations
    #[arg(short, long, default_value_t = 250)]
    query_every: usize,

    /// Mean change per observation during the trend phase
    #[arg(short, long, default_value_t = 0.01)]
    slope: f64,

    /// Noise standard deviation
    #[arg(long, default_value_t = 1.0)]
    noise: f64,

    /// RNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Kernel override, e.g. `epa`
    #[arg(short, long)]
    kernel: Option<Kernel>,

    /// Log level
    #[arg(long, env = "DEDSTA_LOG_LEVEL")]
    log_level: Option<String>,
}

/// Piecewise mean: flat, then trending, then flat at the new level.
fn true_mean(t: usize, total: usize, slope: f64) -> f64 {
    let first = total / 3;
    let second = 2 * total / 3;
    if t < first {
        0.0
    } else if t < second {
        slope * (t - first) as f64
    } else {
        slope * (second - first) as f64
    }
}

fn nu_label(nu: f64) -> ColoredString {
    let text = format!("{:.3}", nu);
    if nu < 0.3 {
        text.green()
    } else if nu < 0.6 {
        text.yellow()
    } else {
        text.red().bold()
    }
}

fn print_report(t: usize, mean: f64, grid: &[Vec<f64>], report: &EvaluationReport) {
    let (peak_at, peak) = report
        .densities
        .iter()
        .enumerate()
        .fold((0, f64::MIN), |best, (i, &d)| if d > best.1 { (i, d) } else { best });
    let mode = grid.get(peak_at).map(|p| p[0]).unwrap_or(f64::NAN);
    println!(
        "{:>7}  {:>8.3}  {}  {:>5}  {:>8.3}  {:>7.4}",
        t,
        mean,
        nu_label(report.nonstationarity),
        report.reservoir_size,
        mode,
        peak
    );
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = DedstaConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if let Some(kernel) = cli.kernel {
        config.density.kernel = kernel;
    }

    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.logging.level.clone().into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut estimator =
        DensityEstimator::from_config(&config).context("building the estimator")?;
    let mut rng = StdRng::seed_from_u64(cli.seed);
    let noise = Normal::new(0.0, cli.noise).context("invalid noise level")?;
    let query_every = cli.query_every.max(1);

    println!("{}", "DEDSTA drift stream".cyan().bold());
    println!(
        "  reservoir {}..={}  window {}  kernel {}  modules {:?}",
        config.reservoir.min_size,
        config.reservoir.max_size,
        config.nonstationarity.window_size,
        config.density.kernel,
        estimator.module_names()
    );
    println!();
    println!(
        "{}",
        "      t      mean     ν      size      mode     peak".bold()
    );

    for t in 0..cli.observations {
        let mean = true_mean(t, cli.observations, cli.slope);
        let value = mean + noise.sample(&mut rng);
        estimator.update(&[value])?;

        let seen = t + 1;
        if seen % query_every != 0 || seen < MIN_OBSERVATIONS {
            continue;
        }

        let points = estimator.reservoir().points();
        let (lo, hi) = points
            .iter()
            .fold((f64::MAX, f64::MIN), |(lo, hi), p| (lo.min(p[0]), hi.max(p[0])));
        let pad = 4.0 * cli.noise.max(1.0);
        let grid = linspace(lo - pad, hi + pad, GRID_POINTS);

        match estimator.evaluate_report(&grid) {
            Ok(report) => print_report(seen, mean, &grid, &report),
            Err(e) => warn!(observations = seen, error = %e, "query failed"),
        }
    }

    info!(
        observations = estimator.observations_seen(),
        "stream finished"
    );
    println!();
    println!("{}", "Done.".green().bold());
    Ok(())
}
