use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use drift_core::config::AppConfig;
use drift_io::DriftConfig;
use drift_lib::experiment::{apply_tick_budget, default_drift_config, run_experiment};
use drift_lib::render::{render_outcome, render_windows};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Pretrain the model pair and run the coupling benchmark
    Run {
        /// Benchmark settings; defaults apply when the file is missing
        #[arg(short, long, default_value = "drift.toml")]
        config: PathBuf,

        /// Drift config with models and links; the built-in pair when omitted
        #[arg(short, long)]
        drift: Option<PathBuf>,

        /// Run for this many ticks instead of wall-clock time
        #[arg(long)]
        ticks: Option<u64>,

        /// Window size in ticks when --ticks is set
        #[arg(long, default_value_t = 500)]
        window_ticks: u64,

        /// Run all four capability combinations
        #[arg(long)]
        matrix: bool,

        /// Run configurations on the rayon pool
        #[arg(long)]
        parallel: bool,

        /// Print per-window metrics
        #[arg(short, long)]
        verbose: bool,

        /// Write the JSON run report here
        #[arg(short, long)]
        report: Option<PathBuf>,
    },
    /// Write the built-in drift config to a file
    Init {
        #[arg(short, long, default_value = "drift_config.json")]
        output: PathBuf,
    },
}

fn load_app_config(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        tracing::info!(path = ?path, "No config file, using defaults");
        return Ok(AppConfig::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    AppConfig::from_toml(&content).with_context(|| format!("parsing {}", path.display()))
}

fn main() -> Result<()> {
    drift_core::init_logging();
    let args = Args::parse();

    match args.command {
        Command::Init { output } => {
            let drift = default_drift_config()?;
            drift.save_to_file(&output)?;
            println!(
                "Wrote {} ({} models, {} links) to {}",
                drift.name,
                drift.models.len(),
                drift.links().len(),
                output.display()
            );
        }
        Command::Run {
            config,
            drift,
            ticks,
            window_ticks,
            matrix,
            parallel,
            verbose,
            report,
        } => {
            let mut app = load_app_config(&config)?;
            if let Some(ticks) = ticks {
                apply_tick_budget(&mut app, ticks, window_ticks);
            }
            app.benchmark.matrix |= matrix;
            app.benchmark.parallel |= parallel;

            let (drift_config, drift_name) = match &drift {
                Some(path) => (
                    DriftConfig::load_from_file(path)
                        .with_context(|| format!("loading {}", path.display()))?,
                    path.display().to_string(),
                ),
                None => (default_drift_config()?, "built-in".to_string()),
            };

            let outcome = run_experiment(&app, &drift_config)?;
            let run_report = outcome.report(&app, &drift_name);

            if verbose {
                for r in &outcome.suite.results {
                    print!("{}", render_windows(r));
                }
                println!();
            }
            print!("{}", render_outcome(&outcome, &run_report));

            if let Some(path) = report {
                run_report.save_to_file(&path)?;
                println!("Report {} written to {}", run_report.run_id, path.display());
            }
        }
    }

    Ok(())
}
