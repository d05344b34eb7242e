//! hems-sim entry point: CLI wiring and config-driven Monte Carlo run.

use std::io;
use std::path::Path;
use std::process;

use tracing::info;
use tracing_subscriber::EnvFilter;

use hems_sim::cli::{self, CliOptions};
use hems_sim::config::HemsConfig;
use hems_sim::dataset::discover_csv_files;
use hems_sim::evaluator::RuleBasedEvaluator;
use hems_sim::HemsError;
use hems_sim::evaluator::WeeklyCostEvaluator;
use hems_sim::io::export::{export_histograms_csv, export_samples_csv, export_scenarios_csv};
use hems_sim::monte_carlo::{MonteCarloDriver, MonteCarloReport};

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Resolves the configuration: `--config` first, then `--preset`, then baseline.
fn load_config(cli: &CliOptions) -> HemsConfig {
    let loaded = if let Some(ref path) = cli.config {
        HemsConfig::from_toml_file(path)
    } else if let Some(ref name) = cli.preset {
        HemsConfig::from_preset(name)
    } else {
        Ok(HemsConfig::baseline())
    };

    let mut config = loaded.unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });

    if let Some(seed) = cli.seed {
        config.monte_carlo.seed = seed;
    }
    if let Some(bins) = cli.bins {
        config.monte_carlo.histogram_bins = bins;
    }
    if let Some(ref dir) = cli.data_dir {
        config.dataset.dir = dir.clone();
    }
    config
}

fn main() {
    let cli = cli::parse_args().unwrap_or_else(|e| {
        eprintln!("error: {e}");
        cli::print_usage();
        process::exit(2);
    });
    if cli.help {
        cli::print_usage();
        return;
    }

    init_tracing();

    let config = load_config(&cli);
    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    let evaluator = RuleBasedEvaluator::from_config(&config);
    let mut driver = MonteCarloDriver::from_config(&config, evaluator).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        process::exit(1);
    });

    let files = discover_csv_files(&config.dataset.dir, config.monte_carlo.max_datasets)
        .unwrap_or_else(|e| {
            eprintln!(
                "error: cannot list datasets in \"{}\": {e}",
                config.dataset.dir.display()
            );
            process::exit(1);
        });
    info!(count = files.len(), dir = %config.dataset.dir.display(), "datasets found");

    let report = driver.run_paths(&files, &config.dataset).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        process::exit(1);
    });

    println!("{report}");

    if let Err(e) = write_outputs(&cli, &mut driver, &report) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

/// Writes every export requested on the command line.
fn write_outputs<E: WeeklyCostEvaluator>(
    cli: &CliOptions,
    driver: &mut MonteCarloDriver<E>,
    report: &MonteCarloReport,
) -> Result<(), HemsError> {
    if let Some(ref path) = cli.samples_out {
        export_samples_csv(&report.costs, path).map_err(export_error(path))?;
        info!(path = %path.display(), "cost samples written");
    }

    if let Some(ref path) = cli.histogram_out {
        export_histograms_csv(&report.costs, report.histogram_bins, path)
            .map_err(export_error(path))?;
        info!(path = %path.display(), bins = report.histogram_bins, "histograms written");
    }

    // Sampled after the run; cost samples do not depend on this flag.
    if let Some(ref path) = cli.scenario_out {
        let (weekday, weekend) = driver.sample_scenarios();
        export_scenarios_csv(&weekday, &weekend, path).map_err(export_error(path))?;
        info!(path = %path.display(), "scenario written");
    }
    Ok(())
}

fn export_error(path: &Path) -> impl FnOnce(io::Error) -> HemsError + '_ {
    move |source| HemsError::Export {
        path: path.to_path_buf(),
        source,
    }
}
