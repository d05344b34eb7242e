use std::env;
use std::path::PathBuf;

/// Parsed command-line options.
#[derive(Debug, Default)]
pub struct CliOptions {
    pub config: Option<PathBuf>,
    pub preset: Option<String>,
    pub seed: Option<u64>,
    pub data_dir: Option<PathBuf>,
    pub samples_out: Option<PathBuf>,
    pub scenario_out: Option<PathBuf>,
    pub histogram_out: Option<PathBuf>,
    pub bins: Option<usize>,
    pub help: bool,
}

/// Parses the process arguments.
///
/// # Errors
///
/// Returns a message describing the first invalid argument.
pub fn parse_args() -> Result<CliOptions, String> {
    parse_args_from(env::args().skip(1).collect())
}

pub fn parse_args_from(args: Vec<String>) -> Result<CliOptions, String> {
    let mut opts = CliOptions::default();
    let mut i = 0usize;

    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                let path = args.next_or_err(
                    i,
                    "missing value for --config (expected a TOML file path)",
                )?;
                set_once(&mut opts.config, PathBuf::from(path), "--config")?;
            }
            "--preset" => {
                i += 1;
                let name = args.next_or_err(
                    i,
                    "missing value for --preset (expected a preset name)",
                )?;
                set_once(&mut opts.preset, name.to_string(), "--preset")?;
            }
            "--seed" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --seed (expected a u64)")?;
                let seed = raw
                    .parse::<u64>()
                    .map_err(|_| format!("--seed value \"{raw}\" is not a valid u64"))?;
                set_once(&mut opts.seed, seed, "--seed")?;
            }
            "--data-dir" => {
                i += 1;
                let path = args.next_or_err(
                    i,
                    "missing value for --data-dir (expected a directory)",
                )?;
                set_once(&mut opts.data_dir, PathBuf::from(path), "--data-dir")?;
            }
            "--samples-out" => {
                i += 1;
                let path = args.next_or_err(
                    i,
                    "missing value for --samples-out (expected a file path)",
                )?;
                set_once(&mut opts.samples_out, PathBuf::from(path), "--samples-out")?;
            }
            "--scenario-out" => {
                i += 1;
                let path = args.next_or_err(
                    i,
                    "missing value for --scenario-out (expected a file path)",
                )?;
                set_once(&mut opts.scenario_out, PathBuf::from(path), "--scenario-out")?;
            }
            "--histogram-out" => {
                i += 1;
                let path = args.next_or_err(
                    i,
                    "missing value for --histogram-out (expected a file path)",
                )?;
                set_once(&mut opts.histogram_out, PathBuf::from(path), "--histogram-out")?;
            }
            "--bins" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --bins (expected a count)")?;
                let bins = raw
                    .parse::<usize>()
                    .ok()
                    .filter(|&n| n > 0)
                    .ok_or_else(|| format!("--bins value \"{raw}\" is not a positive integer"))?;
                set_once(&mut opts.bins, bins, "--bins")?;
            }
            "--help" | "-h" => opts.help = true,
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    if opts.config.is_some() && opts.preset.is_some() {
        return Err(
            "arguments `--config` and `--preset` are mutually exclusive; choose one source"
                .to_string(),
        );
    }

    Ok(opts)
}

fn set_once<T>(slot: &mut Option<T>, value: T, flag: &str) -> Result<(), String> {
    if slot.replace(value).is_some() {
        return Err(format!("{flag} provided more than once"));
    }
    Ok(())
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String> {
        self.get(index)
            .map(String::as_str)
            .ok_or_else(|| err.to_string())
    }
}

pub fn print_usage() {
    eprintln!("hems-sim: Monte Carlo EV availability cost simulator");
    eprintln!();
    eprintln!("Usage: hems-sim [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <path>          Load configuration from a TOML file");
    eprintln!("  --preset <name>          Use a built-in preset (baseline, time_of_use, quick)");
    eprintln!("  --seed <u64>             Override the random seed");
    eprintln!("  --data-dir <path>        Override the dataset directory");
    eprintln!("  --samples-out <path>     Export every daily cost sample to CSV");
    eprintln!("  --scenario-out <path>    Export one weekday/weekend scenario to CSV");
    eprintln!("  --histogram-out <path>   Export per-weekday cost histograms to CSV");
    eprintln!("  --bins <n>               Override the number of histogram bins");
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("If neither --config nor --preset is given, the baseline preset is used.");
}
