//! Command line interface.

pub mod command;

use std::{path::PathBuf, time::Duration};

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

#[derive(Parser, Debug)]
#[command(
    name = "cdsdl",
    version,
    about = "Download Climate Data Store (CDS) datasets",
    long_about = None
)]
pub struct Cli {
    /// Dataset, e.g.: reanalysis-era5-land
    pub dataset: String,

    /// Variable, e.g.: total_precipitation
    pub variable: String,

    /// Output directory, e.g.: /data/db/cds
    pub output_directory: PathBuf,

    /// Start year (inclusive), e.g.: 1950
    #[arg(long, value_name = "YEAR")]
    pub start: i32,

    /// End year (exclusive), e.g.: 2025
    #[arg(long, value_name = "YEAR")]
    pub end: i32,

    /// Longest wait between job status checks, in seconds
    #[arg(
        long,
        value_name = "SECONDS",
        default_value_t = 120,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub poll_max: u64,

    /// Log debug output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Creates a spinner.
pub fn create_spinner(message: String) -> ProgressBar {
    let bar = ProgressBar::new_spinner().with_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));

    bar
}

/// Creates a byte progress bar, or a spinner when the size is unknown.
pub fn create_download_bar(size: Option<u64>, message: String) -> ProgressBar {
    match size {
        Some(size) => ProgressBar::new(size).with_message(message).with_style(
            ProgressStyle::with_template(
                "{msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({percent}%) {eta}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
        ),
        None => create_spinner(message),
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn should_have_valid_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn should_parse_positionals_and_years() {
        let cli = Cli::try_parse_from([
            "cdsdl",
            "reanalysis-era5-land",
            "total_precipitation",
            "/data/db/cds",
            "--start",
            "1950",
            "--end",
            "2025",
        ])
        .unwrap();

        assert_eq!(cli.dataset, "reanalysis-era5-land");
        assert_eq!(cli.variable, "total_precipitation");
        assert_eq!(cli.output_directory, PathBuf::from("/data/db/cds"));
        assert_eq!((cli.start, cli.end), (1950, 2025));
        assert_eq!(cli.poll_max, 120);
        assert!(!cli.verbose);
    }

    #[test]
    fn should_require_both_years() {
        let result =
            Cli::try_parse_from(["cdsdl", "dataset", "variable", "out", "--start", "1950"]);
        assert!(result.is_err());
    }

    #[test]
    fn should_reject_zero_poll_max() {
        let args = |poll_max: &'static str| {
            [
                "cdsdl", "dataset", "variable", "out", "--start", "1950", "--end", "2025",
                "--poll-max", poll_max,
            ]
        };

        assert!(Cli::try_parse_from(args("0")).is_err());
        assert_eq!(Cli::try_parse_from(args("1")).unwrap().poll_max, 1);
    }

    #[test]
    fn should_size_download_bar_from_content_length() {
        let bar = create_download_bar(Some(1000), "2020_01.nc".to_string());
        bar.set_position(500);

        assert_eq!(bar.length(), Some(1000));
        assert_eq!(bar.position(), 500);

        bar.finish_and_clear();
    }
}
