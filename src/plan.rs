//! Plans and runs the monthly downloads for a range of years.
//!
//! Every month in the range is visited in chronological order. A month is
//! skipped when its file already exists, and the current month (plus the rest
//! of its year) is skipped because its data is not yet complete.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use chrono::{Datelike, Local};

use crate::{cds::Retrieve, request::RetrievalRequest};

/// A calendar month. Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        YearMonth { year, month }
    }

    /// The month the local clock is in.
    pub fn now() -> Self {
        let today = Local::now();
        YearMonth::new(today.year(), today.month())
    }

    pub fn file_name(&self) -> String {
        format!("{}.nc", self)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{:02}", self.year, self.month)
    }
}

/// Every month of every year in `[start, end)`, oldest first.
pub fn months(start: i32, end: i32) -> impl Iterator<Item = YearMonth> {
    (start..end).flat_map(|year| (1..=12).map(move |month| YearMonth::new(year, month)))
}

/// What happened over a run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Summary {
    pub downloaded: usize,
    pub already_present: usize,
    pub incomplete: usize,
}

#[derive(Debug, Clone)]
pub struct Plan {
    dataset: String,
    variable: String,
    output_directory: PathBuf,
    start: i32,
    end: i32,
}

impl Plan {
    /// Fails unless `start` is before `end`.
    pub fn new(
        dataset: &str,
        variable: &str,
        output_directory: &Path,
        start: i32,
        end: i32,
    ) -> Result<Self> {
        if start >= end {
            bail!("start year must be less than end year");
        }

        Ok(Plan {
            dataset: dataset.to_string(),
            variable: variable.to_string(),
            output_directory: output_directory.to_path_buf(),
            start,
            end,
        })
    }

    /// Directory the monthly files for the variable are written to.
    pub fn variable_directory(&self) -> PathBuf {
        self.output_directory.join(&self.variable)
    }

    pub fn target(&self, month: YearMonth) -> PathBuf {
        self.variable_directory().join(month.file_name())
    }

    /// Downloads every missing month in the range, one at a time.
    ///
    /// The first error from `retriever` aborts the run. Files fetched before
    /// it stay on disk and are skipped next time.
    pub async fn run<R: Retrieve + ?Sized>(
        &self,
        retriever: &R,
        now: YearMonth,
    ) -> Result<Summary> {
        let directory = self.variable_directory();
        fs::create_dir_all(&directory)
            .with_context(|| format!("Failed to create `{}`", directory.display()))?;

        let mut summary = Summary::default();
        let mut halted_year = None;

        for month in months(self.start, self.end) {
            if halted_year == Some(month.year) {
                summary.incomplete += 1;
                continue;
            }

            let target = self.target(month);

            if month == now {
                println!(
                    "--> skipping: {}: current month not yet complete",
                    target.display()
                );
                summary.incomplete += 1;
                halted_year = Some(month.year);
                continue;
            }

            if target.is_file() {
                println!("--> skipping: {}: already exists", target.display());
                summary.already_present += 1;
                continue;
            }

            println!("--> downloading {} ...", target.display());
            let request = RetrievalRequest::new(&self.variable, month);
            tracing::debug!(dataset = %self.dataset, %month, "retrieving");

            retriever
                .retrieve(&self.dataset, &request, &target)
                .await
                .with_context(|| format!("Failed to retrieve `{}`", target.display()))?;
            summary.downloaded += 1;
        }

        Ok(summary)
    }
}

// -- Tests -------------------------------------------------------------------
