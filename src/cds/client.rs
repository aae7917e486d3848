//! HTTP client for the CDS retrieve API.
//!
//! A retrieval is a server-side job: the request is submitted, the job is
//! polled until it finishes, and the resulting asset is downloaded.

use std::{fmt, path::Path, time::Duration};

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Url,
};
use serde::{Deserialize, Serialize};

use super::{
    error::{check, problem_message},
    CdsError, Credentials, Retrieve,
};
use crate::{cli::create_spinner, download::download_to, request::RetrievalRequest};

const USER_AGENT: &str = concat!("cdsdl/", env!("CARGO_PKG_VERSION"));

/// How long to wait between job status checks. The wait grows by `factor`
/// after every check, up to `max`.
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    pub initial: Duration,
    pub max: Duration,
    pub factor: f64,
}

impl Default for PollPolicy {
    fn default() -> Self {
        PollPolicy {
            initial: Duration::from_secs(1),
            max: Duration::from_secs(120),
            factor: 1.5,
        }
    }
}

impl PollPolicy {
    /// Never shorter than `initial`, so a zero `max` can't turn polling into
    /// a busy loop.
    fn next(&self, current: Duration) -> Duration {
        current
            .mul_f64(self.factor)
            .clamp(self.initial, self.max.max(self.initial))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum JobStatus {
    Accepted,
    Running,
    Successful,
    Failed,
    Rejected,
    Dismissed,
    #[serde(other)]
    Unknown,
}

impl JobStatus {
    fn is_pending(&self) -> bool {
        matches!(self, JobStatus::Accepted | JobStatus::Running | JobStatus::Unknown)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match self {
            JobStatus::Accepted => "accepted",
            JobStatus::Running => "running",
            JobStatus::Successful => "successful",
            JobStatus::Failed => "failed",
            JobStatus::Rejected => "rejected",
            JobStatus::Dismissed => "dismissed",
            JobStatus::Unknown => "unknown",
        };
        f.write_str(status)
    }
}

#[derive(Debug, Deserialize)]
struct Job {
    #[serde(rename = "jobID")]
    job_id: String,
    status: JobStatus,
}

#[derive(Serialize)]
struct Execution<'a> {
    inputs: &'a RetrievalRequest,
}

#[derive(Debug, Deserialize)]
struct Results {
    asset: Asset,
}

#[derive(Debug, Deserialize)]
struct Asset {
    value: AssetValue,
}

#[derive(Debug, Deserialize)]
struct AssetValue {
    href: String,
    #[serde(rename = "file:size")]
    size: Option<u64>,
}

/// One authenticated session with the archive, reused for every retrieval.
pub struct CdsClient {
    api: reqwest::Client,
    downloads: reqwest::Client,
    base_url: Url,
    poll: PollPolicy,
}

impl CdsClient {
    pub fn new(credentials: Credentials) -> Result<Self, CdsError> {
        let mut token = HeaderValue::from_str(&credentials.key).map_err(|_| CdsError::Config {
            message: "API key contains characters not allowed in an HTTP header".to_string(),
        })?;
        token.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static("private-token"), token);

        let api = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;
        let downloads = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

        // Trailing slash so relative asset links resolve beneath the API root.
        let base_url = Url::parse(&format!("{}/", credentials.url)).map_err(|e| CdsError::Config {
            message: format!("invalid API URL `{}`: {}", credentials.url, e),
        })?;

        Ok(CdsClient {
            api,
            downloads,
            base_url,
            poll: PollPolicy::default(),
        })
    }

    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    /// Appends `segments` to the API root, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, CdsError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CdsError::Config {
                message: format!("API URL `{}` cannot take a path", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    async fn submit(&self, dataset: &str, request: &RetrievalRequest) -> Result<Job, CdsError> {
        let url = self.endpoint(&["retrieve", "v1", "processes", dataset, "execution"])?;
        let response = self
            .api
            .post(url)
            .json(&Execution { inputs: request })
            .send()
            .await?;
        let job: Job = check(response).await?.json().await?;
        tracing::debug!(job_id = %job.job_id, status = %job.status, "job submitted");

        Ok(job)
    }

    async fn status(&self, job_id: &str) -> Result<JobStatus, CdsError> {
        let url = self.endpoint(&["retrieve", "v1", "jobs", job_id])?;
        let job: Job = check(self.api.get(url).send().await?).await?.json().await?;

        Ok(job.status)
    }

    /// Polls until the job leaves the queue, failing unless it succeeded.
    async fn wait(&self, job: Job) -> Result<String, CdsError> {
        let spinner = create_spinner(format!("Job {}: {}", job.job_id, job.status));
        let mut status = job.status;
        let mut delay = self.poll.initial;

        while status.is_pending() {
            tokio::time::sleep(delay).await;
            delay = self.poll.next(delay);

            let latest = self.status(&job.job_id).await?;
            if latest != status {
                tracing::debug!(job_id = %job.job_id, status = %latest, "job status changed");
                spinner.set_message(format!("Job {}: {}", job.job_id, latest));
            }
            status = latest;
        }
        spinner.finish_and_clear();

        if status != JobStatus::Successful {
            return Err(CdsError::JobFailed {
                message: self.failure_message(&job.job_id).await,
                job_id: job.job_id,
                status: status.to_string(),
            });
        }

        Ok(job.job_id)
    }

    async fn results(&self, job_id: &str) -> Result<AssetValue, CdsError> {
        let url = self.endpoint(&["retrieve", "v1", "jobs", job_id, "results"])?;
        let results: Results = check(self.api.get(url).send().await?).await?.json().await?;

        Ok(results.asset.value)
    }

    /// The server explains a failed job through its results document.
    async fn failure_message(&self, job_id: &str) -> String {
        let url = match self.endpoint(&["retrieve", "v1", "jobs", job_id, "results"]) {
            Ok(url) => url,
            Err(e) => return e.to_string(),
        };

        match self.api.get(url).send().await {
            Ok(response) => problem_message(&response.text().await.unwrap_or_default()),
            Err(e) => e.to_string(),
        }
    }

    fn asset_url(&self, href: &str) -> Result<Url, CdsError> {
        Url::parse(href)
            .or_else(|_| self.base_url.join(href))
            .map_err(|e| CdsError::Protocol {
                message: format!("invalid asset link `{}`: {}", href, e),
            })
    }
}

#[async_trait]
impl Retrieve for CdsClient {
    async fn retrieve(
        &self,
        dataset: &str,
        request: &RetrievalRequest,
        target: &Path,
    ) -> Result<()> {
        let job = self.submit(dataset, request).await?;
        let job_id = self.wait(job).await?;
        let asset = self.results(&job_id).await?;
        let url = self.asset_url(&asset.href)?;

        download_to(&self.downloads, url.as_str(), target, asset.size).await?;

        Ok(())
    }
}

// -- Tests -------------------------------------------------------------------
