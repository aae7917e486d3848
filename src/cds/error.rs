use std::path::PathBuf;

use reqwest::{Response, StatusCode};
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CdsError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Request to `{url}` failed with {status}: {message}")]
    Http {
        url: String,
        status: StatusCode,
        message: String,
    },

    #[error("Job {job_id} {status}: {message}")]
    JobFailed {
        job_id: String,
        status: String,
        message: String,
    },

    #[error("Unexpected response from the archive: {message}")]
    Protocol { message: String },

    #[error(
        "Incomplete download of `{}`: expected {expected} bytes, received {received}",
        .path.display()
    )]
    Incomplete {
        path: PathBuf,
        expected: u64,
        received: u64,
    },

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON response: {0}")]
    Json(#[from] serde_json::Error),
}

/// Error document the archive returns alongside failing statuses.
#[derive(Debug, Deserialize)]
struct Problem {
    title: Option<String>,
    detail: Option<String>,
}

/// Passes successful responses through, turning anything else into
/// [`CdsError::Http`] carrying the server's explanation.
pub async fn check(response: Response) -> Result<Response, CdsError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();

    Err(CdsError::Http {
        url,
        status,
        message: problem_message(&body),
    })
}

/// Extracts `title: detail` from a problem document, falling back to the raw
/// body.
pub fn problem_message(body: &str) -> String {
    let fallback = || body.trim().to_string();

    match serde_json::from_str::<Problem>(body) {
        Ok(Problem {
            title: Some(title),
            detail: Some(detail),
        }) => format!("{}: {}", title, detail),
        Ok(Problem {
            title: Some(message),
            detail: None,
        })
        | Ok(Problem {
            title: None,
            detail: Some(message),
        }) => message,
        _ => fallback(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_join_title_and_detail() {
        let body =
            r#"{"type": "x", "title": "The job has failed", "detail": "variable not found"}"#;
        assert_eq!(problem_message(body), "The job has failed: variable not found");
    }

    #[test]
    fn should_use_whichever_part_is_present() {
        assert_eq!(problem_message(r#"{"title": "Forbidden"}"#), "Forbidden");
        assert_eq!(
            problem_message(r#"{"detail": "licence not accepted"}"#),
            "licence not accepted"
        );
    }

    #[test]
    fn should_fall_back_to_raw_body() {
        assert_eq!(problem_message("  Bad Gateway\n"), "Bad Gateway");
        assert_eq!(problem_message("{}"), "{}");
    }
}
