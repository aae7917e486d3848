//! Streams a file from a URL onto disk.

use std::{
    io::Write,
    path::{Path, PathBuf},
};

use futures::StreamExt;
use tempfile::NamedTempFile;

use crate::{
    cds::{error::check, CdsError},
    cli::create_download_bar,
};

/// Downloads `url` to `target` with a progress bar, returning the number of
/// bytes written.
///
/// The body is written to a temporary file beside `target` and only moved
/// into place once complete, so an interrupted transfer never leaves a file at
/// `target`. When `expected_size` is given, a short body is an error.
pub async fn download_to(
    client: &reqwest::Client,
    url: &str,
    target: &Path,
    expected_size: Option<u64>,
) -> Result<u64, CdsError> {
    let response = check(client.get(url).send().await?).await?;

    let file_name = target
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    let progress_bar = create_download_bar(response.content_length().or(expected_size), file_name);

    let mut file = NamedTempFile::new_in(parent_directory(target))?;
    let mut received = 0u64;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk)?;
        received += chunk.len() as u64;
        progress_bar.set_position(received);
    }
    file.flush()?;

    if let Some(expected) = expected_size {
        if expected != received {
            progress_bar.abandon();
            return Err(CdsError::Incomplete {
                path: target.to_path_buf(),
                expected,
                received,
            });
        }
    }

    file.persist(target).map_err(|e| e.error)?;
    progress_bar.finish_and_clear();
    tracing::debug!(target = %target.display(), bytes = received, "download complete");

    Ok(received)
}

fn parent_directory(target: &Path) -> PathBuf {
    match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

// -- Tests -------------------------------------------------------------------
