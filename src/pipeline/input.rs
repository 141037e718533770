//! Input resolution: turn user-supplied paths and URLs into in-memory sources.
//!
//! Each input may be a Markdown file, a directory (every `*.md` /
//! `*.markdown` file directly inside it), or an HTTP(S) URL. Any unreadable
//! input is fatal for the whole load: a deck with a silently missing slide is
//! worse than no deck.

use crate::error::DeckError;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// One Markdown document, not yet parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// Stable name used for ordering and display, usually the file name.
    pub name: String,
    pub text: String,
}

impl SourceDocument {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve every input to source documents, preserving input order.
///
/// URL downloads run concurrently (up to `concurrency` at once); local
/// reads are cheap and run in the same ordered stream.
pub async fn resolve_sources(
    inputs: &[String],
    timeout_secs: u64,
    concurrency: usize,
) -> Result<Vec<SourceDocument>, DeckError> {
    if inputs.is_empty() {
        return Err(DeckError::NoSources {
            path: PathBuf::from("."),
        });
    }

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| DeckError::Internal(format!("Failed to build HTTP client: {e}")))?;

    let groups: Vec<Vec<SourceDocument>> = stream::iter(inputs.iter().map(|input| {
        let client = client.clone();
        async move { resolve_one(&client, input, timeout_secs).await }
    }))
    .buffered(concurrency.max(1))
    .try_collect()
    .await?;

    Ok(groups.into_iter().flatten().collect())
}

async fn resolve_one(
    client: &reqwest::Client,
    input: &str,
    timeout_secs: u64,
) -> Result<Vec<SourceDocument>, DeckError> {
    if is_url(input) {
        return Ok(vec![download_url(client, input, timeout_secs).await?]);
    }

    let path = PathBuf::from(input);
    let meta = tokio::fs::metadata(&path).await.map_err(|e| io_error(&path, e))?;
    if meta.is_dir() {
        read_directory(&path).await
    } else if meta.is_file() {
        Ok(vec![read_file(&path).await?])
    } else {
        Err(DeckError::InvalidInput {
            input: input.to_string(),
        })
    }
}

/// Read every Markdown file directly inside `dir`.
async fn read_directory(dir: &Path) -> Result<Vec<SourceDocument>, DeckError> {
    let mut entries = tokio::fs::read_dir(dir).await.map_err(|e| io_error(dir, e))?;
    let mut paths = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(|e| io_error(dir, e))? {
        let path = entry.path();
        if path.is_file() && is_markdown(&path) {
            paths.push(path);
        }
    }

    if paths.is_empty() {
        return Err(DeckError::NoSources {
            path: dir.to_path_buf(),
        });
    }
    debug!("Found {} Markdown files in {}", paths.len(), dir.display());

    let mut docs = Vec::with_capacity(paths.len());
    for path in &paths {
        docs.push(read_file(path).await?);
    }
    Ok(docs)
}

async fn read_file(path: &Path) -> Result<SourceDocument, DeckError> {
    let text = tokio::fs::read_to_string(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => io_error(path, e),
        _ => DeckError::SourceUnreadable {
            name: path.display().to_string(),
            source: e,
        },
    })?;
    Ok(SourceDocument::new(file_name(path), text))
}

fn is_markdown(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref(),
        Some("md" | "markdown")
    )
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn io_error(path: &Path, e: std::io::Error) -> DeckError {
    match e.kind() {
        std::io::ErrorKind::NotFound => DeckError::SourceNotFound {
            path: path.to_path_buf(),
        },
        std::io::ErrorKind::PermissionDenied => DeckError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => DeckError::SourceUnreadable {
            name: path.display().to_string(),
            source: e,
        },
    }
}

/// Download a Markdown document over HTTP(S).
async fn download_url(
    client: &reqwest::Client,
    url: &str,
    timeout_secs: u64,
) -> Result<SourceDocument, DeckError> {
    info!("Downloading Markdown from: {}", url);

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            DeckError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            DeckError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(DeckError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let text = response.text().await.map_err(|e| DeckError::DownloadFailed {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    Ok(SourceDocument::new(url_file_name(url), text))
}

/// Last path segment of the URL, or the URL itself when there is none.
fn url_file_name(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if !last.is_empty() {
                    return last.to_string();
                }
            }
        }
    }
    url.to_string()
}

/// Natural ordering: digit runs compare numerically, everything else by
/// character. Ties fall back to plain byte order so the result is total.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut ai = a.chars().peekable();
    let mut bi = b.chars().peekable();

    loop {
        match (ai.peek().copied(), bi.peek().copied()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let na = take_digits(&mut ai);
                let nb = take_digits(&mut bi);
                let ord = compare_digit_runs(&na, &nb);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(x), Some(y)) => {
                if x != y {
                    return x.cmp(&y);
                }
                ai.next();
                bi.next();
            }
        }
    }
}

fn take_digits(it: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut s = String::new();
    while let Some(c) = it.peek().copied().filter(char::is_ascii_digit) {
        s.push(c);
        it.next();
    }
    s
}

fn compare_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Sort sources into deck order. Stable, so equal names keep input order.
pub fn sort_sources(sources: &mut [SourceDocument]) {
    sources.sort_by(|a, b| natural_cmp(&a.name, &b.name));
}
