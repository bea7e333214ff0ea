use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use armtc_common::error::{Result, ToolchainError};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::StatusCode;
use tracing::{debug, error, warn};

use crate::validation::validate_url;

const CONNECT_TIMEOUT_SECS: u64 = 30;
const MAX_REDIRECTS: usize = 10;
const USER_AGENT_STRING: &str =
    "armtc toolchain builder (Rust; +https://github.com/armtc/armtc)";

/// Network access used by the pipeline. Tests substitute their own.
pub trait Fetcher {
    /// Fetches a page body as text.
    fn fetch_text(&self, url: &str) -> Result<String>;

    /// Downloads `url` to `dest`, returning the number of bytes written.
    /// `dest` is only ever replaced by a complete file.
    fn download(&self, url: &str, dest: &Path) -> Result<u64>;
}

/// Blocking HTTP(S) fetcher with a progress bar on downloads.
pub struct HttpFetcher {
    client: Client,
    show_progress: bool,
}

impl HttpFetcher {
    pub fn new(show_progress: bool) -> Result<Self> {
        Ok(Self {
            client: build_http_client()?,
            show_progress,
        })
    }

    fn get(&self, url: &str) -> Result<Response> {
        validate_url(url)?;
        let response = self.client.get(url).send().map_err(|e| {
            debug!("HTTP request failed for {url}: {e}");
            transfer_error(url, url, format!("HTTP request failed: {e}"))
        })?;
        let status = response.status();
        debug!("Received HTTP status: {} for {}", status, url);
        if status.is_success() {
            return Ok(response);
        }
        error!("HTTP error {} for URL {}", status, url);
        let reason = match status {
            StatusCode::NOT_FOUND => "Resource not found (404)".to_string(),
            StatusCode::FORBIDDEN => "Access forbidden (403)".to_string(),
            other => format!("HTTP error {other}"),
        };
        Err(transfer_error(url, url, reason))
    }

    fn progress_bar(&self, len: Option<u64>, name: &str) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = match len {
            Some(len) => {
                let pb = ProgressBar::new(len);
                if let Ok(style) = ProgressStyle::with_template(
                    "{msg} [{bar:30}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})",
                ) {
                    pb.set_style(style.progress_chars("=> "));
                }
                pb
            }
            None => {
                let pb = ProgressBar::new_spinner();
                if let Ok(style) = ProgressStyle::with_template("{spinner} {msg} {bytes}") {
                    pb.set_style(style);
                }
                pb.enable_steady_tick(Duration::from_millis(100));
                pb
            }
        };
        pb.set_message(name.to_string());
        pb
    }
}

impl Fetcher for HttpFetcher {
    fn fetch_text(&self, url: &str) -> Result<String> {
        debug!("Fetching listing page {}", url);
        let response = self.get(url)?;
        response
            .text()
            .map_err(|e| transfer_error(url, url, format!("Failed to read response body: {e}")))
    }

    fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        let name = dest
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let temp_path = temp_download_path(dest);
        debug!("Downloading {} to temporary path {}", url, temp_path.display());
        if temp_path.exists() {
            if let Err(e) = fs::remove_file(&temp_path) {
                warn!(
                    "Could not remove existing temporary file {}: {}",
                    temp_path.display(),
                    e
                );
            }
        }
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut response = self.get(url)?;
        let pb = self.progress_bar(response.content_length(), &name);
        let written = stream_to_file(&mut response, &temp_path, &pb);
        pb.finish_and_clear();

        let written = match written {
            Ok(n) => n,
            Err(e) => {
                let _ = fs::remove_file(&temp_path);
                return Err(transfer_error(&name, url, format!("Download interrupted: {e}")));
            }
        };

        fs::rename(&temp_path, dest).map_err(|e| {
            error!(
                "Failed to move temp file {} to {}: {}",
                temp_path.display(),
                dest.display(),
                e
            );
            ToolchainError::Io(Arc::new(e))
        })?;
        debug!("Downloaded {} bytes to {}", written, dest.display());
        Ok(written)
    }
}

fn stream_to_file(response: &mut Response, temp_path: &Path, pb: &ProgressBar) -> io::Result<u64> {
    let file = File::create(temp_path)?;
    let mut writer = pb.wrap_write(BufWriter::new(file));
    let written = io::copy(response, &mut writer)?;
    writer.flush()?;
    Ok(written)
}

/// Sibling of `dest` used while a download is in flight.
pub fn temp_download_path(dest: &Path) -> PathBuf {
    let temp_filename = format!(
        ".{}.download",
        dest.file_name().unwrap_or_default().to_string_lossy()
    );
    dest.with_file_name(temp_filename)
}

fn transfer_error(name: &str, url: &str, reason: String) -> ToolchainError {
    ToolchainError::Transfer(name.to_string(), url.to_string(), reason)
}

fn build_http_client() -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_STRING));
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    // No overall timeout: toolchain archives are large and links can be slow.
    Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .timeout(None::<Duration>)
        .default_headers(headers)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .build()
        .map_err(ToolchainError::from)
}
