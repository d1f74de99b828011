use super::{
    extractor::{Extractor, ProgressHook},
    options::{DownloadConfig, FILE_MARKER, PROGRESS_MARKER},
    types::{FetchReport, ProbeSummary, ProgressUpdate},
};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::{
    path::{Path, PathBuf},
    process::Stdio,
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    process::Command,
};
use tracing::{debug, info, warn};

const ERROR_PREFIX: &str = "ERROR: ";

/// Subset of `yt-dlp --dump-single-json` read by the probe.
#[derive(Debug, Deserialize)]
struct ProbeInfo {
    #[serde(rename = "_type")]
    kind: Option<String>,
    title: Option<String>,
    duration: Option<f64>,
    uploader: Option<String>,
    view_count: Option<u64>,
    playlist_count: Option<usize>,
    entries: Option<Vec<serde_json::Value>>,
}

impl ProbeInfo {
    fn into_summary(self) -> ProbeSummary {
        let is_collection = self.entries.is_some() || self.kind.as_deref() == Some("playlist");

        if is_collection {
            let entry_count = self
                .playlist_count
                .or_else(|| self.entries.as_ref().map(Vec::len))
                .unwrap_or(0);
            ProbeSummary::Collection {
                title: self.title.unwrap_or_else(|| "Unknown Playlist".to_string()),
                entry_count,
            }
        } else {
            ProbeSummary::Single {
                title: self.title.unwrap_or_else(|| "Unknown Title".to_string()),
                duration: self.duration.map(|d| d as u64),
                uploader: self.uploader,
                view_count: self.view_count,
            }
        }
    }
}

#[derive(Debug, PartialEq)]
enum OutputLine {
    Progress(ProgressUpdate),
    File(PathBuf),
    Error(String),
    Other,
}

fn parse_output_line(line: &str) -> OutputLine {
    let line = line.trim_end();

    if let Some(rest) = line.strip_prefix(PROGRESS_MARKER) {
        return OutputLine::Progress(parse_progress(rest));
    }
    if let Some(path) = line.strip_prefix(FILE_MARKER) {
        return OutputLine::File(PathBuf::from(path));
    }
    if let Some(message) = line.strip_prefix(ERROR_PREFIX) {
        return OutputLine::Error(message.to_string());
    }

    OutputLine::Other
}

fn parse_progress(fields: &str) -> ProgressUpdate {
    let mut parts = fields.splitn(5, '|').map(str::trim);
    let percent_str = parts.next().unwrap_or_default().to_string();
    let percent = percent_str.trim_end_matches('%').trim().parse::<f64>().ok();

    ProgressUpdate {
        percent,
        percent_str,
        total_str: parts.next().unwrap_or_default().to_string(),
        speed_str: parts.next().unwrap_or_default().to_string(),
        eta_str: parts.next().unwrap_or_default().to_string(),
        title: parts.next().unwrap_or_default().to_string(),
    }
}

pub struct YtDlpExtractor {
    program: PathBuf,
    program_args: Vec<String>,
    ffmpeg: PathBuf,
}

impl YtDlpExtractor {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            program_args: Vec::new(),
            ffmpeg: PathBuf::from("ffmpeg"),
        }
    }

    /// Points the availability check at the ffmpeg inside `location`.
    pub fn with_ffmpeg_location(mut self, location: Option<&Path>) -> Self {
        if let Some(location) = location {
            self.ffmpeg = if location.is_dir() {
                location.join("ffmpeg")
            } else {
                location.to_path_buf()
            };
        }
        self
    }

    #[cfg(test)]
    fn scripted(script: &Path) -> Self {
        Self {
            program: PathBuf::from("sh"),
            program_args: vec![script.to_string_lossy().into_owned()],
            ffmpeg: PathBuf::from("ffmpeg"),
        }
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.program_args).stdin(Stdio::null());
        command
    }

    fn handle_line(line: &str, report: &mut FetchReport, on_progress: &mut ProgressHook<'_>) {
        match parse_output_line(line) {
            OutputLine::Progress(update) => on_progress(&update),
            OutputLine::File(path) => {
                debug!("yt-dlp wrote {}", path.display());
                report.files.push(path);
            }
            OutputLine::Error(message) => {
                warn!("yt-dlp reported an error: {}", message);
                report.failures.push(message);
            }
            OutputLine::Other => debug!("yt-dlp: {}", line),
        }
    }
}

#[async_trait]
impl Extractor for YtDlpExtractor {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn probe(&self, url: &str, config: &DownloadConfig) -> Result<ProbeSummary> {
        debug!("Extracting metadata with yt-dlp for: {}", url);

        let output = self
            .command()
            .args(config.probe_args())
            .arg(url)
            .output()
            .await
            .context("Failed to extract media metadata")?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            let reason = error
                .lines()
                .filter_map(|line| line.strip_prefix(ERROR_PREFIX))
                .last()
                .unwrap_or(error.trim());
            return Err(anyhow!("Media metadata extraction failed: {}", reason));
        }

        let info: ProbeInfo =
            serde_json::from_slice(&output.stdout).context("Failed to parse media metadata")?;

        Ok(info.into_summary())
    }

    async fn fetch(
        &self,
        url: &str,
        config: &DownloadConfig,
        on_progress: &mut ProgressHook<'_>,
    ) -> Result<FetchReport> {
        info!("Downloading media with yt-dlp: {}", url);

        let mut child = self
            .command()
            .args(config.download_args())
            .arg(url)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .context("Failed to spawn yt-dlp")?;

        let stdout = child.stdout.take().context("Failed to get yt-dlp stdout")?;
        let stderr = child.stderr.take().context("Failed to get yt-dlp stderr")?;

        let mut stdout_lines = BufReader::new(stdout).lines();
        let mut stderr_lines = BufReader::new(stderr).lines();
        let (mut stdout_open, mut stderr_open) = (true, true);
        let mut report = FetchReport::default();

        // Progress may land on either stream depending on yt-dlp's quiet mode,
        // so both are drained and classified the same way.
        while stdout_open || stderr_open {
            tokio::select! {
                line = stdout_lines.next_line(), if stdout_open => {
                    match line.context("Failed to read yt-dlp output")? {
                        Some(line) => Self::handle_line(&line, &mut report, on_progress),
                        None => stdout_open = false,
                    }
                }
                line = stderr_lines.next_line(), if stderr_open => {
                    match line.context("Failed to read yt-dlp errors")? {
                        Some(line) => Self::handle_line(&line, &mut report, on_progress),
                        None => stderr_open = false,
                    }
                }
            }
        }

        let status = child.wait().await.context("Failed to wait for yt-dlp")?;

        if !status.success() {
            if report.files.is_empty() {
                let reason = report
                    .failures
                    .last()
                    .cloned()
                    .unwrap_or_else(|| format!("yt-dlp exited with {status}"));
                return Err(anyhow!("Media download failed: {}", reason));
            }
            warn!(
                "yt-dlp exited with {} after writing {} file(s)",
                status,
                report.files.len()
            );
        }

        Ok(report)
    }

    async fn test_availability(&self) -> bool {
        let ytdlp_available = match self.command().arg("--version").output().await {
            Ok(output) => {
                if output.status.success() {
                    let version = String::from_utf8_lossy(&output.stdout);
                    info!("✅ yt-dlp is available, version: {}", version.trim());
                    true
                } else {
                    warn!("❌ yt-dlp command failed");
                    false
                }
            }
            Err(e) => {
                warn!("❌ yt-dlp not found: {}", e);
                false
            }
        };

        // ffmpeg does the merging and audio extraction
        let ffmpeg_available = match Command::new(&self.ffmpeg).arg("-version").output().await {
            Ok(output) => {
                if output.status.success() {
                    let version_line = String::from_utf8_lossy(&output.stdout)
                        .lines()
                        .next()
                        .unwrap_or("unknown")
                        .to_string();
                    info!("✅ ffmpeg is available: {}", version_line);
                    true
                } else {
                    warn!("❌ ffmpeg command failed");
                    false
                }
            }
            Err(e) => {
                warn!("❌ ffmpeg not found: {} (required for merging and audio extraction)", e);
                false
            }
        };

        if ytdlp_available && !ffmpeg_available {
            warn!("⚠️  yt-dlp will work but format merging and audio extraction will fail");
        }

        ytdlp_available
    }
}
