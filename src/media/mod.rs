mod extractor;
#[cfg(test)]
pub mod fake;
mod format;
mod options;
mod types;
mod ytdlp;

pub use extractor::Extractor;
pub use format::{AudioFormat, QualityTier};
pub use options::{AudioExtraction, DownloadConfig};
pub use types::{FetchReport, ProbeSummary, ProgressUpdate, Selection};
pub use ytdlp::YtDlpExtractor;

use anyhow::Result;
use tracing::info;

/// Fails when the extractor cannot run on this system.
pub async fn test_setup(extractor: &dyn Extractor) -> Result<()> {
    info!("Testing {} setup...", extractor.name());

    if extractor.test_availability().await {
        info!("✅ {} is ready", extractor.name());
        Ok(())
    } else {
        Err(anyhow::anyhow!(
            "{} is not available. Please install yt-dlp (and ffmpeg) or set downloader.ytdlp_path in the config file.",
            extractor.name()
        ))
    }
}
