use super::{
    options::DownloadConfig,
    types::{FetchReport, ProbeSummary, ProgressUpdate},
};
use anyhow::Result;
use async_trait::async_trait;

/// Receives progress updates while `fetch` runs, on the caller's task.
pub type ProgressHook<'a> = dyn FnMut(&ProgressUpdate) + Send + 'a;

#[async_trait]
pub trait Extractor: Send + Sync {
    /// Human-readable name of the extractor
    fn name(&self) -> &'static str;

    /// Read metadata for the URL without downloading any media
    async fn probe(&self, url: &str, config: &DownloadConfig) -> Result<ProbeSummary>;

    /// Download (and post-process) the media the config selects
    async fn fetch(
        &self,
        url: &str,
        config: &DownloadConfig,
        on_progress: &mut ProgressHook<'_>,
    ) -> Result<FetchReport>;

    /// Test if the extractor and its helpers are available on the system
    async fn test_availability(&self) -> bool;
}
