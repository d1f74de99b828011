use super::{
    extractor::{Extractor, ProgressHook},
    options::DownloadConfig,
    types::{FetchReport, ProbeSummary, ProgressUpdate},
};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::Mutex;

/// In-memory extractor that records every call it receives.
pub struct FakeExtractor {
    probe_result: Result<ProbeSummary, String>,
    fetch_result: Result<FetchReport, String>,
    pub probes: Mutex<Vec<DownloadConfig>>,
    pub fetches: Mutex<Vec<DownloadConfig>>,
}

impl FakeExtractor {
    pub fn new(summary: ProbeSummary) -> Self {
        Self {
            probe_result: Ok(summary),
            fetch_result: Ok(FetchReport::default()),
            probes: Mutex::new(Vec::new()),
            fetches: Mutex::new(Vec::new()),
        }
    }

    pub fn single(title: &str) -> Self {
        Self::new(ProbeSummary::Single {
            title: title.to_string(),
            duration: Some(212),
            uploader: None,
            view_count: None,
        })
    }

    pub fn failing_probe(message: &str) -> Self {
        Self {
            probe_result: Err(message.to_string()),
            ..Self::single("unused")
        }
    }

    pub fn with_fetch_result(mut self, result: Result<FetchReport, String>) -> Self {
        self.fetch_result = result;
        self
    }

    pub fn probe_count(&self) -> usize {
        self.probes.lock().unwrap().len()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.lock().unwrap().len()
    }

    pub fn last_fetch(&self) -> Option<DownloadConfig> {
        self.fetches.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Extractor for FakeExtractor {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn probe(&self, _url: &str, config: &DownloadConfig) -> Result<ProbeSummary> {
        self.probes.lock().unwrap().push(config.clone());
        self.probe_result.clone().map_err(|e| anyhow!(e))
    }

    async fn fetch(
        &self,
        _url: &str,
        config: &DownloadConfig,
        on_progress: &mut ProgressHook<'_>,
    ) -> Result<FetchReport> {
        self.fetches.lock().unwrap().push(config.clone());
        on_progress(&ProgressUpdate {
            percent: Some(100.0),
            percent_str: "100.0%".to_string(),
            total_str: "1.00MiB".to_string(),
            speed_str: "1.00MiB/s".to_string(),
            eta_str: "00:00".to_string(),
            title: "fake".to_string(),
        });
        self.fetch_result.clone().map_err(|e| anyhow!(e))
    }

    async fn test_availability(&self) -> bool {
        true
    }
}
