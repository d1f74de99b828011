mod orchestrator;
mod selection;

pub use orchestrator::{Orchestrator, Outcome};

use crate::{
    config::DownloaderSettings,
    media::Extractor,
    prompt::{self, is_affirmative, Prompter, TextQuestion},
};
use anyhow::Result;
use tracing::{info, warn};

const CONTINUE_QUESTION: &str = "Would you like to download another video/playlist? (y/n)";

/// The interactive loop: collect answers, run one attempt, ask to go again.
pub struct Session<'a> {
    extractor: &'a dyn Extractor,
    settings: &'a DownloaderSettings,
}

impl<'a> Session<'a> {
    pub fn new(extractor: &'a dyn Extractor, settings: &'a DownloaderSettings) -> Self {
        Self {
            extractor,
            settings,
        }
    }

    pub async fn run_once(&self, prompter: &mut dyn Prompter) -> Result<Outcome> {
        let preferences = prompt::collect(prompter, &self.settings.default_output_dir)?;
        Orchestrator::new(self.extractor, self.settings)
            .run(&preferences, prompter)
            .await
    }

    /// Loops until the user declines to continue. Returns the number of
    /// attempts made.
    pub async fn run(&self, prompter: &mut dyn Prompter) -> Result<usize> {
        println!("\n=== YouTube Downloader ===\n");

        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.run_once(prompter).await? {
                Outcome::Completed(report) => info!(
                    "Attempt {} finished: {} file(s), {} failure(s)",
                    attempts,
                    report.files.len(),
                    report.failures.len()
                ),
                Outcome::Cancelled => info!("Attempt {} cancelled", attempts),
                Outcome::Failed { phase, .. } => {
                    warn!("Attempt {} failed while {}", attempts, phase)
                }
            }

            let answer = prompter.text(&TextQuestion::new(CONTINUE_QUESTION))?;
            if !is_affirmative(&answer) {
                println!("\nThank you for using YouTube Downloader!");
                return Ok(attempts);
            }
        }
    }
}
