use super::selection;
use crate::{
    config::DownloaderSettings,
    media::{
        AudioExtraction, DownloadConfig, Extractor, FetchReport, ProbeSummary, ProgressUpdate,
        Selection,
    },
    prompt::{is_affirmative, MediaChoice, Preferences, Prompter, TextQuestion},
    utils::{format_duration, format_number},
};
use anyhow::{Context, Result};
use std::{
    fmt,
    path::Path,
    time::{Duration, Instant},
};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Probing,
    Downloading,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Probing => f.write_str("probing"),
            Phase::Downloading => f.write_str("downloading"),
        }
    }
}

/// How a single download attempt ended.
#[derive(Debug)]
pub enum Outcome {
    Completed(FetchReport),
    Cancelled,
    Failed { phase: Phase, error: anyhow::Error },
}

/// Creates `path` and its parents; succeeds when it already exists.
pub fn ensure_output_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path)
        .with_context(|| format!("Failed to create output directory {}", path.display()))
}

/// Logs progress at most once per second, plus the final update.
struct ProgressLogger {
    last_update: Option<Instant>,
}

impl ProgressLogger {
    fn new() -> Self {
        Self { last_update: None }
    }

    fn log(&mut self, update: &ProgressUpdate) {
        let due = self
            .last_update
            .is_none_or(|last| last.elapsed() >= Duration::from_secs(1));

        if due || update.is_finished() {
            info!(
                "Downloading: {} of {}",
                update.percent_str, update.total_str
            );
            debug!(
                "{}: {} ETA {}",
                update.title, update.speed_str, update.eta_str
            );
            self.last_update = Some(Instant::now());
        }
    }
}

pub struct Orchestrator<'a> {
    extractor: &'a dyn Extractor,
    settings: &'a DownloaderSettings,
}

impl<'a> Orchestrator<'a> {
    pub fn new(extractor: &'a dyn Extractor, settings: &'a DownloaderSettings) -> Self {
        Self {
            extractor,
            settings,
        }
    }

    pub fn build_config(&self, preferences: &Preferences, selection: Selection) -> DownloadConfig {
        let template =
            DownloadConfig::output_template_in(&preferences.output_dir, &self.settings.output_template);

        let config = match preferences.media {
            MediaChoice::Video(tier) => DownloadConfig::video(tier.format_spec(), template, selection),
            MediaChoice::AudioOnly(format) => DownloadConfig::audio(
                AudioExtraction {
                    format,
                    quality: self.settings.audio_quality.clone(),
                },
                template,
                selection,
            ),
        };

        config
            .with_single_item(!preferences.is_collection())
            .with_ffmpeg_location(self.settings.ffmpeg_location.clone())
    }

    async fn probe(&self, preferences: &Preferences) -> Result<(DownloadConfig, ProbeSummary)> {
        let selection = selection::resolve(preferences)?;
        let config = self.build_config(preferences, selection);
        ensure_output_dir(&preferences.output_dir)?;

        info!("Starting download from: {}", preferences.url);
        let summary = self.extractor.probe(&preferences.url, &config).await?;

        Ok((config, summary))
    }

    fn log_summary(&self, summary: &ProbeSummary, selection: &Selection) {
        match summary {
            ProbeSummary::Collection { title, entry_count } => {
                info!("Playlist: {}", title);
                info!("Number of videos: {}", format_number(*entry_count as u64));
                if selection.is_restricted() {
                    info!("Downloading videos: {}", selection);
                    if let Some(highest) = selection.highest_index() {
                        if highest > *entry_count as u64 {
                            warn!(
                                "Selection goes up to video {} but the playlist has {}",
                                highest, entry_count
                            );
                        }
                    }
                }
            }
            ProbeSummary::Single {
                title,
                duration,
                uploader,
                view_count,
            } => {
                info!("Title: {}", title);
                if let Some(uploader) = uploader {
                    info!("Uploader: {}", uploader);
                }
                if let Some(views) = view_count {
                    info!("Views: {}", format_number(*views));
                }
                info!("Duration: {}", format_duration(duration.unwrap_or(0)));
            }
        }
    }

    /// Runs one attempt through probe, confirmation and download.
    ///
    /// Extractor failures become `Outcome::Failed`; only prompt errors are
    /// returned as `Err`.
    pub async fn run(
        &self,
        preferences: &Preferences,
        prompter: &mut dyn Prompter,
    ) -> Result<Outcome> {
        let (config, summary) = match self.probe(preferences).await {
            Ok(probed) => probed,
            Err(error) => {
                error!("An error occurred: {:#}", error);
                return Ok(Outcome::Failed {
                    phase: Phase::Probing,
                    error,
                });
            }
        };

        self.log_summary(&summary, &config.selection);

        let answer = prompter.text(&TextQuestion::new("Proceed with download? (y/n)"))?;
        if !is_affirmative(&answer) {
            info!("Download cancelled by user");
            return Ok(Outcome::Cancelled);
        }

        let mut progress = ProgressLogger::new();
        let fetched = self
            .extractor
            .fetch(&preferences.url, &config, &mut |update: &ProgressUpdate| {
                progress.log(update)
            })
            .await;

        match fetched {
            Ok(report) => {
                for file in &report.files {
                    info!("Saved {}", file.display());
                }
                if report.is_partial() {
                    warn!(
                        "{} item(s) could not be downloaded:",
                        report.failures.len()
                    );
                    for failure in &report.failures {
                        warn!("  {}", failure);
                    }
                }
                info!("Download completed successfully!");
                Ok(Outcome::Completed(report))
            }
            Err(error) => {
                error!("An error occurred: {:#}", error);
                Ok(Outcome::Failed {
                    phase: Phase::Downloading,
                    error,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        media::{fake::FakeExtractor, AudioFormat, QualityTier},
        prompt::{scripted::ScriptedPrompter, CollectionChoice},
    };
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn prefs(dir: &TempDir, url: &str, media: MediaChoice) -> Preferences {
        Preferences {
            url: url.to_string(),
            output_dir: dir.path().join("out"),
            collection: None,
            media,
        }
    }

    fn value_after<'c>(args: &'c [String], flag: &str) -> Option<&'c str> {
        args.iter()
            .position(|a| a == flag)
            .and_then(|i| args.get(i + 1))
            .map(String::as_str)
    }

    #[test]
    fn test_ensure_output_dir_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("a").join("b");

        ensure_output_dir(&target).unwrap();
        ensure_output_dir(&target).unwrap();

        assert!(target.is_dir());
    }

    #[test]
    fn test_build_config_for_audio() {
        let settings = DownloaderSettings::default();
        let extractor = FakeExtractor::single("clip");
        let orchestrator = Orchestrator::new(&extractor, &settings);
        let preferences = Preferences {
            url: "https://youtu.be/abc".to_string(),
            output_dir: PathBuf::from("music"),
            collection: None,
            media: MediaChoice::AudioOnly(AudioFormat::Mp3),
        };

        let config = orchestrator.build_config(&preferences, Selection::All);

        assert_eq!(config.format, "bestaudio/best");
        assert_eq!(config.output_template, "music/%(title)s.%(ext)s");
        assert_eq!(
            config.extract_audio,
            Some(AudioExtraction {
                format: AudioFormat::Mp3,
                quality: "192K".to_string()
            })
        );
        assert!(config.single_item);
        assert!(config.ignore_errors);
    }

    #[tokio::test]
    async fn test_single_video_720p_downloads_once() {
        let dir = TempDir::new().unwrap();
        let settings = DownloaderSettings::default();
        let extractor = FakeExtractor::single("clip");
        let orchestrator = Orchestrator::new(&extractor, &settings);
        let preferences = prefs(
            &dir,
            "https://www.youtube.com/watch?v=abc",
            MediaChoice::Video(QualityTier::P720),
        );
        let mut prompter = ScriptedPrompter::new(["Y"]);

        let outcome = orchestrator.run(&preferences, &mut prompter).await.unwrap();

        assert!(matches!(outcome, Outcome::Completed(_)));
        assert_eq!(extractor.probe_count(), 1);
        assert_eq!(extractor.fetch_count(), 1);
        let config = extractor.last_fetch().unwrap();
        assert!(config.format.contains("[height<=720]"));
        assert!(config.single_item);
        assert!(dir.path().join("out").is_dir());
    }

    #[tokio::test]
    async fn test_declined_confirmation_never_fetches() {
        for answer in ["n", "", "no", "sure", "yy"] {
            let dir = TempDir::new().unwrap();
            let settings = DownloaderSettings::default();
            let extractor = FakeExtractor::single("clip");
            let orchestrator = Orchestrator::new(&extractor, &settings);
            let preferences = prefs(
                &dir,
                "https://www.youtube.com/watch?v=abc",
                MediaChoice::Video(QualityTier::Best),
            );
            let mut prompter = ScriptedPrompter::new([answer]);

            let outcome = orchestrator.run(&preferences, &mut prompter).await.unwrap();

            assert!(matches!(outcome, Outcome::Cancelled), "answer {answer:?}");
            assert_eq!(extractor.probe_count(), 1);
            assert_eq!(extractor.fetch_count(), 0, "answer {answer:?}");
        }
    }

    #[tokio::test]
    async fn test_playlist_range_restricts_fetch() {
        let dir = TempDir::new().unwrap();
        let settings = DownloaderSettings::default();
        let extractor = FakeExtractor::new(ProbeSummary::Collection {
            title: "Mix".to_string(),
            entry_count: 10,
        });
        let orchestrator = Orchestrator::new(&extractor, &settings);
        let mut preferences = prefs(
            &dir,
            "https://www.youtube.com/playlist?list=PL1",
            MediaChoice::Video(QualityTier::Best),
        );
        preferences.collection = Some(CollectionChoice::Range {
            start: "2".to_string(),
            end: "4".to_string(),
        });
        let mut prompter = ScriptedPrompter::new(["yes"]);

        orchestrator.run(&preferences, &mut prompter).await.unwrap();

        let config = extractor.last_fetch().unwrap();
        assert_eq!(config.selection, Selection::Range { start: 2, end: 4 });
        assert!(!config.single_item);
        let args = config.download_args();
        assert_eq!(value_after(&args, "--playlist-start"), Some("2"));
        assert_eq!(value_after(&args, "--playlist-end"), Some("4"));
    }

    #[tokio::test]
    async fn test_probe_failure_skips_confirmation_and_fetch() {
        let dir = TempDir::new().unwrap();
        let settings = DownloaderSettings::default();
        let extractor = FakeExtractor::failing_probe("Video unavailable");
        let orchestrator = Orchestrator::new(&extractor, &settings);
        let preferences = prefs(
            &dir,
            "https://www.youtube.com/watch?v=abc",
            MediaChoice::Video(QualityTier::Best),
        );
        let mut prompter = ScriptedPrompter::new(Vec::<String>::new());

        let outcome = orchestrator.run(&preferences, &mut prompter).await.unwrap();

        match outcome {
            Outcome::Failed { phase, error } => {
                assert_eq!(phase, Phase::Probing);
                assert!(error.to_string().contains("Video unavailable"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(prompter.asked.is_empty());
        assert_eq!(extractor.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_reported() {
        let dir = TempDir::new().unwrap();
        let settings = DownloaderSettings::default();
        let extractor =
            FakeExtractor::single("clip").with_fetch_result(Err("connection reset".to_string()));
        let orchestrator = Orchestrator::new(&extractor, &settings);
        let preferences = prefs(
            &dir,
            "https://www.youtube.com/watch?v=abc",
            MediaChoice::AudioOnly(AudioFormat::M4a),
        );
        let mut prompter = ScriptedPrompter::new(["y"]);

        let outcome = orchestrator.run(&preferences, &mut prompter).await.unwrap();

        assert!(matches!(
            outcome,
            Outcome::Failed {
                phase: Phase::Downloading,
                ..
            }
        ));
        assert_eq!(extractor.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_partial_playlist_failure_is_visible() {
        let dir = TempDir::new().unwrap();
        let settings = DownloaderSettings::default();
        let report = FetchReport {
            files: vec![PathBuf::from("out/a.mp4")],
            failures: vec!["[youtube] b: Private video".to_string()],
        };
        let extractor = FakeExtractor::new(ProbeSummary::Collection {
            title: "Mix".to_string(),
            entry_count: 2,
        })
        .with_fetch_result(Ok(report.clone()));
        let orchestrator = Orchestrator::new(&extractor, &settings);
        let preferences = prefs(
            &dir,
            "https://www.youtube.com/playlist?list=PL1",
            MediaChoice::Video(QualityTier::P480),
        );
        let mut prompter = ScriptedPrompter::new(["y"]);

        let outcome = orchestrator.run(&preferences, &mut prompter).await.unwrap();

        match outcome {
            Outcome::Completed(got) => assert_eq!(got, report),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_reversed_range_fails_before_probe() {
        let dir = TempDir::new().unwrap();
        let settings = DownloaderSettings::default();
        let extractor = FakeExtractor::single("clip");
        let orchestrator = Orchestrator::new(&extractor, &settings);
        let mut preferences = prefs(
            &dir,
            "https://www.youtube.com/playlist?list=PL1",
            MediaChoice::Video(QualityTier::Best),
        );
        preferences.collection = Some(CollectionChoice::Range {
            start: "4".to_string(),
            end: "2".to_string(),
        });
        let mut prompter = ScriptedPrompter::new(["y"]);

        let outcome = orchestrator.run(&preferences, &mut prompter).await.unwrap();

        assert!(matches!(
            outcome,
            Outcome::Failed {
                phase: Phase::Probing,
                ..
            }
        ));
        assert_eq!(extractor.probe_count(), 0);
    }
}
