use super::{Prompter, TextQuestion, Validation};
use crate::{
    media::{AudioFormat, QualityTier},
    utils,
};
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    Full,
    Range,
    Specific,
}

impl SelectionMode {
    const ALL: [SelectionMode; 3] = [
        SelectionMode::Full,
        SelectionMode::Range,
        SelectionMode::Specific,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SelectionMode::Full => "Full playlist",
            SelectionMode::Range => "Select range",
            SelectionMode::Specific => "Specific videos",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaMode {
    VideoWithAudio,
    AudioOnly,
}

impl MediaMode {
    const ALL: [MediaMode; 2] = [MediaMode::VideoWithAudio, MediaMode::AudioOnly];

    pub fn label(&self) -> &'static str {
        match self {
            MediaMode::VideoWithAudio => "Video with Audio",
            MediaMode::AudioOnly => "Audio Only",
        }
    }
}

/// Playlist choice with the raw text the user typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionChoice {
    Full,
    Range { start: String, end: String },
    Specific { indices: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaChoice {
    Video(QualityTier),
    AudioOnly(AudioFormat),
}

/// Answers for one pass through the loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preferences {
    pub url: String,
    pub output_dir: PathBuf,
    pub collection: Option<CollectionChoice>,
    pub media: MediaChoice,
}

impl Preferences {
    pub fn is_collection(&self) -> bool {
        utils::is_collection(&self.url)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Url,
    OutputDir,
    SelectionMode,
    StartIndex,
    EndIndex,
    Indices,
    MediaMode,
    Quality,
    AudioFormat,
    Done,
}

#[derive(Debug, Default)]
struct Answers {
    url: Option<String>,
    output_dir: Option<PathBuf>,
    selection_mode: Option<SelectionMode>,
    start: Option<String>,
    end: Option<String>,
    indices: Option<String>,
    media_mode: Option<MediaMode>,
    quality: Option<QualityTier>,
    audio_format: Option<AudioFormat>,
}

impl Answers {
    fn is_collection(&self) -> bool {
        self.url.as_deref().is_some_and(utils::is_collection)
    }

    fn start_index(&self) -> u32 {
        self.start
            .as_deref()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(1)
    }

    fn into_preferences(self) -> Result<Preferences> {
        let collection = match self.selection_mode {
            None => None,
            Some(SelectionMode::Full) => Some(CollectionChoice::Full),
            Some(SelectionMode::Range) => Some(CollectionChoice::Range {
                start: self.start.context("Missing playlist start index")?,
                end: self.end.context("Missing playlist end index")?,
            }),
            Some(SelectionMode::Specific) => Some(CollectionChoice::Specific {
                indices: self.indices.context("Missing playlist indices")?,
            }),
        };

        let media = match self.media_mode.context("Missing download type")? {
            MediaMode::VideoWithAudio => {
                MediaChoice::Video(self.quality.context("Missing quality")?)
            }
            MediaMode::AudioOnly => {
                MediaChoice::AudioOnly(self.audio_format.context("Missing audio format")?)
            }
        };

        Ok(Preferences {
            url: self.url.context("Missing URL")?,
            output_dir: self.output_dir.context("Missing output directory")?,
            collection,
            media,
        })
    }
}

/// Which question follows `current`, given what has been answered so far.
fn next_step(current: Step, answers: &Answers) -> Step {
    match (current, answers.selection_mode, answers.media_mode) {
        (Step::Url, _, _) => Step::OutputDir,
        (Step::OutputDir, _, _) if answers.is_collection() => Step::SelectionMode,
        (Step::OutputDir, _, _) => Step::MediaMode,
        (Step::SelectionMode, Some(SelectionMode::Range), _) => Step::StartIndex,
        (Step::SelectionMode, Some(SelectionMode::Specific), _) => Step::Indices,
        (Step::SelectionMode, _, _) => Step::MediaMode,
        (Step::StartIndex, _, _) => Step::EndIndex,
        (Step::EndIndex | Step::Indices, _, _) => Step::MediaMode,
        (Step::MediaMode, _, Some(MediaMode::AudioOnly)) => Step::AudioFormat,
        (Step::MediaMode, _, _) => Step::Quality,
        (Step::Quality | Step::AudioFormat | Step::Done, _, _) => Step::Done,
    }
}

fn select_from<T: Copy>(
    prompter: &mut dyn Prompter,
    message: &str,
    options: &[T],
    label: impl Fn(&T) -> &'static str,
) -> Result<T> {
    let labels: Vec<&str> = options.iter().map(label).collect();
    let index = prompter.select(message, &labels)?;
    options
        .get(index)
        .copied()
        .with_context(|| format!("Choice {index} is out of range for '{message}'"))
}

fn ask(
    step: Step,
    prompter: &mut dyn Prompter,
    answers: &mut Answers,
    default_output_dir: &str,
) -> Result<()> {
    match step {
        Step::Url => {
            let question = TextQuestion::new("Enter the YouTube URL (video or playlist)")
                .with_validation(Validation::Url);
            answers.url = Some(prompter.text(&question)?.trim().to_string());
        }
        Step::OutputDir => {
            let question =
                TextQuestion::new("Enter output directory path").with_default(default_output_dir);
            let answer = prompter.text(&question)?;
            let answer = match answer.trim() {
                "" => default_output_dir,
                path => path,
            };
            answers.output_dir = Some(utils::expand_home(answer));
        }
        Step::SelectionMode => {
            answers.selection_mode = Some(select_from(
                prompter,
                "Playlist download options",
                &SelectionMode::ALL,
                SelectionMode::label,
            )?);
        }
        Step::StartIndex => {
            let question = TextQuestion::new("Enter start index (e.g., 1)")
                .with_validation(Validation::Index { min: 1 });
            answers.start = Some(prompter.text(&question)?.trim().to_string());
        }
        Step::EndIndex => {
            let min = answers.start_index();
            let question = TextQuestion::new("Enter end index (e.g., 5)")
                .with_validation(Validation::Index { min });
            answers.end = Some(prompter.text(&question)?.trim().to_string());
        }
        Step::Indices => {
            let question =
                TextQuestion::new("Enter video numbers separated by commas (e.g., 1,3,5)")
                    .with_validation(Validation::IndexList);
            answers.indices = Some(prompter.text(&question)?);
        }
        Step::MediaMode => {
            answers.media_mode = Some(select_from(
                prompter,
                "What would you like to download?",
                &MediaMode::ALL,
                MediaMode::label,
            )?);
        }
        Step::Quality => {
            answers.quality = Some(select_from(
                prompter,
                "Select quality",
                &QualityTier::ALL,
                QualityTier::label,
            )?);
        }
        Step::AudioFormat => {
            answers.audio_format = Some(select_from(
                prompter,
                "Select audio format",
                &AudioFormat::ALL,
                AudioFormat::label,
            )?);
        }
        Step::Done => {}
    }
    Ok(())
}

/// Walks the question sequence until every required answer is in.
pub fn collect(prompter: &mut dyn Prompter, default_output_dir: &str) -> Result<Preferences> {
    let mut answers = Answers::default();
    let mut step = Step::Url;

    while step != Step::Done {
        ask(step, prompter, &mut answers, default_output_dir)?;
        let next = next_step(step, &answers);
        debug!("Prompt step {:?} -> {:?}", step, next);
        step = next;
    }

    answers.into_preferences()
}
