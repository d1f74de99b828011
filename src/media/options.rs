use super::{
    format::{AudioFormat, AUDIO_ONLY_FORMAT},
    types::Selection,
};
use std::path::{Path, PathBuf};

/// Marker prefixed to progress lines so they can be told apart from
/// ordinary yt-dlp output.
pub const PROGRESS_MARKER: &str = "[tubegrab:progress]";
/// Marker prefixed to the final path printed after post-processing.
pub const FILE_MARKER: &str = "[tubegrab:file]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioExtraction {
    pub format: AudioFormat,
    pub quality: String,
}

/// Everything yt-dlp needs for one attempt. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadConfig {
    pub format: String,
    pub output_template: String,
    pub selection: Selection,
    pub single_item: bool,
    pub extract_audio: Option<AudioExtraction>,
    pub ignore_errors: bool,
    pub ffmpeg_location: Option<PathBuf>,
}

impl DownloadConfig {
    pub fn output_template_in(dir: &Path, file_template: &str) -> String {
        dir.join(file_template).to_string_lossy().into_owned()
    }

    pub fn video(format: String, output_template: String, selection: Selection) -> Self {
        Self {
            format,
            output_template,
            selection,
            single_item: false,
            extract_audio: None,
            ignore_errors: true,
            ffmpeg_location: None,
        }
    }

    pub fn audio(extraction: AudioExtraction, output_template: String, selection: Selection) -> Self {
        Self {
            format: AUDIO_ONLY_FORMAT.to_string(),
            extract_audio: Some(extraction),
            ..Self::video(String::new(), output_template, selection)
        }
    }

    pub fn with_single_item(mut self, single_item: bool) -> Self {
        self.single_item = single_item;
        self
    }

    pub fn with_ffmpeg_location(mut self, location: Option<PathBuf>) -> Self {
        self.ffmpeg_location = location;
        self
    }

    fn common_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if self.single_item {
            args.push("--no-playlist".to_string());
        }
        if let Some(location) = &self.ffmpeg_location {
            args.push("--ffmpeg-location".to_string());
            args.push(location.to_string_lossy().into_owned());
        }
        args
    }

    /// Arguments for a metadata-only run. The selection is left out so the
    /// reported entry count covers the whole playlist.
    pub fn probe_args(&self) -> Vec<String> {
        let mut args = vec![
            "--dump-single-json".to_string(),
            "--flat-playlist".to_string(),
            "--no-warnings".to_string(),
        ];
        args.extend(self.common_args());
        args
    }

    pub fn download_args(&self) -> Vec<String> {
        let mut args = vec![
            "--format".to_string(),
            self.format.clone(),
            "--output".to_string(),
            self.output_template.clone(),
            "--newline".to_string(),
            "--progress".to_string(),
            "--progress-template".to_string(),
            format!(
                "download:{PROGRESS_MARKER}%(progress._percent_str)s|%(progress._total_bytes_str)s|%(progress._speed_str)s|%(progress._eta_str)s|%(info.title)s"
            ),
            "--print".to_string(),
            format!("after_move:{FILE_MARKER}%(filepath)s"),
        ];
        args.extend(self.common_args());

        if self.ignore_errors {
            args.push("--ignore-errors".to_string());
        }

        match &self.selection {
            Selection::All => {}
            Selection::Range { start, end } => {
                args.push("--playlist-start".to_string());
                args.push(start.to_string());
                args.push("--playlist-end".to_string());
                args.push(end.to_string());
            }
            Selection::Items(items) => {
                args.push("--playlist-items".to_string());
                args.push(items.join(","));
            }
        }

        if let Some(extraction) = &self.extract_audio {
            args.push("--extract-audio".to_string());
            args.push("--audio-format".to_string());
            args.push(extraction.format.label().to_string());
            args.push("--audio-quality".to_string());
            args.push(extraction.quality.clone());
        }

        args
    }
}
