use anyhow::{anyhow, Error};
use std::{fmt, str::FromStr};

/// Selection expression used when only the audio track is wanted.
pub const AUDIO_ONLY_FORMAT: &str = "bestaudio/best";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityTier {
    Best,
    P1080,
    P720,
    P480,
    P360,
}

impl QualityTier {
    pub const ALL: [QualityTier; 5] = [
        QualityTier::Best,
        QualityTier::P1080,
        QualityTier::P720,
        QualityTier::P480,
        QualityTier::P360,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            QualityTier::Best => "best",
            QualityTier::P1080 => "1080p",
            QualityTier::P720 => "720p",
            QualityTier::P480 => "480p",
            QualityTier::P360 => "360p",
        }
    }

    /// Height cap taken from the label's leading digits; `None` for `best`.
    pub fn max_height(&self) -> Option<u32> {
        let digits: String = self
            .label()
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        digits.parse().ok()
    }

    /// Builds the yt-dlp `--format` expression for this tier.
    pub fn format_spec(&self) -> String {
        match self.max_height() {
            None => "bestvideo*+bestaudio/best".to_string(),
            Some(height) => {
                format!("bestvideo[height<={height}]+bestaudio/best[height<={height}]")
            }
        }
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for QualityTier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QualityTier::ALL
            .into_iter()
            .find(|tier| tier.label() == s)
            .ok_or_else(|| anyhow!("Unknown quality tier: {s}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Mp3,
    Wav,
    M4a,
}

impl AudioFormat {
    pub const ALL: [AudioFormat; 3] = [AudioFormat::Mp3, AudioFormat::Wav, AudioFormat::M4a];

    pub fn label(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Wav => "wav",
            AudioFormat::M4a => "m4a",
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AudioFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AudioFormat::ALL
            .into_iter()
            .find(|format| format.label() == s)
            .ok_or_else(|| anyhow!("Unknown audio format: {s}"))
    }
}
