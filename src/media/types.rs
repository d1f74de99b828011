use std::{fmt, path::PathBuf};

/// Which entries of a playlist to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    All,
    /// Inclusive, 1-based, `start <= end`.
    Range { start: u32, end: u32 },
    /// 1-based indices in the order the user typed them.
    Items(Vec<String>),
}

impl Selection {
    pub fn is_restricted(&self) -> bool {
        !matches!(self, Selection::All)
    }

    /// Highest entry index this selection asks for.
    pub fn highest_index(&self) -> Option<u64> {
        match self {
            Selection::All => None,
            Selection::Range { end, .. } => Some(u64::from(*end)),
            Selection::Items(items) => items.iter().filter_map(|i| i.parse().ok()).max(),
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::All => f.write_str("all"),
            Selection::Range { start, end } => write!(f, "{start}-{end}"),
            Selection::Items(items) => f.write_str(&items.join(",")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProbeSummary {
    Collection {
        title: String,
        entry_count: usize,
    },
    Single {
        title: String,
        duration: Option<u64>,
        uploader: Option<String>,
        view_count: Option<u64>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    pub percent: Option<f64>,
    pub percent_str: String,
    pub total_str: String,
    pub speed_str: String,
    pub eta_str: String,
    pub title: String,
}

impl ProgressUpdate {
    pub fn is_finished(&self) -> bool {
        self.percent.is_some_and(|p| p >= 100.0)
    }
}

/// Result of a download run. `failures` holds one message per entry that
/// yt-dlp skipped, so a partially failed playlist is visible to the caller.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FetchReport {
    pub files: Vec<PathBuf>,
    pub failures: Vec<String>,
}

impl FetchReport {
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }
}
