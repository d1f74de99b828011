use crate::{
    media::Selection,
    prompt::{CollectionChoice, Preferences},
};
use anyhow::{anyhow, bail, Result};

fn parse_index(raw: &str) -> Result<u32> {
    let index: u32 = raw
        .trim()
        .parse()
        .map_err(|_| anyhow!("'{}' is not a playlist index", raw.trim()))?;
    if index == 0 {
        bail!("Playlist indices start at 1");
    }
    Ok(index)
}

/// Turns the playlist answers into the entries yt-dlp should fetch.
pub fn resolve(preferences: &Preferences) -> Result<Selection> {
    match &preferences.collection {
        None | Some(CollectionChoice::Full) => Ok(Selection::All),
        Some(CollectionChoice::Range { start, end }) => {
            let start = parse_index(start)?;
            let end = parse_index(end)?;
            if end < start {
                bail!("Playlist range ends ({end}) before it starts ({start})");
            }
            Ok(Selection::Range { start, end })
        }
        Some(CollectionChoice::Specific { indices }) => {
            let items: Vec<String> = indices
                .split(',')
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(String::from)
                .collect();
            if items.is_empty() {
                bail!("No playlist entries were selected");
            }
            Ok(Selection::Items(items))
        }
    }
}
