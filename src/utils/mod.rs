use std::path::PathBuf;
use url::Url;

const SUPPORTED_HOSTS: [&str; 2] = ["youtube.com", "youtu.be"];
const COLLECTION_MARKERS: [&str; 3] = ["playlist", "&list=", "?list="];

/// Returns true when `url` parses and points at a supported host.
///
/// Any parse failure counts as unsupported so that callers can simply
/// re-prompt instead of handling an error.
pub fn is_supported_url(url: &str) -> bool {
    match Url::parse(url.trim()) {
        Ok(parsed) => parsed
            .host_str()
            .map(|host| SUPPORTED_HOSTS.iter().any(|h| host.contains(h)))
            .unwrap_or(false),
        Err(_) => false,
    }
}

/// Checks for a playlist marker in the raw URL text. Never touches the network.
pub fn is_collection(url: &str) -> bool {
    COLLECTION_MARKERS.iter().any(|marker| url.contains(marker))
}

pub fn format_number(num: u64) -> String {
    let num_str = num.to_string();
    let chars: Vec<char> = num_str.chars().collect();
    let mut result = String::new();

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i).is_multiple_of(3) {
            result.push(',');
        }
        result.push(*c);
    }

    result
}

/// Formats seconds as `minutes:seconds`; minutes are not folded into hours.
pub fn format_duration(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Expands a leading `~/` to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
