pub mod api;
pub mod config;
pub mod digest;
pub mod format;
pub mod library;
pub mod output;

use serde::Serialize;

/// A single chapter entry as shown in a rendered digest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chapter {
    pub timestamp: String,
    pub title: String,
    pub description: String,
}

/// Structured view of one digest text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DigestSections {
    pub one_line_summary: String,
    pub key_takeaways: Vec<String>,
    pub why_watch: Vec<String>,
    pub chapters: Vec<Chapter>,
    pub narrative: String,
}

impl DigestSections {
    /// True when no section carries any content
    pub fn is_empty(&self) -> bool {
        self.one_line_summary.is_empty()
            && self.key_takeaways.is_empty()
            && self.why_watch.is_empty()
            && self.chapters.is_empty()
            && self.narrative.is_empty()
    }
}

/// Extract video ID from various YouTube URL formats
pub fn extract_video_id(input: &str) -> Option<String> {
    let input = input.trim();

    // Bare 11-character video ID
    if regex::Regex::new(r"^[a-zA-Z0-9_-]{11}$").unwrap().is_match(input) {
        return Some(input.to_string());
    }

    // youtube.com/watch?v=ID
    if let Some(caps) = regex::Regex::new(r"(?:youtube\.com/watch\?.*v=)([a-zA-Z0-9_-]{11})")
        .unwrap()
        .captures(input)
    {
        return Some(caps[1].to_string());
    }

    // youtu.be/ID
    if let Some(caps) = regex::Regex::new(r"youtu\.be/([a-zA-Z0-9_-]{11})")
        .unwrap()
        .captures(input)
    {
        return Some(caps[1].to_string());
    }

    // youtube.com/embed/ID
    if let Some(caps) = regex::Regex::new(r"youtube\.com/embed/([a-zA-Z0-9_-]{11})")
        .unwrap()
        .captures(input)
    {
        return Some(caps[1].to_string());
    }

    // youtube.com/shorts/ID
    if let Some(caps) = regex::Regex::new(r"youtube\.com/shorts/([a-zA-Z0-9_-]{11})")
        .unwrap()
        .captures(input)
    {
        return Some(caps[1].to_string());
    }

    // youtube.com/v/ID (legacy player URLs)
    if let Some(caps) = regex::Regex::new(r"youtube\.com/v/([a-zA-Z0-9_-]{11})")
        .unwrap()
        .captures(input)
    {
        return Some(caps[1].to_string());
    }

    None
}

/// Merge server-supplied chapters with chapters parsed out of digest prose.
///
/// Server chapters carry real start times from video metadata and always win.
/// A parsed chapter is appended only when no server chapter starts within
/// five seconds of it. Neither side is re-sorted.
pub fn merge_chapters(server: &[api::ServerChapter], parsed: Vec<Chapter>) -> Vec<Chapter> {
    if server.is_empty() {
        return parsed;
    }

    let mut merged: Vec<Chapter> = server.iter().map(api::ServerChapter::to_chapter).collect();
    let starts: Vec<f64> = server.iter().map(|chapter| chapter.start_time).collect();

    for chapter in parsed {
        let near_existing = format::parse_timestamp(&chapter.timestamp)
            .map(|seconds| starts.iter().any(|start| (start - f64::from(seconds)).abs() < 5.0))
            .unwrap_or(false);
        if !near_existing {
            merged.push(chapter);
        }
    }

    merged
}
