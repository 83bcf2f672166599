use comrak::ComrakOptions;
use eyre::Result;
use log::warn;
use regex::Regex;
use serde::Serialize;

use crate::api::{Category, Channel, Video};
use crate::format::{format_count, format_date, format_timestamp, format_views, parse_timestamp};
use crate::{Chapter, DigestSections};

/// Render a digest as plain text
pub fn render_text(video: &Video, sections: &DigestSections) -> String {
    let mut out = String::new();

    if let Some(title) = &video.title {
        out.push_str(title);
        out.push('\n');
    }
    out.push_str(&meta_line(video));
    out.push('\n');

    if !sections.one_line_summary.is_empty() {
        out.push('\n');
        out.push_str(&sections.one_line_summary);
        out.push('\n');
    }
    if !sections.key_takeaways.is_empty() {
        out.push_str("\nKey Takeaways:\n");
        for item in &sections.key_takeaways {
            out.push_str(&format!("- {item}\n"));
        }
    }
    if !sections.why_watch.is_empty() {
        out.push_str("\nWhy Watch:\n");
        for item in &sections.why_watch {
            out.push_str(&format!("- {item}\n"));
        }
    }
    if !sections.chapters.is_empty() {
        out.push_str("\nChapters:\n");
        for chapter in &sections.chapters {
            out.push_str(&format!("{:>8}  {}", chapter.timestamp, chapter.title));
            if !chapter.description.is_empty() {
                out.push_str(&format!(" - {}", chapter.description));
            }
            out.push('\n');
        }
    }
    if !sections.narrative.is_empty() {
        out.push('\n');
        out.push_str(&sections.narrative);
        out.push('\n');
    }

    out
}

fn meta_line(video: &Video) -> String {
    let mut parts = Vec::new();
    if let Some(channel) = &video.channel_title {
        parts.push(channel.clone());
    }
    parts.push(format_views(video.view_count));
    if let Some(date) = &video.upload_date {
        let formatted = format_date(date);
        if !formatted.is_empty() {
            parts.push(formatted);
        }
    }
    if let Some(duration) = video.duration {
        parts.push(format_timestamp(duration));
    }
    parts.join(" | ")
}

#[derive(Debug, Serialize)]
struct DigestDocument<'a> {
    video: &'a Video,
    digest: &'a DigestSections,
}

/// Render a digest as pretty-printed JSON
pub fn render_json(video: &Video, sections: &DigestSections) -> Result<String> {
    Ok(serde_json::to_string_pretty(&DigestDocument { video, digest: sections })?)
}

/// Render a digest as a standalone HTML fragment
pub fn render_html(video: &Video, sections: &DigestSections) -> String {
    let video_id = video.youtube_id.as_deref().unwrap_or_default();
    let mut out = String::new();

    out.push_str("<article class=\"digest\">\n");
    if let Some(title) = &video.title {
        out.push_str(&format!("<h1>{}</h1>\n", html_escape::encode_text(title)));
    }
    out.push_str(&format!(
        "<p class=\"meta\">{}</p>\n",
        html_escape::encode_text(&meta_line(video))
    ));

    if !sections.one_line_summary.is_empty() {
        out.push_str(&format!(
            "<p class=\"lede\"><strong>{}</strong></p>\n",
            html_escape::encode_text(&sections.one_line_summary)
        ));
    }
    push_bullet_section(&mut out, "Key Takeaways", &sections.key_takeaways);
    push_bullet_section(&mut out, "Why Watch", &sections.why_watch);
    push_chapter_section(&mut out, video_id, &sections.chapters);

    if !sections.narrative.is_empty() {
        out.push_str("<section class=\"narrative\">\n");
        out.push_str(&markdown_to_html(&sections.narrative, video_id));
        out.push_str("</section>\n");
    }

    out.push_str("</article>\n");
    out
}

fn push_bullet_section(out: &mut String, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    out.push_str(&format!("<h2>{title}</h2>\n<ul>\n"));
    for item in items {
        out.push_str(&format!("<li>{}</li>\n", html_escape::encode_text(item)));
    }
    out.push_str("</ul>\n");
}

fn push_chapter_section(out: &mut String, video_id: &str, chapters: &[Chapter]) {
    if chapters.is_empty() {
        return;
    }
    out.push_str("<h2>Chapters</h2>\n<ul class=\"chapters\">\n");
    for chapter in chapters {
        let stamp = match parse_timestamp(&chapter.timestamp) {
            Some(seconds) if !video_id.is_empty() => format!(
                r#"<a href="{}">{}</a>"#,
                html_escape::encode_double_quoted_attribute(&watch_url(video_id, seconds)),
                chapter.timestamp
            ),
            _ => chapter.timestamp.clone(),
        };
        out.push_str(&format!(
            "<li>{stamp} <strong>{}</strong>",
            html_escape::encode_text(&chapter.title)
        ));
        if !chapter.description.is_empty() {
            out.push_str(&format!(" - {}", html_escape::encode_text(&chapter.description)));
        }
        out.push_str("</li>\n");
    }
    out.push_str("</ul>\n");
}

/// Render a channel listing, one per line
pub fn render_channels(channels: &[Channel]) -> String {
    if channels.is_empty() {
        return "No channels found\n".to_string();
    }
    let mut out = String::new();
    for channel in channels {
        out.push_str(&channel.name);
        if let Some(subscribers) = channel.subscriber_count {
            out.push_str(&format!(" ({} subscribers)", format_count(subscribers)));
        }
        out.push('\n');
    }
    out
}

/// Render a category listing, one per line
pub fn render_categories(categories: &[Category]) -> String {
    if categories.is_empty() {
        return "No categories found\n".to_string();
    }
    let mut out = String::new();
    for category in categories {
        out.push_str(&category.name);
        out.push('\n');
    }
    out
}

/// Render one-line overviews of a video listing
pub fn render_library(videos: &[Video]) -> String {
    if videos.is_empty() {
        return "No videos found\n".to_string();
    }
    let mut out = String::new();
    for video in videos {
        let title = video.title.as_deref().unwrap_or("(untitled)");
        let channel = video.channel_title.as_deref().unwrap_or("unknown channel");
        let marker = if video.processed || video.summary.is_some() { "*" } else { " " };
        out.push_str(&format!("{marker} {title}\n"));
        let mut detail = vec![channel.to_string(), format_views(video.view_count)];
        if let Some(date) = &video.upload_date {
            detail.push(format_date(date));
        }
        if let Some(duration) = video.duration {
            detail.push(format_timestamp(duration));
        }
        out.push_str(&format!("    {}\n", detail.join(" | ")));
    }
    out
}

/// Convert digest markdown to HTML with clickable timestamp links.
///
/// Explicit `[M:SS](t=N)` links use the supplied second count. Bare `M:SS`
/// or `H:MM:SS` occurrences outside existing anchors become links via
/// minutes*60+seconds. Never fails: any internal error downgrades to the raw
/// text escaped inside a paragraph tag.
pub fn markdown_to_html(text: &str, video_id: &str) -> String {
    match try_markdown_to_html(text, video_id) {
        Ok(html) => html,
        Err(error) => {
            warn!("markdown rendering failed, returning escaped text: {error}");
            format!("<p>{}</p>\n", html_escape::encode_text(text))
        }
    }
}

fn try_markdown_to_html(text: &str, video_id: &str) -> Result<String> {
    // Rewrite explicit timestamp links to full watch URLs before rendering,
    // so the supplied second count always wins over the visible time.
    let explicit = Regex::new(r"\[(\d{1,2}:\d{2}(?::\d{2})?)\]\(t=(\d+)s?\)")?;
    let with_links = explicit.replace_all(text, |caps: &regex::Captures| {
        let seconds = caps[2].parse().unwrap_or(0);
        format!("[{}]({})", &caps[1], watch_url(video_id, seconds))
    });

    let mut options = ComrakOptions::default();
    options.render.unsafe_ = true;
    let html = comrak::markdown_to_html(&with_links, &options);

    link_bare_timestamps(&html, video_id)
}

/// Linkify bare timestamps without touching existing anchors. Only the gaps
/// between anchors are rewritten, so text already inside a link is left
/// alone.
fn link_bare_timestamps(html: &str, video_id: &str) -> Result<String> {
    let anchor = Regex::new(r"(?is)<a\b[^>]*>.*?</a>")?;
    let bare = Regex::new(r"\b(\d{1,2}:\d{2}(?::\d{2})?)\b")?;

    let mut out = String::with_capacity(html.len());
    let mut last = 0;
    for existing in anchor.find_iter(html) {
        out.push_str(&linkify_gap(&bare, &html[last..existing.start()], video_id));
        out.push_str(existing.as_str());
        last = existing.end();
    }
    out.push_str(&linkify_gap(&bare, &html[last..], video_id));
    Ok(out)
}

fn linkify_gap(bare: &Regex, gap: &str, video_id: &str) -> String {
    bare.replace_all(gap, |caps: &regex::Captures| match parse_timestamp(&caps[1]) {
        Some(seconds) => format!(
            r#"<a href="{}">{}</a>"#,
            html_escape::encode_double_quoted_attribute(&watch_url(video_id, seconds)),
            &caps[1]
        ),
        None => caps[1].to_string(),
    })
    .into_owned()
}

fn watch_url(video_id: &str, seconds: u32) -> String {
    format!("https://www.youtube.com/watch?v={video_id}&t={seconds}s")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_video() -> Video {
        Video {
            id: 7,
            youtube_id: Some("abc123def45".to_string()),
            title: Some("Test Video".to_string()),
            channel_title: Some("Test Channel".to_string()),
            view_count: Some(1_500),
            duration: Some(754),
            upload_date: Some("20230115".to_string()),
            ..Video::default()
        }
    }

    fn sample_sections() -> DigestSections {
        DigestSections {
            one_line_summary: "A quick tour.".to_string(),
            key_takeaways: vec!["First point".to_string(), "Second point".to_string()],
            why_watch: vec!["Good demos".to_string()],
            chapters: vec![Chapter {
                timestamp: "1:05".to_string(),
                title: "Intro".to_string(),
                description: "Welcome".to_string(),
            }],
            narrative: "The long version.".to_string(),
        }
    }

    #[test]
    fn test_render_text_sections() {
        let output = render_text(&sample_video(), &sample_sections());
        assert!(output.starts_with("Test Video\n"));
        assert!(output.contains("Test Channel | 1.5K views | Jan 15, 2023 | 12:34"));
        assert!(output.contains("A quick tour."));
        assert!(output.contains("Key Takeaways:\n- First point\n- Second point"));
        assert!(output.contains("Why Watch:\n- Good demos"));
        assert!(output.contains("Intro - Welcome"));
        assert!(output.contains("The long version."));
    }

    #[test]
    fn test_render_text_skips_empty_sections() {
        let output = render_text(&sample_video(), &DigestSections::default());
        assert!(!output.contains("Key Takeaways"));
        assert!(!output.contains("Chapters"));
    }

    #[test]
    fn test_render_json_round_trips() {
        let json = render_json(&sample_video(), &sample_sections()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["video"]["youtube_id"], "abc123def45");
        assert_eq!(value["digest"]["key_takeaways"][0], "First point");
    }

    #[test]
    fn test_render_html_links_chapters() {
        let html = render_html(&sample_video(), &sample_sections());
        assert!(html.contains("<h1>Test Video</h1>"));
        assert!(html.contains("v=abc123def45&amp;t=65s"));
        assert!(html.contains("<li>First point</li>"));
    }

    #[test]
    fn test_render_html_escapes_text() {
        let mut sections = sample_sections();
        sections.key_takeaways = vec!["Use <script> tags never".to_string()];
        let html = render_html(&sample_video(), &sections);
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_render_library_listing() {
        let output = render_library(&[sample_video()]);
        assert!(output.contains("Test Video"));
        assert!(output.contains("Test Channel | 1.5K views"));
    }

    #[test]
    fn test_render_library_empty() {
        assert_eq!(render_library(&[]), "No videos found\n");
    }

    #[test]
    fn test_render_channels() {
        let channels = vec![Channel {
            id: 1,
            name: "Fireship".to_string(),
            youtube_channel_id: None,
            subscriber_count: Some(2_300_000),
        }];
        assert_eq!(render_channels(&channels), "Fireship (2.3M subscribers)\n");
        assert_eq!(render_channels(&[]), "No channels found\n");
    }

    #[test]
    fn test_render_categories() {
        let categories = vec![
            Category { id: 1, name: "Programming".to_string(), youtube_category_id: None },
            Category { id: 2, name: "Music".to_string(), youtube_category_id: None },
        ];
        assert_eq!(render_categories(&categories), "Programming\nMusic\n");
    }

    #[test]
    fn test_bare_timestamp_linkified() {
        let html = markdown_to_html("Check out 1:05 for details", "abc123");
        assert!(html.contains("v=abc123&amp;t=65s"));
        assert!(html.contains(">1:05</a>"));
    }

    #[test]
    fn test_hours_timestamp_linkified() {
        let html = markdown_to_html("The demo at 1:02:03 is worth it", "abc123");
        assert!(html.contains("t=3723s"));
    }

    #[test]
    fn test_explicit_timestamp_wins() {
        let html = markdown_to_html("[2:00](t=125)", "abc123");
        assert!(html.contains("t=125s"));
        assert!(!html.contains("t=120s"));
        assert!(html.contains(">2:00</a>"));
    }

    #[test]
    fn test_no_double_linking() {
        let html = markdown_to_html(
            r#"Already linked: <a href="https://example.com/x">1:30</a>"#,
            "abc123",
        );
        assert_eq!(html.matches("<a ").count(), 1);
        assert!(html.contains("https://example.com/x"));
    }

    #[test]
    fn test_markdown_structure_renders() {
        let html = markdown_to_html("## Heading\n\n- item one\n- item two", "abc123");
        assert!(html.contains("<h2>"));
        assert!(html.contains("<li>item one</li>"));
    }

    #[test]
    fn test_invalid_clock_value_left_alone() {
        let html = markdown_to_html("Scores were 1:75 in the match", "abc123");
        assert!(!html.contains("<a "));
    }

    #[test]
    fn test_render_html_tolerates_huge_server_timestamp() {
        use crate::api::ServerChapter;

        let server = ServerChapter {
            start_time: 0.0,
            title: "Corrupt metadata".to_string(),
            end_time: None,
            timestamp: Some("71582789:00".to_string()),
        };
        let mut sections = sample_sections();
        sections.chapters = vec![server.to_chapter()];
        let html = render_html(&sample_video(), &sections);
        assert!(html.contains("<li>71582789:00 <strong>Corrupt metadata</strong>"));
        assert!(!html.contains("<a "));
    }
}
