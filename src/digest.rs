//! Digest-text parsing: turns the backend's loosely formatted AI summary
//! into structured sections for rendering.
//!
//! Summary formats drifted across backend prompt revisions, so every section
//! is matched by a small set of recognizers tried in a fixed order. The first
//! recognizer that succeeds wins and its span is removed from the working
//! text, so later passes never re-scan the same content.

use std::ops::Range;

use eyre::Result;
use log::warn;
use regex::Regex;

use crate::{Chapter, DigestSections};

const ONE_LINE_HEADINGS: &[&str] = &[
    "Ultra-Concise Summary",
    "Concise Summary",
    "One-Sentence Summary",
    "Executive Summary",
    "Summary",
];
const TAKEAWAY_HEADINGS: &[&str] = &[
    "Key Takeaways",
    "Key Points",
    "Critical Takeaways",
    "Actionable Takeaways",
];
const TAKEAWAY_LABELS: &[&str] = &["Key Takeaways", "Key Points"];
const WHY_WATCH_HEADINGS: &[&str] = &["Why Watch", "Reasons to Watch"];
const WHY_WATCH_LABELS: &[&str] = &["Why Watch", "Reasons to Watch"];
const CHAPTER_HEADINGS: &[&str] = &["Section Breakdown", "Chapter Breakdown"];
const CHAPTER_LABELS: &[&str] = &["Section Breakdown", "Chapter Breakdown"];
const NARRATIVE_HEADINGS: &[&str] = &["Full Narrative Summary"];

const TIMESTAMP: &str = r"\d{1,2}:\d{2}(?::\d{2})?";

/// Parse a raw digest string into its sections.
///
/// Never fails: a section that cannot be recognized is simply empty, and any
/// internal error downgrades to a warning. Whatever text remains after all
/// structured sections are cut out becomes the narrative.
pub fn parse_summary(raw: &str) -> DigestSections {
    let mut text = raw.replace("\r\n", "\n");

    let one_line_summary = extract_one_line(&mut text).unwrap_or_else(|error| {
        warn!("one-line summary extraction failed: {error}");
        String::new()
    });
    let key_takeaways =
        extract_bullets(&mut text, TAKEAWAY_HEADINGS, TAKEAWAY_LABELS).unwrap_or_else(|error| {
            warn!("takeaway extraction failed: {error}");
            Vec::new()
        });
    let why_watch =
        extract_bullets(&mut text, WHY_WATCH_HEADINGS, WHY_WATCH_LABELS).unwrap_or_else(|error| {
            warn!("why-watch extraction failed: {error}");
            Vec::new()
        });
    let chapters = extract_chapters(&mut text).unwrap_or_else(|error| {
        warn!("chapter extraction failed: {error}");
        Vec::new()
    });
    let narrative = extract_narrative(&mut text).unwrap_or_else(|error| {
        warn!("narrative extraction failed: {error}");
        String::new()
    });

    DigestSections {
        one_line_summary,
        key_takeaways,
        why_watch,
        chapters,
        narrative,
    }
}

/// Pass 1: one-line summary. Heading block first, inline label second,
/// then the first short prose line of the document.
fn extract_one_line(text: &mut String) -> Result<String> {
    if let Some(block) = heading_block(text, ONE_LINE_HEADINGS)? {
        let summary = one_line_from_body(&block.body)?;
        text.replace_range(block.span, "");
        return Ok(summary);
    }

    let label = Regex::new(
        r"(?i)^[ \t]*\**(?:ultra[\- ]concise|one[\- ](?:line|sentence)) summary\**[ \t]*:[ \t]*(.+)$",
    )?;
    let spans = line_spans(text);
    for span in &spans {
        let value = match label.captures(text[span.clone()].trim_end()) {
            Some(caps) => clean_fragment(&caps[1]),
            None => continue,
        };
        text.replace_range(span.clone(), "");
        return Ok(value);
    }

    // Nothing labelled; take the first non-empty line if it reads like a
    // lede: short, not a bullet, not a heading, not a section label, not a
    // chapter line.
    let list_item = list_item_regex()?;
    let timestamp_lead = Regex::new(&format!(r"^\[?{TIMESTAMP}"))?;
    let section_label = label_regex(&[TAKEAWAY_LABELS, WHY_WATCH_LABELS, CHAPTER_LABELS].concat())?;
    for span in &spans {
        let line = text[span.clone()].trim().to_string();
        if line.is_empty() {
            continue;
        }
        if line.chars().count() < 200
            && !list_item.is_match(&line)
            && !is_heading_line(&line)
            && !section_label.is_match(&line)
            && !timestamp_lead.is_match(&line)
        {
            text.replace_range(span.clone(), "");
            return Ok(line);
        }
        break;
    }

    Ok(String::new())
}

fn one_line_from_body(body: &str) -> Result<String> {
    let first_paragraph = body
        .split("\n\n")
        .map(str::trim)
        .find(|paragraph| !paragraph.is_empty())
        .unwrap_or("");
    let collapsed = first_paragraph.split_whitespace().collect::<Vec<_>>().join(" ");
    // Some prompt revisions repeat the label inside the block body
    let label = Regex::new(
        r"(?i)^\**(?:ultra[\- ]concise|one[\- ](?:line|sentence)) summary\**[ \t]*:[ \t]*",
    )?;
    Ok(clean_fragment(&label.replace(&collapsed, "")))
}

/// Passes 2 and 3: bulleted sections (key takeaways, why-watch).
fn extract_bullets(text: &mut String, headings: &[&str], labels: &[&str]) -> Result<Vec<String>> {
    let block = match heading_block(text, headings)? {
        Some(block) => Some(block),
        None => label_block(text, labels)?,
    };
    let Some(block) = block else {
        return Ok(Vec::new());
    };

    let mut items = list_items(&block.body)?;
    if items.is_empty() {
        items = sentence_items(&block.body);
    }
    text.replace_range(block.span, "");
    Ok(items)
}

/// Pass 4: chapter breakdown. A heading or label block is preferred; with
/// neither present the whole remaining text is scanned for timestamp-led
/// lines, leaving any narrative block alone.
fn extract_chapters(text: &mut String) -> Result<Vec<Chapter>> {
    let block = match heading_block(text, CHAPTER_HEADINGS)? {
        Some(block) => Some(block),
        None => label_block(text, CHAPTER_LABELS)?,
    };
    if let Some(block) = block {
        let chapters = chapters_from_block(&block.body)?;
        text.replace_range(block.span, "");
        return Ok(chapters);
    }
    loose_chapter_scan(text)
}

/// The chapter line shapes seen across prompt revisions, tried in order.
/// The first shape yielding any matches wins; results are never merged
/// across shapes, so a line cannot be counted twice.
fn chapters_from_block(body: &str) -> Result<Vec<Chapter>> {
    let shapes = [
        (format!(r"^[ \t]*({TIMESTAMP})[ \t]*:[ \t]*(.+)$"), false),
        (format!(r"^[ \t]*\[({TIMESTAMP})\]\(t=\d+s?\)[ \t]*:[ \t]*(.+)$"), false),
        (
            format!(r"^[ \t]*\[({TIMESTAMP})\][ \t]*[-–][ \t]*\[(?:{TIMESTAMP})\][ \t]*:[ \t]*(.+)$"),
            false,
        ),
        (
            format!(r"^[ \t]*\[({TIMESTAMP})\]\(t=\d+s?\)[ \t]*[-–][ \t]*\*\*(.+?)\*\*[ \t]*:[ \t]*(.+)$"),
            true,
        ),
        (
            format!(r"^[ \t]*-[ \t]*\[({TIMESTAMP})\]\(t=\d+s?\)[ \t]*\*\*(.+?)\*\*[ \t]*$"),
            true,
        ),
    ];

    for (pattern, bold_title) in &shapes {
        let shape = Regex::new(pattern)?;
        let mut found = Vec::new();
        for line in body.lines() {
            let Some(caps) = shape.captures(line.trim_end()) else {
                continue;
            };
            if *bold_title {
                found.push(Chapter {
                    timestamp: caps[1].to_string(),
                    title: caps[2].trim().to_string(),
                    description: caps
                        .get(3)
                        .map(|capture| capture.as_str().trim().to_string())
                        .unwrap_or_default(),
                });
            } else {
                let (title, description) = split_title_desc(caps[2].trim());
                found.push(Chapter {
                    timestamp: caps[1].to_string(),
                    title,
                    description,
                });
            }
        }
        if !found.is_empty() {
            return Ok(found);
        }
    }

    Ok(Vec::new())
}

fn loose_chapter_scan(text: &mut String) -> Result<Vec<Chapter>> {
    let narrative_span = heading_block(text, NARRATIVE_HEADINGS)?.map(|block| block.span);
    let line_pattern = Regex::new(&format!(
        r"^[ \t]*(?:[-*•][ \t]+)?\[?({TIMESTAMP})\]?(?:\(t=\d+s?\))?(?:[ \t]*[:\-–]|[ \t])[ \t]*(.+)$"
    ))?;

    let mut chapters = Vec::new();
    let mut remainder = String::with_capacity(text.len());
    for span in line_spans(text) {
        let protected = narrative_span
            .as_ref()
            .is_some_and(|narrative| span.start >= narrative.start && span.start < narrative.end);
        let line = &text[span.clone()];
        let captured = if protected { None } else { line_pattern.captures(line.trim_end()) };
        match captured {
            Some(caps) => {
                let (title, description) = split_title_desc(caps[2].trim());
                chapters.push(Chapter {
                    timestamp: caps[1].to_string(),
                    title,
                    description,
                });
            }
            None => remainder.push_str(line),
        }
    }

    if chapters.is_empty() {
        return Ok(Vec::new());
    }
    *text = remainder;
    Ok(chapters)
}

/// Pass 5: whatever is left becomes the narrative. A "Full Narrative
/// Summary" block wins verbatim over the leftover computation; otherwise
/// stray heading markers are stripped while their title text is kept.
fn extract_narrative(text: &mut String) -> Result<String> {
    if let Some(block) = heading_block(text, NARRATIVE_HEADINGS)? {
        let Block { span, body } = block;
        text.replace_range(span, "");
        return Ok(body);
    }

    let mut kept = String::new();
    for span in line_spans(text) {
        let line = &text[span.clone()];
        if is_heading_line(line) {
            let title = heading_title_text(line);
            if !title.is_empty() {
                kept.push_str(&title);
                kept.push('\n');
            }
            continue;
        }
        kept.push_str(line);
    }
    text.clear();

    let collapsed = Regex::new(r"\n{3,}")?.replace_all(&kept, "\n\n");
    Ok(collapsed.trim().to_string())
}

/// A matched section: the byte range to cut from the working text plus the
/// trimmed block body.
struct Block {
    span: Range<usize>,
    body: String,
}

/// Find a markdown heading line carrying one of the given section titles,
/// tolerating emoji or other decoration before the title. The block body
/// runs to the next heading or end of input.
fn heading_block(text: &str, titles: &[&str]) -> Result<Option<Block>> {
    let heading = section_heading_regex(titles)?;
    let spans = line_spans(text);

    for (index, span) in spans.iter().enumerate() {
        if !heading.is_match(text[span.clone()].trim_end()) {
            continue;
        }
        let mut end_line = index + 1;
        while end_line < spans.len() && !is_heading_line(&text[spans[end_line].clone()]) {
            end_line += 1;
        }
        let body_start = span.end;
        let body_end = if end_line > index + 1 { spans[end_line - 1].end } else { body_start };
        let body = text[body_start..body_end].trim().to_string();
        return Ok(Some(Block { span: span.start..body_end, body }));
    }

    Ok(None)
}

/// Find an inline label line ("Key Takeaways:", "**Reasons to Watch:**")
/// and the list items directly under it. With no list items the paragraph
/// below the label is taken instead, so sentence splitting still has
/// something to work on.
fn label_block(text: &str, labels: &[&str]) -> Result<Option<Block>> {
    let label = label_regex(labels)?;
    let list_item = list_item_regex()?;
    let spans = line_spans(text);

    for (index, span) in spans.iter().enumerate() {
        if !label.is_match(text[span.clone()].trim_end()) {
            continue;
        }

        let mut last_item = index;
        let mut cursor = index + 1;
        while cursor < spans.len() {
            let line = text[spans[cursor].clone()].trim_end();
            if line.trim().is_empty() {
                cursor += 1;
                continue;
            }
            if list_item.is_match(line) {
                last_item = cursor;
                cursor += 1;
                continue;
            }
            break;
        }
        if last_item > index {
            let end = spans[last_item].end;
            let body = text[span.end..end].trim().to_string();
            return Ok(Some(Block { span: span.start..end, body }));
        }

        let mut paragraph_start = index + 1;
        while paragraph_start < spans.len() && text[spans[paragraph_start].clone()].trim().is_empty()
        {
            paragraph_start += 1;
        }
        let mut paragraph_end = paragraph_start;
        while paragraph_end < spans.len() {
            let line = text[spans[paragraph_end].clone()].trim();
            if line.is_empty() || is_heading_line(line) {
                break;
            }
            paragraph_end += 1;
        }
        if paragraph_end > paragraph_start {
            let end = spans[paragraph_end - 1].end;
            let body = text[spans[paragraph_start].start..end].trim().to_string();
            return Ok(Some(Block { span: span.start..end, body }));
        }
        // bare label with nothing under it; keep scanning
    }

    Ok(None)
}

fn section_heading_regex(titles: &[&str]) -> Result<Regex> {
    let alternatives = titles
        .iter()
        .map(|title| regex::escape(title))
        .collect::<Vec<_>>()
        .join("|");
    Ok(Regex::new(&format!(
        r"^[ \t]{{0,3}}#{{1,6}}[ \t]*[^\p{{L}}\p{{N}}]*(?i:{alternatives})[ \t:*]*$"
    ))?)
}

fn label_regex(labels: &[&str]) -> Result<Regex> {
    let alternatives = labels
        .iter()
        .map(|label| regex::escape(label))
        .collect::<Vec<_>>()
        .join("|");
    Ok(Regex::new(&format!(r"^[ \t]*\**(?i:{alternatives})\**[ \t]*:[:* \t]*$"))?)
}

fn list_item_regex() -> Result<Regex> {
    Ok(Regex::new(r"^[ \t]*(?:[-*•]|\d{1,2}[.)])[ \t]+(.+)$")?)
}

fn list_items(body: &str) -> Result<Vec<String>> {
    let item = list_item_regex()?;
    let mut items = Vec::new();
    for line in body.lines() {
        if let Some(caps) = item.captures(line.trim_end()) {
            items.push(caps[1].trim().to_string());
        }
    }
    Ok(items)
}

/// Fallback for a matched section with no bullets: split on sentence
/// boundaries, keeping only sentences of three or more words.
fn sentence_items(body: &str) -> Vec<String> {
    let collapsed = body.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .split(". ")
        .map(|sentence| sentence.trim().trim_end_matches('.').trim())
        .filter(|sentence| sentence.split_whitespace().count() >= 3)
        .map(str::to_string)
        .collect()
}

fn split_title_desc(rest: &str) -> (String, String) {
    let parts = rest.split_once(" - ").or_else(|| rest.split_once(" – "));
    match parts {
        Some((title, description)) => (clean_fragment(title), clean_fragment(description)),
        None => (clean_fragment(rest), String::new()),
    }
}

fn clean_fragment(fragment: &str) -> String {
    fragment.trim().trim_matches('*').trim().to_string()
}

fn is_heading_line(line: &str) -> bool {
    let trimmed = line.trim();
    let hashes = trimmed.len() - trimmed.trim_start_matches('#').len();
    if !(1..=6).contains(&hashes) {
        return false;
    }
    let rest = &trimmed[hashes..];
    rest.is_empty() || rest.starts_with(' ') || rest.starts_with('\t')
}

fn heading_title_text(line: &str) -> String {
    line.trim()
        .trim_start_matches('#')
        .trim_start_matches(|character: char| !character.is_alphanumeric())
        .trim()
        .trim_matches('*')
        .trim()
        .to_string()
}

/// Byte ranges of each line, trailing newline included
fn line_spans(text: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut start = 0;
    for (index, byte) in text.bytes().enumerate() {
        if byte == b'\n' {
            spans.push(start..index + 1);
            start = index + 1;
        }
    }
    if start < text.len() {
        spans.push(start..text.len());
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        let sections = parse_summary("");
        assert!(sections.is_empty());
    }

    #[test]
    fn test_whitespace_input() {
        let sections = parse_summary("   \n\n\t  \n");
        assert!(sections.is_empty());
    }

    #[test]
    fn test_unbalanced_markdown_does_not_panic() {
        let sections = parse_summary("## Key Takeaways\n- **unclosed bold\n* second] item[");
        assert_eq!(sections.key_takeaways.len(), 2);
    }

    #[test]
    fn test_plain_sentence_becomes_one_line() {
        let sections = parse_summary("Just a plain sentence with no structure at all.");
        assert_eq!(sections.one_line_summary, "Just a plain sentence with no structure at all.");
        assert!(sections.key_takeaways.is_empty());
        assert!(sections.why_watch.is_empty());
        assert!(sections.chapters.is_empty());
        assert!(sections.narrative.is_empty());
    }

    #[test]
    fn test_full_digest_with_headings() {
        let raw = "\
## Ultra-Concise Summary
A tour of async Rust pitfalls.

## Key Takeaways
- Executors are not interchangeable
- Blocking calls starve the runtime

## Why Watch
- Practical examples from production incidents

## Section Breakdown
[00:00]-[03:10]: Intro - Why async is hard
[03:10]-[12:45]: Executors - Tokio internals

## Full Narrative Summary
The speaker opens with a war story.

Then a deep dive follows.
";
        let sections = parse_summary(raw);
        assert_eq!(sections.one_line_summary, "A tour of async Rust pitfalls.");
        assert_eq!(
            sections.key_takeaways,
            vec!["Executors are not interchangeable", "Blocking calls starve the runtime"]
        );
        assert_eq!(sections.why_watch, vec!["Practical examples from production incidents"]);
        assert_eq!(sections.chapters.len(), 2);
        assert_eq!(sections.chapters[0].timestamp, "00:00");
        assert_eq!(sections.chapters[0].title, "Intro");
        assert_eq!(sections.chapters[0].description, "Why async is hard");
        assert_eq!(sections.chapters[1].timestamp, "03:10");
        assert_eq!(
            sections.narrative,
            "The speaker opens with a war story.\n\nThen a deep dive follows."
        );
    }

    #[test]
    fn test_idempotent_extraction() {
        let raw = "## Key Takeaways\n- First point\n- Second point\n\n## Full Narrative Summary\nSome prose here.\n";
        let sections = parse_summary(raw);
        assert_eq!(sections.key_takeaways.len(), 2);

        let again = parse_summary(&sections.narrative);
        assert!(again.key_takeaways.is_empty());
        assert!(again.chapters.is_empty());
    }

    #[test]
    fn test_inline_one_line_label() {
        let sections = parse_summary("Ultra-concise summary: Rust in one hundred seconds.\n\nMore prose follows here.");
        assert_eq!(sections.one_line_summary, "Rust in one hundred seconds.");
        assert_eq!(sections.narrative, "More prose follows here.");
    }

    #[test]
    fn test_heading_body_repeats_label() {
        let raw = "## Ultra-Concise Summary\nUltra-concise summary: Compact overview.\n";
        let sections = parse_summary(raw);
        assert_eq!(sections.one_line_summary, "Compact overview.");
    }

    #[test]
    fn test_bullet_marker_stripping() {
        let raw = "Key Takeaways:\n- First point\n* Second point\n1. Third point";
        let sections = parse_summary(raw);
        assert_eq!(sections.key_takeaways, vec!["First point", "Second point", "Third point"]);
    }

    #[test]
    fn test_unicode_bullet_marker() {
        let raw = "## Key Takeaways\n• Compact binaries\n• No runtime";
        let sections = parse_summary(raw);
        assert_eq!(sections.key_takeaways, vec!["Compact binaries", "No runtime"]);
    }

    #[test]
    fn test_numbered_paren_marker() {
        let raw = "## Key Points\n1) Alpha point here\n2) Beta point here";
        let sections = parse_summary(raw);
        assert_eq!(sections.key_takeaways, vec!["Alpha point here", "Beta point here"]);
    }

    #[test]
    fn test_sentence_fallback_when_no_bullets() {
        let raw = "## Key Takeaways\nFirst insight about the borrow checker. Second point on lifetimes here.";
        let sections = parse_summary(raw);
        assert_eq!(
            sections.key_takeaways,
            vec!["First insight about the borrow checker", "Second point on lifetimes here"]
        );
    }

    #[test]
    fn test_why_watch_bold_label() {
        let raw = "**Reasons to Watch:**\n- Clear diagrams\n- Real benchmarks";
        let sections = parse_summary(raw);
        assert_eq!(sections.why_watch, vec!["Clear diagrams", "Real benchmarks"]);
    }

    #[test]
    fn test_emoji_heading_recognized() {
        let raw = "## 🔑 Key Takeaways\n- Point one here\n- Point two here";
        let sections = parse_summary(raw);
        assert_eq!(sections.key_takeaways.len(), 2);
    }

    #[test]
    fn test_heading_case_insensitive() {
        let raw = "## KEY TAKEAWAYS\n- Shouting still counts";
        let sections = parse_summary(raw);
        assert_eq!(sections.key_takeaways, vec!["Shouting still counts"]);
    }

    #[test]
    fn test_chapter_shape_plain() {
        let raw = "## Chapter Breakdown\n0:00: Intro - Welcome\n2:30: Setup - Tools";
        let sections = parse_summary(raw);
        assert_eq!(sections.chapters.len(), 2);
        assert_eq!(sections.chapters[1].timestamp, "2:30");
        assert_eq!(sections.chapters[1].title, "Setup");
        assert_eq!(sections.chapters[1].description, "Tools");
    }

    #[test]
    fn test_chapter_shape_explicit_link() {
        let raw = "## Section Breakdown\n[0:45](t=45): Demo - Live coding";
        let sections = parse_summary(raw);
        assert_eq!(sections.chapters.len(), 1);
        assert_eq!(sections.chapters[0].timestamp, "0:45");
        assert_eq!(sections.chapters[0].title, "Demo");
    }

    #[test]
    fn test_chapter_shape_range() {
        let raw = "## Section Breakdown\n[00:00]-[02:15]: Opening - The setup\n[02:15]-[09:40]: Argument - The core claim";
        let sections = parse_summary(raw);
        assert_eq!(sections.chapters.len(), 2);
        assert_eq!(sections.chapters[0].timestamp, "00:00");
        assert_eq!(sections.chapters[1].timestamp, "02:15");
        assert_eq!(sections.chapters[1].description, "The core claim");
    }

    #[test]
    fn test_chapter_shape_bold_title() {
        let raw = "## Section Breakdown\n[00:30](t=30) - **Setup**: Installing the toolchain";
        let sections = parse_summary(raw);
        assert_eq!(sections.chapters.len(), 1);
        assert_eq!(sections.chapters[0].title, "Setup");
        assert_eq!(sections.chapters[0].description, "Installing the toolchain");
    }

    #[test]
    fn test_chapter_shape_bullet_bold() {
        let raw = "## Section Breakdown\n- [01:00](t=60) **Overview**\n- [03:20](t=200) **Details**";
        let sections = parse_summary(raw);
        assert_eq!(sections.chapters.len(), 2);
        assert_eq!(sections.chapters[0].title, "Overview");
        assert_eq!(sections.chapters[0].description, "");
    }

    #[test]
    fn test_first_chapter_shape_wins() {
        let raw = "## Section Breakdown\n0:00: Intro - Welcome\n- [01:00](t=60) **Overview**";
        let sections = parse_summary(raw);
        assert_eq!(sections.chapters.len(), 1);
        assert_eq!(sections.chapters[0].title, "Intro");
    }

    #[test]
    fn test_loose_chapter_ordering() {
        let sections = parse_summary("0:00: Intro - Welcome\n2:30: Setup - Getting started");
        assert_eq!(sections.chapters.len(), 2);
        assert_eq!(sections.chapters[0].timestamp, "0:00");
        assert_eq!(sections.chapters[0].title, "Intro");
        assert_eq!(sections.chapters[0].description, "Welcome");
        assert_eq!(sections.chapters[1].timestamp, "2:30");
        assert_eq!(sections.chapters[1].title, "Setup");
        assert_eq!(sections.chapters[1].description, "Getting started");
    }

    #[test]
    fn test_chapter_label_form() {
        let raw = "Section Breakdown:\n[00:00]-[02:15]: Intro - Welcome and agenda\n[02:15]-[05:00]: Main - The core argument";
        let sections = parse_summary(raw);
        assert_eq!(sections.chapters.len(), 2);
        assert_eq!(sections.chapters[0].title, "Intro");
    }

    #[test]
    fn test_narrative_block_preferred_verbatim() {
        let raw = "\
## Full Narrative Summary
The full story goes here.

More of the story.

## Random Other Notes
Leftover notes.
";
        let sections = parse_summary(raw);
        assert_eq!(sections.narrative, "The full story goes here.\n\nMore of the story.");
    }

    #[test]
    fn test_narrative_block_keeps_timestamp_lines() {
        let raw = "## Full Narrative Summary\n1:05 - the speaker pivots to benchmarks.\n";
        let sections = parse_summary(raw);
        assert!(sections.chapters.is_empty());
        assert!(sections.narrative.contains("1:05"));
    }

    #[test]
    fn test_stray_heading_markers_stripped() {
        let raw = "## 📚 Content Overview\nBody text stays in the narrative.\n";
        let sections = parse_summary(raw);
        assert_eq!(sections.narrative, "Content Overview\nBody text stays in the narrative.");
    }

    #[test]
    fn test_crlf_input() {
        let raw = "## Key Takeaways\r\n- Windows line endings\r\n- Still parse fine\r\n";
        let sections = parse_summary(raw);
        assert_eq!(sections.key_takeaways, vec!["Windows line endings", "Still parse fine"]);
    }

    #[test]
    fn test_sections_in_any_document_position() {
        let raw = "\
Intro prose that is fairly long and should not be mistaken for anything structured at all, running well past what a one-line summary would plausibly be, because the whole point of this line is to exceed the length cutoff used by the lede fallback and stay in the narrative.

## Why Watch
- Because benchmarks

## Key Takeaways
- Order of sections does not matter
";
        let sections = parse_summary(raw);
        assert_eq!(sections.why_watch, vec!["Because benchmarks"]);
        assert_eq!(sections.key_takeaways, vec!["Order of sections does not matter"]);
        assert!(sections.narrative.starts_with("Intro prose"));
    }
}
