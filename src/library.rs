use chrono::NaiveDate;

use crate::api::Video;
use crate::format::parse_date;

/// Duration buckets: short is under five minutes, long is twenty and up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DurationFilter {
    #[default]
    All,
    Short,
    Medium,
    Long,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Date,
    Title,
    Views,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Default)]
pub struct LibraryFilter {
    pub search: Option<String>,
    pub categories: Vec<String>,
    pub duration: DurationFilter,
}

/// Narrow a video listing. Search matches title or channel name
/// case-insensitively; categories are any-of; duration uses the bucket
/// boundaries above. Missing fields never match a narrowing filter.
pub fn filter_videos(mut videos: Vec<Video>, filter: &LibraryFilter) -> Vec<Video> {
    if let Some(term) = &filter.search {
        let term = term.to_lowercase();
        if !term.is_empty() {
            videos.retain(|video| {
                video.title.as_deref().is_some_and(|title| title.to_lowercase().contains(&term))
                    || video
                        .channel_title
                        .as_deref()
                        .is_some_and(|channel| channel.to_lowercase().contains(&term))
            });
        }
    }

    if !filter.categories.is_empty() {
        videos.retain(|video| {
            video.categories.iter().any(|category| {
                filter.categories.iter().any(|wanted| wanted.eq_ignore_ascii_case(category))
            })
        });
    }

    match filter.duration {
        DurationFilter::All => {}
        DurationFilter::Short => videos.retain(|video| video.duration.is_some_and(|d| d < 300)),
        DurationFilter::Medium => {
            videos.retain(|video| video.duration.is_some_and(|d| (300..1200).contains(&d)))
        }
        DurationFilter::Long => videos.retain(|video| video.duration.is_some_and(|d| d >= 1200)),
    }

    videos
}

/// Sort a listing in place. Missing dates sort as oldest, missing titles as
/// empty strings, missing view counts as zero.
pub fn sort_videos(videos: &mut [Video], key: SortKey, order: SortOrder) {
    videos.sort_by(|a, b| {
        let ordering = match key {
            SortKey::Date => upload_date(a).cmp(&upload_date(b)),
            SortKey::Title => {
                let a = a.title.as_deref().unwrap_or("").to_lowercase();
                let b = b.title.as_deref().unwrap_or("").to_lowercase();
                a.cmp(&b)
            }
            SortKey::Views => a.view_count.unwrap_or(0).cmp(&b.view_count.unwrap_or(0)),
        };
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

fn upload_date(video: &Video) -> NaiveDate {
    video
        .upload_date
        .as_deref()
        .and_then(parse_date)
        .unwrap_or(NaiveDate::MIN)
}
