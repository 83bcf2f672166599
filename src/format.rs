use chrono::NaiveDate;

/// Parse a `M:SS` or `H:MM:SS` timestamp into whole seconds
pub fn parse_timestamp(raw: &str) -> Option<u32> {
    let parts: Vec<&str> = raw.trim().split(':').collect();
    match parts.as_slice() {
        [minutes, seconds] => {
            let minutes: u32 = minutes.parse().ok()?;
            let seconds: u32 = seconds.parse().ok()?;
            if seconds >= 60 {
                return None;
            }
            minutes.checked_mul(60)?.checked_add(seconds)
        }
        [hours, minutes, seconds] => {
            let hours: u32 = hours.parse().ok()?;
            let minutes: u32 = minutes.parse().ok()?;
            let seconds: u32 = seconds.parse().ok()?;
            if minutes >= 60 || seconds >= 60 {
                return None;
            }
            hours.checked_mul(3600)?.checked_add(minutes * 60 + seconds)
        }
        _ => None,
    }
}

/// Format whole seconds as `M:SS`, or `H:MM:SS` once past an hour
pub fn format_timestamp(seconds: u32) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes}:{secs:02}")
    }
}

/// Format a count with K/M suffixes, e.g. "1.5K"
pub fn format_count(count: u64) -> String {
    if count < 1_000 {
        count.to_string()
    } else if count < 1_000_000 {
        format!("{:.1}K", count as f64 / 1_000.0)
    } else {
        format!("{:.1}M", count as f64 / 1_000_000.0)
    }
}

/// Format a view count, e.g. "1.5K views"; absent counts read as zero
pub fn format_views(views: Option<u64>) -> String {
    format!("{} views", format_count(views.unwrap_or(0)))
}

/// Parse an upload date in any of the shapes the backend emits:
/// bare "YYYYMMDD", ISO "YYYY-MM-DD", or a full RFC 3339 datetime.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y%m%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .or_else(|_| chrono::DateTime::parse_from_rfc3339(raw).map(|datetime| datetime.date_naive()))
        .ok()
}

/// Format an upload date as "Jan 1, 2023"; unparseable input passes through unchanged
pub fn format_date(raw: &str) -> String {
    match parse_date(raw) {
        Some(date) => date.format("%b %-d, %Y").to_string(),
        None => raw.trim().to_string(),
    }
}
