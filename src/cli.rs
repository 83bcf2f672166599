use clap::Parser;
use std::path::PathBuf;

use ytdigest::library::{DurationFilter, SortKey, SortOrder};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Html,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum DurationOption {
    All,
    Short,
    Medium,
    Long,
}

impl DurationOption {
    pub fn to_filter(self) -> DurationFilter {
        match self {
            DurationOption::All => DurationFilter::All,
            DurationOption::Short => DurationFilter::Short,
            DurationOption::Medium => DurationFilter::Medium,
            DurationOption::Long => DurationFilter::Long,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SortOption {
    DateDesc,
    DateAsc,
    TitleAsc,
    TitleDesc,
    ViewsDesc,
    ViewsAsc,
}

impl SortOption {
    pub fn to_key_order(self) -> (SortKey, SortOrder) {
        match self {
            SortOption::DateDesc => (SortKey::Date, SortOrder::Desc),
            SortOption::DateAsc => (SortKey::Date, SortOrder::Asc),
            SortOption::TitleAsc => (SortKey::Title, SortOrder::Asc),
            SortOption::TitleDesc => (SortKey::Title, SortOrder::Desc),
            SortOption::ViewsDesc => (SortKey::Views, SortOrder::Desc),
            SortOption::ViewsAsc => (SortKey::Views, SortOrder::Asc),
        }
    }
}

#[derive(Parser)]
#[command(
    name = "ytdigest",
    about = "YouTube Digest viewer",
    version = env!("GIT_DESCRIBE"),
)]
pub struct Cli {
    /// YouTube video URL or video ID (reads from stdin if omitted)
    pub url: Option<String>,

    /// List the video library instead of showing a digest
    #[arg(short, long)]
    pub list: bool,

    /// List known channels
    #[arg(long)]
    pub channels: bool,

    /// List known categories
    #[arg(long)]
    pub categories: bool,

    /// Request a fresh digest from the backend before displaying
    #[arg(long)]
    pub submit: bool,

    /// Output format: text (default), json, html
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Write output to file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Backend API base URL (overrides config file)
    #[arg(long)]
    pub api_url: Option<String>,

    /// Filter the library by title or channel substring
    #[arg(short, long)]
    pub search: Option<String>,

    /// Filter the library by category (repeatable)
    #[arg(short, long)]
    pub category: Vec<String>,

    /// Filter the library by duration bucket
    #[arg(long, value_enum, default_value_t = DurationOption::All)]
    pub duration: DurationOption,

    /// Library sort order
    #[arg(long, value_enum, default_value_t = SortOption::DateDesc)]
    pub sort: SortOption,

    /// Show resolution metadata on stderr
    #[arg(short, long)]
    pub verbose: bool,
}
