use std::io::{self, BufRead};
use std::path::PathBuf;
use std::time::Duration;

use eyre::{Result, WrapErr, bail};
use log::{debug, info};

mod cli;

use cli::{Cli, OutputFormat};

fn setup_logging() -> Result<()> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_file = log_dir.join("ytdigest.log");

    let target = Box::new(std::fs::OpenOptions::new().create(true).append(true).open(&log_file)?);

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized: {}", log_file.display());
    Ok(())
}

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ytdigest")
        .join("logs")
}

fn build_after_help() -> String {
    let config_path = ytdigest::config::config_path();
    let log_path = log_dir().join("ytdigest.log");

    format!(
        "\nCONFIG:\n  {} (api_url, default_format)\n\nLogs are written to: {}",
        config_path.display(),
        log_path.display()
    )
}

fn parse_format(name: &str) -> Option<OutputFormat> {
    match name.to_lowercase().as_str() {
        "text" => Some(OutputFormat::Text),
        "json" => Some(OutputFormat::Json),
        "html" => Some(OutputFormat::Html),
        _ => None,
    }
}

/// Retry an async operation with exponential backoff
async fn retry<F, Fut, T>(max_attempts: u32, operation: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut last_err = None;
    for attempt in 0..max_attempts {
        match operation().await {
            Ok(val) => return Ok(val),
            Err(e) => {
                if attempt + 1 < max_attempts {
                    let delay = Duration::from_millis(500 * 2u64.pow(attempt));
                    debug!("Attempt {} failed: {e}, retrying in {delay:?}", attempt + 1);
                    tokio::time::sleep(delay).await;
                }
                last_err = Some(e);
            }
        }
    }
    Err(last_err.unwrap())
}

/// Poll an async operation until it yields a value. A transient error counts
/// the same as "not ready". The delay doubles per attempt and holds at five
/// times the base.
async fn poll<F, Fut, T>(max_attempts: u32, base_delay: Duration, operation: F) -> Option<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<Option<T>>>,
{
    let cap = base_delay.saturating_mul(5);
    let mut delay = base_delay;
    for attempt in 0..max_attempts {
        match operation().await {
            Ok(Some(value)) => return Some(value),
            Ok(None) => debug!("Not ready yet (attempt {})", attempt + 1),
            Err(e) => debug!("Poll attempt {} failed: {e}", attempt + 1),
        }
        if attempt + 1 < max_attempts {
            tokio::time::sleep(delay).await;
            delay = delay.saturating_mul(2).min(cap);
        }
    }
    None
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging()?;

    let after_help = build_after_help();
    let cmd = <Cli as clap::CommandFactory>::command().after_help(after_help);
    let matches = cmd.get_matches();
    let cli = <Cli as clap::FromArgMatches>::from_arg_matches(&matches)?;

    // Load config file (non-fatal if missing/invalid)
    let config = ytdigest::config::Config::load().unwrap_or_default();

    // Apply config defaults (CLI flags take priority)
    let api_url = cli
        .api_url
        .clone()
        .or_else(|| config.api_url.clone())
        .unwrap_or_else(|| ytdigest::api::DEFAULT_API_URL.to_string());
    let format = cli
        .format
        .or_else(|| config.default_format.as_deref().and_then(parse_format))
        .unwrap_or(OutputFormat::Text);

    if cli.verbose {
        let config_path = ytdigest::config::config_path();
        if config_path.exists() {
            eprintln!("Config: {}", config_path.display());
        }
        eprintln!("API: {api_url}");
    }

    let client = reqwest::Client::new();

    if cli.channels {
        let channels = retry(3, || {
            let client = &client;
            let api_url = &api_url;
            async move { ytdigest::api::fetch_channels(client, api_url).await }
        })
        .await
        .wrap_err("failed to load channels")?;
        print!("{}", ytdigest::output::render_channels(&channels));
        return Ok(());
    }

    if cli.categories {
        let categories = retry(3, || {
            let client = &client;
            let api_url = &api_url;
            async move { ytdigest::api::fetch_categories(client, api_url).await }
        })
        .await
        .wrap_err("failed to load categories")?;
        print!("{}", ytdigest::output::render_categories(&categories));
        return Ok(());
    }

    if cli.list {
        let videos = retry(3, || {
            let client = &client;
            let api_url = &api_url;
            async move { ytdigest::api::fetch_videos(client, api_url).await }
        })
        .await
        .wrap_err("failed to load video library")?;

        let filter = ytdigest::library::LibraryFilter {
            search: cli.search.clone(),
            categories: cli.category.clone(),
            duration: cli.duration.to_filter(),
        };
        let mut videos = ytdigest::library::filter_videos(videos, &filter);
        let (key, order) = cli.sort.to_key_order();
        ytdigest::library::sort_videos(&mut videos, key, order);

        let rendered = ytdigest::output::render_library(&videos);
        if let Some(ref path) = cli.output {
            std::fs::write(path, &rendered)?;
        } else {
            print!("{rendered}");
        }
        return Ok(());
    }

    // Collect URLs: from arg or stdin
    let urls = if let Some(ref url) = cli.url {
        vec![url.clone()]
    } else {
        let stdin = io::stdin();
        stdin.lock().lines().collect::<Result<Vec<_>, _>>()?
    };

    if urls.is_empty() {
        bail!("no URL or video ID provided\n\nUsage: ytdigest <URL>\n       echo <URL> | ytdigest\n       ytdigest --list");
    }

    for url_input in &urls {
        let url_input = url_input.trim().to_string();
        if url_input.is_empty() {
            continue;
        }

        let youtube_id = ytdigest::extract_video_id(&url_input)
            .ok_or_else(|| eyre::eyre!("could not extract video ID from: {url_input}\n\nSupported formats:\n  https://www.youtube.com/watch?v=ID\n  https://youtu.be/ID\n  https://www.youtube.com/embed/ID\n  https://www.youtube.com/shorts/ID\n  https://www.youtube.com/v/ID\n  <11-character video ID>"))?;

        let videos = retry(3, || {
            let client = &client;
            let api_url = &api_url;
            async move { ytdigest::api::fetch_videos(client, api_url).await }
        })
        .await
        .wrap_err("failed to load video library")?;

        let video = match ytdigest::api::find_by_youtube_id(&videos, &youtube_id) {
            Some(video) => video.clone(),
            None => {
                if !cli.submit {
                    bail!("video {youtube_id} is not in the library; pass --submit to add it");
                }
                let watch_url = format!("https://www.youtube.com/watch?v={youtube_id}");
                info!("Registering {watch_url}");
                ytdigest::api::create_video(&client, &api_url, &watch_url)
                    .await
                    .wrap_err("failed to register video with the backend")?
            }
        };

        let digests = retry(3, || {
            let client = &client;
            let api_url = &api_url;
            let video_id = video.id;
            async move { ytdigest::api::fetch_video_digests(client, api_url, video_id).await }
        })
        .await
        .wrap_err("failed to load digests")?;

        let raw_summary = if cli.submit {
            let baseline = digests.iter().map(|digest| digest.id).max().unwrap_or(0);
            let requested = ytdigest::api::create_digest(&client, &api_url, video.id)
                .await
                .wrap_err("failed to request digest generation")?;
            info!("Requested digest {} for video {}", requested.id, video.id);
            if cli.verbose {
                eprintln!("Digest requested; waiting for generation...");
            }

            let immediate = requested.digest.filter(|text| !text.trim().is_empty());
            match immediate {
                Some(text) => text,
                None => {
                    // Generation runs in a backend background task, so only a
                    // digest newer than the pre-submit baseline counts
                    let generated = poll(15, Duration::from_secs(2), || {
                        let client = &client;
                        let api_url = &api_url;
                        let video_id = video.id;
                        async move {
                            let digests =
                                ytdigest::api::fetch_video_digests(client, api_url, video_id)
                                    .await?;
                            Ok(ytdigest::api::fresh_digest(&digests, baseline)
                                .and_then(|digest| digest.digest.clone()))
                        }
                    })
                    .await;
                    match generated {
                        Some(text) => text,
                        None => bail!(
                            "digest generation for video {youtube_id} did not finish in time; re-run without --submit once it completes"
                        ),
                    }
                }
            }
        } else {
            ytdigest::api::latest_digest(&digests)
                .and_then(|digest| digest.digest.clone())
                .or_else(|| video.summary.clone())
                .unwrap_or_default()
        };

        // A just-registered video gains title and chapters only once the
        // backend finishes metadata processing, so refresh after submitting
        let video = if cli.submit {
            match ytdigest::api::fetch_video(&client, &api_url, video.id).await {
                Ok(fresh) => fresh,
                Err(error) => {
                    debug!("Could not refresh video record: {error}");
                    video
                }
            }
        } else {
            video
        };

        if raw_summary.trim().is_empty() {
            info!("No digest text for video {youtube_id}");
            eprintln!(
                "No digest available for {}; pass --submit to request one",
                video.title.as_deref().unwrap_or(&youtube_id)
            );
            continue;
        }

        let parsed = ytdigest::digest::parse_summary(&raw_summary);
        let chapters = ytdigest::merge_chapters(&video.chapters, parsed.chapters.clone());
        let sections = ytdigest::DigestSections { chapters, ..parsed };

        if cli.verbose {
            eprintln!(
                "Video: {} ({youtube_id})\nSections: takeaways={} why_watch={} chapters={}\nNarrative: {} chars",
                video.title.as_deref().unwrap_or("(untitled)"),
                sections.key_takeaways.len(),
                sections.why_watch.len(),
                sections.chapters.len(),
                sections.narrative.len(),
            );
        }

        let rendered = match format {
            OutputFormat::Text => ytdigest::output::render_text(&video, &sections),
            OutputFormat::Json => ytdigest::output::render_json(&video, &sections)?,
            OutputFormat::Html => ytdigest::output::render_html(&video, &sections),
        };

        if let Some(ref path) = cli.output {
            std::fs::write(path, &rendered)?;
            if cli.verbose {
                eprintln!("Output written to: {}", path.display());
            }
        } else {
            println!("{rendered}");
        }
    }

    Ok(())
}
