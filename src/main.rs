//! Medialoader - resolve media encodings and download them through yt-dlp

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use medialoader::downloader::DownloadResult;
use medialoader::utils::paths::default_config_path;
use medialoader::{
    AppSettings, AudioTier, DownloadOrchestrator, QualityRequest, TransferProgress,
};
use std::io::Write;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "medialoader", version, about)]
struct Cli {
    /// Settings file (JSON); defaults to the platform config directory
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output directory, overrides the configured download location
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Print machine-readable JSON instead of summaries
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show title, platform and the main encodings
    Info { url: String },

    /// List every encoding grouped by kind
    Formats { url: String },

    /// Download the encoding nearest to a quality, or an exact encoding id
    Download {
        url: String,
        /// best, 4k, 2160, 1440, 1080, 720, 480, 360, 240
        #[arg(short, long, conflicts_with = "format_id")]
        quality: Option<QualityRequest>,
        #[arg(short, long)]
        format_id: Option<String>,
    },

    /// Extract audio as mp3
    Audio {
        url: String,
        /// best, high, medium, low
        #[arg(short, long)]
        tier: Option<AudioTier>,
    },

    /// Download several URLs concurrently
    Batch {
        #[arg(required = true)]
        urls: Vec<String>,
        #[arg(short, long)]
        quality: Option<QualityRequest>,
    },

    /// Print the source platform of a URL
    Platform { url: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let settings = AppSettings::load(&config_path)
        .with_context(|| format!("failed to load settings from {}", config_path.display()))?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run(cli, settings))
}

async fn run(cli: Cli, settings: AppSettings) -> Result<()> {
    let engine = DownloadOrchestrator::from_settings(&settings);
    if engine.is_degraded() {
        eprintln!("WARNING: yt-dlp not found, serving placeholder data");
        eprintln!("Please install yt-dlp:");
        eprintln!("  pip install yt-dlp");
        eprintln!("  or visit: https://github.com/yt-dlp/yt-dlp");
    }

    let output_dir = cli
        .output
        .clone()
        .unwrap_or_else(|| settings.download_location.clone());

    match cli.command {
        Command::Info { url } => {
            let info = engine.inspect(&url).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                print!("{}", info);
            }
        }
        Command::Formats { url } => {
            let catalog = engine.resolve(&url).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&catalog)?);
            } else {
                for (title, bucket) in [
                    ("Video + audio", catalog.combined()),
                    ("Video only", catalog.video_only()),
                    ("Audio only", catalog.audio_only()),
                ] {
                    if bucket.is_empty() {
                        continue;
                    }
                    println!("{}:", title);
                    for d in bucket {
                        println!("  {:>8}  {}", d.id, d);
                    }
                }
            }
        }
        Command::Download {
            url,
            quality,
            format_id,
        } => {
            let request = match format_id {
                Some(id) => QualityRequest::EncodingId(id),
                None => quality.unwrap_or_else(|| settings.default_quality.clone()),
            };

            let (tx, rx) = mpsc::channel(32);
            let printer = tokio::spawn(print_progress(rx));
            let result = engine
                .download_with_progress(&url, &output_dir, &request, Some(tx))
                .await;
            // sender is dropped with the request, so the printer ends
            let _ = printer.await;
            report(&url, result, cli.json)?;
        }
        Command::Audio { url, tier } => {
            let tier = tier.unwrap_or(settings.default_audio_tier);
            let result = engine.download_audio(&url, &output_dir, tier).await;
            report(&url, result, cli.json)?;
        }
        Command::Batch { urls, quality } => {
            let request = quality.unwrap_or_else(|| settings.default_quality.clone());
            let results = engine.download_batch(&urls, &output_dir, &request).await;
            let failed = results.iter().filter(|(_, r)| r.is_err()).count();

            if cli.json {
                let rows: Vec<serde_json::Value> = results
                    .iter()
                    .map(|(url, result)| match result {
                        Ok(media) => serde_json::json!({ "url": url, "ok": media }),
                        Err(e) => serde_json::json!({ "url": url, "error": e.to_string() }),
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                for (url, result) in &results {
                    match result {
                        Ok(media) => println!("OK   {} -> {}", url, media.file_path.display()),
                        Err(e) => println!("FAIL {}: {}", url, e),
                    }
                }
            }

            if failed > 0 {
                anyhow::bail!("{} of {} downloads failed", failed, urls.len());
            }
        }
        Command::Platform { url } => {
            let label = engine.classify_platform(&url);
            if cli.json {
                println!("{}", serde_json::json!({ "url": url, "platform": label }));
            } else {
                println!("{}", label);
            }
        }
    }

    Ok(())
}

async fn print_progress(mut rx: mpsc::Receiver<TransferProgress>) {
    let mut shown = false;
    while let Some(p) = rx.recv().await {
        eprint!(
            "\r{:5.1}% of {:.1} MB at {:.2} MB/s",
            p.percent,
            p.total_bytes as f64 / (1024.0 * 1024.0),
            p.speed_bps / (1024.0 * 1024.0)
        );
        let _ = std::io::stderr().flush();
        shown = true;
    }
    if shown {
        eprintln!();
    }
}

fn report(url: &str, result: DownloadResult, json: bool) -> Result<()> {
    let media = result.with_context(|| format!("download failed for {}", url))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&media)?);
    } else {
        println!("Title:   {}", media.title);
        println!("Quality: {} (encoding {})", media.quality_label, media.encoding_id);
        println!("Size:    {:.1} MB", media.size_mb);
        println!("Saved:   {}", media.file_path.display());
    }
    Ok(())
}
