use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use image_fetch::config::{self, FetchConfig};
use image_fetch::utils::images;
use image_fetch::{DownloadScope, ImageFetcher, NamingStrategy, PhotoStore};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;

/// Download images by URL into a local photo directory
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Download one or more image URLs
    Fetch {
        /// URLs to download
        #[arg(required = true)]
        urls: Vec<String>,

        /// Media root the photo directory is created under
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Request timeout in seconds (0 waits forever)
        #[arg(short, long)]
        timeout: Option<u64>,

        /// How saved files are named
        #[arg(short, long, value_enum)]
        naming: Option<NamingStrategy>,

        /// Number of downloads to run at once
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Decode each saved file and warn if it isn't a readable image
        #[arg(long, default_value_t = false)]
        verify: bool,
    },
    /// List downloaded images
    List {
        /// Media root the photo directory lives under
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Print as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Show format and dimensions of a downloaded image
    Preview {
        /// Image file to inspect
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    image_fetch::logging::init_logging(args.verbose);

    let config_path = match args.config {
        Some(path) => path,
        None => config::config_path()?,
    };

    match args.command {
        Commands::Fetch {
            urls,
            root,
            timeout,
            naming,
            jobs,
            verify,
        } => {
            let mut cfg = config::load_or_init(&config_path)?;
            if let Some(root) = root {
                cfg.media_root = Some(root);
            }
            if let Some(timeout) = timeout {
                cfg.timeout_secs = timeout;
            }
            if let Some(naming) = naming {
                cfg.naming = naming;
            }
            if let Some(jobs) = jobs {
                cfg.max_concurrent = jobs;
            }

            let failures = fetch_all(&cfg, urls, verify).await?;
            if failures > 0 {
                eprintln!("{} download(s) failed", failures);
                std::process::exit(1);
            }
        }
        Commands::List { root, json } => {
            let mut cfg = config::load_or_default(&config_path)?;
            if let Some(root) = root {
                cfg.media_root = Some(root);
            }
            let store = PhotoStore::new(cfg.resolve_media_root()?, &cfg.photo_dir);
            let photos = store
                .list()
                .with_context(|| format!("reading {}", store.dir().display()))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&photos)?);
            } else if photos.is_empty() {
                println!("No images in {}", store.dir().display());
            } else {
                for photo in &photos {
                    println!("{:>10}  {}", photo.bytes, photo.file_name);
                }
                println!("Total images: {}", photos.len());
            }
        }
        Commands::Preview { file } => {
            let info = images::inspect(&file)?;
            println!("File: {}", info.path.display());
            println!("Format: {}", info.format_name());
            println!("Dimensions: {}x{}", info.width, info.height);
            println!("Size: {} bytes", info.bytes);
            if let Err(e) = images::validate(&info) {
                eprintln!("Warning: {}", e);
            }
        }
    }

    Ok(())
}

/// Run every URL through one scope and report each outcome. Returns the number of failures.
async fn fetch_all(cfg: &FetchConfig, urls: Vec<String>, verify: bool) -> Result<usize> {
    let media_root = cfg.resolve_media_root()?;
    let fetcher = ImageFetcher::new(cfg, &media_root)?;
    println!("Saving to: {}", fetcher.store().dir().display());

    let mut scope = DownloadScope::new(Arc::new(fetcher), cfg.max_concurrent);
    for url in urls {
        scope.launch(url);
    }

    let pb = ProgressBar::new(scope.in_flight() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}")?
            .progress_chars("#>-"),
    );

    let mut failures = 0;
    while let Some(outcome) = scope.next_outcome().await {
        pb.inc(1);
        match outcome.result {
            Ok(saved) => {
                pb.println(format!("{} -> {}", outcome.url, saved.file_name));
                if verify {
                    let checked =
                        images::inspect(&saved.path).and_then(|info| images::validate(&info));
                    if let Err(e) = checked {
                        pb.println(format!("  warning: {}", e));
                    }
                }
            }
            Err(e) => {
                failures += 1;
                tracing::warn!("[task {}] {}", outcome.id, e);
                pb.println(format!("{} failed: {}", outcome.url, e));
            }
        }
    }
    pb.finish_and_clear();

    Ok(failures)
}
