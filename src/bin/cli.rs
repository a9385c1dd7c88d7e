use clap::Parser;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use indicatif_log_bridge::LogWrapper;
use log::{LevelFilter, error, info, warn};
use rutubedl::Rutube;
use rutubedl::config::Config;
use rutubedl::error::Error;
use rutubedl::model::{SelectionPolicy, VideoInfo};
use rutubedl::notify::Notifier;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

#[derive(Parser, Clone)]
#[command(version, about = "Download rutube videos without re-encoding")]
pub struct Cli {
    /// The video page URL; asked for when omitted.
    pub url: Option<String>,

    /// best, average, worst or a 1-based position; asked for when omitted.
    #[arg(long = "quality", short)]
    pub quality: Option<SelectionPolicy>,

    #[arg(long = "output-dir", short)]
    pub output_dir: Option<PathBuf>,

    #[arg(long = "ffmpeg")]
    pub ffmpeg: Option<PathBuf>,

    /// Also save the thumbnail as <title>.jpg.
    #[arg(long = "thumbnail", action = clap::ArgAction::SetTrue)]
    pub thumbnail: bool,

    #[arg(long = "ntfy-topic")]
    pub ntfy_topic: Option<String>,

    /// Append logs to this file instead of the terminal.
    #[arg(long = "log-file")]
    pub log_file: Option<PathBuf>,

    #[arg(
        long = "verbosity",
        short,
        default_value = "info",
        value_parser = clap::builder::PossibleValuesParser::new([
            "info", "debug", "error", "none", "full"
        ])
    )]
    pub verbosity: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Cli::parse();
    let progress = MultiProgress::new();
    if let Err(e) = init_logger(&args, &progress) {
        eprintln!("Failed to set up logging: {}", e);
        return ExitCode::FAILURE;
    }

    let mut config = Config::load_or_default();
    if let Some(output_dir) = args.output_dir.clone() {
        config.output_dir = output_dir;
    }
    if let Some(ffmpeg) = args.ffmpeg.clone() {
        config.ffmpeg = ffmpeg;
    }
    if let Some(topic) = args.ntfy_topic.clone() {
        config.ntfy_topic = Some(topic);
    }

    let notifier = match &config.ntfy_topic {
        Some(topic) => Notifier::connect(&config.ntfy_server, topic).await,
        None => None,
    };
    let rutube = Rutube::from_config(&config).with_notifier(notifier);

    match run(&args, &rutube, &progress).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

async fn run(args: &Cli, rutube: &Rutube, progress: &MultiProgress) -> Result<(), u8> {
    let url = match &args.url {
        Some(url) => url.clone(),
        None => prompt("Enter video url: ").map_err(|e| {
            error!("{}", e);
            1u8
        })?,
    };

    let info = match rutube.fetch_video_info(&url).await {
        Ok(info) => info,
        Err(e) => return Err(abort(rutube, &url, e).await),
    };
    if info.variants.is_empty() {
        error!("No streams found in the master playlist");
        let e = Error::VariantIndex { index: 0, len: 0 };
        return Err(abort(rutube, &url, e).await);
    }

    let policy = match args.quality {
        Some(policy) => policy,
        None => choose_resolution(&info).map_err(|e| {
            error!("{}", e);
            1u8
        })?,
    };
    let variant = match rutube.select(&info, policy) {
        Ok(variant) => variant,
        Err(e) => return Err(abort(rutube, &url, e).await),
    };

    if args.thumbnail {
        match rutube.download_thumbnail(&info).await {
            Ok(path) => info!("Saved thumbnail in '{}'", path.display()),
            Err(e) => warn!("Thumbnail not saved: {}", e),
        }
    }

    let spinner = progress.add(ProgressBar::new_spinner());
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("Downloading {}", variant.resolution));
    spinner.enable_steady_tick(Duration::from_millis(120));

    let result = rutube.download_variant(&info, variant).await;
    spinner.finish_and_clear();
    rutube.report(&url, &result).await;

    result.map(|_| ()).map_err(|e| e.exit_code())
}

/// Reports a failure that stopped the download before it started.
async fn abort(rutube: &Rutube, url: &str, e: Error) -> u8 {
    warn!("Aborting: {}", e);
    let code = e.exit_code();
    rutube.report(url, &Err(e)).await;
    code
}

fn init_logger(args: &Cli, progress: &MultiProgress) -> Result<(), Box<dyn std::error::Error>> {
    let level = match args.verbosity.as_str() {
        "none" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "debug" => LevelFilter::Debug,
        "full" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    };

    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(level.min(LevelFilter::Warn))
        .filter_module("rutubedl", level)
        .format_target(false);

    if let Some(path) = &args.log_file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
        builder.try_init()?;
        return Ok(());
    }

    let logger = builder.build();
    LogWrapper::new(progress.clone(), logger).try_init()?;
    log::set_max_level(level);
    Ok(())
}

fn prompt(message: &str) -> std::io::Result<String> {
    print!("{}", message);
    std::io::stdout().flush()?;
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn choose_resolution(info: &VideoInfo) -> std::io::Result<SelectionPolicy> {
    let n = info.variants.len();
    println!("Available resolutions:");
    for (i, variant) in info.variants.iter().enumerate() {
        println!("{}) {}", i + 1, variant.resolution);
    }

    loop {
        let input = prompt("Choose resolution (default - 1): ")?;
        let choice = if input.is_empty() {
            Some(1)
        } else {
            input.parse::<usize>().ok()
        };

        match choice {
            Some(choice) if (1..=n).contains(&choice) => {
                return Ok(SelectionPolicy::Index(choice - 1));
            }
            _ => println!("Option must be a number between 1 and {}", n),
        }
    }
}
