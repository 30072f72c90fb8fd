use civic_eye::severity::IssueType;
use civic_eye::{config, output, pipeline};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "civic-eye")]
#[command(about = "Forensic trust scoring for citizen-report photographs")]
#[command(long_about = "\
Forensic trust scoring for citizen-report photographs

Each image is scored by three independent forensic signals and the results
are fused into a trust score from 0 (likely manipulated) to 100 (no sign of
manipulation). The score and the report's issue type decide how urgently a
human should review it.

Signals:
  ela        JPEG recompression error levels (pasted or retouched regions)
  metadata   EXIF/XMP editing software, missing camera tags, implausible times
  shadow     agreement of light direction across the frame

Accepted inputs: JPEG and PNG.

Issue types: safety, infrastructure, sanitation, other
(the app labels fire, accident, road_block, pothole, water_leak and garbage
are accepted too).

Run 'civic-eye gen-config' to generate a documented config file.")]
#[command(version)]
struct Cli {
    /// Config file (TOML); stock defaults when absent
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

/// Flags shared by the scoring commands.
#[derive(clap::Args, Clone)]
struct ScoreArgs {
    /// Issue type of the report the image belongs to
    #[arg(long, default_value = "other")]
    issue_type: IssueType,

    /// Print the assessment as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Score one image
    Analyze {
        file: PathBuf,

        /// Declared MIME type; guessed from the file extension when absent
        #[arg(long)]
        mime: Option<String>,

        #[command(flatten)]
        args: ScoreArgs,
    },
    /// Score many images in parallel
    Batch {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        args: ScoreArgs,
    },
    /// Print the effective severity table
    SeverityTable,
    /// Print a stock config file with all options documented
    GenConfig,
    /// Load and validate the config file
    CheckConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_json);

    match cli.command {
        Command::Analyze { file, mime, args } => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            init_thread_pool(&config.processing);
            let bytes = std::fs::read(&file)?;
            let mime = mime.or_else(|| mime_from_extension(&file).map(str::to_string));
            let assessment = pipeline::assess(&bytes, mime.as_deref(), args.issue_type, &config)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&assessment)?);
            } else {
                output::print_assessment(&file.display().to_string(), &assessment);
            }
        }
        Command::Batch { files, args } => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            init_thread_pool(&config.processing);
            let results: Vec<(String, Result<civic_eye::Assessment, String>)> = files
                .par_iter()
                .map(|path| {
                    let result = std::fs::read(path)
                        .map_err(|e| e.to_string())
                        .and_then(|bytes| {
                            pipeline::assess(
                                &bytes,
                                mime_from_extension(path),
                                args.issue_type,
                                &config,
                            )
                            .map_err(|e| e.to_string())
                        });
                    (path.display().to_string(), result)
                })
                .collect();

            let failed = results.iter().filter(|(_, r)| r.is_err()).count();
            if args.json {
                let records: Vec<serde_json::Value> = results
                    .iter()
                    .map(|(file, result)| match result {
                        Ok(a) => serde_json::json!({ "file": file, "assessment": a }),
                        Err(e) => serde_json::json!({ "file": file, "error": e }),
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                for (file, result) in &results {
                    match result {
                        Ok(a) => println!("{}", output::format_batch_line(file, a)),
                        Err(e) => println!("{}", output::format_batch_error(file, e)),
                    }
                }
                println!(
                    "{}",
                    output::format_batch_summary(results.len() - failed, failed)
                );
            }
            if failed > 0 {
                return Err(format!("{failed} of {} images could not be scored", results.len()).into());
            }
        }
        Command::SeverityTable => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            output::print_severity_table(&config.severity);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::CheckConfig => {
            match &cli.config {
                Some(path) => {
                    config::load_config(path)?;
                    println!("==> {} is valid", path.display());
                }
                None => {
                    config::load_config_or_default(None)?;
                    println!("==> No config file given; stock defaults are valid");
                }
            }
        }
    }

    Ok(())
}

/// Install the global tracing subscriber on stderr.
///
/// `RUST_LOG` wins over the `-v` count when set.
fn init_logging(verbose: u8, json: bool) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available CPU cores: config can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

fn mime_from_extension(path: &Path) -> Option<&'static str> {
    image::ImageFormat::from_extension(path.extension()?).map(|format| format.to_mime_type())
}
