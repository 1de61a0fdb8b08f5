use anyhow::Context;
use clap::{Parser, ValueEnum};
use console::style;
use image_utils::conversion::DEFAULT_JPEG_QUALITY;
use image_utils::logging::{init_logging, LogConfig};
use image_utils::report::print_directory_summary;
use image_utils::{ConvertOptions, HeicConverter};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::Level;

const BATCH_TEMPLATE: &str = "{spinner:.green} {prefix:.cyan.bold} [{bar:40.cyan/blue}] {pos}/{len} {wide_msg}";
const PROGRESS_CHARS: &str = "█▓░";

#[derive(Parser, Debug)]
#[command(name = "convert")]
#[command(version, about = "Convert HEIC images to JPEG", long_about = None)]
struct Cli {
    /// A HEIC file or a directory containing HEIC files.
    #[arg(value_name = "PATH")]
    input: PathBuf,

    #[arg(short, long)]
    recursive: bool,

    /// JPEG quality (1-100).
    #[arg(short, long, default_value_t = DEFAULT_JPEG_QUALITY, value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: u8,

    /// Leave existing `.jpg` outputs untouched.
    #[arg(long)]
    skip_existing: bool,

    /// Do not copy file times from the source.
    #[arg(long)]
    no_preserve_timestamps: bool,

    #[arg(long, value_enum, default_value = "human")]
    format: OutputFormat,

    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn options(&self) -> ConvertOptions {
        ConvertOptions {
            jpeg_quality: self.quality,
            recursive: self.recursive,
            overwrite: !self.skip_existing,
            preserve_timestamps: !self.no_preserve_timestamps,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Human,
    Json,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    if let Err(e) = init_logging("convert", LogConfig::default().with_level(level)) {
        eprintln!("{}", logging_warning(&e));
    }

    let converter = HeicConverter::new(cli.options());

    let outcome = if cli.input.is_file() {
        convert_single(&converter, &cli.input, cli.format)
    } else if cli.input.is_dir() {
        convert_directory(&converter, &cli.input, cli.format)
    } else {
        eprintln!(
            "{} {} is neither a file nor a directory",
            style("❌ Error:").red().bold(),
            cli.input.display()
        );
        std::process::exit(1);
    };

    if let Err(e) = outcome {
        tracing::error!(error = %e, "Conversion failed");
        eprintln!("{} {:#}", style("❌ Error:").red().bold(), e);
        std::process::exit(1);
    }
}

fn convert_single(converter: &HeicConverter, input: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let outcome = converter
        .convert_file(input)
        .with_context(|| format!("Failed to convert {}", input.display()))?;

    match format {
        OutputFormat::Human => println!("{}", outcome.output.display()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
    }
    Ok(())
}

fn convert_directory(converter: &HeicConverter, dir: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let files = converter
        .collect(dir)
        .with_context(|| format!("Failed to scan {}", dir.display()))?;

    let pb = create_progress_bar(files.len() as u64, "HEIC → JPEG", format == OutputFormat::Human);
    let report = converter.convert_files_with(&files, |file| {
        pb.set_message(
            file.file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .into_owned(),
        );
        pb.inc(1);
    });
    pb.finish_and_clear();

    match format {
        OutputFormat::Human => print_directory_summary(&report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    if !report.errors.is_empty() {
        anyhow::bail!("{} of {} files failed to convert", report.errors.len(), report.total());
    }
    Ok(())
}

fn logging_warning(e: &anyhow::Error) -> String {
    format!("{} Logging disabled: {:#}", style("⚠️").yellow(), e)
}

fn create_progress_bar(total: u64, prefix: &str, visible: bool) -> ProgressBar {
    let pb = ProgressBar::new(total);

    if !visible {
        pb.set_draw_target(ProgressDrawTarget::hidden());
        return pb;
    }

    let style = ProgressStyle::with_template(BATCH_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars(PROGRESS_CHARS);
    pb.set_style(style);
    pb.set_prefix(prefix.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
