use anyhow::Context;
use clap::{Parser, ValueEnum};
use console::style;
use image_utils::logging::{init_logging, LogConfig};
use image_utils::report::print_comparison_report;
use image_utils::{AlignPolicy, ComparisonResult, ImageComparator};
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser, Debug)]
#[command(name = "compare")]
#[command(version, about = "Compare two images pixel by pixel", long_about = None)]
struct Cli {
    #[arg(long, value_enum, default_value = "human")]
    format: OutputFormat,

    /// Fail instead of resizing the second image when sizes differ.
    #[arg(long)]
    strict_size: bool,

    /// Directory for the difference image (default: current directory).
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,

    #[arg(value_name = "FILE1")]
    file1: PathBuf,

    #[arg(value_name = "FILE2")]
    file2: PathBuf,

    /// Any extra argument enables writing the difference image.
    #[arg(value_name = "OUTPUT", trailing_var_arg = true, allow_hyphen_values = true)]
    extra: Vec<String>,
}

impl Cli {
    fn produce_output(&self) -> bool {
        !self.extra.is_empty()
    }

    fn align_policy(&self) -> AlignPolicy {
        if self.strict_size {
            AlignPolicy::Reject
        } else {
            AlignPolicy::Stretch
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
    if let Err(e) = init_logging("compare", LogConfig::default().with_level(level)) {
        eprintln!("{}", logging_warning(&e));
    }

    if let Err(e) = run(&cli) {
        tracing::error!(error = %e, "Comparison failed");
        eprintln!("{} {:#}", style("❌ Error:").red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let mut comparator = ImageComparator::new().with_align_policy(cli.align_policy());
    if let Some(dir) = &cli.output_dir {
        comparator = comparator.with_output_dir(dir);
    }

    let result = comparator
        .compare(&cli.file1, &cli.file2, cli.produce_output())
        .with_context(|| {
            format!(
                "Failed to compare {} with {}",
                cli.file1.display(),
                cli.file2.display()
            )
        })?;

    print_result(&result, cli.format)
}

fn logging_warning(e: &anyhow::Error) -> String {
    format!("{} Logging disabled: {:#}", style("⚠️").yellow(), e)
}

fn print_result(result: &ComparisonResult, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Human => print_comparison_report(result),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(result)?),
    }
    Ok(())
}
