//! Report Module
//!
//! Human-readable summaries for comparison and conversion results.

use crate::compare::ComparisonResult;
use crate::conversion::DirectoryReport;
use std::fmt::Write as _;

pub fn format_comparison(result: &ComparisonResult) -> String {
    let output = result
        .output_file
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "None".to_string());

    let mut text = String::new();
    let _ = writeln!(text, "Pixel Match Percentage: {:.2}%", result.pixel_match);
    let _ = writeln!(text, "Color Match: {:.2}", result.color_match);
    let _ = write!(text, "Output File: {}", output);
    text
}

pub fn print_comparison_report(result: &ComparisonResult) {
    if result.resized {
        eprintln!(
            "⚠️  Second image was resized to {}x{} before comparison",
            result.width, result.height
        );
    }
    println!("{}", format_comparison(result));
}

pub fn format_directory_summary(report: &DirectoryReport) -> String {
    let mut text = format!(
        "✅ Complete: {} converted, {} failed, {} skipped (total: {}, {:.1}% success)",
        report.succeeded.len(),
        report.errors.len(),
        report.skipped.len(),
        report.total(),
        report.success_rate()
    );
    for (path, error) in &report.errors {
        let _ = write!(text, "\n   ❌ {} → {}", path.display(), error);
    }
    text
}

pub fn print_directory_summary(report: &DirectoryReport) {
    for outcome in &report.succeeded {
        println!("{}", outcome.output.display());
    }
    println!("\n{}", format_directory_summary(report));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::ConversionOutcome;
    use std::path::PathBuf;

    #[test]
    fn test_format_comparison_two_decimals() {
        let result = ComparisonResult {
            pixel_match: 97.5,
            color_match: 441.672_955_930_063_7,
            output_file: None,
            width: 2,
            height: 2,
            resized: false,
        };
        assert_eq!(
            format_comparison(&result),
            "Pixel Match Percentage: 97.50%\nColor Match: 441.67\nOutput File: None"
        );
    }

    #[test]
    fn test_format_comparison_with_output() {
        let result = ComparisonResult {
            pixel_match: 100.0,
            color_match: 0.0,
            output_file: Some(PathBuf::from("a_b.png")),
            width: 1,
            height: 1,
            resized: false,
        };
        assert!(format_comparison(&result).ends_with("Output File: a_b.png"));
    }

    #[test]
    fn test_directory_summary_lists_errors() {
        let mut report = DirectoryReport::new();
        report.success(ConversionOutcome {
            input: PathBuf::from("a.heic"),
            output: PathBuf::from("a.heic.jpg"),
            width: 1,
            height: 1,
        });
        report.fail(PathBuf::from("b.heic"), "corrupt".to_string());

        let text = format_directory_summary(&report);
        assert!(text.starts_with("✅ Complete: 1 converted, 1 failed, 0 skipped (total: 2, 50.0% success)"));
        assert!(text.contains("b.heic → corrupt"));
    }
}
