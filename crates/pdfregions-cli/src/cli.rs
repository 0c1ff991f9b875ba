use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

/// Capture text regions from a PDF page and reuse them across documents.
#[derive(Debug, Parser)]
#[command(name = "pdfregions", about, version)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Interactively label regions of the first page of a PDF
    Capture(CaptureArgs),

    /// Apply a saved template to a PDF or a directory of PDFs
    Batch(BatchArgs),
}

#[derive(Debug, Args)]
pub struct CaptureArgs {
    /// Path to the PDF file
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Preview render resolution
    #[arg(long, default_value_t = 150.0, value_parser = parse_dpi)]
    pub dpi: f64,

    /// Keep the page preview image at this path. Without it the preview goes
    /// to a temporary directory that is removed when the command ends.
    #[arg(long, value_name = "PATH")]
    pub preview: Option<PathBuf>,

    /// Where the flat capture CSV goes if you choose to export it
    #[arg(long, value_name = "PATH", default_value = "captured_data.csv")]
    pub capture_csv: PathBuf,

    /// Where the template goes if you choose to save it
    #[arg(long, value_name = "PATH", default_value = "rect_template.json")]
    pub template_out: PathBuf,

    /// Plan table the session row is appended to
    #[arg(long, value_name = "PATH", default_value = "plan_de_salud.csv")]
    pub plan: PathBuf,
}

#[derive(Debug, Args)]
pub struct BatchArgs {
    /// Template JSON file (label -> [x0, y0, x1, y1])
    #[arg(value_name = "TEMPLATE")]
    pub template: PathBuf,

    /// A PDF file or a directory of PDF files
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Output CSV; existing rows are kept and new rows appended
    #[arg(short, long, value_name = "PATH", default_value = "batch_output.csv")]
    pub output: PathBuf,

    /// Horizontal gap in points that separates two words
    #[arg(long, value_name = "PT", default_value_t = 3.0, value_parser = parse_tolerance)]
    pub x_tolerance: f64,

    /// Baseline shift in points that starts a new line
    #[arg(long, value_name = "PT", default_value_t = 3.0, value_parser = parse_tolerance)]
    pub y_tolerance: f64,

    /// How deeply Form XObjects are followed
    #[arg(long, value_name = "N", default_value_t = 10)]
    pub max_form_depth: usize,
}

fn parse_dpi(s: &str) -> Result<f64, String> {
    let dpi: f64 = s.parse().map_err(|_| format!("'{s}' is not a number"))?;
    if dpi.is_finite() && dpi > 0.0 {
        Ok(dpi)
    } else {
        Err(format!("DPI must be a positive number, got {s}"))
    }
}

fn parse_tolerance(s: &str) -> Result<f64, String> {
    let tolerance: f64 = s.parse().map_err(|_| format!("'{s}' is not a number"))?;
    if tolerance.is_finite() && tolerance >= 0.0 {
        Ok(tolerance)
    } else {
        Err(format!("tolerance must be zero or more, got {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_defaults() {
        let cli = Cli::try_parse_from(["pdfregions", "capture", "plan.pdf"]).unwrap();
        assert_eq!(cli.verbose, 0);
        let Commands::Capture(args) = cli.command else {
            panic!("expected capture");
        };
        assert_eq!(args.file, PathBuf::from("plan.pdf"));
        assert_eq!(args.dpi, 150.0);
        assert_eq!(args.preview, None);
        assert_eq!(args.capture_csv, PathBuf::from("captured_data.csv"));
        assert_eq!(args.template_out, PathBuf::from("rect_template.json"));
        assert_eq!(args.plan, PathBuf::from("plan_de_salud.csv"));
    }

    #[test]
    fn batch_defaults_and_output_flag() {
        let cli = Cli::try_parse_from(["pdfregions", "batch", "t.json", "pdfs"]).unwrap();
        let Commands::Batch(args) = cli.command else {
            panic!("expected batch");
        };
        assert_eq!(args.output, PathBuf::from("batch_output.csv"));
        assert_eq!((args.x_tolerance, args.y_tolerance), (3.0, 3.0));
        assert_eq!(args.max_form_depth, 10);

        let cli =
            Cli::try_parse_from(["pdfregions", "-vv", "batch", "t.json", "pdfs", "-o", "x.csv"])
                .unwrap();
        assert_eq!(cli.verbose, 2);
        let Commands::Batch(args) = cli.command else {
            panic!("expected batch");
        };
        assert_eq!(args.output, PathBuf::from("x.csv"));
    }

    #[test]
    fn verbose_is_global() {
        let cli = Cli::try_parse_from(["pdfregions", "batch", "t.json", "p", "-v"]).unwrap();
        assert_eq!(cli.verbose, 1);
    }

    #[test]
    fn dpi_must_be_positive() {
        assert!(Cli::try_parse_from(["pdfregions", "capture", "a.pdf", "--dpi", "0"]).is_err());
        assert!(Cli::try_parse_from(["pdfregions", "capture", "a.pdf", "--dpi", "abc"]).is_err());
        let cli = Cli::try_parse_from(["pdfregions", "capture", "a.pdf", "--dpi", "72"]).unwrap();
        let Commands::Capture(args) = cli.command else {
            panic!("expected capture");
        };
        assert_eq!(args.dpi, 72.0);
    }

    #[test]
    fn batch_text_options() {
        let cli = Cli::try_parse_from([
            "pdfregions",
            "batch",
            "t.json",
            "p",
            "--x-tolerance",
            "0",
            "--y-tolerance",
            "1.5",
            "--max-form-depth",
            "2",
        ])
        .unwrap();
        let Commands::Batch(args) = cli.command else {
            panic!("expected batch");
        };
        assert_eq!((args.x_tolerance, args.y_tolerance), (0.0, 1.5));
        assert_eq!(args.max_form_depth, 2);

        assert!(
            Cli::try_parse_from(["pdfregions", "batch", "t", "p", "--x-tolerance", "-1"]).is_err()
        );
        assert!(
            Cli::try_parse_from(["pdfregions", "batch", "t", "p", "--y-tolerance", "nan"]).is_err()
        );
    }

    #[test]
    fn missing_arguments_are_rejected() {
        assert!(Cli::try_parse_from(["pdfregions", "capture"]).is_err());
        assert!(Cli::try_parse_from(["pdfregions", "batch", "t.json"]).is_err());
    }
}
