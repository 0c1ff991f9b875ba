use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use pdfregions::pdfregions_core::{accumulate, save_capture_csv};
use pdfregions::{CaptureOutcome, CaptureSession, Scale, SelectionSurface, document_id};
use pdfregions_raster::{RenderOptions, render_to_png};

use crate::cli::CaptureArgs;
use crate::console::{Console, capture_grid};
use crate::shared::open_pdf;

/// File name of the preview inside its temporary directory.
const PREVIEW_FILE_NAME: &str = "page_preview.png";

pub fn run(args: &CaptureArgs) -> Result<(), i32> {
    let stdin = io::stdin();
    let mut console = Console::new(stdin.lock(), io::stdout().lock());
    capture(args, &mut console)
}

/// The whole capture flow over an arbitrary console.
pub fn capture<R: BufRead, W: Write>(
    args: &CaptureArgs,
    console: &mut Console<R, W>,
) -> Result<(), i32> {
    let pdf = open_pdf(&args.file)?;
    let page = pdf.first_page().map_err(|e| {
        eprintln!("Error: failed to read first page: {e}");
        1
    })?;
    let Some(scale) = Scale::from_dpi(args.dpi) else {
        eprintln!("Error: invalid DPI: {}", args.dpi);
        return Err(1);
    };

    // Removed on return, so a session that captures nothing leaves no files.
    let preview_dir;
    let preview_path: PathBuf = match &args.preview {
        Some(path) => path.clone(),
        None => {
            preview_dir = tempfile::Builder::new()
                .prefix("pdfregions-")
                .tempdir()
                .map_err(|e| {
                    eprintln!("Error: failed to create preview directory: {e}");
                    1
                })?;
            preview_dir.path().join(PREVIEW_FILE_NAME)
        }
    };

    let render_options = RenderOptions {
        dpi: args.dpi,
        ..RenderOptions::default()
    };
    let preview = render_to_png(&page, &render_options, &preview_path).map_err(|e| {
        eprintln!("Error: failed to render preview {}: {e}", preview_path.display());
        1
    })?;

    console.say(format!(
        "Page size (PDF points): {:.2} x {:.2}",
        page.width(),
        page.height()
    ));
    console.say(format!(
        "Preview written to {} ({} x {} px at {} DPI, grid every {} px).",
        preview_path.display(),
        preview.width(),
        preview.height(),
        args.dpi,
        render_options.grid_step_px
    ));
    console.say("Instructions:");
    console.say("  - Open the preview and type the pixel corners of a region: x0 y0 x1 y1.");
    console.say("  - Enter a label to keep the text; a blank label discards the region.");
    console.say("  - Type q (or end the input) when you are done.");

    let mut session = CaptureSession::new(&page, scale, document_id(&args.file));
    session.begin();
    while let Some(rect) = console.next_selection() {
        session.handle_selection(rect, console).map_err(|e| {
            eprintln!("Error: failed to read region text: {e}");
            1
        })?;
    }
    session.close();
    tracing::info!(rows = session.rows().len(), "capture session closed");

    let captured = match session.finish() {
        CaptureOutcome::Nothing => {
            console.say("Nothing captured.");
            return Ok(());
        }
        CaptureOutcome::Captured(captured) => captured,
    };

    console.say("\n--- Captured result ---");
    console.say(capture_grid(&captured.rows).trim_end());

    let question = format!("Export to CSV ({})?", args.capture_csv.display());
    if console.confirm(&question) {
        save_capture_csv(&captured.rows, &args.capture_csv).map_err(|e| {
            eprintln!("Error: failed to write {}: {e}", args.capture_csv.display());
            1
        })?;
        console.say(format!("CSV saved to {}", args.capture_csv.display()));
    }

    let question = format!(
        "Save coordinate template for reuse ({})?",
        args.template_out.display()
    );
    if console.confirm(&question) {
        captured.template.save(&args.template_out).map_err(|e| {
            eprintln!("Error: failed to write {}: {e}", args.template_out.display());
            1
        })?;
        console.say(format!("Template saved to {}", args.template_out.display()));
    }

    let table = accumulate(&args.plan, [captured.plan_row]).map_err(|e| {
        eprintln!("Error: failed to update {}: {e}", args.plan.display());
        1
    })?;
    console.say(format!(
        "Plan table updated: {} ({} rows)",
        args.plan.display(),
        table.len()
    ));

    Ok(())
}
