use pdfregions::pdfregions_core::{accumulate, merge};
use pdfregions::{BatchApplier, ExtractOptions, Template, TextOptions};

use crate::cli::BatchArgs;

pub fn run(args: &BatchArgs) -> Result<(), i32> {
    let output = &args.output;
    let template = Template::load(&args.template).map_err(|e| {
        eprintln!(
            "Error: failed to load template {}: {e}",
            args.template.display()
        );
        1
    })?;

    let applier = BatchApplier::new()
        .with_text_options(TextOptions {
            x_tolerance: args.x_tolerance,
            y_tolerance: args.y_tolerance,
        })
        .with_extract_options(ExtractOptions {
            max_recursion_depth: args.max_form_depth,
        });
    let report = applier.run(&template, &args.path).map_err(|e| {
        eprintln!("Error: {e}");
        1
    })?;

    let partial = merge(None, report.plan_rows());
    println!("--- Extracted rows ---");
    print!("{partial}");
    println!(
        "Processed {} document(s), skipped {}.",
        report.records.len(),
        report.skipped.len()
    );

    let table = accumulate(output, partial.rows().to_vec()).map_err(|e| {
        eprintln!("Error: failed to write {}: {e}", output.display());
        1
    })?;
    tracing::info!(path = %output.display(), rows = table.len(), "output table written");
    println!("\nOutput updated: {}", output.display());
    println!("\n=== Accumulated table ===");
    print!("{table}");

    Ok(())
}
