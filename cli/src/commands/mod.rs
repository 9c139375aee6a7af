//! CLI command implementations.

pub mod capture;
pub mod transfer;

use framestore_core::telemetry::TransferReport;

/// Print a report either as JSON on stdout or as a short human summary.
pub fn print_report(report: &TransferReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", report.to_json()?);
        return Ok(());
    }

    println!("{:?} {}", report.direction, report.root.display());
    println!("  segments:  {}", report.segments);
    println!("  frames:    {} written, {} skipped", report.frames_written, report.frames_skipped);
    println!(
        "  bytes:     {} payload / {} reserved ({:.1}%)",
        report.bytes_payload,
        report.bytes_reserved,
        report.fill_ratio * 100.0
    );
    println!("  elapsed:   {:.3}s", report.elapsed.as_secs_f64());
    for w in &report.warnings {
        println!("  warning:   {}", w);
    }
    Ok(())
}
