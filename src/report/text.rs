//! Plain-text statistics report.

use std::fmt::Write;

use super::stats::EntityStatistics;

/// Entities listed in the report's ranking.
pub const REPORT_TOP_N: usize = 10;

/// Render the statistics report.
pub fn render(stats: &EntityStatistics) -> String {
    let mut out = String::new();
    // writing into a String cannot fail
    let _ = write_report(&mut out, stats);
    out
}

fn write_report(out: &mut String, stats: &EntityStatistics) -> std::fmt::Result {
    let overall = &stats.overall;
    writeln!(out, "NER Statistics Report")?;
    writeln!(out, "=====================")?;
    writeln!(out)?;
    writeln!(out, "Overall")?;
    writeln!(out, "-------")?;
    writeln!(out, "Total entities: {}", overall.count)?;
    writeln!(out, "Mean confidence: {:.3}", overall.mean)?;
    writeln!(out, "Max confidence: {:.3}", overall.max)?;
    writeln!(out, "Min confidence: {:.3}", overall.min)?;
    writeln!(out)?;
    writeln!(out, "By type")?;
    writeln!(out, "-------")?;

    for group in &stats.by_label {
        writeln!(out)?;
        writeln!(out, "{}:", group.label)?;
        writeln!(out, "  Count: {}", group.count())?;
        writeln!(out, "  Mean confidence: {:.3}", group.confidence.mean)?;
        writeln!(out, "  Max confidence: {:.3}", group.confidence.max)?;
        writeln!(out, "  Min confidence: {:.3}", group.confidence.min)?;
    }

    writeln!(out)?;
    writeln!(out)?;
    writeln!(out, "Most frequent entities (top {REPORT_TOP_N})")?;
    writeln!(out, "--------------------------------")?;
    for (rank, (text, count)) in stats.ranking.iter().enumerate() {
        writeln!(out, "{:2}. {} ({} occurrences)", rank + 1, text, count)?;
    }
    Ok(())
}
