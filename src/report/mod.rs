//! Statistics and chart generation over a finished entity table.
//!
//! [`generate`] reads the CSV written by an entity batch and produces a
//! plain-text report plus four SVG charts (with the `charts` feature) in an
//! output directory.

#[cfg(feature = "charts")]
pub mod charts;
pub mod stats;
pub mod text;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::Result;
use crate::table;
use crate::types::labels;

use stats::EntityStatistics;

pub const STATISTICS_REPORT_FILE: &str = "statistics_report.txt";
pub const ENTITY_TYPE_DISTRIBUTION_FILE: &str = "entity_type_distribution.svg";
pub const CONFIDENCE_DISTRIBUTION_FILE: &str = "confidence_distribution.svg";
pub const ENTITY_BY_TYPE_FILE: &str = "entity_by_type_analysis.svg";
pub const TOP_ENTITIES_FILE: &str = "top_entities.svg";

/// Chart color for an entity label.
pub fn label_color(label: &str) -> (u8, u8, u8) {
    match label {
        labels::PERSON => (0xFF, 0x6B, 0x6B),
        labels::LOCATION => (0x4E, 0xCD, 0xC4),
        labels::ORGANIZATION => (0x45, 0xB7, 0xD1),
        labels::DATE => (0x96, 0xCE, 0xB4),
        labels::MONEY => (0xFF, 0xEA, 0xA7),
        _ => (0xDD, 0xA0, 0xDD),
    }
}

/// Build the report for the table at `csv_path` into `output_dir`.
///
/// Creates `output_dir` if needed and returns the paths written. A table
/// without any entities produces no artifacts and an empty list.
pub fn generate(csv_path: &Path, output_dir: &Path, top_n: usize) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)?;

    let rows = table::read_rows(csv_path)?;
    let entities = stats::flatten_rows(&rows);
    let Some(statistics) = EntityStatistics::compute(&entities, top_n) else {
        warn!(path = %csv_path.display(), rows = rows.len(), "no entities to report on");
        return Ok(Vec::new());
    };

    let mut written = Vec::new();

    let report_path = output_dir.join(STATISTICS_REPORT_FILE);
    fs::write(&report_path, text::render(&statistics))?;
    written.push(report_path);

    #[cfg(feature = "charts")]
    {
        let path = output_dir.join(ENTITY_TYPE_DISTRIBUTION_FILE);
        charts::entity_type_distribution(&statistics, &path)?;
        written.push(path);

        let path = output_dir.join(CONFIDENCE_DISTRIBUTION_FILE);
        charts::confidence_distribution(&entities, &path)?;
        written.push(path);

        let path = output_dir.join(ENTITY_BY_TYPE_FILE);
        charts::entity_by_type_analysis(&statistics, &path)?;
        written.push(path);

        let path = output_dir.join(TOP_ENTITIES_FILE);
        charts::top_entities(&statistics, &entities, &path)?;
        written.push(path);
    }

    info!(
        dir = %output_dir.display(),
        entities = entities.len(),
        artifacts = written.len(),
        "report generated"
    );
    Ok(written)
}
