//! Grouping and descriptive statistics over extracted entities.

use serde::Serialize;
use tracing::warn;

use super::text::REPORT_TOP_N;
use crate::table::BatchRow;

/// An entity flattened out of the result table, tagged with its source row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportEntity {
    pub text: String,
    pub label: String,
    pub confidence: f64,
    pub text_id: usize,
}

/// Flatten every row's entity list.
///
/// Rows with an empty or `[]` cell contribute nothing; rows whose cell is
/// not valid JSON are logged and skipped.
pub fn flatten_rows(rows: &[BatchRow]) -> Vec<ReportEntity> {
    let mut out = Vec::new();
    for row in rows {
        let raw = row.entities.trim();
        if raw.is_empty() || raw == "[]" {
            continue;
        }
        match row.parse_entities() {
            Ok(entities) => out.extend(entities.into_iter().map(|e| ReportEntity {
                text: e.text,
                label: e.label,
                confidence: e.confidence,
                text_id: row.text_id,
            })),
            Err(err) => warn!(text_id = row.text_id, error = %err, "skipping unparseable entity cell"),
        }
    }
    out
}

/// Count, mean, min and max of a set of confidence values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConfidenceStats {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl ConfidenceStats {
    /// `None` for an empty input.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;

        for v in values {
            count += 1;
            sum += v;
            min = min.min(v);
            max = max.max(v);
        }

        (count > 0).then(|| Self {
            count,
            mean: sum / count as f64,
            min,
            max,
        })
    }
}

/// Statistics for one entity label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelStats {
    pub label: String,
    pub confidence: ConfidenceStats,
}

impl LabelStats {
    pub fn count(&self) -> usize {
        self.confidence.count
    }
}

/// Per-label statistics, labels in first-seen order.
pub fn by_label(entities: &[ReportEntity]) -> Vec<LabelStats> {
    let mut groups: Vec<(&str, Vec<f64>)> = Vec::new();
    for entity in entities {
        match groups.iter_mut().find(|(label, _)| *label == entity.label) {
            Some((_, values)) => values.push(entity.confidence),
            None => groups.push((entity.label.as_str(), vec![entity.confidence])),
        }
    }

    groups
        .into_iter()
        .filter_map(|(label, values)| {
            ConfidenceStats::from_values(values).map(|confidence| LabelStats {
                label: label.to_string(),
                confidence,
            })
        })
        .collect()
}

/// The `n` most frequent entity texts with their counts.
///
/// Ordered by count descending; ties keep first-appearance order.
pub fn top_entities(entities: &[ReportEntity], n: usize) -> Vec<(String, usize)> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for entity in entities {
        match counts.iter_mut().find(|(text, _)| *text == entity.text) {
            Some((_, c)) => *c += 1,
            None => counts.push((entity.text.as_str(), 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .take(n)
        .map(|(text, c)| (text.to_string(), c))
        .collect()
}

/// Label of the first entity whose text is `text`.
pub fn label_of<'a>(entities: &'a [ReportEntity], text: &str) -> Option<&'a str> {
    entities
        .iter()
        .find(|e| e.text == text)
        .map(|e| e.label.as_str())
}

/// Everything the text report and charts need.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityStatistics {
    pub overall: ConfidenceStats,
    pub by_label: Vec<LabelStats>,
    /// Chart ranking, `top_n` long.
    pub top: Vec<(String, usize)>,
    /// Text report ranking, always [`REPORT_TOP_N`] long at most.
    pub ranking: Vec<(String, usize)>,
}

impl EntityStatistics {
    /// `None` when there are no entities.
    pub fn compute(entities: &[ReportEntity], top_n: usize) -> Option<Self> {
        let overall = ConfidenceStats::from_values(entities.iter().map(|e| e.confidence))?;
        Some(Self {
            overall,
            by_label: by_label(entities),
            top: top_entities(entities, top_n),
            ranking: top_entities(entities, REPORT_TOP_N),
        })
    }
}
