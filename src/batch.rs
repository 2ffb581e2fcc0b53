//! Sequential batch orchestration over the [`Extractor`].
//!
//! Texts are processed strictly in order, one model call at a time. After
//! every `every` calls the runner sleeps for `pause` to stay under provider
//! rate limits. Every input produces exactly one output, in input order,
//! whether or not its call succeeded.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, info};

use crate::config::BatchConfig;
use crate::extract::Extractor;
use crate::report::stats::ConfidenceStats;
use crate::table::BatchRow;
use crate::telemetry;
use crate::types::{Judgment, Sentiment, SentimentLabel};

/// Fixed pause inserted between groups of calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// Pause after this many calls; 0 never pauses.
    pub every: usize,
    pub pause: Duration,
}

impl Pacing {
    pub const NONE: Pacing = Pacing {
        every: 0,
        pause: Duration::ZERO,
    };

    pub fn new(every: usize, pause: Duration) -> Self {
        Self { every, pause }
    }

    /// Pause after every call but the last.
    pub fn after_each(pause: Duration) -> Self {
        Self::new(1, pause)
    }

    /// Whether to pause after the call at `index` out of `total`.
    ///
    /// Never pauses after the last call.
    pub fn pause_after(&self, index: usize, total: usize) -> bool {
        self.every > 0 && !self.pause.is_zero() && (index + 1) % self.every == 0 && index + 1 < total
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Pacing::from(&BatchConfig::default())
    }
}

impl From<&BatchConfig> for Pacing {
    fn from(config: &BatchConfig) -> Self {
        Pacing::new(config.pause_every, config.pause())
    }
}

/// Map `f` over `texts` sequentially, pausing according to `pacing`.
pub async fn run_paced<'a, S, T, F, Fut>(texts: &'a [S], pacing: Pacing, mut f: F) -> Vec<T>
where
    S: AsRef<str> + 'a,
    F: FnMut(usize, &'a str) -> Fut,
    Fut: Future<Output = T>,
{
    let total = texts.len();
    let mut results = Vec::with_capacity(total);

    for (index, text) in texts.iter().enumerate() {
        info!(item = index + 1, total, "processing text");
        results.push(f(index, text.as_ref()).await);

        if pacing.pause_after(index, total) {
            debug!(pause = ?pacing.pause, "pausing between batches");
            metrics::counter!(telemetry::BATCH_PAUSES_TOTAL).increment(1);
            tokio::time::sleep(pacing.pause).await;
        }
    }

    results
}

/// Classify the sentiment of every text, in order.
pub async fn classify_sentiments<S: AsRef<str>>(
    extractor: &Extractor,
    texts: &[S],
    pacing: Pacing,
) -> Vec<Judgment<Sentiment>> {
    run_paced(texts, pacing, |_, text| extractor.classify_sentiment(text)).await
}

/// Extract entities from every text and build one table row per text.
pub async fn extract_entity_rows<S: AsRef<str>>(
    extractor: &Extractor,
    texts: &[S],
    pacing: Pacing,
) -> Vec<BatchRow> {
    extract_entity_rows_with(extractor, texts, pacing, |_, _| {}).await
}

/// [`extract_entity_rows`], handing each row and the batch size to `on_row`
/// as soon as the row is built.
pub async fn extract_entity_rows_with<S, F>(
    extractor: &Extractor,
    texts: &[S],
    pacing: Pacing,
    on_row: F,
) -> Vec<BatchRow>
where
    S: AsRef<str>,
    F: Fn(&BatchRow, usize),
{
    let total = texts.len();
    let on_row = &on_row;
    run_paced(texts, pacing, |index, text| async move {
        let judgment = extractor.extract_entities(text).await;
        let row = BatchRow::from_judgment(index, text, &judgment);
        on_row(&row, total);
        row
    })
    .await
}

/// Count sentiment labels in first-seen order.
pub fn sentiment_counts(judgments: &[Judgment<Sentiment>]) -> Vec<(SentimentLabel, usize)> {
    let mut counts: Vec<(SentimentLabel, usize)> = Vec::new();
    for judgment in judgments {
        let label = &judgment.value().sentiment;
        match counts.iter_mut().find(|(l, _)| l == label) {
            Some((_, n)) => *n += 1,
            None => counts.push((label.clone(), 1)),
        }
    }
    counts
}

/// Aggregate figures for a finished entity batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSummary {
    pub total_texts: usize,
    pub processed_texts: usize,
    pub total_entities: usize,
    /// Entity label counts, most frequent first (ties keep first-seen order).
    pub label_counts: Vec<(String, usize)>,
    /// Confidence over all entities, `None` when there are none.
    pub confidence: Option<ConfidenceStats>,
}

impl BatchSummary {
    pub fn from_rows(rows: &[BatchRow]) -> Self {
        let entities: Vec<_> = rows
            .iter()
            .filter_map(|row| row.parse_entities().ok())
            .flatten()
            .collect();

        let mut label_counts: Vec<(String, usize)> = Vec::new();
        for entity in &entities {
            match label_counts.iter_mut().find(|(l, _)| *l == entity.label) {
                Some((_, n)) => *n += 1,
                None => label_counts.push((entity.label.clone(), 1)),
            }
        }
        // stable sort keeps first-seen order among equal counts
        label_counts.sort_by(|a, b| b.1.cmp(&a.1));

        Self {
            total_texts: rows.len(),
            processed_texts: rows.iter().filter(|r| r.processed).count(),
            total_entities: rows.iter().map(|r| r.entity_count).sum(),
            label_counts,
            confidence: ConfidenceStats::from_values(entities.iter().map(|e| e.confidence)),
        }
    }

    /// Mean entities per successfully processed text; 0 when none succeeded.
    pub fn mean_entities_per_text(&self) -> f64 {
        if self.processed_texts == 0 {
            0.0
        } else {
            self.total_entities as f64 / self.processed_texts as f64
        }
    }
}
