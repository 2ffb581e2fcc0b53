//! Batch orchestration over a scripted provider, through the CSV table and
//! into the report.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use textlabel::batch::{self, BatchSummary, Pacing};
use textlabel::providers::ChatProvider;
use textlabel::{
    ChatOptions, ChatResponse, Error, Extractor, Message, Result, SentimentLabel, report, table,
};

/// Replays a fixed list of outcomes, one per call, and records the prompts.
struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    fn new(replies: Vec<Result<String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn chat(&self, messages: &[Message], _options: &ChatOptions) -> Result<ChatResponse> {
        self.prompts
            .lock()
            .unwrap()
            .push(messages[0].content.clone());
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(Error::EmptyResponse))?;
        Ok(ChatResponse {
            content: reply,
            ..Default::default()
        })
    }
}

fn ok(s: &str) -> Result<String> {
    Ok(s.to_string())
}

fn extractor(provider: Arc<ScriptedProvider>) -> Extractor {
    Extractor::new(provider, ChatOptions::new("gpt-4o-mini"))
}

#[tokio::test]
async fn entity_batch_keeps_one_row_per_text_in_order() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        ok(r#"{"entities": [{"text": "台積電", "label": "ORGANIZATION", "confidence": 0.95},
                           {"text": "台南", "label": "LOCATION", "confidence": 0.9}]}"#),
        Err(Error::Api {
            status: 500,
            message: "boom".to_string(),
        }),
        ok("sorry, no JSON today"),
        ok(r#"```json
{"entities": [{"text": "Google", "label": "ORGANIZATION", "confidence": 0.85}]}
```"#),
    ]));
    let texts = ["台積電將在台南投資", "第二段", "第三段", "陳小華現任Google工程師"];

    let rows = batch::extract_entity_rows(&extractor(provider.clone()), &texts, Pacing::NONE).await;

    assert_eq!(rows.len(), texts.len());
    for (i, row) in rows.iter().enumerate() {
        assert_eq!(row.text_id, i);
        assert_eq!(row.text, texts[i]);
    }
    assert_eq!(
        rows.iter().map(|r| r.processed).collect::<Vec<_>>(),
        vec![true, false, false, true]
    );
    assert_eq!(
        rows.iter().map(|r| r.entity_count).collect::<Vec<_>>(),
        vec![2, 0, 0, 1]
    );
    assert!(rows[1].error.as_deref().unwrap().contains("boom"));
    assert!(rows[2].error.is_some());

    // prompts went out in input order
    let prompts = provider.prompts();
    assert_eq!(prompts.len(), 4);
    for (prompt, text) in prompts.iter().zip(texts) {
        assert!(prompt.contains(&format!("Text: {text}\n")), "{prompt}");
    }

    let summary = BatchSummary::from_rows(&rows);
    assert_eq!(summary.total_texts, 4);
    assert_eq!(summary.processed_texts, 2);
    assert_eq!(summary.total_entities, 3);
    assert_eq!(summary.label_counts[0], ("ORGANIZATION".to_string(), 2));
}

#[tokio::test]
async fn rows_are_reported_as_they_are_built() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        ok(r#"{"entities": [{"text": "台積電", "label": "ORGANIZATION", "confidence": 0.95}]}"#),
        Err(Error::AuthenticationFailed),
        ok(r#"{"entities": []}"#),
    ]));
    let texts = ["台積電", "第二段", "第三段"];
    let seen = Mutex::new(Vec::new());

    let rows = batch::extract_entity_rows_with(
        &extractor(provider.clone()),
        &texts,
        Pacing::NONE,
        |row, total| {
            // calls made so far: progress arrives before the next text is sent
            let calls = provider.prompts().len();
            seen.lock()
                .unwrap()
                .push((row.text_id, row.entity_count, row.processed, total, calls));
        },
    )
    .await;

    assert_eq!(rows.len(), 3);
    assert_eq!(
        seen.into_inner().unwrap(),
        vec![
            (0, 1, true, 3, 1),
            (1, 0, false, 3, 2),
            (2, 0, true, 3, 3),
        ]
    );
}

#[tokio::test]
async fn sentiment_batch_mixes_model_and_fallback() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        ok(r#"{"sentiment": "positive", "confidence": 0.9}"#),
        ok("definitely negative"),
        Err(Error::AuthenticationFailed),
    ]));
    let texts = vec!["太棒了！".to_string(), "很失望".to_string(), "還不錯".to_string()];

    let judgments = batch::classify_sentiments(&extractor(provider), &texts, Pacing::NONE).await;

    assert_eq!(judgments.len(), 3);
    assert_eq!(judgments[0].value().sentiment, SentimentLabel::Positive);
    assert_eq!(judgments[1].value().confidence, 0.5);
    assert_eq!(judgments[2].value().confidence, 0.0);
    assert_eq!(
        batch::sentiment_counts(&judgments),
        vec![(SentimentLabel::Positive, 1), (SentimentLabel::Neutral, 2)]
    );
}

#[tokio::test]
async fn rows_survive_csv_and_feed_the_report() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        ok(r#"{"entities": [{"text": "台積電", "label": "ORGANIZATION", "confidence": 0.95},
                           {"text": "2025年", "label": "DATE", "confidence": 0.8}]}"#),
        ok(r#"{"entities": [{"text": "台積電", "label": "ORGANIZATION", "confidence": 0.9},
                           {"text": "劉德音", "label": "PERSON", "confidence": 0.92}]}"#),
    ]));
    let texts = ["台積電預計2025年投產", "台積電董事長劉德音"];
    let rows = batch::extract_entity_rows(&extractor(provider), &texts, Pacing::NONE).await;

    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("ner_labeled_data.csv");
    table::write_rows(&csv, &rows).unwrap();
    assert_eq!(table::read_rows(&csv).unwrap(), rows);

    let out = dir.path().join("ner_analysis");
    let written = report::generate(&csv, &out, 15).unwrap();
    assert!(written.contains(&out.join(report::STATISTICS_REPORT_FILE)));

    let text = std::fs::read_to_string(out.join(report::STATISTICS_REPORT_FILE)).unwrap();
    assert!(text.contains("Total entities: 4"));
    assert!(text.contains(" 1. 台積電 (2 occurrences)"));
}
