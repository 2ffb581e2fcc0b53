//! Structured extraction from free text through a chat model.
//!
//! The [`Extractor`] sends one prompt per text, parses the reply leniently
//! (see [`parse`]) and never fails: transport errors and unreadable replies
//! both become [`Judgment::Fallback`] values built from the
//! [`FallbackPolicy`].
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use textlabel::extract::Extractor;
//! use textlabel::providers::OpenAiClient;
//! use textlabel::types::ChatOptions;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> textlabel::Result<()> {
//!     let client = OpenAiClient::new("sk-your-key")?;
//!     let extractor = Extractor::new(
//!         Arc::new(client),
//!         ChatOptions::new("gpt-4o-mini").temperature(0.1),
//!     );
//!
//!     let judgment = extractor.classify_sentiment("太棒了！").await;
//!     println!("{:?}", judgment.value());
//!     Ok(())
//! }
//! ```

pub mod parse;
pub mod prompt;

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::Error;
use crate::providers::ChatProvider;
use crate::telemetry;
use crate::types::{
    ChatOptions, ChatResponse, Entity, EntityReply, ExtractionFailure, FinishReason, Judgment,
    Message, Sentiment, SentimentLabel, Usage,
};

/// Message attached to fallbacks produced from unreadable replies.
pub const MALFORMED_REPLY_MESSAGE: &str = "reply could not be parsed as JSON";

/// Message for an unreadable reply the service cut off at its length limit.
pub const TRUNCATED_REPLY_MESSAGE: &str = "reply was truncated at the length limit";

/// Message for a reply the service withheld through its content filter.
pub const FILTERED_REPLY_MESSAGE: &str = "reply was withheld by the content filter";

/// Extraction task: what to ask the model for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Task {
    /// Sentiment polarity with a confidence score.
    Sentiment,
    /// Named entities with a label and confidence per span.
    Entities,
}

impl Task {
    pub fn as_str(self) -> &'static str {
        match self {
            Task::Sentiment => "sentiment",
            Task::Entities => "entities",
        }
    }

    /// Instruction prompt for `text`.
    pub fn prompt(self, text: &str) -> String {
        match self {
            Task::Sentiment => prompt::sentiment_prompt(text),
            Task::Entities => prompt::entity_prompt(text),
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Confidence values used when a fallback is synthesized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FallbackPolicy {
    /// Confidence when the service call itself failed.
    #[serde(default = "default_service_error_confidence")]
    pub service_error_confidence: f64,
    /// Confidence when a sentiment reply arrived but could not be parsed.
    #[serde(default = "default_parse_error_confidence")]
    pub parse_error_confidence: f64,
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self {
            service_error_confidence: default_service_error_confidence(),
            parse_error_confidence: default_parse_error_confidence(),
        }
    }
}

fn default_service_error_confidence() -> f64 {
    0.0
}

fn default_parse_error_confidence() -> f64 {
    0.5
}

impl FallbackPolicy {
    /// Neutral sentiment carrying the confidence for this failure.
    pub fn sentiment(&self, failure: &ExtractionFailure) -> Sentiment {
        let confidence = match failure {
            ExtractionFailure::Service(_) => self.service_error_confidence,
            ExtractionFailure::MalformedReply(_) => self.parse_error_confidence,
        };
        Sentiment::new(SentimentLabel::Neutral, confidence)
    }
}

/// Client for structured extraction over a [`ChatProvider`].
#[derive(Clone)]
pub struct Extractor {
    provider: Arc<dyn ChatProvider>,
    options: ChatOptions,
    fallback: FallbackPolicy,
}

impl fmt::Debug for Extractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extractor")
            .field("provider", &self.provider.name())
            .field("options", &self.options)
            .field("fallback", &self.fallback)
            .finish()
    }
}

impl Extractor {
    pub fn new(provider: Arc<dyn ChatProvider>, options: ChatOptions) -> Self {
        Self {
            provider,
            options,
            fallback: FallbackPolicy::default(),
        }
    }

    pub fn with_fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn options(&self) -> &ChatOptions {
        &self.options
    }

    pub fn fallback_policy(&self) -> &FallbackPolicy {
        &self.fallback
    }

    /// Classify the sentiment of one text.
    pub async fn classify_sentiment(&self, text: &str) -> Judgment<Sentiment> {
        let policy = self.fallback;
        self.judge(Task::Sentiment, text, |failure| policy.sentiment(failure))
            .await
    }

    /// Extract named entities from one text.
    ///
    /// Fallbacks carry an empty entity list.
    pub async fn extract_entities(&self, text: &str) -> Judgment<Vec<Entity>> {
        self.judge::<EntityPayload>(Task::Entities, text, |_| EntityPayload::default())
            .await
            .map(EntityPayload::into_entities)
    }

    #[instrument(skip(self, text, on_failure), fields(provider = self.provider.name(), chars = text.chars().count()))]
    async fn judge<T>(
        &self,
        task: Task,
        text: &str,
        on_failure: impl FnOnce(&ExtractionFailure) -> T,
    ) -> Judgment<T>
    where
        T: DeserializeOwned,
    {
        let start = Instant::now();
        let messages = [Message::user(task.prompt(text))];

        let judgment = match self.provider.chat(&messages, &self.options).await {
            Err(err) => {
                warn!(%task, error = %err, "model call failed, using fallback");
                let failure = call_failure(&err);
                Judgment::fallback(on_failure(&failure), failure)
            }
            Ok(response) => {
                if let Some(usage) = &response.usage {
                    record_token_usage(usage);
                }
                match parse::parse_reply::<T>(&response.content) {
                    Ok(value) => {
                        debug!(%task, "reply parsed");
                        Judgment::model(value)
                    }
                    Err(err) => {
                        let preview: String = response.content.chars().take(200).collect();
                        warn!(
                            %task,
                            error = %err,
                            finish_reason = ?response.finish_reason,
                            reply = %preview,
                            "unparseable reply, using fallback"
                        );
                        let failure = unreadable_reply(&response);
                        Judgment::fallback(on_failure(&failure), failure)
                    }
                }
            }
        };

        record_judgment(task, judgment.failure(), start);
        judgment
    }
}

/// Service errors keep their cause; anything else went wrong handling the reply.
fn call_failure(err: &Error) -> ExtractionFailure {
    if err.is_service() {
        ExtractionFailure::Service(err.to_string())
    } else {
        ExtractionFailure::MalformedReply(err.to_string())
    }
}

fn unreadable_reply(response: &ChatResponse) -> ExtractionFailure {
    let message = match response.finish_reason {
        FinishReason::Length => TRUNCATED_REPLY_MESSAGE,
        FinishReason::ContentFilter => FILTERED_REPLY_MESSAGE,
        FinishReason::Stop | FinishReason::Other => MALFORMED_REPLY_MESSAGE,
    };
    ExtractionFailure::MalformedReply(message.to_string())
}

/// Entity replies are usually `{"entities": [...]}`; a bare array is accepted too.
#[derive(Deserialize)]
#[serde(untagged)]
enum EntityPayload {
    Wrapped(EntityReply),
    Bare(Vec<Entity>),
}

impl Default for EntityPayload {
    fn default() -> Self {
        EntityPayload::Bare(Vec::new())
    }
}

impl EntityPayload {
    fn into_entities(self) -> Vec<Entity> {
        match self {
            EntityPayload::Wrapped(reply) => reply.entities,
            EntityPayload::Bare(entities) => entities,
        }
    }
}

fn record_judgment(task: Task, failure: Option<&ExtractionFailure>, start: Instant) {
    let status = if failure.is_some() { "fallback" } else { "ok" };
    metrics::counter!(telemetry::REQUESTS_TOTAL,
        "task" => task.as_str(),
        "status" => status,
    )
    .increment(1);
    metrics::histogram!(telemetry::REQUEST_DURATION_SECONDS,
        "task" => task.as_str(),
    )
    .record(start.elapsed().as_secs_f64());

    if let Some(failure) = failure {
        metrics::counter!(telemetry::FALLBACKS_TOTAL,
            "task" => task.as_str(),
            "cause" => failure.cause(),
        )
        .increment(1);
    }
}

fn record_token_usage(usage: &Usage) {
    metrics::counter!(telemetry::TOKENS_TOTAL, "direction" => "prompt")
        .increment(u64::from(usage.prompt_tokens));
    metrics::counter!(telemetry::TOKENS_TOTAL, "direction" => "completion")
        .increment(u64::from(usage.completion_tokens));
}
