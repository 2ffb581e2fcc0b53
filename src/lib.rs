//! textlabel - LLM-backed text labelling
//!
//! This crate sends free text to an OpenAI-compatible chat model and turns
//! the replies into structured labels: a sentiment with a confidence score,
//! or a list of named entities. Batches of texts are processed sequentially
//! with pacing, written to a CSV table and summarized into a statistics
//! report and SVG charts.
//!
//! Model failures never abort a batch. Every text yields a [`Judgment`]
//! that is either the model's parsed answer or a fallback carrying the
//! reason it was synthesized.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use textlabel::{Extractor, OpenAiClient, ChatOptions};
//! use textlabel::batch::{self, Pacing};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> textlabel::Result<()> {
//!     let client = OpenAiClient::new("sk-your-key")?;
//!     let extractor = Extractor::new(Arc::new(client), ChatOptions::new("gpt-4o-mini"));
//!
//!     let texts = ["台積電將在台南投資", "Google 宣布新產品"];
//!     let rows = batch::extract_entity_rows(&extractor, &texts, Pacing::default()).await;
//!     textlabel::table::write_rows("ner_labeled_data.csv".as_ref(), &rows)?;
//!     Ok(())
//! }
//! ```
//!
//! The crate also ships a small unrelated arithmetic helper,
//! [`even_squares`], used by the `evensq` tool.

pub mod batch;
pub mod config;
pub mod error;
pub mod even_squares;
pub mod extract;
pub mod providers;
pub mod report;
pub mod table;
pub mod telemetry;
pub mod types;

// Re-export main types at crate root
pub use config::Config;
pub use error::{Error, Result};
pub use extract::{Extractor, FallbackPolicy, Task};
pub use providers::{ChatProvider, OpenAiClient};
pub use table::BatchRow;

pub use types::{
    ChatOptions, ChatResponse, Entity, ExtractionFailure, FinishReason, Judgment, Message, Role,
    Sentiment, SentimentLabel, SentimentRecord, Usage,
};
