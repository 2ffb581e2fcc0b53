//! Public types for the textlabel API.

mod entity;
mod judgment;
mod message;
mod options;
mod response;
mod sentiment;

pub(crate) use entity::EntityReply;
pub use entity::{Entity, labels};
pub use judgment::{ExtractionFailure, Judgment};
pub use message::{Message, Role};
pub use options::ChatOptions;
pub use response::{ChatResponse, FinishReason, Usage};
pub use sentiment::{Sentiment, SentimentLabel, SentimentRecord};
