//! Model service providers.
//!
//! Extraction talks to models through the [`ChatProvider`] trait; the only
//! built-in backend is the OpenAI-compatible HTTP client.

pub mod openai;
pub mod traits;

pub use openai::OpenAiClient;
pub use traits::ChatProvider;
