//! Provider trait for chat completion backends.
//!
//! The extraction layer only needs one capability from a model service: a
//! single non-streaming chat completion. Backends implement [`ChatProvider`]
//! and the [`Extractor`](crate::extract::Extractor) holds one behind an
//! `Arc<dyn ChatProvider>`, so tests can swap in scripted replies.
//!
//! # Error Semantics
//!
//! Providers return `Err` for anything that prevents a reply from arriving
//! (transport, HTTP status, empty choices). Interpreting the reply text is
//! not the provider's job; a reply that is not valid JSON is still `Ok`.

use std::sync::Arc;

use async_trait::async_trait;

use crate::Result;
use crate::types::{ChatOptions, ChatResponse, Message};

/// Provider for single-shot chat completion.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Provider name for logging/debugging.
    fn name(&self) -> &str;

    /// Non-streaming chat completion.
    async fn chat(&self, messages: &[Message], options: &ChatOptions) -> Result<ChatResponse>;
}

#[async_trait]
impl<P: ChatProvider + ?Sized> ChatProvider for Arc<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn chat(&self, messages: &[Message], options: &ChatOptions) -> Result<ChatResponse> {
        (**self).chat(messages, options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    struct EchoProvider;

    #[async_trait]
    impl ChatProvider for EchoProvider {
        fn name(&self) -> &str {
            "echo"
        }

        async fn chat(&self, messages: &[Message], options: &ChatOptions) -> Result<ChatResponse> {
            let last = messages.last().ok_or(Error::EmptyResponse)?;
            Ok(ChatResponse {
                content: format!("{}: {}", options.model, last.content),
                ..Default::default()
            })
        }
    }

    #[tokio::test]
    async fn arc_delegates_to_inner_provider() {
        let provider: Arc<dyn ChatProvider> = Arc::new(EchoProvider);
        let response = provider
            .chat(&[Message::user("ping")], &ChatOptions::new("m"))
            .await
            .unwrap();

        assert_eq!(provider.name(), "echo");
        assert_eq!(response.content, "m: ping");
    }

    #[tokio::test]
    async fn empty_messages_is_an_error() {
        let err = EchoProvider
            .chat(&[], &ChatOptions::new("m"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::EmptyResponse));
    }
}
