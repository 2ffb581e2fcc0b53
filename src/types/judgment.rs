//! Parse-with-fallback outcome of a structured extraction.
//!
//! A [`Judgment`] separates what the model actually said from values
//! synthesized locally when the call failed or the reply could not be read.
//! A low confidence inside [`Judgment::Model`] is the model's own opinion; a
//! [`Judgment::Fallback`] always carries the reason it was produced.

use serde::{Deserialize, Serialize};

/// Why a fallback value was substituted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "cause", content = "message", rename_all = "snake_case")]
pub enum ExtractionFailure {
    /// The request never produced a usable reply (transport, HTTP or API error).
    #[error("{0}")]
    Service(String),
    /// The reply arrived but was not the structured data we asked for.
    #[error("{0}")]
    MalformedReply(String),
}

impl ExtractionFailure {
    /// Short machine-readable cause, used as a metric label.
    pub fn cause(&self) -> &'static str {
        match self {
            ExtractionFailure::Service(_) => "service",
            ExtractionFailure::MalformedReply(_) => "malformed_reply",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ExtractionFailure::Service(msg) | ExtractionFailure::MalformedReply(msg) => msg,
        }
    }
}

/// Result of one extraction call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum Judgment<T> {
    /// Value parsed from the model's reply.
    Model { value: T },
    /// Locally synthesized value.
    Fallback {
        value: T,
        failure: ExtractionFailure,
    },
}

impl<T> Judgment<T> {
    pub fn model(value: T) -> Self {
        Judgment::Model { value }
    }

    pub fn fallback(value: T, failure: ExtractionFailure) -> Self {
        Judgment::Fallback { value, failure }
    }

    /// The carried value, whichever way it was obtained.
    pub fn value(&self) -> &T {
        match self {
            Judgment::Model { value } | Judgment::Fallback { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Judgment::Model { value } | Judgment::Fallback { value, .. } => value,
        }
    }

    pub fn failure(&self) -> Option<&ExtractionFailure> {
        match self {
            Judgment::Model { .. } => None,
            Judgment::Fallback { failure, .. } => Some(failure),
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Judgment::Fallback { .. })
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Judgment<U> {
        match self {
            Judgment::Model { value } => Judgment::Model { value: f(value) },
            Judgment::Fallback { value, failure } => Judgment::Fallback {
                value: f(value),
                failure,
            },
        }
    }
}
