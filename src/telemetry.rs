//! Telemetry metric name constants.
//!
//! Centralised metric names for textlabel operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `textlabel_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `task`: extraction task, "sentiment" or "entities"
//! - `status`: outcome, "ok" or "fallback"
//! - `cause`: fallback cause, "service" or "malformed_reply"

/// Total extraction requests sent to the model.
///
/// Labels: `task`, `status` ("ok" | "fallback").
pub const REQUESTS_TOTAL: &str = "textlabel_requests_total";

/// Extraction request duration in seconds, including reply parsing.
///
/// Labels: `task`.
pub const REQUEST_DURATION_SECONDS: &str = "textlabel_request_duration_seconds";

/// Total fallback results synthesized locally.
///
/// Labels: `task`, `cause`.
pub const FALLBACKS_TOTAL: &str = "textlabel_fallbacks_total";

/// Total tokens consumed, when the service reports usage.
///
/// Labels: `direction` ("prompt" | "completion").
pub const TOKENS_TOTAL: &str = "textlabel_tokens_total";

/// Total pauses inserted by batch pacing.
pub const BATCH_PAUSES_TOTAL: &str = "textlabel_batch_pauses_total";
