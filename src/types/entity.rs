//! Named-entity types.

use serde::{Deserialize, Serialize};

/// Well-known entity labels the model is asked to use.
///
/// The label vocabulary is open: the model may answer with other tags and
/// those are kept as-is.
pub mod labels {
    pub const PERSON: &str = "PERSON";
    pub const LOCATION: &str = "LOCATION";
    pub const ORGANIZATION: &str = "ORGANIZATION";
    pub const DATE: &str = "DATE";
    pub const MONEY: &str = "MONEY";
    /// Substituted when a reply omits the label.
    pub const UNKNOWN: &str = "UNKNOWN";

    /// Requested taxonomy with a short description of each tag.
    pub const TAXONOMY: [(&str, &str); 5] = [
        (PERSON, "names of people"),
        (LOCATION, "places, cities, countries"),
        (ORGANIZATION, "companies, institutions"),
        (DATE, "dates and time expressions"),
        (MONEY, "monetary amounts"),
    ];
}

fn unknown_label() -> String {
    labels::UNKNOWN.to_string()
}

/// One entity span extracted from a text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(default)]
    pub text: String,
    #[serde(default = "unknown_label")]
    pub label: String,
    #[serde(default)]
    pub confidence: f64,
}

impl Entity {
    pub fn new(text: impl Into<String>, label: impl Into<String>, confidence: f64) -> Self {
        Self {
            text: text.into(),
            label: label.into(),
            confidence,
        }
    }
}

/// Shape of an entity-extraction reply: `{"entities": [...]}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct EntityReply {
    #[serde(default)]
    pub entities: Vec<Entity>,
}
