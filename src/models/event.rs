use serde::{Deserialize, Serialize};

/// One calendar appointment as supplied by the event store. Timestamps stay
/// RFC3339 strings on the model and are parsed where they are used, so a
/// malformed value surfaces as a validation error naming the event and field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    pub start_at: String,
    /// Missing end means a zero-duration event; the effective end equals the start.
    #[serde(default)]
    pub end_at: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub category: EventCategory,
    pub created_by: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum EventCategory {
    Work,
    Personal,
    Study,
    #[default]
    Other,
}

impl Event {
    /// The timestamp travel legs depart from: the end when one is set,
    /// otherwise the start.
    pub fn effective_end_at(&self) -> &str {
        self.end_at.as_deref().unwrap_or(&self.start_at)
    }
}
