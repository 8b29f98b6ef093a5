use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Canonical record derived from one delivery. Every field is a plain
/// string; absence is the empty string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Event {
    pub request_id: String,
    pub author: String,
    pub action: EventAction,
    pub from_branch: String,
    pub to_branch: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EventAction {
    Push,
    PullRequest,
    Merge,
    #[default]
    Unclassified,
}

impl EventAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventAction::Push => "PUSH",
            EventAction::PullRequest => "PULL_REQUEST",
            EventAction::Merge => "MERGE",
            EventAction::Unclassified => "",
        }
    }

    /// Lenient inverse of [`as_str`](Self::as_str); unknown tags are unclassified.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "PUSH" => EventAction::Push,
            "PULL_REQUEST" => EventAction::PullRequest,
            "MERGE" => EventAction::Merge,
            _ => EventAction::Unclassified,
        }
    }
}

impl fmt::Display for EventAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EventAction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventAction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = Option::<String>::deserialize(deserializer)?;
        Ok(tag.as_deref().map(Self::from_tag).unwrap_or_default())
    }
}

/// Why a delivery was accepted without producing an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    EmptyLabel,
    Ping,
    UnsupportedEvent(String),
    PullRequestAction(String),
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IgnoreReason::EmptyLabel => f.write_str("missing event type"),
            IgnoreReason::Ping => f.write_str("ping"),
            IgnoreReason::UnsupportedEvent(label) => write!(f, "unsupported event {label:?}"),
            IgnoreReason::PullRequestAction(action) => {
                write!(f, "unrecorded pull request action {action:?}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalized {
    Event(Event),
    Ignored(IgnoreReason),
}

impl Normalized {
    pub fn event(&self) -> Option<&Event> {
        match self {
            Normalized::Event(event) => Some(event),
            Normalized::Ignored(_) => None,
        }
    }

    pub fn is_ignored(&self) -> bool {
        matches!(self, Normalized::Ignored(_))
    }
}
