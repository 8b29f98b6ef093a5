use chrono::{DateTime, Utc};
use common::text::{email_local_part, last_segment, timestamp_slug};
use serde_json::Value;
use tracing::debug;

use crate::models::{Event, EventAction, IgnoreReason, Normalized};
use crate::payloads::{first_non_empty, PayloadExt};
use crate::timestamp::format_timestamp;

pub const UNKNOWN_AUTHOR: &str = "Unknown";
pub const DEFAULT_BRANCH: &str = "main";

const PUSH_ID_SLUG_CHARS: usize = 50;
const FALLBACK_ID_SLUG_CHARS: usize = 30;

/// Normalizes a delivery stamped with the current wall-clock time.
pub fn normalize(event_type: &str, payload: &Value) -> Normalized {
    normalize_at(event_type, payload, Utc::now())
}

/// Maps a GitHub event label and payload onto the canonical [`Event`].
///
/// Total: missing, null or mistyped fields fall back to their defaults, and
/// labels or sub-actions that are not recorded come back as
/// [`Normalized::Ignored`].
pub fn normalize_at(event_type: &str, payload: &Value, now: DateTime<Utc>) -> Normalized {
    let label = event_type.trim().to_lowercase();
    let timestamp = format_timestamp(now);

    let event = match label.as_str() {
        "" => return Normalized::Ignored(IgnoreReason::EmptyLabel),
        "ping" => return Normalized::Ignored(IgnoreReason::Ping),
        "push" => normalize_push(payload, timestamp),
        "pull_request" => match normalize_pull_request(payload, timestamp) {
            Ok(event) => event,
            Err(reason) => return Normalized::Ignored(reason),
        },
        _ => return Normalized::Ignored(IgnoreReason::UnsupportedEvent(label)),
    };

    Normalized::Event(with_fallback_request_id(event))
}

fn normalize_push(payload: &Value, timestamp: String) -> Event {
    let request_id = first_non_empty([
        payload.str_at(&["after"]),
        payload.str_at(&["head_commit", "id"]),
    ])
    .map(str::to_owned)
    .unwrap_or_else(|| format!("push-{}", timestamp_slug(&timestamp, PUSH_ID_SLUG_CHARS)));

    let git_ref = payload.str_at(&["ref"]).trim();
    let to_branch = if git_ref.is_empty() {
        DEFAULT_BRANCH
    } else {
        last_segment(git_ref)
    };

    Event {
        request_id,
        author: push_author(payload),
        action: EventAction::Push,
        from_branch: String::new(),
        to_branch: to_branch.to_owned(),
        timestamp,
    }
}

fn push_author(payload: &Value) -> String {
    let commit_author = payload.first_item("commits").field("author");
    let from_commit = first_non_empty([
        commit_author.str_at(&["name"]),
        commit_author.str_at(&["username"]),
        email_local_part(commit_author.str_at(&["email"])),
    ]);

    // A commit literally authored as "Unknown" still defers to the pusher.
    match from_commit {
        Some(name) if name != UNKNOWN_AUTHOR => name.to_owned(),
        _ => first_non_empty([
            payload.str_at(&["pusher", "name"]),
            payload.str_at(&["pusher", "login"]),
        ])
        .unwrap_or(UNKNOWN_AUTHOR)
        .to_owned(),
    }
}

fn normalize_pull_request(payload: &Value, timestamp: String) -> Result<Event, IgnoreReason> {
    let pull_request = payload.field("pull_request");
    let sub_action = payload.str_at(&["action"]).to_lowercase();

    let action = match sub_action.as_str() {
        "closed" if pull_request.bool_at(&["merged"]) => EventAction::Merge,
        "opened" | "synchronize" | "reopened" => EventAction::PullRequest,
        _ => return Err(IgnoreReason::PullRequestAction(sub_action)),
    };

    let mut request_id = payload.id_at(&["number"]);
    if request_id.is_empty() {
        request_id = pull_request.id_at(&["number"]);
    }

    let author = first_non_empty([
        payload.str_at(&["sender", "login"]),
        pull_request.str_at(&["user", "login"]),
    ])
    .unwrap_or(UNKNOWN_AUTHOR);

    Ok(Event {
        request_id,
        author: author.to_owned(),
        action,
        from_branch: pull_request.str_at(&["head", "ref"]).to_owned(),
        to_branch: pull_request.str_at(&["base", "ref"]).to_owned(),
        timestamp,
    })
}

fn with_fallback_request_id(mut event: Event) -> Event {
    if event.request_id.is_empty() {
        event.request_id = format!(
            "{}-{}",
            event.action.as_str().to_lowercase(),
            timestamp_slug(&event.timestamp, FALLBACK_ID_SLUG_CHARS)
        );
        debug!(request_id = %event.request_id, "synthesized request id");
    }
    event
}
