use db::models::EventRow;
use normalizer::EventAction;
use serde::Serialize;

/// One line of the event feed.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EventDto {
    pub message: String,
    pub timestamp: String,
    pub action: String,
    pub author: String,
    pub request_id: String,
    pub from_branch: String,
    pub to_branch: String,
}

impl From<EventRow> for EventDto {
    fn from(row: EventRow) -> Self {
        let author = if row.author.is_empty() {
            "Unknown".to_string()
        } else {
            row.author
        };
        let message = display_message(
            &author,
            &row.action,
            &row.from_branch,
            &row.to_branch,
            &row.timestamp,
        );
        Self {
            message,
            timestamp: row.timestamp,
            action: row.action,
            author,
            request_id: row.request_id,
            from_branch: row.from_branch,
            to_branch: row.to_branch,
        }
    }
}

pub fn display_message(
    author: &str,
    action: &str,
    from_branch: &str,
    to_branch: &str,
    timestamp: &str,
) -> String {
    match EventAction::from_tag(action) {
        EventAction::Push => format!("{author} pushed to {to_branch} on {timestamp}"),
        EventAction::PullRequest => format!(
            "{author} submitted a pull request from {from_branch} to {to_branch} on {timestamp}"
        ),
        EventAction::Merge => {
            format!("{author} merged branch {from_branch} to {to_branch} on {timestamp}")
        }
        EventAction::Unclassified => {
            let action = if action.is_empty() { "action" } else { action };
            format!("{author} performed {action} on {timestamp}")
        }
    }
}
