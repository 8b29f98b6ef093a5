pub mod models;
pub mod payloads;
pub mod timestamp;
pub mod transform;

pub use models::{Event, EventAction, IgnoreReason, Normalized};
pub use payloads::{parse_payload, PayloadExt};
pub use timestamp::format_timestamp;
pub use transform::{normalize, normalize_at};
