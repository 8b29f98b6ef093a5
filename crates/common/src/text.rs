/// Replaces spaces and colons with `-` and keeps at most `max_chars` chars.
pub fn timestamp_slug(input: &str, max_chars: usize) -> String {
    input
        .chars()
        .map(|ch| if ch == ' ' || ch == ':' { '-' } else { ch })
        .take(max_chars)
        .collect()
}

/// Text after the last `/`. A trailing slash yields an empty segment.
pub fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Part of an address before the first `@`; the whole input when there is none.
pub fn email_local_part(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}
