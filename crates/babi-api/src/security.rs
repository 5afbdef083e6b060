//! Input sanitization for log output.

/// Maximum characters of user text written to a log line.
pub const MAX_LOG_PREVIEW: usize = 80;

/// Strip control characters and truncate user text for logging.
pub fn log_preview(input: &str) -> String {
    let cleaned: String = input
        .trim()
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();

    if cleaned.chars().count() > MAX_LOG_PREVIEW {
        let head: String = cleaned.chars().take(MAX_LOG_PREVIEW).collect();
        format!("{}…", head)
    } else {
        cleaned
    }
}

/// Plan ids are short lowercase slugs.
pub fn is_valid_plan_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 32
        && id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
