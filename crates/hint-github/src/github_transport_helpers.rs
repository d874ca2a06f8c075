pub fn truncate_for_error(body: &str, max_chars: usize) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }
    let truncated = trimmed.chars().take(max_chars).collect::<String>();
    format!("{truncated}...")
}

/// Statuses an existence-tolerant fetch reports as "absent" rather than failing.
pub fn is_absent_status(status: u16) -> bool {
    !(200..300).contains(&status)
}
