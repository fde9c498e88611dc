//! Countdown display formatting

/// Render a second count as `MM:SS`.
///
/// Minutes are not wrapped at the hour, so 90 minutes renders as `90:00`.
pub fn format_time(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Parse a `MM:SS` string back into seconds, the inverse of [`format_time`].
pub fn parse_time(display: &str) -> Option<u32> {
    let (minutes, seconds) = display.trim().split_once(':')?;
    if minutes.is_empty() || seconds.len() != 2 {
        return None;
    }
    if !minutes.bytes().chain(seconds.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }

    let minutes: u32 = minutes.parse().ok()?;
    let seconds: u32 = seconds.parse().ok()?;
    if seconds >= 60 {
        return None;
    }

    minutes.checked_mul(60)?.checked_add(seconds)
}

/// Human readable duration used for accumulated focus time, e.g. `1h 5m 3s`
pub fn format_duration(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
