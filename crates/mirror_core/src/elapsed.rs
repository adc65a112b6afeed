use chrono::TimeDelta;

/// Human phrasing of how long ago something happened: `"3 hours ago"`.
///
/// Uses the largest whole unit (days, hours, minutes, seconds); zero or
/// negative spans read as `"Just now"`.
pub fn describe_elapsed(elapsed: TimeDelta) -> String {
    let days = elapsed.num_days();
    let seconds = elapsed.num_seconds();
    if days > 0 {
        return plural(days, "day");
    }
    if seconds >= 3600 {
        return plural(seconds / 3600, "hour");
    }
    if seconds >= 60 {
        return plural(seconds / 60, "minute");
    }
    if seconds > 0 {
        return plural(seconds, "second");
    }
    "Just now".to_string()
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("{count} {unit} ago")
    } else {
        format!("{count} {unit}s ago")
    }
}
