const FALLBACK_NAME: &str = "untitled";

/// Filesystem-safe name for a remote display name.
///
/// Drops every character that is not an ASCII word character, whitespace,
/// `.` or `-`, then turns each whitespace run into a single `_`. Names that
/// end up empty or made only of dots become `untitled`.
pub fn sanitize_name(input: &str) -> String {
    let mut cleaned = String::with_capacity(input.len());
    let mut in_whitespace = false;
    for c in input.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                cleaned.push('_');
            }
            in_whitespace = true;
        } else if is_kept(c) {
            cleaned.push(c);
            in_whitespace = false;
        }
    }

    if cleaned.chars().all(|c| c == '.') {
        return FALLBACK_NAME.to_string();
    }
    cleaned
}

fn is_kept(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')
}
