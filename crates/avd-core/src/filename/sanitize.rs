//! Linux-safe filename sanitization.

/// Linux NAME_MAX.
const MAX_LEN: usize = 255;

/// Sanitizes a derived filename for safe use on Linux.
///
/// Replaces path separators, NUL, control characters, and whitespace with
/// `_`, collapses runs of `_`, strips leading/trailing dots, spaces, and
/// underscores, and truncates to 255 bytes on a character boundary.
pub fn sanitize_file_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        let keep = !(c == '/' || c == '\\' || c == '\0' || c.is_control() || c.is_whitespace());
        if keep {
            out.push(c);
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }

    let trimmed = out.trim_matches(|c: char| c == '.' || c == '_' || c == ' ');

    let mut end = trimmed.len().min(MAX_LEN);
    while end > 0 && !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    trimmed[..end].to_string()
}
