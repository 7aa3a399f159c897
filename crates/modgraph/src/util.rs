use cow_utils::CowUtils;

/// Normalize line endings to LF (\n) so parse locations do not depend on the platform
pub fn normalize_line_endings(content: String) -> String {
    if !content.contains('\r') {
        return content;
    }
    content
        .cow_replace("\r\n", "\n")
        .cow_replace('\r', "\n")
        .into_owned()
}

/// Join a base dotted name and a suffix, tolerating an empty base
pub fn join_dotted(base: &str, suffix: &str) -> String {
    if base.is_empty() {
        suffix.to_owned()
    } else {
        format!("{base}.{suffix}")
    }
}
