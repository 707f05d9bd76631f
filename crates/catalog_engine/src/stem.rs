const TRUNCATED_MARKER: &str = "…";
pub const MAX_STEM_PREVIEW: usize = 160;

/// Renders an HTML stem as a single line of markdown-ish text, cut to at most
/// `max_chars` characters plus a marker.
pub fn stem_preview(stem_html: &str, max_chars: usize) -> String {
    let markdown = html2md::parse_html(stem_html);
    let flattened = markdown.split_whitespace().collect::<Vec<_>>().join(" ");
    if flattened.chars().count() <= max_chars {
        flattened
    } else {
        let truncated: String = flattened.chars().take(max_chars).collect();
        format!("{}{TRUNCATED_MARKER}", truncated.trim_end())
    }
}
