use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Truncate to `max_width` terminal columns, ending in `...` when cut.
/// Grapheme-aware so accents and emoji are never split.
pub fn truncate_with_ellipsis(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    if max_width <= 3 {
        return take_width(s, max_width);
    }
    let mut truncated = take_width(s, max_width - 3);
    truncated.push_str("...");
    truncated
}

fn take_width(s: &str, max_width: usize) -> String {
    let mut width = 0;
    let mut out = String::new();
    for grapheme in s.graphemes(true) {
        let w = grapheme.width();
        if width + w > max_width {
            break;
        }
        out.push_str(grapheme);
        width += w;
    }
    out
}

/// First line of a possibly multi-line message.
pub fn first_line(s: &str) -> &str {
    s.lines().next().unwrap_or("").trim()
}
