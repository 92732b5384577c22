//! Character-granular line wrapping.
//!
//! Lines break between any two characters rather than at whitespace, so
//! text in scripts without word delimiters still fits its box. Mixed runs of
//! Latin words may break mid-word.

/// Split `text` into lines no wider than `max_width`.
///
/// Explicit `\n` breaks are kept. A line always receives at least one
/// character, even when that character alone is wider than `max_width`.
/// Empty text yields a single empty line.
pub fn wrap_text<F>(text: &str, max_width: f32, advance: F) -> Vec<String>
where
    F: Fn(char) -> f32,
{
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let paragraph = paragraph.strip_suffix('\r').unwrap_or(paragraph);
        let mut line = String::new();
        let mut width = 0.0f32;

        for ch in paragraph.chars() {
            let w = advance(ch);
            if width + w > max_width && !line.is_empty() {
                lines.push(std::mem::take(&mut line));
                width = 0.0;
            }
            line.push(ch);
            width += w;
        }
        lines.push(line);
    }

    lines
}

/// Width of a line under the same advance function.
pub fn line_width<F>(line: &str, advance: F) -> f32
where
    F: Fn(char) -> f32,
{
    line.chars().map(advance).sum()
}
