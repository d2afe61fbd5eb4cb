// crates/l1menu/src/labels.rs

//! Splitting and joining of the comma-separated `<labels>` element.

/// Separator between labels in the `<labels>` text.
pub const LABEL_SEPARATOR: char = ',';

/// Splits `text` on `,` and trims every token.
///
/// Empty tokens between consecutive separators are kept. Blank input has no
/// labels at all, so an absent `<labels>` element reads as an empty list.
pub fn tokenize(text: &str) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    text.split(LABEL_SEPARATOR)
        .map(|token| token.trim().to_string())
        .collect()
}

/// Joins `labels` with `,`. Labels are assumed to be trimmed already.
pub fn join<S: AsRef<str>>(labels: &[S]) -> String {
    let mut joined = String::new();
    for (i, label) in labels.iter().enumerate() {
        if i > 0 {
            joined.push(LABEL_SEPARATOR);
        }
        joined.push_str(label.as_ref());
    }
    joined
}
