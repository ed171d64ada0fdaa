//! Token normalization.

/// Lowercases `text`, splits on whitespace and strips every
/// non-alphanumeric character from each word. Words left empty are
/// dropped.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|c| c.is_alphanumeric())
                .flat_map(char::to_lowercase)
                .collect::<String>()
        })
        .filter(|token| !token.is_empty())
        .collect()
}
