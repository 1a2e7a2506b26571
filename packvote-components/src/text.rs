//! Small string helpers shared by the form widgets.

/// Title-cases a name or location for display.
///
/// Each space-separated word gets an upper-case first letter and lower-case
/// rest. For comma-separated locations such as `austin, tx` the second part
/// is a region code and is upper-cased whole. Empty input reads `N/A`.
pub fn capitalize_text(text: &str) -> String {
    if text.is_empty() {
        return "N/A".to_string();
    }
    if !text.contains(',') {
        return capitalize_words(text);
    }
    text.split(',')
        .enumerate()
        .map(|(index, part)| {
            let part = part.trim();
            if index == 1 {
                part.to_uppercase()
            } else {
                capitalize_words(part)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn capitalize_words(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Keeps only ASCII digits.
pub fn digits_only(text: &str) -> String {
    text.chars().filter(char::is_ascii_digit).collect()
}
