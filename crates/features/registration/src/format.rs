//! Input formatters applied while the user types or leaves a field.

const PHONE_MAX_DIGITS: usize = 10;

/// Keeps only ASCII digits, at most ten of them.
#[must_use]
pub fn phone_digits(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).take(PHONE_MAX_DIGITS).collect()
}

/// Lowercases the name, then capitalizes the first letter of every space-separated word.
///
/// Runs of spaces are preserved as typed.
#[must_use]
pub fn title_case(value: &str) -> String {
    value
        .to_lowercase()
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            chars
                .next()
                .map_or_else(String::new, |first| first.to_uppercase().chain(chars).collect())
        })
        .collect::<Vec<_>>()
        .join(" ")
}
