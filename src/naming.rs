//! Short display titles derived from a free-text description

use crate::widget::PLACEHOLDER_NAME;

const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "from",
];

const MAX_WORDS: usize = 4;
const MAX_CHARS: usize = 40;
const FALLBACK_CHARS: usize = 30;
const ELLIPSIS: &str = "...";

/// Derive a title from a prompt.
///
/// Keeps the first four non-stop-words, title-cased. Results never exceed 40
/// characters; longer titles are cut to 37 and end in `...`.
///
/// ```
/// use widgetsmith::derive_name;
/// assert_eq!(derive_name("the quick brown fox jumps"), "Quick Brown Fox Jumps");
/// assert_eq!(derive_name("   "), "Untitled Widget");
/// ```
pub fn derive_name(text: &str) -> String {
    if text.trim().is_empty() {
        return PLACEHOLDER_NAME.to_string();
    }

    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' || c.is_whitespace() { c } else { ' ' })
        .collect();

    let words: Vec<&str> = cleaned
        .split_whitespace()
        .filter(|w| !STOP_WORDS.contains(w))
        .take(MAX_WORDS)
        .collect();

    if words.is_empty() {
        let fallback: String = text.chars().take(FALLBACK_CHARS).collect();
        let fallback = fallback.trim();
        return if fallback.is_empty() {
            PLACEHOLDER_NAME.to_string()
        } else {
            fallback.to_string()
        };
    }

    let name = words.iter().map(|w| capitalize(w)).collect::<Vec<_>>().join(" ");

    if name.chars().count() > MAX_CHARS {
        let mut cut: String = name.chars().take(MAX_CHARS - ELLIPSIS.len()).collect();
        cut.push_str(ELLIPSIS);
        cut
    } else {
        name
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_placeholder() {
        assert_eq!(derive_name(""), PLACEHOLDER_NAME);
        assert_eq!(derive_name("   "), PLACEHOLDER_NAME);
        assert_eq!(derive_name("\n\t"), PLACEHOLDER_NAME);
    }

    #[test]
    fn stop_words_are_dropped() {
        assert_eq!(derive_name("the quick brown fox jumps"), "Quick Brown Fox Jumps");
        assert_eq!(derive_name("A clock with the time"), "Clock Time");
    }

    #[test]
    fn only_four_words_are_kept() {
        assert_eq!(
            derive_name("weather forecast showing temperature humidity wind"),
            "Weather Forecast Showing Temperature"
        );
    }

    #[test]
    fn punctuation_splits_words() {
        assert_eq!(derive_name("pomodoro-timer, minimal!"), "Pomodoro Timer Minimal");
    }

    #[test]
    fn long_names_are_truncated_to_forty() {
        let name = derive_name("extraordinarily magnificent photosynthesis visualization");
        assert_eq!(name.chars().count(), 40);
        assert!(name.ends_with("..."));
        assert!(name.starts_with("Extraordinarily Magnificent"));
    }

    #[test]
    fn forty_exactly_is_not_truncated() {
        // 10 + 1 + 10 + 1 + 10 + 1 + 7 = 40
        let name = derive_name("abcdefghij klmnopqrst uvwxyzabcd efghijk");
        assert_eq!(name.chars().count(), 40);
        assert!(!name.ends_with("..."));
    }

    #[test]
    fn all_stop_words_fall_back_to_raw_text() {
        assert_eq!(derive_name("  the and of  "), "the and of");
        assert_eq!(derive_name("?!"), "?!");
    }

    #[test]
    fn fallback_takes_thirty_characters() {
        let raw = format!("{}{}", "-".repeat(35), " ");
        assert_eq!(derive_name(&raw), "-".repeat(30));
    }

    #[test]
    fn non_ascii_words_survive() {
        assert_eq!(derive_name("horloge élégante"), "Horloge Élégante");
    }

    #[test]
    fn always_within_limit() {
        for input in [
            "a",
            "x",
            "counter",
            "a very very very very long description of something",
            "supercalifragilisticexpialidocious supercalifragilisticexpialidocious",
        ] {
            assert!(derive_name(input).chars().count() <= MAX_CHARS, "{}", input);
        }
    }
}
