use log::debug;
use regex::Regex;

/// Character used to mask censored tokens
pub const DEFAULT_MASK_CHAR: char = '*';

/// Characters commonly substituted into obfuscated profanity
const SUBSTITUTION_CHARS: &[char] = &['*', '#', '@', '$', '!', '0', '1', '3'];

/// Suffixes stripped when checking inflected forms of dictionary words
const STRIP_SUFFIXES: &[&str] = &["ing", "in'", "ers", "er", "es", "ed", "s", "y"];

/// Clean words that happen to contain a dictionary word as a substring
const FALSE_POSITIVES: &[&str] = &["hello", "shell", "shells", "shellfish"];

/// Static, case-insensitive dictionary-based profanity filter.
///
/// Tokenization contract: text is split on whitespace and rejoined with
/// single spaces, so the censored token sequence stays positionally parallel
/// to the transcript's word sequence. Matching looks only at a token's
/// alphanumeric core; attached punctuation survives masking, and a token
/// that is already fully masked has no core and is never re-matched.
pub struct ProfanityFilter {
    words: Vec<String>,
    mask_char: char,
    core_chars: Regex,
}

impl ProfanityFilter {
    pub fn new(words: Vec<String>, mask_char: char) -> Self {
        let words = words
            .into_iter()
            .map(|w| w.trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self {
            words,
            mask_char,
            core_chars: Regex::new(r"[A-Za-z0-9]").expect("valid literal regex"),
        }
    }

    /// Filter with the built-in word list and `*` mask
    pub fn with_default_words() -> Self {
        Self::new(default_word_list(), DEFAULT_MASK_CHAR)
    }

    pub fn mask_char(&self) -> char {
        self.mask_char
    }

    /// Check a single word (without attached punctuation) against the
    /// dictionary: direct match, common inflected forms, substring matches
    /// for compounds like "bullshit", and obfuscated variations like `f**k`
    /// or `d@mn`.
    pub fn is_profane(&self, word: &str) -> bool {
        let word = word.to_lowercase();
        if word.chars().filter(|c| c.is_alphanumeric()).count() < 2 {
            return false;
        }

        if FALSE_POSITIVES.contains(&word.as_str()) {
            return false;
        }

        if self.words.iter().any(|w| *w == word) {
            return true;
        }

        // Inflected forms: "fucking", "bitches"
        for suffix in STRIP_SUFFIXES {
            if let Some(stem) = word.strip_suffix(suffix) {
                if stem.len() >= 3 && self.words.iter().any(|w| w == stem) {
                    return true;
                }
            }
        }

        // Compounds: both sides at least 4 chars to avoid short-word noise
        if word.len() >= 4 {
            for swear in &self.words {
                if swear.len() >= 4 && (word.contains(swear.as_str()) || swear.contains(&word)) {
                    return true;
                }
            }
        }

        self.words.iter().any(|w| is_obfuscated_variation(&word, w))
    }

    /// Produce the censored form of `text`: whitespace tokens, each matched
    /// token's core replaced with the mask character, equal visible length.
    pub fn censor(&self, text: &str) -> String {
        let censored: Vec<String> = text
            .split_whitespace()
            .map(|token| self.censor_token(token))
            .collect();
        let masked = censored
            .iter()
            .filter(|t| t.contains(self.mask_char))
            .count();
        debug!("Censored {} of {} tokens", masked, censored.len());
        censored.join(" ")
    }

    fn censor_token(&self, token: &str) -> String {
        let Some((start, end)) = self.core_span(token) else {
            return token.to_string();
        };

        let core = &token[start..end];
        if !self.is_profane(core) {
            return token.to_string();
        }

        let mask: String = std::iter::repeat(self.mask_char)
            .take(core.chars().count())
            .collect();
        format!("{}{}{}", &token[..start], mask, &token[end..])
    }

    /// Byte span from the first to the last alphanumeric character of a
    /// token. A fully-masked or all-punctuation token has no span.
    fn core_span(&self, token: &str) -> Option<(usize, usize)> {
        let first = self.core_chars.find(token)?.start();
        let last = self.core_chars.find_iter(token).last()?.end();
        Some((first, last))
    }
}

impl Default for ProfanityFilter {
    fn default() -> Self {
        Self::with_default_words()
    }
}

/// Built-in profanity dictionary
pub fn default_word_list() -> Vec<String> {
    [
        "fuck", "shit", "damn", "hell", "ass", "bitch", "bastard", "crap", "piss",
    ]
    .iter()
    .map(|w| w.to_string())
    .collect()
}

/// Check whether `word` is an obfuscated rendering of `swear`: same length,
/// substitution characters standing in for letters, and at least one literal
/// character agreeing so an all-mask token never matches anything.
fn is_obfuscated_variation(word: &str, swear: &str) -> bool {
    if word.chars().count() != swear.chars().count() {
        return false;
    }

    let mut matches = 0;
    let mut exact = 0;
    for (wc, sc) in word.chars().zip(swear.chars()) {
        if wc == sc {
            matches += 1;
            exact += 1;
        } else if SUBSTITUTION_CHARS.contains(&wc) {
            matches += 1;
        }
    }

    exact >= 1 && matches == word.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_match_is_case_insensitive() {
        let filter = ProfanityFilter::with_default_words();
        assert!(filter.is_profane("damn"));
        assert!(filter.is_profane("DAMN"));
        assert!(filter.is_profane("Shit"));
        assert!(!filter.is_profane("hello"));
        assert!(!filter.is_profane("a"));
        assert!(!filter.is_profane(""));
    }

    #[test]
    fn test_inflected_forms_match() {
        let filter = ProfanityFilter::with_default_words();
        assert!(filter.is_profane("fucking"));
        assert!(filter.is_profane("bitches"));
        assert!(filter.is_profane("damned"));
        // "hello" is not an inflection of "hell"
        assert!(!filter.is_profane("hello"));
    }

    #[test]
    fn test_compound_words_match_by_substring() {
        let filter = ProfanityFilter::with_default_words();
        assert!(filter.is_profane("bullshit"));
        assert!(filter.is_profane("horseshit"));
        assert!(filter.is_profane("goddamn"));
        // substring matching skips known clean containers
        assert!(!filter.is_profane("hello"));
        assert!(!filter.is_profane("shellfish"));
        // and never applies below 4 chars on either side
        assert!(!filter.is_profane("class"));
    }

    #[test]
    fn test_compound_words_are_masked_full_length() {
        let filter = ProfanityFilter::with_default_words();
        assert_eq!(filter.censor("utter bullshit"), "utter ********");
        let once = filter.censor("utter bullshit");
        assert_eq!(filter.censor(&once), once);
    }

    #[test]
    fn test_obfuscated_variations_match() {
        let filter = ProfanityFilter::with_default_words();
        assert!(filter.is_profane("f**k"));
        assert!(filter.is_profane("d@mn"));
        assert!(filter.is_profane("sh1t"));
        assert!(!filter.is_profane("walk"));
    }

    #[test]
    fn test_all_mask_token_never_matches() {
        let filter = ProfanityFilter::with_default_words();
        assert!(!filter.is_profane("****"));
        assert!(!filter.is_profane("*****"));
    }

    #[test]
    fn test_censor_masks_with_equal_visible_length() {
        let filter = ProfanityFilter::with_default_words();
        assert_eq!(filter.censor("damn hello"), "**** hello");
        assert_eq!(filter.censor("what the fuck"), "what the ****");
        assert_eq!(filter.censor("clean words only"), "clean words only");
    }

    #[test]
    fn test_censor_preserves_attached_punctuation() {
        let filter = ProfanityFilter::with_default_words();
        assert_eq!(filter.censor("damn, that hurt"), "****, that hurt");
        assert_eq!(filter.censor("\"shit!\""), "\"****!\"");
    }

    #[test]
    fn test_censor_is_idempotent() {
        let filter = ProfanityFilter::with_default_words();
        let once = filter.censor("damn it all to hell, friend");
        let twice = filter.censor(&once);
        assert_eq!(once, twice);
        assert_eq!(once, "**** it all to ****, friend");
    }

    #[test]
    fn test_censor_keeps_token_count() {
        let filter = ProfanityFilter::with_default_words();
        let text = "well shit that was a damn surprise";
        let censored = filter.censor(text);
        assert_eq!(
            censored.split_whitespace().count(),
            text.split_whitespace().count()
        );
    }

    #[test]
    fn test_custom_word_list_and_mask_char() {
        let filter = ProfanityFilter::new(vec!["frak".to_string()], '#');
        assert_eq!(filter.censor("frak this"), "#### this");
        assert!(!filter.is_profane("damn"));
    }
}
