use proptest::prelude::*;

use skillmatch::ranking::TextNormalizer;
use skillmatch::ranking::normalize::STOP_WORDS;

proptest! {
    #[test]
    fn test_normalize_is_idempotent(text in ".*") {
        let normalizer = TextNormalizer::new();
        let once = normalizer.normalize(&text);
        let twice = normalizer.normalize(&once.joined());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn test_tokens_are_clean(text in "[a-zA-Z0-9 ,.;:/?'\"-]{0,80}") {
        let normalizer = TextNormalizer::new();
        for token in normalizer.normalize(&text).tokens() {
            prop_assert!(!token.is_empty());
            prop_assert!(token.chars().all(char::is_alphanumeric));
            prop_assert_eq!(token.to_lowercase(), token.clone());
            prop_assert!(!STOP_WORDS.contains(&token.as_str()));
        }
    }

    #[test]
    fn test_normalize_is_deterministic(text in ".*") {
        let normalizer = TextNormalizer::new();
        prop_assert_eq!(normalizer.normalize(&text), normalizer.normalize(&text));
    }
}
