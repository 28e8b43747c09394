//! Query and title tokenization.
//!
//! Text is lowercased and split into maximal runs of ASCII letters and
//! digits. There is no stemming and no Unicode normalization, so
//! `"Jacket's"` yields `["jacket", "s"]` and `"café"` yields `["caf"]`.

/// Words dropped from a query before measuring topical overlap.
pub const STOPWORDS: &[&str] = &["the", "a", "an", "of", "for", "and", "to", "in", "on", "with"];

/// Split `text` into lowercase alphanumeric tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Tokens of `query` with stopwords removed.
///
/// Falls back to the unfiltered tokens when every token is a stopword, so a
/// non-empty query always has something to score against.
pub fn content_tokens(query: &str) -> Vec<String> {
    let tokens = tokenize(query);
    let content: Vec<String> = tokens
        .iter()
        .filter(|token| !is_stopword(token))
        .cloned()
        .collect();
    if content.is_empty() {
        tokens
    } else {
        content
    }
}

/// Returns `true` if `token` is in [`STOPWORDS`].
pub fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(&token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_splits_on_punctuation() {
        assert_eq!(
            tokenize("Black Leather-Biker JACKET!"),
            vec!["black", "leather", "biker", "jacket"]
        );
    }

    #[test]
    fn keeps_digits_inside_tokens() {
        assert_eq!(tokenize("Size 10 / XL2"), vec!["size", "10", "xl2"]);
    }

    #[test]
    fn empty_and_symbol_only_text_yields_nothing() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("  -- !! ").is_empty());
    }

    #[test]
    fn non_ascii_letters_break_tokens() {
        assert_eq!(tokenize("café noir"), vec!["caf", "noir"]);
    }

    #[test]
    fn content_tokens_drop_stopwords() {
        assert_eq!(
            content_tokens("a jacket for the winter"),
            vec!["jacket", "winter"]
        );
    }

    #[test]
    fn all_stopword_query_falls_back_to_full_tokens() {
        assert_eq!(content_tokens("The And Of"), vec!["the", "and", "of"]);
    }

    #[test]
    fn content_tokens_keep_duplicates() {
        assert_eq!(content_tokens("red red dress"), vec!["red", "red", "dress"]);
    }

    #[test]
    fn stopword_lookup() {
        assert!(is_stopword("with"));
        assert!(!is_stopword("without"));
        assert_eq!(STOPWORDS.len(), 10);
    }
}
