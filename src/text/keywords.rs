use std::collections::{HashMap, HashSet};

/// Default English stop words excluded from keyword ranking
///
/// Articles, auxiliary verbs, pronouns, prepositions, conjunctions and a few
/// common quantifiers. Changing this list changes crawl output, so extend it
/// through configuration instead of editing it.
pub const STOP_WORDS: &[&str] = &[
    "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "from", "up",
    "about", "into", "through", "during", "before", "after", "above", "below", "between", "is",
    "are", "was", "were", "be", "been", "being", "have", "has", "had", "do", "does", "did",
    "will", "would", "could", "should", "may", "might", "must", "can", "this", "that", "these",
    "those", "a", "an", "as", "if", "each", "how", "which", "who", "when", "where", "why", "what",
    "there", "here", "more", "most", "other", "some", "such", "only", "own", "same", "so", "than",
    "too", "very", "i", "you", "he", "she", "it", "we", "they",
];

/// Tuning knobs for [`extract_keywords`]
#[derive(Debug, Clone)]
pub struct KeywordOptions {
    /// Shortest token (in characters) that can become a keyword
    pub min_length: usize,

    /// Maximum number of keywords returned
    pub max_keywords: usize,

    /// Tokens that are never keywords
    pub stop_words: HashSet<String>,
}

impl KeywordOptions {
    /// Creates options with the default stop-word list
    pub fn new(min_length: usize, max_keywords: usize) -> Self {
        Self {
            min_length,
            max_keywords,
            stop_words: STOP_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }

    /// Replaces the stop-word set
    pub fn with_stop_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.stop_words = words
            .into_iter()
            .map(|w| w.as_ref().to_lowercase())
            .collect();
        self
    }

    fn is_candidate(&self, token: &str) -> bool {
        token.chars().count() >= self.min_length
            && token.chars().all(|c| c.is_alphabetic())
            && !self.stop_words.contains(token)
    }
}

impl Default for KeywordOptions {
    fn default() -> Self {
        Self::new(4, 15)
    }
}

/// Ranks the keywords of cleaned text by frequency
///
/// Tokens are split on whitespace and kept only when they are purely
/// alphabetic, at least `min_length` long and not stop words. The result holds
/// at most `max_keywords` distinct tokens, most frequent first. Tokens with the
/// same count keep the order in which they first appeared.
///
/// # Examples
///
/// ```
/// use sitecrawl::text::{extract_keywords, KeywordOptions};
///
/// let keywords = extract_keywords("alpha alpha beta beta", &KeywordOptions::default());
/// assert_eq!(keywords, vec!["alpha", "beta"]);
/// ```
pub fn extract_keywords(cleaned: &str, options: &KeywordOptions) -> Vec<String> {
    if options.max_keywords == 0 {
        return Vec::new();
    }

    // Insertion order of `ranked` is first-occurrence order
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut ranked: Vec<(&str, usize)> = Vec::new();

    for token in cleaned.split_whitespace() {
        if !options.is_candidate(token) {
            continue;
        }
        match positions.get(token) {
            Some(&idx) => ranked[idx].1 += 1,
            None => {
                positions.insert(token, ranked.len());
                ranked.push((token, 1));
            }
        }
    }

    // sort_by is stable, so equal counts stay in first-occurrence order
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    ranked
        .into_iter()
        .take(options.max_keywords)
        .map(|(token, _)| token.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> KeywordOptions {
        KeywordOptions::default()
    }

    #[test]
    fn test_tie_broken_by_first_occurrence() {
        assert_eq!(
            extract_keywords("alpha alpha beta beta", &defaults()),
            vec!["alpha", "beta"]
        );
        assert_eq!(
            extract_keywords("beta alpha alpha beta", &defaults()),
            vec!["beta", "alpha"]
        );
    }

    #[test]
    fn test_frequency_descending() {
        let text = "robotics vision vision robotics learning vision";
        assert_eq!(
            extract_keywords(text, &defaults()),
            vec!["vision", "robotics", "learning"]
        );
    }

    #[test]
    fn test_filters_short_numeric_and_stop_words() {
        let text = "the cat about research 2024 cs1301 through computing";
        assert_eq!(
            extract_keywords(text, &defaults()),
            vec!["research", "computing"]
        );
    }

    #[test]
    fn test_min_length_boundary() {
        let options = KeywordOptions::new(5, 15);
        assert_eq!(extract_keywords("data graph", &options), vec!["graph"]);
    }

    #[test]
    fn test_max_keywords_truncates() {
        let text = "one1 aaaa bbbb cccc dddd eeee";
        let options = KeywordOptions::new(4, 3);
        assert_eq!(extract_keywords(text, &options), vec!["aaaa", "bbbb", "cccc"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(extract_keywords("", &defaults()).is_empty());
    }

    #[test]
    fn test_deterministic() {
        let text = "systems theory systems networks theory security networks systems";
        let first = extract_keywords(text, &defaults());
        for _ in 0..10 {
            assert_eq!(extract_keywords(text, &defaults()), first);
        }
        assert_eq!(first, vec!["systems", "theory", "networks", "security"]);
    }

    #[test]
    fn test_custom_stop_words() {
        let options = KeywordOptions::default().with_stop_words(["Georgia"]);
        assert_eq!(
            extract_keywords("georgia tech georgia computing", &options),
            vec!["tech", "computing"]
        );
        // "about" is only a stop word in the default list
        assert_eq!(extract_keywords("about", &options), vec!["about"]);
    }

    #[test]
    fn test_default_stop_word_list_is_stable() {
        assert_eq!(STOP_WORDS.len(), 81);
        assert!(STOP_WORDS.contains(&"between"));
        assert!(STOP_WORDS.contains(&"they"));
    }
}
