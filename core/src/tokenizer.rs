use lazy_static::lazy_static;
use std::collections::HashSet;

use crate::index::{DocId, Dictionary};

lazy_static! {
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "aa", "aaa", "a", "an", "the", "and", "or", "is", "to", "in", "of", "for", "on", "with", ",",
        ];
        words.iter().copied().collect()
    };
}

/// Shortest term kept in the index.
pub const MIN_TERM_LEN: usize = 3;

const SEPARATORS: [char; 3] = [' ', '\n', '\t'];

pub fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }

/// Strip at most one suffix. Rules are tried in order and the first match wins.
pub fn stem(word: &str) -> &str {
    let len = word.len();
    if len > 2 && word.ends_with("er") {
        return &word[..len - 2];
    }
    if len > 2 && word.ends_with("or") {
        return &word[..len - 2];
    }
    if len > 1 && word.ends_with('r') {
        return &word[..len - 1];
    }
    if len > 2 && word.ends_with("ed") {
        return &word[..len - 2];
    }
    if len > 3 && word.ends_with("ing") {
        return &word[..len - 3];
    }
    if len > 2 && word.ends_with('s') {
        return &word[..len - 1];
    }
    word
}

/// Keep ASCII letters only, lowercased.
fn clean(token: &str) -> String {
    token
        .bytes()
        .filter(u8::is_ascii_alphabetic)
        .map(|b| char::from(b.to_ascii_lowercase()))
        .collect()
}

/// Turn a raw token into an index term, or reject it.
pub fn normalize(raw: &str) -> Option<String> {
    let cleaned = clean(raw);
    if cleaned.is_empty() {
        return None;
    }
    let term = stem(&cleaned);
    if term.len() < MIN_TERM_LEN || is_stopword(term) {
        return None;
    }
    Some(term.to_string())
}

/// Split a document on spaces, newlines and tabs and collect its terms.
///
/// Presence only: a term seen several times still maps to the single `doc_id`.
pub fn tokenize(text: &str, doc_id: DocId) -> Dictionary {
    let mut terms = Dictionary::new();
    for term in text.split(SEPARATORS).filter(|chunk| !chunk.is_empty()).filter_map(normalize) {
        terms.insert(term, doc_id);
    }
    terms
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_rules_apply_in_order() {
        assert_eq!(stem("runner"), "runn");
        assert_eq!(stem("actor"), "act");
        assert_eq!(stem("star"), "sta");
        assert_eq!(stem("jumped"), "jump");
        assert_eq!(stem("walking"), "walk");
        assert_eq!(stem("jogs"), "jog");
        assert_eq!(stem("quickly"), "quickly");
        // "ers" matches rule f only; rules are never chained
        assert_eq!(stem("runners"), "runner");
    }

    #[test]
    fn stem_thresholds() {
        // too short for "er", still long enough for the bare "r" rule
        assert_eq!(stem("er"), "e");
        assert_eq!(stem("r"), "r");
        assert_eq!(stem("ar"), "a");
        assert_eq!(stem("ing"), "ing");
        assert_eq!(stem("ed"), "ed");
        assert_eq!(stem("as"), "as");
    }

    #[test]
    fn normalize_strips_non_letters() {
        assert_eq!(normalize("Quick,").as_deref(), Some("quick"));
        assert_eq!(normalize("don't").as_deref(), Some("dont"));
        assert_eq!(normalize("caf\u{e9}s").as_deref(), Some("caf"));
        assert_eq!(normalize("1234"), None);
        assert_eq!(normalize("--"), None);
    }

    #[test]
    fn normalize_rejects_short_and_stopwords() {
        assert_eq!(normalize("The"), None);
        assert_eq!(normalize("WITH"), None);
        assert_eq!(normalize("ox"), None);
        assert_eq!(normalize("aaas"), None);
        assert_eq!(normalize("cats").as_deref(), Some("cat"));
    }

    #[test]
    fn tokenize_is_presence_only() {
        let d = tokenize("jogs jogs\tjogs\nquickly", 4);
        assert_eq!(d.len(), 2);
        assert_eq!(d.get("jog").unwrap().len(), 1);
        assert!(d.contains("quickly"));
    }

    #[test]
    fn tokenize_does_not_split_on_punctuation() {
        let d = tokenize("well-known", 1);
        let terms: Vec<_> = d.terms().collect();
        assert_eq!(terms, vec!["wellknown"]);
    }
}
