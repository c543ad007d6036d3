//! Token normalizer for clinical narrative.
//!
//! Steps:
//! - Deaccent (NFD, combining marks dropped)
//! - Keep runs of at least two ASCII letters; digits and punctuation separate tokens
//! - Lowercase every token that is not entirely upper case (acronyms such as "MI" survive)
//! - Expand "pt"/"pts" to "patient"

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref TOKEN: Regex = Regex::new(r"[a-zA-Z]{2,}").unwrap();
}

/// Abbreviations expanded after case folding.
const ABBREVIATIONS: &[(&str, &str)] = &[("pt", "patient"), ("pts", "patient")];

/// Strip diacritics: "Núttèr" → "Nutter".
pub fn deaccent(text: &str) -> String {
    text.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Normalize one document into a single line of space-separated tokens.
pub fn normalize(text: &str) -> String {
    let plain = deaccent(text);
    let mut tokens: Vec<String> = Vec::new();

    for m in TOKEN.find_iter(&plain) {
        let token = m.as_str();
        let folded = if token.bytes().all(|b| b.is_ascii_uppercase()) {
            token.to_string()
        } else {
            token.to_lowercase()
        };
        let expanded = ABBREVIATIONS
            .iter()
            .find(|(abbr, _)| *abbr == folded)
            .map(|(_, full)| full.to_string())
            .unwrap_or(folded);
        tokens.push(expanded);
    }

    tokens.join(" ")
}

/// Normalize a batch of documents, 1:1 and in order.
pub fn normalize_all<S: AsRef<str>>(documents: &[S]) -> Vec<String> {
    documents.iter().map(|d| normalize(d.as_ref())).collect()
}

/// Drop tokens found in `stopwords` from normalized text.
pub fn remove_stopwords(normalized: &str, stopwords: &HashSet<String>) -> String {
    normalized
        .split(' ')
        .filter(|token| !token.is_empty() && !stopwords.contains(*token))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_documents() {
        let docs = ["The pt. appears awake.", "Cardiologist:  Dr. C. Núttèr"];
        assert_eq!(
            normalize_all(&docs),
            vec!["the patient appears awake", "cardiologist dr nutter"]
        );
    }

    #[test]
    fn test_remove_stopwords() {
        let stopwords: HashSet<String> = ["the", "of", "and"].iter().map(|s| s.to_string()).collect();
        let text = normalize("The pt. has a history of MI and CAD");
        assert_eq!(remove_stopwords(&text, &stopwords), "patient has history MI CAD");
        assert_eq!(remove_stopwords("", &stopwords), "");
    }

    #[test]
    fn test_acronyms_keep_case() {
        assert_eq!(normalize("Hx of MI and CAD, Pts stable"), "hx of MI and CAD patient stable");
    }

    #[test]
    fn test_upper_pt_is_an_acronym() {
        // Only the case-folded form is expanded
        assert_eq!(normalize("PT eval"), "PT eval");
    }

    #[test]
    fn test_digits_split_tokens() {
        assert_eq!(normalize("HbA1c 7.2% on 2/3"), "hba on");
        assert_eq!(normalize("a 1 b2 cd"), "cd");
    }

    #[test]
    fn test_deaccent() {
        assert_eq!(deaccent("café crème"), "cafe creme");
    }

    #[test]
    fn test_empty_batch() {
        let docs: [&str; 0] = [];
        assert!(normalize_all(&docs).is_empty());
    }
}
