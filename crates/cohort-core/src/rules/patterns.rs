//! Matching strategies shared by the criterion matchers.
//!
//! Every pattern uses small bounded gaps (`.{0,20}`, `[^.,]{0,25}`) rather
//! than unbounded spans, so evidence terms must sit close together.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref HTML_ENTITY: Regex = Regex::new(r"(?i)&#\d+;").unwrap();

    static ref NUMERIC_DATE: Regex = Regex::new(
        r"\d{4}/\d{1,2}/\d{1,2}|\d{1,2}/\d{1,2}/\d{4}|\d{1,2}/\d{1,2}/\d{1,2}|\d{4}/\d{1,2}|\d{1,2}/\d{4}|\d{1,2}/\d{1,2}|\d{4}"
    )
    .unwrap();

    static ref RELATIVE_DATE: Regex =
        Regex::new(r"(?i)\d{1,2}\s+(?:day|week|month|year)s?").unwrap();

    static ref MONTH_DAY: Regex = Regex::new(
        r"(?i)(?:january|february|march|april|may|june|july|august|september|october|november|december)\s+\d{1,2}"
    )
    .unwrap();
}

/// True if any pattern matches.
pub fn any_match(patterns: &[Regex], text: &str) -> bool {
    patterns.iter().any(|p| p.is_match(text))
}

/// Negative evidence first, then positive evidence, else not met.
///
/// A single negative hit decides the document even when positive
/// evidence is also present.
pub fn negation_scan(negative: &[Regex], positive: &[Regex], text: &str) -> bool {
    if any_match(negative, text) {
        return false;
    }
    any_match(positive, text)
}

/// True if some trigger occurrence has neither flank negated.
///
/// `trigger` must define `left` and `right` capture groups around the
/// trigger term.
pub fn unnegated_trigger(trigger: &Regex, left_neg: &Regex, right_neg: &Regex, text: &str) -> bool {
    trigger.captures_iter(text).any(|caps| {
        let left = caps.name("left").map_or("", |m| m.as_str());
        let right = caps.name("right").map_or("", |m| m.as_str());
        !left_neg.is_match(left) && !right_neg.is_match(right)
    })
}

/// Drop numeric HTML entities such as `&#8217;`.
pub fn remove_html_chars(text: &str) -> String {
    HTML_ENTITY.replace_all(text, "").into_owned()
}

/// Drop dates and durations so their digits are not read as lab values.
pub fn remove_dates(text: &str) -> String {
    let text = NUMERIC_DATE.replace_all(text, "");
    let text = RELATIVE_DATE.replace_all(&text, "");
    MONTH_DAY.replace_all(&text, "").into_owned()
}

/// Collapse every whitespace run to a single space.
pub fn squash_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Non-blank lines with inner whitespace collapsed.
pub fn clean_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(squash_whitespace)
        .filter(|l| !l.is_empty())
        .collect()
}

/// Take at most `max_chars` characters of `text`.
pub fn char_prefix(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negation_scan_precedence() {
        let negative = vec![Regex::new(r"(?i)denies").unwrap()];
        let positive = vec![Regex::new(r"(?i)alcohol").unwrap()];

        assert!(negation_scan(&negative, &positive, "Alcohol daily"));
        assert!(!negation_scan(&negative, &positive, "Denies alcohol"));
        assert!(!negation_scan(&negative, &positive, "Nothing relevant"));
    }

    #[test]
    fn test_unnegated_trigger() {
        let trigger = Regex::new(r"(?i)(?P<left>.{0,20})\bangina\b(?P<right>.{0,10})").unwrap();
        let neg = Regex::new(r"(?i)\b(?:no|denies)\b").unwrap();

        assert!(unnegated_trigger(&trigger, &neg, &neg, "Exertional angina today"));
        assert!(!unnegated_trigger(&trigger, &neg, &neg, "He denies angina today"));
        assert!(!unnegated_trigger(&trigger, &neg, &neg, "Nothing here"));
    }

    #[test]
    fn test_remove_dates() {
        assert_eq!(remove_dates("Cr 1.8 on 3/14/2019"), "Cr 1.8 on ");
        assert_eq!(remove_dates("A1c 7.1 2 weeks ago"), "A1c 7.1  ago");
        assert_eq!(remove_dates("seen March 3 with A1c 8"), "seen  with A1c 8");
    }

    #[test]
    fn test_remove_html_chars() {
        assert_eq!(remove_html_chars("patient&#8217;s creatinine"), "patients creatinine");
    }

    #[test]
    fn test_clean_lines() {
        let lines = clean_lines("  a   b \n\n\t c\td  \n");
        assert_eq!(lines, vec!["a b", "c d"]);
    }

    #[test]
    fn test_char_prefix() {
        assert_eq!(char_prefix("abcdef", 3), "abc");
        assert_eq!(char_prefix("ab", 3), "ab");
        assert_eq!(char_prefix("éèà", 2), "éè");
    }
}
