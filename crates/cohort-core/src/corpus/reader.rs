//! Patient XML parsing.
//!
//! Files follow the n2c2 2018 track 1 layout:
//!
//! ```text
//! <?xml version="1.0" encoding="UTF-8"?>
//! <PatientMatching>
//!   <TEXT><![CDATA[ ...records... ]]></TEXT>
//!   <TAGS>
//!     <ABDOMINAL met="not met" />
//!     ...
//!   </TAGS>
//! </PatientMatching>
//! ```

use lazy_static::lazy_static;
use regex::Regex;

use super::{CorpusError, CorpusResult};
use crate::models::{Criterion, Label, Labels};

lazy_static! {
    static ref TEXT: Regex = Regex::new(r"(?s)<TEXT\s*>(.*?)</TEXT\s*>").unwrap();
    static ref CDATA: Regex = Regex::new(r"(?s)<!\[CDATA\[(.*?)\]\]>").unwrap();
    static ref TAGS: Regex = Regex::new(r"(?s)<TAGS\s*>(.*?)</TAGS\s*>").unwrap();
    static ref TAG: Regex =
        Regex::new(r#"<([A-Z0-9-]+)\s+met\s*=\s*["']([^"']*)["']\s*/?>"#).unwrap();
    static ref CHAR_REF: Regex = Regex::new(r"&#(?:[xX]([0-9a-fA-F]{1,6})|([0-9]{1,7}));").unwrap();
}

/// Character for a decimal or hex reference; invalid code points stay as written.
fn char_ref(caps: &regex::Captures) -> String {
    let code = match (caps.get(1), caps.get(2)) {
        (Some(hex), _) => u32::from_str_radix(hex.as_str(), 16).ok(),
        (None, Some(dec)) => dec.as_str().parse::<u32>().ok(),
        (None, None) => None,
    };
    match code.and_then(char::from_u32) {
        Some(c) => c.to_string(),
        None => caps[0].to_string(),
    }
}

/// Resolve the five predefined XML entities and numeric character references.
fn unescape(text: &str) -> String {
    let named = text
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'");
    // "&amp;" last, so "&amp;#38;" stays "&#38;"
    CHAR_REF.replace_all(&named, char_ref).replace("&amp;", "&")
}

/// TEXT content: CDATA sections verbatim, other content unescaped.
/// Empty when the element is missing.
pub fn parse_text(xml: &str) -> String {
    let Some(caps) = TEXT.captures(xml) else {
        return String::new();
    };
    let body = &caps[1];

    let mut text = String::new();
    let mut last = 0;
    for cdata in CDATA.captures_iter(body) {
        let (Some(whole), Some(inner)) = (cdata.get(0), cdata.get(1)) else {
            continue;
        };
        text.push_str(&unescape(&body[last..whole.start()]));
        text.push_str(inner.as_str());
        last = whole.end();
    }
    text.push_str(&unescape(&body[last..]));
    text
}

/// Criterion labels from TAGS. Missing tags stay `NotMet`; unknown tag
/// names are ignored.
pub fn parse_tags(xml: &str, file: &str) -> CorpusResult<Labels> {
    let mut labels = Labels::default();
    let Some(caps) = TAGS.captures(xml) else {
        return Ok(labels);
    };

    for tag in TAG.captures_iter(&caps[1]) {
        let Ok(criterion) = tag[1].parse::<Criterion>() else {
            log::debug!("{}: ignoring unknown tag {}", file, &tag[1]);
            continue;
        };
        let label = tag[2]
            .parse::<Label>()
            .map_err(|_| CorpusError::InvalidLabel {
                file: file.to_string(),
                criterion,
                value: tag[2].to_string(),
            })?;
        labels.set(criterion, label);
    }

    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    const XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<PatientMatching>
  <TEXT><![CDATA[
Record date: 2090-01-02
Pt seen <today> & stable.
]]></TEXT>
  <TAGS>
    <ABDOMINAL met="not met" />
    <CREATININE met="met" />
    <SMOKER met="met" />
  </TAGS>
</PatientMatching>
"#;

    #[test]
    fn test_parse_text_cdata() {
        assert_eq!(
            parse_text(XML),
            "\nRecord date: 2090-01-02\nPt seen <today> & stable.\n"
        );
    }

    #[test]
    fn test_parse_text_escaped() {
        assert_eq!(parse_text("<TEXT>a &lt; b &amp;&amp; c</TEXT>"), "a < b && c");
        assert_eq!(parse_text("<PatientMatching/>"), "");
    }

    #[test]
    fn test_parse_text_char_refs() {
        assert_eq!(
            parse_text("<TEXT>patient&#8217;s A1C &#x3E; 9 &#65;</TEXT>"),
            "patient\u{2019}s A1C > 9 A"
        );
        assert_eq!(parse_text("<TEXT>&amp;#38; &#xD800;</TEXT>"), "&#38; &#xD800;");
    }

    #[test]
    fn test_parse_tags() {
        let labels = parse_tags(XML, "100.xml").unwrap();
        assert_eq!(labels.get(Criterion::Creatinine), Label::Met);
        assert_eq!(labels.get(Criterion::Abdominal), Label::NotMet);
        assert_eq!(labels.get(Criterion::Hba1c), Label::NotMet);
    }

    #[test]
    fn test_invalid_label() {
        let xml = r#"<TAGS><HBA1C met="maybe"/></TAGS>"#;
        assert!(matches!(
            parse_tags(xml, "1.xml"),
            Err(CorpusError::InvalidLabel { criterion: Criterion::Hba1c, .. })
        ));
    }
}
