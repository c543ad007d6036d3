//! Patient XML serialization.

use serde::{Deserialize, Serialize};

use crate::models::Patient;

/// What to emit when writing patients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriteOptions {
    /// Emit the TEXT element
    pub include_text: bool,
    /// Emit the TAGS element
    pub include_tags: bool,
    /// Replace existing files
    pub overwrite: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            include_text: true,
            include_tags: true,
            overwrite: false,
        }
    }
}

/// Wrap text in CDATA, splitting any embedded terminator.
fn cdata(text: &str) -> String {
    format!("<![CDATA[{}]]>", text.replace("]]>", "]]]]><![CDATA[>"))
}

/// Serialize one patient with two-space indentation.
pub fn to_xml(patient: &Patient, options: &WriteOptions) -> String {
    let mut xml = String::from("<?xml version='1.0' encoding='UTF-8'?>\n");

    if !options.include_text && !options.include_tags {
        xml.push_str("<PatientMatching/>\n");
        return xml;
    }

    xml.push_str("<PatientMatching>\n");
    if options.include_text {
        xml.push_str(&format!("  <TEXT>{}</TEXT>\n", cdata(&patient.text)));
    }
    if options.include_tags {
        xml.push_str("  <TAGS>\n");
        for (criterion, label) in patient.labels.iter() {
            xml.push_str(&format!("    <{} met=\"{}\"/>\n", criterion, label));
        }
        xml.push_str("  </TAGS>\n");
    }
    xml.push_str("</PatientMatching>\n");

    xml
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::reader::{parse_tags, parse_text};
    use crate::models::{Criterion, Label, Labels};

    fn patient() -> Patient {
        let mut labels = Labels::default();
        labels.set(Criterion::English, Label::Met);
        Patient::new("7.xml".into(), "odd ]]> text".into(), labels).unwrap()
    }

    #[test]
    fn test_to_xml_layout() {
        let xml = to_xml(&patient(), &WriteOptions::default());
        assert!(xml.starts_with("<?xml version='1.0' encoding='UTF-8'?>\n<PatientMatching>\n  <TEXT><![CDATA["));
        assert!(xml.contains("    <ABDOMINAL met=\"not met\"/>\n"));
        assert!(xml.contains("    <ENGLISH met=\"met\"/>\n"));
        assert!(xml.ends_with("  </TAGS>\n</PatientMatching>\n"));
    }

    #[test]
    fn test_cdata_terminator_survives() {
        let p = patient();
        let xml = to_xml(&p, &WriteOptions::default());
        assert_eq!(parse_text(&xml), p.text);
        assert_eq!(parse_tags(&xml, "7.xml").unwrap(), p.labels);
    }

    #[test]
    fn test_optional_sections() {
        let p = patient();
        let tags_only = WriteOptions {
            include_text: false,
            ..WriteOptions::default()
        };
        let xml = to_xml(&p, &tags_only);
        assert!(!xml.contains("<TEXT>"));
        assert!(xml.contains("<TAGS>"));

        let nothing = WriteOptions {
            include_text: false,
            include_tags: false,
            overwrite: false,
        };
        assert_eq!(
            to_xml(&p, &nothing),
            "<?xml version='1.0' encoding='UTF-8'?>\n<PatientMatching/>\n"
        );
    }
}
