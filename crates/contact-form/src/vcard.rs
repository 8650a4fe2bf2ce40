//! vCard 3.0 serialization.
//!
//! Output shape (CRLF line endings, no trailing line break):
//!
//! ```text
//! BEGIN:VCARD
//! VERSION:3.0
//! N:<last>;<first>;;;
//! TEL;TYPE=<TOKEN>[;PREF]:<number>     (one per non-empty number, in order)
//! END:VCARD
//! ```

use crate::form::ContactSnapshot;
use crate::phone::PhoneType;

pub const VCARD_MIME: &str = "text/vcard;charset=UTF-8";
pub const VCARD_FILE_NAME: &str = "vcard.vcf";
pub const VCARD_VERSION: &str = "3.0";

const CRLF: &str = "\r\n";

/// `TYPE` parameter for a phone row, e.g. `HOME` or `HOME;PREF`.
pub fn phone_type_token(phone_type: PhoneType, preferred: bool) -> String {
    let mut token = phone_type.vcard_token().to_string();
    if preferred {
        token.push_str(";PREF");
    }
    token
}

/// Escape a text value (RFC 2426 §4).
pub fn escape_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            ',' => escaped.push_str("\\,"),
            ';' => escaped.push_str("\\;"),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                escaped.push_str("\\n");
            }
            '\n' => escaped.push_str("\\n"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Serialize a submitted snapshot. Pure and deterministic.
///
/// Rows with an empty number are skipped, preferred or not; a snapshot with no
/// numbers at all yields a card with only the name record.
pub fn serialize(snapshot: &ContactSnapshot) -> String {
    let mut lines: Vec<String> = Vec::with_capacity(snapshot.phone.len() + 4);
    lines.push("BEGIN:VCARD".to_string());
    lines.push(format!("VERSION:{VCARD_VERSION}"));
    lines.push(format!(
        "N:{};{};;;",
        escape_text(&snapshot.last_name),
        escape_text(&snapshot.first_name)
    ));

    for entry in &snapshot.phone {
        if entry.number.is_empty() {
            continue;
        }
        lines.push(format!(
            "TEL;TYPE={}:{}",
            phone_type_token(entry.phone_type, entry.preferred),
            escape_text(&entry.number)
        ));
    }

    lines.push("END:VCARD".to_string());
    lines.join(CRLF).trim_end().to_string()
}

/// Turn bare `\n` into `\r\n`; existing `\r\n` pairs are left alone.
pub fn normalize_line_endings(text: &str) -> String {
    let mut normalized = String::with_capacity(text.len() + text.len() / 16);
    let mut previous = None;
    for c in text.chars() {
        if c == '\n' && previous != Some('\r') {
            normalized.push('\r');
        }
        normalized.push(c);
        previous = Some(c);
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phone::PhoneEntry;
    use pretty_assertions::assert_eq;

    fn tel_lines(card: &str) -> Vec<&str> {
        card.split(CRLF).filter(|l| l.starts_with("TEL")).collect()
    }

    #[test]
    fn test_single_other_number() {
        let snapshot = ContactSnapshot::new("Jaana", "Tikkanen")
            .with_phone(PhoneEntry::new(PhoneType::Other, "123456789"));
        let card = serialize(&snapshot);

        assert_eq!(
            card,
            "BEGIN:VCARD\r\nVERSION:3.0\r\nN:Tikkanen;Jaana;;;\r\nTEL;TYPE=OTHER:123456789\r\nEND:VCARD"
        );
        assert_eq!(tel_lines(&card), vec!["TEL;TYPE=OTHER:123456789"]);
    }

    #[test]
    fn test_preferred_token() {
        assert_eq!(phone_type_token(PhoneType::Home, true), "HOME;PREF");
        assert_eq!(phone_type_token(PhoneType::Work, false), "WORK");

        let snapshot = ContactSnapshot::new("A", "B")
            .with_phone(PhoneEntry::new(PhoneType::Home, "555").preferred());
        assert_eq!(tel_lines(&serialize(&snapshot)), vec!["TEL;TYPE=HOME;PREF:555"]);
    }

    #[test]
    fn test_empty_numbers_are_skipped() {
        let snapshot = ContactSnapshot::new("A", "B")
            .with_phone(PhoneEntry::new(PhoneType::Home, "").preferred())
            .with_phone(PhoneEntry::new(PhoneType::Work, "777"))
            .with_phone(PhoneEntry::default());
        assert_eq!(tel_lines(&serialize(&snapshot)), vec!["TEL;TYPE=WORK:777"]);
    }

    #[test]
    fn test_no_numbers_is_still_a_card() {
        let card = serialize(&ContactSnapshot {
            first_name: "Pertti".into(),
            last_name: "Mäkynen".into(),
            ..Default::default()
        });
        assert_eq!(
            card,
            "BEGIN:VCARD\r\nVERSION:3.0\r\nN:Mäkynen;Pertti;;;\r\nEND:VCARD"
        );
    }

    #[test]
    fn test_phone_order_preserved() {
        let snapshot = ContactSnapshot::new("A", "B")
            .with_phone(PhoneEntry::new(PhoneType::Work, "1"))
            .with_phone(PhoneEntry::new(PhoneType::Home, "2"))
            .with_phone(PhoneEntry::new(PhoneType::Other, "3"));
        assert_eq!(
            tel_lines(&serialize(&snapshot)),
            vec!["TEL;TYPE=WORK:1", "TEL;TYPE=HOME:2", "TEL;TYPE=OTHER:3"]
        );
    }

    #[test]
    fn test_name_components_are_escaped() {
        let snapshot = ContactSnapshot::new("Anna;Maria", "Smith, Jr.\\");
        let card = serialize(&snapshot);
        assert!(card.contains("N:Smith\\, Jr.\\\\;Anna\\;Maria;;;"));
        assert_eq!(escape_text("a\r\nb\nc"), "a\\nb\\nc");
    }

    #[test]
    fn test_serialize_is_deterministic() {
        let snapshot = ContactSnapshot::new("A", "B")
            .with_phone(PhoneEntry::new(PhoneType::Home, "1").preferred());
        assert_eq!(serialize(&snapshot), serialize(&snapshot));
    }

    #[test]
    fn test_normalize_line_endings() {
        assert_eq!(normalize_line_endings("a\nb"), "a\r\nb");
        assert_eq!(normalize_line_endings("a\r\nb\n"), "a\r\nb\r\n");
        assert_eq!(normalize_line_endings("no breaks"), "no breaks");
    }
}
