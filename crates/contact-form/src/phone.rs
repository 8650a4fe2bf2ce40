//! Phone number entries.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Phone number category.
///
/// Option order matters for the type picker: `Other` comes first and is the
/// default for new entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PhoneType {
    #[default]
    Other,
    Home,
    Work,
}

impl PhoneType {
    /// All types in picker order.
    pub const ALL: [PhoneType; 3] = [PhoneType::Other, PhoneType::Home, PhoneType::Work];

    /// Label shown in the type picker.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Other => "Other",
            Self::Home => "Home",
            Self::Work => "Work",
        }
    }

    /// vCard `TYPE` parameter value.
    pub fn vcard_token(&self) -> &'static str {
        match self {
            Self::Other => "OTHER",
            Self::Home => "HOME",
            Self::Work => "WORK",
        }
    }

    /// Case-insensitive lookup; anything unrecognized is `Other`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "home" => Self::Home,
            "work" => Self::Work,
            _ => Self::Other,
        }
    }

    /// Lookup by picker position (0 = Other, 1 = Home, 2 = Work).
    pub fn from_ordinal(ordinal: u64) -> Self {
        match ordinal {
            1 => Self::Home,
            2 => Self::Work,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for PhoneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PhoneType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_label(s))
    }
}

impl<'de> Deserialize<'de> for PhoneType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de;

        struct PhoneTypeVisitor;

        impl<'de> de::Visitor<'de> for PhoneTypeVisitor {
            type Value = PhoneType;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a phone type label or ordinal")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(PhoneType::from_label(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(PhoneType::from_ordinal(v))
            }

            fn visit_i64<E: de::Error>(self, _v: i64) -> Result<Self::Value, E> {
                Ok(PhoneType::Other)
            }
        }

        deserializer.deserialize_any(PhoneTypeVisitor)
    }
}

/// A single phone number row.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PhoneEntry {
    /// Designated primary number.
    #[serde(default)]
    pub preferred: bool,
    #[serde(rename = "type", default)]
    pub phone_type: PhoneType,
    /// Raw number text. Format checks belong to the number input widget.
    #[serde(default)]
    pub number: String,
}

impl PhoneEntry {
    pub fn new(phone_type: PhoneType, number: impl Into<String>) -> Self {
        Self {
            preferred: false,
            phone_type,
            number: number.into(),
        }
    }

    /// Builder: mark as preferred.
    pub fn preferred(mut self) -> Self {
        self.preferred = true;
        self
    }

    /// True when the number is empty and the entry will not reach the vCard.
    pub fn is_blank(&self) -> bool {
        self.number.is_empty()
    }
}

/// Partial update merged into an existing entry. `None` fields are untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PhoneEntryPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred: Option<bool>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub phone_type: Option<PhoneType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
}

impl PhoneEntryPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn preferred(mut self, preferred: bool) -> Self {
        self.preferred = Some(preferred);
        self
    }

    pub fn phone_type(mut self, phone_type: PhoneType) -> Self {
        self.phone_type = Some(phone_type);
        self
    }

    pub fn number(mut self, number: impl Into<String>) -> Self {
        self.number = Some(number.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.preferred.is_none() && self.phone_type.is_none() && self.number.is_none()
    }

    /// Merge into `entry`.
    pub fn apply_to(&self, entry: &mut PhoneEntry) {
        if let Some(preferred) = self.preferred {
            entry.preferred = preferred;
        }
        if let Some(phone_type) = self.phone_type {
            entry.phone_type = phone_type;
        }
        if let Some(number) = &self.number {
            entry.number.clone_from(number);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_entry() {
        let entry = PhoneEntry::default();
        assert!(!entry.preferred);
        assert_eq!(entry.phone_type, PhoneType::Other);
        assert!(entry.is_blank());
    }

    #[test]
    fn test_type_labels_in_picker_order() {
        let labels: Vec<_> = PhoneType::ALL.iter().map(|t| t.label()).collect();
        assert_eq!(labels, vec!["Other", "Home", "Work"]);
    }

    #[test]
    fn test_unrecognized_type_defaults_to_other() {
        assert_eq!(PhoneType::from_label("HOME"), PhoneType::Home);
        assert_eq!(PhoneType::from_label(" work "), PhoneType::Work);
        assert_eq!(PhoneType::from_label("mobile"), PhoneType::Other);
        assert_eq!(PhoneType::from_ordinal(7), PhoneType::Other);
    }

    #[test]
    fn test_deserialize_entry_with_unknown_type() {
        let entry: PhoneEntry =
            serde_json::from_str(r#"{"preferred":true,"type":"fax","number":"555"}"#).unwrap();
        assert_eq!(entry.phone_type, PhoneType::Other);
        assert!(entry.preferred);

        let entry: PhoneEntry = serde_json::from_str(r#"{"type":2,"number":"1"}"#).unwrap();
        assert_eq!(entry.phone_type, PhoneType::Work);
    }

    #[test]
    fn test_patch_merges_only_set_fields() {
        let mut entry = PhoneEntry::new(PhoneType::Home, "123");
        PhoneEntryPatch::new().preferred(true).apply_to(&mut entry);
        assert_eq!(entry, PhoneEntry::new(PhoneType::Home, "123").preferred());

        PhoneEntryPatch::new()
            .phone_type(PhoneType::Work)
            .number("456")
            .apply_to(&mut entry);
        assert_eq!(entry.phone_type, PhoneType::Work);
        assert_eq!(entry.number, "456");
        assert!(entry.preferred);
    }
}
