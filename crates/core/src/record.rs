use std::collections::BTreeMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

/// Segment separator in the content fingerprint. Never appears inside a
/// segment (segments use `:` between name and value).
const FINGERPRINT_DELIMITER: &str = "||";

/// Number of attribute segments the fingerprint includes.
const FINGERPRINT_ATTRIBUTE_LIMIT: usize = 10;

// ---------------------------------------------------------------------------
// Attributes
// ---------------------------------------------------------------------------

/// Insertion-ordered attribute map: display name → extracted text.
///
/// Order matters — the content fingerprint takes the first ten entries in
/// the order the extraction pass produced them, so this is a thin wrapper
/// over a pair vector rather than a sorted or hashed map. Serializes as a
/// JSON object with order preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append an entry. A repeated name keeps both entries in order; `get`
    /// returns the first.
    pub fn push(&mut self, name: String, value: String) {
        self.0.push((name, value));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Attributes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Attributes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AttrVisitor;

        impl<'de> Visitor<'de> for AttrVisitor {
            type Value = Attributes;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of attribute names to string values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Attributes, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, value)) = access.next_entry::<String, String>()? {
                    entries.push((name, value));
                }
                Ok(Attributes(entries))
            }
        }

        deserializer.deserialize_map(AttrVisitor)
    }
}

// ---------------------------------------------------------------------------
// RequirementRecord
// ---------------------------------------------------------------------------

/// A single requirement extracted from an interchange document.
///
/// `attributes` and `raw_attributes` are two views of the same extraction
/// pass: one keyed by resolved display name, the other by the stable
/// attribute-definition id. They always have the same cardinality.
///
/// Records are created fresh per parse and never mutated afterwards; there
/// is no cross-parse identity. `content_fingerprint` is for change
/// detection only, not identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequirementRecord {
    /// Requirement id. Falls back to a positional placeholder when the
    /// source element carries no identifier (`generated_id` is then true).
    pub id: String,
    /// Source identifier, kept only when distinct from `id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    /// Resolved type display name, or the raw type reference when the
    /// reference was never cataloged. Absent when the element had no type.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub requirement_type: Option<String>,
    /// Display name → extracted text, in extraction order.
    pub attributes: Attributes,
    /// Attribute-definition id → extracted text.
    pub raw_attributes: BTreeMap<String, String>,
    /// Deterministic change-detection string, see [`Self::fingerprint`].
    pub content_fingerprint: String,
    /// True when `id` is a positional placeholder rather than a source
    /// identifier. Such records can never match a master requirement.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub generated_id: bool,
}

impl RequirementRecord {
    /// Build the deterministic fingerprint string: id, identifier (when
    /// distinct), type, then the first ten non-empty attribute pairs in
    /// insertion order, joined with `||`.
    pub fn fingerprint(&self) -> String {
        let mut parts = Vec::new();

        if !self.id.is_empty() {
            parts.push(format!("ID:{}", self.id));
        }
        if let Some(identifier) = &self.identifier {
            if identifier != &self.id {
                parts.push(format!("IDENTIFIER:{identifier}"));
            }
        }
        if let Some(kind) = &self.requirement_type {
            parts.push(format!("TYPE:{kind}"));
        }

        let mut taken = 0;
        for (name, value) in self.attributes.iter() {
            if value.is_empty() || taken >= FINGERPRINT_ATTRIBUTE_LIMIT {
                continue;
            }
            parts.push(format!("{name}:{value}"));
            taken += 1;
        }

        parts.join(FINGERPRINT_DELIMITER)
    }

    /// Hex SHA-256 of the fingerprint string. Stable short anchor for
    /// callers that persist change markers instead of the full string.
    pub fn content_digest(&self) -> String {
        let digest = Sha256::digest(self.content_fingerprint.as_bytes());
        digest.iter().map(|b| format!("{b:02x}")).collect()
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name)
    }

    /// Main requirement text: the conventional text attributes first, then
    /// the first attribute value that looks like prose.
    pub fn text_content(&self) -> Option<&str> {
        self.attribute("ReqIF.Text")
            .or_else(|| self.attribute("Text"))
            .or_else(|| self.attribute("Description"))
            .or_else(|| self.first_prose_attribute())
    }

    fn first_prose_attribute(&self) -> Option<&str> {
        self.attributes
            .iter()
            .map(|(_, value)| value)
            .find(|value| value.len() > 10)
    }
}
