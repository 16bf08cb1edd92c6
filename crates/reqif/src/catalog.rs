//! Definition catalogs built in one full-document pass.
//!
//! Three catalogs: attribute definitions (seven kinds), enumeration
//! definitions with their value entries, and spec-object types. Enumeration
//! values are additionally flattened into a document-global id → display
//! name table for direct resolution during extraction.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::dom::Element;
use crate::ns::NamespaceContext;

/// The seven attribute kinds of the interchange standard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeKind {
    String,
    Xhtml,
    Enumeration,
    Integer,
    Real,
    Date,
    Boolean,
}

impl AttributeKind {
    pub const ALL: [AttributeKind; 7] = [
        AttributeKind::String,
        AttributeKind::Xhtml,
        AttributeKind::Enumeration,
        AttributeKind::Integer,
        AttributeKind::Real,
        AttributeKind::Date,
        AttributeKind::Boolean,
    ];

    fn suffix(&self) -> &'static str {
        match self {
            Self::String => "STRING",
            Self::Xhtml => "XHTML",
            Self::Enumeration => "ENUMERATION",
            Self::Integer => "INTEGER",
            Self::Real => "REAL",
            Self::Date => "DATE",
            Self::Boolean => "BOOLEAN",
        }
    }

    /// Declaration element name, e.g. `ATTRIBUTE-DEFINITION-STRING`.
    pub fn definition_tag(&self) -> String {
        format!("ATTRIBUTE-DEFINITION-{}", self.suffix())
    }

    /// Value element name, e.g. `ATTRIBUTE-VALUE-STRING`.
    pub fn value_tag(&self) -> String {
        format!("ATTRIBUTE-VALUE-{}", self.suffix())
    }

    /// Reference element name nested under `DEFINITION`.
    pub fn definition_ref_tag(&self) -> String {
        format!("ATTRIBUTE-DEFINITION-{}-REF", self.suffix())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AttributeDefinition {
    pub id: String,
    pub display_name: String,
    pub kind: AttributeKind,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnumerationDefinition {
    pub id: String,
    pub display_name: String,
    /// value id → display name, owned by this enumeration.
    pub values: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpecObjectType {
    pub id: String,
    pub display_name: String,
}

/// All catalogs for one document, plus the counters the build produced.
/// Rebuilt per parse invocation; immutable afterwards.
#[derive(Debug, Default)]
pub struct Catalogs {
    pub attribute_definitions: HashMap<String, AttributeDefinition>,
    pub enumerations: HashMap<String, EnumerationDefinition>,
    /// Flattened value table across all enumerations. Duplicate value ids
    /// are allowed; the later definition in document order wins.
    pub enum_values: HashMap<String, String>,
    pub spec_object_types: HashMap<String, SpecObjectType>,
    /// Elements found per declaration tag, for diagnostics.
    pub elements_found: BTreeMap<String, usize>,
    /// Declarations without an identifier: skipped, never fatal.
    pub skipped_declarations: usize,
    /// Catalog inserts that overwrote an earlier id (last one wins).
    pub duplicate_ids: usize,
}

impl Catalogs {
    pub fn attribute_definition(&self, id: &str) -> Option<&AttributeDefinition> {
        self.attribute_definitions.get(id)
    }

    pub fn enum_value_name(&self, value_id: &str) -> Option<&str> {
        self.enum_values.get(value_id).map(String::as_str)
    }

    pub fn spec_object_type_name(&self, id: &str) -> Option<&str> {
        self.spec_object_types.get(id).map(|t| t.display_name.as_str())
    }
}

/// Scan the whole document once and build every catalog.
pub fn build(root: &Element, ctx: &NamespaceContext) -> Catalogs {
    let mut catalogs = Catalogs::default();
    build_attribute_definitions(root, ctx, &mut catalogs);
    build_enumerations(root, ctx, &mut catalogs);
    build_spec_object_types(root, ctx, &mut catalogs);
    catalogs
}

fn build_attribute_definitions(root: &Element, ctx: &NamespaceContext, catalogs: &mut Catalogs) {
    for kind in AttributeKind::ALL {
        let tag = kind.definition_tag();
        let elements = ctx.find_all(root, &tag);
        catalogs.elements_found.insert(tag, elements.len());

        for element in elements {
            let Some(id) = element.identifier() else {
                catalogs.skipped_declarations += 1;
                continue;
            };
            let display_name = element.display_name().unwrap_or(id).to_string();
            let previous = catalogs.attribute_definitions.insert(
                id.to_string(),
                AttributeDefinition {
                    id: id.to_string(),
                    display_name,
                    kind,
                },
            );
            if previous.is_some() {
                catalogs.duplicate_ids += 1;
            }
        }
    }
}

fn build_enumerations(root: &Element, ctx: &NamespaceContext, catalogs: &mut Catalogs) {
    let definitions = ctx.find_all(root, "DATATYPE-DEFINITION-ENUMERATION");
    catalogs
        .elements_found
        .insert("DATATYPE-DEFINITION-ENUMERATION".into(), definitions.len());

    for definition in definitions {
        let Some(enum_id) = definition.identifier() else {
            catalogs.skipped_declarations += 1;
            continue;
        };
        let display_name = definition.display_name().unwrap_or(enum_id).to_string();
        let mut values = BTreeMap::new();

        for container in ctx.find_all(definition, "SPECIFIED-VALUES") {
            for value in ctx.find_all(container, "ENUM-VALUE") {
                let Some(value_id) = value.identifier() else {
                    catalogs.skipped_declarations += 1;
                    continue;
                };
                let value_name = value.display_name().unwrap_or(value_id).to_string();
                values.insert(value_id.to_string(), value_name.clone());
                if catalogs
                    .enum_values
                    .insert(value_id.to_string(), value_name)
                    .is_some()
                {
                    catalogs.duplicate_ids += 1;
                }
            }
        }

        let previous = catalogs.enumerations.insert(
            enum_id.to_string(),
            EnumerationDefinition {
                id: enum_id.to_string(),
                display_name,
                values,
            },
        );
        if previous.is_some() {
            catalogs.duplicate_ids += 1;
        }
    }
}

fn build_spec_object_types(root: &Element, ctx: &NamespaceContext, catalogs: &mut Catalogs) {
    let types = ctx.find_all(root, "SPEC-OBJECT-TYPE");
    catalogs
        .elements_found
        .insert("SPEC-OBJECT-TYPE".into(), types.len());

    for element in types {
        let Some(id) = element.identifier() else {
            catalogs.skipped_declarations += 1;
            continue;
        };
        let display_name = element.display_name().unwrap_or(id).to_string();
        let previous = catalogs.spec_object_types.insert(
            id.to_string(),
            SpecObjectType {
                id: id.to_string(),
                display_name,
            },
        );
        if previous.is_some() {
            catalogs.duplicate_ids += 1;
        }
    }
}
