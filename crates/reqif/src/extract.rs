//! Requirement extraction: one pass over the requirement-bearing elements,
//! resolving type and attribute-definition references through the catalogs.
//!
//! Per-element failures are data, not control flow: each element produces
//! either a record or a counted skip reason, and a bad element never aborts
//! the document.

use serde::Serialize;

use reqsync_core::RequirementRecord;

use crate::catalog::{AttributeKind, Catalogs};
use crate::dom::{flatten_text, Element};
use crate::ns::NamespaceContext;

/// One requirement-bearing element that could not be processed.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedElement {
    pub index: usize,
    pub reason: String,
}

/// Counters accumulated while extracting attribute values.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct ValueCounters {
    pub content_extractions: usize,
    /// Attribute values whose definition reference could not be located at
    /// all (no reference attribute, no nested reference element).
    pub values_without_definition: usize,
}

#[derive(Debug, Default)]
pub struct ExtractionOutput {
    pub records: Vec<RequirementRecord>,
    pub skipped: Vec<SkippedElement>,
    pub spec_objects_processed: usize,
    pub counters: ValueCounters,
}

/// Extract every requirement record reachable from `root`.
pub fn extract(root: &Element, ctx: &NamespaceContext, catalogs: &Catalogs) -> ExtractionOutput {
    let mut output = ExtractionOutput::default();

    for (index, spec_object) in ctx.find_all(root, "SPEC-OBJECT").into_iter().enumerate() {
        output.spec_objects_processed += 1;
        match process_spec_object(spec_object, index, ctx, catalogs, &mut output.counters) {
            Ok(record) => output.records.push(record),
            Err(reason) => output.skipped.push(SkippedElement { index, reason }),
        }
    }

    output
}

fn process_spec_object(
    element: &Element,
    index: usize,
    ctx: &NamespaceContext,
    catalogs: &Catalogs,
    counters: &mut ValueCounters,
) -> Result<RequirementRecord, String> {
    let source_identifier = element.identifier().map(str::to_string);
    let (id, generated_id) = match source_identifier.clone() {
        Some(identifier) => (identifier, false),
        None => (format!("REQ_{index}"), true),
    };

    let mut record = RequirementRecord {
        // `identifier` is kept only when distinct from `id`; the id is
        // derived from the same source attribute, so it only survives when
        // the two diverge.
        identifier: source_identifier.filter(|identifier| identifier != &id),
        id,
        generated_id,
        ..Default::default()
    };

    // Type reference: resolved display name when cataloged, raw reference
    // string otherwise. Never silently dropped.
    if let Some(type_ref) = type_reference(element, ctx) {
        let resolved = catalogs
            .spec_object_type_name(&type_ref)
            .map(str::to_string)
            .unwrap_or(type_ref);
        record.requirement_type = Some(resolved);
    }

    if let Some(values) = ctx.find_child(element, "VALUES") {
        for kind in AttributeKind::ALL {
            for value_element in ctx.find_all(values, &kind.value_tag()) {
                process_attribute_value(value_element, kind, ctx, catalogs, &mut record, counters)?;
            }
        }
    }

    record.content_fingerprint = record.fingerprint();
    Ok(record)
}

/// Reference from the nested type element: tried as a direct attribute
/// first, then as a nested reference element's text.
fn type_reference(element: &Element, ctx: &NamespaceContext) -> Option<String> {
    let type_element = ctx.find_child(element, "TYPE")?;
    if let Some(reference) = type_element
        .attr("SPEC-OBJECT-TYPE-REF")
        .or_else(|| type_element.attr("spec-object-type-ref"))
    {
        if !reference.is_empty() {
            return Some(reference.to_string());
        }
    }
    ctx.find_child(type_element, "SPEC-OBJECT-TYPE-REF")
        .and_then(Element::text_trimmed)
        .map(str::to_string)
}

fn process_attribute_value(
    element: &Element,
    kind: AttributeKind,
    ctx: &NamespaceContext,
    catalogs: &Catalogs,
    record: &mut RequirementRecord,
    counters: &mut ValueCounters,
) -> Result<(), String> {
    let Some(definition_ref) = attribute_definition_ref(element, ctx) else {
        counters.values_without_definition += 1;
        return Ok(());
    };

    let definition = catalogs.attribute_definition(&definition_ref);

    // The cataloged kind wins over the element name: a value element of any
    // spelling whose definition declares an enumeration resolves through
    // the value table.
    let content = match definition.map(|def| def.kind) {
        Some(AttributeKind::Enumeration) => extract_enumeration(element, ctx, catalogs)?,
        _ => extract_by_kind(element, kind, ctx, catalogs)?,
    };

    if content.is_empty() {
        return Ok(());
    }

    // Two views of the same value: stable key and display key, always
    // populated together.
    let display_name = definition
        .map(|def| def.display_name.clone())
        .unwrap_or_else(|| definition_ref.clone());
    record.raw_attributes.insert(definition_ref, content.clone());
    record.attributes.push(display_name, content);
    counters.content_extractions += 1;
    Ok(())
}

/// Owning-definition reference: direct attribute first, then the nested
/// `DEFINITION` element's reference child, over all seven reference kinds.
fn attribute_definition_ref(element: &Element, ctx: &NamespaceContext) -> Option<String> {
    if let Some(reference) = element
        .attr("ATTRIBUTE-DEFINITION-REF")
        .or_else(|| element.attr("attribute-definition-ref"))
    {
        if !reference.is_empty() {
            return Some(reference.to_string());
        }
    }

    let definition = ctx.find_child(element, "DEFINITION")?;
    for kind in AttributeKind::ALL {
        if let Some(reference) = ctx.find_child(definition, &kind.definition_ref_tag()) {
            if let Some(text) = reference.text_trimmed() {
                return Some(text.to_string());
            }
        }
    }
    None
}

fn extract_by_kind(
    element: &Element,
    kind: AttributeKind,
    ctx: &NamespaceContext,
    catalogs: &Catalogs,
) -> Result<String, String> {
    match kind {
        AttributeKind::String => Ok(extract_string(element, ctx)),
        AttributeKind::Xhtml => Ok(extract_xhtml(element, ctx)),
        AttributeKind::Enumeration => extract_enumeration(element, ctx, catalogs),
        AttributeKind::Integer | AttributeKind::Real | AttributeKind::Date => {
            Ok(extract_numeric(element, ctx))
        }
        AttributeKind::Boolean => Ok(extract_boolean(element, ctx)),
    }
}

fn the_value_attr<'a>(element: &'a Element) -> Option<&'a str> {
    element
        .attr("THE-VALUE")
        .or_else(|| element.attr("the-value"))
}

fn extract_string(element: &Element, ctx: &NamespaceContext) -> String {
    if let Some(value) = the_value_attr(element) {
        if !value.is_empty() {
            return value.to_string();
        }
    }
    if let Some(value_element) = ctx.find_child(element, "THE-VALUE") {
        return flatten_text(value_element);
    }
    element.text_trimmed().unwrap_or_default().to_string()
}

fn extract_xhtml(element: &Element, ctx: &NamespaceContext) -> String {
    if let Some(value_element) = ctx.find_child(element, "THE-VALUE") {
        return flatten_text(value_element);
    }

    let all_text = flatten_text(element);
    // Flattened rich text sometimes leads with the internal reference id;
    // drop that token when present.
    if all_text.starts_with('_') {
        if let Some((_, rest)) = all_text.split_once(' ') {
            return rest.to_string();
        }
    }
    all_text
}

fn extract_enumeration(
    element: &Element,
    ctx: &NamespaceContext,
    catalogs: &Catalogs,
) -> Result<String, String> {
    if let Some(values) = ctx.find_child(element, "VALUES") {
        let references = ctx.find_all(values, "ENUM-VALUE-REF");
        if let Some(first) = references.first() {
            // Multiple references: the first one wins.
            let value_id = first
                .text_trimmed()
                .ok_or_else(|| "enumeration reference with empty value id".to_string())?;
            return Ok(catalogs
                .enum_value_name(value_id)
                .unwrap_or(value_id)
                .to_string());
        }
    }
    if let Some(value) = the_value_attr(element) {
        return Ok(catalogs
            .enum_value_name(value)
            .unwrap_or(value)
            .to_string());
    }
    Ok(String::new())
}

fn extract_numeric(element: &Element, ctx: &NamespaceContext) -> String {
    if let Some(value) = the_value_attr(element) {
        return value.to_string();
    }
    ctx.find_child(element, "THE-VALUE")
        .and_then(Element::text_trimmed)
        .unwrap_or_default()
        .to_string()
}

fn extract_boolean(element: &Element, ctx: &NamespaceContext) -> String {
    let value = extract_numeric(element, ctx);
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => "Yes".to_string(),
        "false" | "0" | "no" => "No".to_string(),
        _ => value,
    }
}
