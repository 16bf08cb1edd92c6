//! Owned XML tree built from a single `quick-xml` event pass.
//!
//! The interchange format needs random-access navigation (type references
//! point across the document, attribute values nest definition references),
//! so the streaming events are materialized into a small element tree first.
//! Text placement follows the text/tail model: `text` is the content before
//! the first child, `tail` is the content between an element's end tag and
//! its next sibling — flattening depends on that order.

use quick_xml::events::Event;
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;

use crate::error::ReqifError;

#[derive(Debug, Clone, Default)]
pub struct Element {
    /// Namespace URI the tag resolved to, if any.
    pub ns: Option<String>,
    /// Local tag name without prefix.
    pub local: String,
    /// Attributes as written in the source, in document order.
    pub attrs: Vec<(String, String)>,
    /// Text before the first child.
    pub text: Option<String>,
    pub children: Vec<Element>,
    /// Text between this element's end tag and the next sibling.
    pub tail: Option<String>,
}

impl Element {
    /// Exact attribute lookup, falling back to matching the part after a
    /// namespace prefix (`reqif:IDENTIFIER` matches `IDENTIFIER`).
    pub fn attr(&self, name: &str) -> Option<&str> {
        for (key, value) in &self.attrs {
            if key == name {
                return Some(value);
            }
        }
        for (key, value) in &self.attrs {
            if key.rsplit(':').next() == Some(name) {
                return Some(value);
            }
        }
        None
    }

    pub fn text_trimmed(&self) -> Option<&str> {
        let text = self.text.as_deref()?.trim();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// All descendants in document order, excluding `self`.
    pub fn descendants(&self) -> Descendants<'_> {
        let mut stack: Vec<&Element> = self.children.iter().collect();
        stack.reverse();
        Descendants { stack }
    }

    /// Identifier attribute, tried over the case variants seen in the wild.
    /// The try order is a contract: the first present value wins.
    pub fn identifier(&self) -> Option<&str> {
        ["IDENTIFIER", "identifier", "ID", "id"]
            .iter()
            .find_map(|name| self.attr(name))
            .filter(|value| !value.is_empty())
    }

    /// Human-readable name attribute, same ladder as [`Self::identifier`].
    pub fn display_name(&self) -> Option<&str> {
        ["LONG-NAME", "long-name", "NAME", "name"]
            .iter()
            .find_map(|name| self.attr(name))
            .filter(|value| !value.is_empty())
    }
}

pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<&'a Element> {
        let next = self.stack.pop()?;
        for child in next.children.iter().rev() {
            self.stack.push(child);
        }
        Some(next)
    }
}

// ---------------------------------------------------------------------------
// Tree building
// ---------------------------------------------------------------------------

/// Parse a whole document into an element tree.
pub fn parse_tree(xml: &str) -> Result<Element, ReqifError> {
    let mut reader = NsReader::from_str(xml);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_resolved_event() {
            Ok((ns, Event::Start(e))) => {
                let elem = element_from_event(resolve_ns(ns), e.local_name().as_ref(), &e);
                stack.push(elem);
            }
            Ok((ns, Event::Empty(e))) => {
                let elem = element_from_event(resolve_ns(ns), e.local_name().as_ref(), &e);
                attach(&mut stack, &mut root, elem);
            }
            Ok((_, Event::End(_))) => {
                let elem = stack
                    .pop()
                    .ok_or_else(|| ReqifError::ParseFailure("unbalanced end tag".into()))?;
                attach(&mut stack, &mut root, elem);
            }
            Ok((_, Event::Text(t))) => {
                let text = t
                    .decode()
                    .map(|cow| cow.into_owned())
                    .unwrap_or_else(|_| String::from_utf8_lossy(t.as_ref()).into_owned());
                append_text(&mut stack, &text);
            }
            Ok((_, Event::CData(t))) => {
                let text = String::from_utf8_lossy(t.as_ref()).into_owned();
                append_text(&mut stack, &text);
            }
            Ok((_, Event::GeneralRef(r))) => {
                // Entity references arrive as their own events; resolve the
                // common ones inline, keep unknown ones literal.
                if let Ok(name) = r.decode() {
                    let resolved =
                        resolve_entity(&name).unwrap_or_else(|| format!("&{name};"));
                    append_text(&mut stack, &resolved);
                }
            }
            Ok((_, Event::Eof)) => break,
            Ok(_) => {}
            Err(err) => return Err(ReqifError::ParseFailure(err.to_string())),
        }
    }

    if !stack.is_empty() {
        return Err(ReqifError::ParseFailure("unexpected end of document".into()));
    }
    root.ok_or_else(|| ReqifError::ParseFailure("empty document".into()))
}

fn resolve_ns(result: ResolveResult<'_>) -> Option<String> {
    match result {
        ResolveResult::Bound(ns) => Some(String::from_utf8_lossy(ns.0).into_owned()),
        _ => None,
    }
}

fn element_from_event(
    ns: Option<String>,
    local: &[u8],
    e: &quick_xml::events::BytesStart<'_>,
) -> Element {
    let mut attrs = Vec::new();
    for attr in e.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map(|cow| cow.into_owned())
            .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned());
        attrs.push((key, value));
    }
    Element {
        ns,
        local: String::from_utf8_lossy(local).into_owned(),
        attrs,
        ..Default::default()
    }
}

/// Pop-side attachment: a finished element becomes a child of the open
/// element below it, or the document root.
fn attach(stack: &mut Vec<Element>, root: &mut Option<Element>, elem: Element) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(elem);
    } else if root.is_none() {
        *root = Some(elem);
    }
}

/// Text goes to the open element's `text` before its first child, to the
/// last child's `tail` after.
fn append_text(stack: &mut Vec<Element>, text: &str) {
    let Some(top) = stack.last_mut() else {
        return;
    };
    let slot = match top.children.last_mut() {
        Some(last) => last.tail.get_or_insert_with(String::new),
        None => top.text.get_or_insert_with(String::new),
    };
    slot.push_str(text);
}

// ---------------------------------------------------------------------------
// Text flattening
// ---------------------------------------------------------------------------

enum Visit<'a> {
    Enter(&'a Element),
    Tail(&'a Element),
}

/// Full recursive text of an element: text, then each child's subtree
/// followed by that child's tail, in order. Fragments are trimmed and
/// joined with single spaces, whitespace runs collapsed, entities decoded.
///
/// The walk is an explicit stack so deeply nested rich-text content cannot
/// exhaust the call stack.
pub fn flatten_text(element: &Element) -> String {
    let mut fragments: Vec<&str> = Vec::new();
    let mut work = vec![Visit::Enter(element)];

    while let Some(visit) = work.pop() {
        match visit {
            Visit::Enter(el) => {
                if let Some(text) = el.text.as_deref() {
                    let text = text.trim();
                    if !text.is_empty() {
                        fragments.push(text);
                    }
                }
                for child in el.children.iter().rev() {
                    work.push(Visit::Tail(child));
                    work.push(Visit::Enter(child));
                }
            }
            Visit::Tail(el) => {
                if let Some(tail) = el.tail.as_deref() {
                    let tail = tail.trim();
                    if !tail.is_empty() {
                        fragments.push(tail);
                    }
                }
            }
        }
    }

    let joined = fragments.join(" ");
    let collapsed = joined.split_whitespace().collect::<Vec<_>>().join(" ");
    decode_entities(&collapsed)
}

/// Resolve one entity name (without `&`/`;`): the predefined XML five,
/// `nbsp`, and numeric character references.
fn resolve_entity(name: &str) -> Option<String> {
    if let Some(num) = name.strip_prefix('#') {
        let code = if let Some(hex) = num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
            u32::from_str_radix(hex, 16).ok()?
        } else {
            num.parse::<u32>().ok()?
        };
        return char::from_u32(code).map(|c| c.to_string());
    }
    let text = match name {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => "\u{a0}",
        _ => return None,
    };
    Some(text.to_string())
}

/// Decode remaining `&name;` / `&#NNN;` sequences in assembled text.
/// Unknown entities stay literal.
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        match after.find(';') {
            // Entity names are short; a distant semicolon means a bare '&'.
            Some(semi) if semi > 0 && semi <= 10 => {
                let name = &after[..semi];
                match resolve_entity(name) {
                    Some(decoded) => out.push_str(&decoded),
                    None => {
                        out.push('&');
                        out.push_str(name);
                        out.push(';');
                    }
                }
                rest = &after[semi + 1..];
            }
            _ => {
                out.push('&');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
