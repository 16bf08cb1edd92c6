//! Namespace context and the ordered element-lookup ladder.
//!
//! Real-world interchange documents frequently misdeclare or omit their
//! namespace, and a strict namespaced query would silently drop
//! requirements. Lookups therefore try a fixed sequence of strategies and
//! stop at the first that produces results. The order is a contract, not an
//! accident: downstream behavior (which reference wins) depends on it.

use crate::dom::Element;

/// Lookup strategies in their contractual try order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupStrategy {
    /// Namespace URI and local name both match the context.
    NamespaceExact,
    /// Local name matches exactly, whatever namespace the element landed in.
    LocalExact,
    /// Local name contains the query as a substring. Last resort for
    /// malformed or vendor-mangled tag names.
    LocalContains,
}

pub const STRATEGY_ORDER: [LookupStrategy; 3] = [
    LookupStrategy::NamespaceExact,
    LookupStrategy::LocalExact,
    LookupStrategy::LocalContains,
];

/// Namespace situation of one document, derived from its root element.
#[derive(Debug, Clone, Default)]
pub struct NamespaceContext {
    pub uri: Option<String>,
}

impl NamespaceContext {
    pub fn from_root(root: &Element) -> Self {
        Self {
            uri: root.ns.clone(),
        }
    }

    fn matches(&self, strategy: LookupStrategy, element: &Element, name: &str) -> Option<bool> {
        match strategy {
            LookupStrategy::NamespaceExact => {
                // Without a declared namespace this tier does not apply.
                let uri = self.uri.as_deref()?;
                Some(element.ns.as_deref() == Some(uri) && element.local == name)
            }
            LookupStrategy::LocalExact => Some(element.local == name),
            LookupStrategy::LocalContains => Some(element.local.contains(name)),
        }
    }

    /// All descendants of `parent` matching `name`, in document order.
    /// Strategies are tried in [`STRATEGY_ORDER`]; the first non-empty
    /// result wins.
    pub fn find_all<'a>(&self, parent: &'a Element, name: &str) -> Vec<&'a Element> {
        for strategy in STRATEGY_ORDER {
            let found: Vec<&Element> = parent
                .descendants()
                .filter(|el| self.matches(strategy, el, name) == Some(true))
                .collect();
            if !found.is_empty() {
                return found;
            }
        }
        Vec::new()
    }

    /// First matching element under `parent`: direct children first through
    /// the whole strategy ladder, then descendants.
    pub fn find_child<'a>(&self, parent: &'a Element, name: &str) -> Option<&'a Element> {
        for strategy in STRATEGY_ORDER {
            if let Some(child) = parent
                .children
                .iter()
                .find(|el| self.matches(strategy, el, name) == Some(true))
            {
                return Some(child);
            }
        }
        for strategy in STRATEGY_ORDER {
            if let Some(found) = parent
                .descendants()
                .find(|el| self.matches(strategy, el, name) == Some(true))
            {
                return Some(found);
            }
        }
        None
    }
}
