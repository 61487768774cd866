//! Namespace-agnostic node helpers.
//!
//! Tableau files are usually namespace-free, but exported variants may
//! carry a default namespace; comparisons always use the local name.

use roxmltree::Node;

/// Local element name (namespace stripped).
pub(crate) fn element_name<'a>(node: Node<'a, '_>) -> &'a str {
    node.tag_name().name()
}

/// First descendant element with the given local name, excluding `node`
/// itself.
pub(crate) fn first_descendant<'a, 'input>(
    node: Node<'a, 'input>,
    name: &str,
) -> Option<Node<'a, 'input>> {
    node.descendants()
        .filter(|n| n.is_element() && n.id() != node.id())
        .find(|n| element_name(*n) == name)
}

/// Whether any descendant element has the given local name.
pub(crate) fn has_descendant(node: Node<'_, '_>, name: &str) -> bool {
    first_descendant(node, name).is_some()
}

/// Strip one layer of surrounding brackets from a field reference.
pub(crate) fn strip_brackets(field: &str) -> &str {
    field
        .trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_name_ignores_namespaces() {
        let doc =
            roxmltree::Document::parse(r#"<a xmlns="urn:example"><b/></a>"#).unwrap();
        let b = doc.root_element().first_element_child().unwrap();
        assert_eq!(element_name(b), "b");
    }

    #[test]
    fn first_descendant_skips_self() {
        let doc = roxmltree::Document::parse("<x><y><x/></y></x>").unwrap();
        let outer = doc.root_element();
        let inner = first_descendant(outer, "x").unwrap();
        assert_ne!(inner.id(), outer.id());
    }

    #[test]
    fn strip_brackets_handles_plain_and_bracketed() {
        assert_eq!(strip_brackets("[Sales]"), "Sales");
        assert_eq!(strip_brackets("Sales"), "Sales");
        assert_eq!(strip_brackets(" [Profit Ratio] "), "Profit Ratio");
    }
}
