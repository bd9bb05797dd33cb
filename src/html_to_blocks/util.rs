// DOM helpers shared by the html_to_blocks handlers.

use markup5ever::Attribute;
use markup5ever_rcdom::{Handle, NodeData};

/// Look up an attribute by local name.
fn find_attr<'a>(attrs: &'a [Attribute], name: &str) -> Option<&'a Attribute> {
    attrs.iter().find(|attr| attr.name.local.as_ref() == name)
}

/// Get the value of an attribute on an element node.
pub(crate) fn get_attr(handle: &Handle, name: &str) -> Option<String> {
    if let NodeData::Element { ref attrs, .. } = handle.data {
        return find_attr(&attrs.borrow(), name).map(|attr| attr.value.to_string());
    }
    None
}

/// Get a non-empty attribute value.
pub(crate) fn get_non_empty_attr(handle: &Handle, name: &str) -> Option<String> {
    get_attr(handle, name).filter(|value| !value.is_empty())
}

/// Get the lowercase tag name of an element node.
pub(crate) fn tag_name(handle: &Handle) -> Option<String> {
    if let NodeData::Element { ref name, .. } = handle.data {
        Some(name.local.as_ref().to_ascii_lowercase())
    } else {
        None
    }
}

pub(crate) fn is_element(handle: &Handle, tag: &str) -> bool {
    tag_name(handle).is_some_and(|name| name == tag)
}

/// Whether the element's `class` attribute contains `class`.
pub(crate) fn has_class(handle: &Handle, class: &str) -> bool {
    get_attr(handle, "class").is_some_and(|classes| classes.split_ascii_whitespace().any(|c| c == class))
}

/// Child nodes, cloned out of the `RefCell` so callers can recurse freely.
pub(crate) fn children(handle: &Handle) -> Vec<Handle> {
    handle.children.borrow().clone()
}

/// All descendant elements matching `pred`, in document order.
pub(crate) fn descendants_where(handle: &Handle, pred: &dyn Fn(&Handle) -> bool) -> Vec<Handle> {
    let mut found = Vec::new();
    collect_descendants(handle, pred, &mut found);
    found
}

fn collect_descendants(handle: &Handle, pred: &dyn Fn(&Handle) -> bool, found: &mut Vec<Handle>) {
    for child in handle.children.borrow().iter() {
        if matches!(child.data, NodeData::Element { .. }) && pred(child) {
            found.push(child.clone());
        }
        collect_descendants(child, pred, found);
    }
}

/// First descendant element matching `pred`, in document order.
pub(crate) fn first_descendant_where(
    handle: &Handle,
    pred: &dyn Fn(&Handle) -> bool,
) -> Option<Handle> {
    for child in handle.children.borrow().iter() {
        if matches!(child.data, NodeData::Element { .. }) && pred(child) {
            return Some(child.clone());
        }
        if let Some(found) = first_descendant_where(child, pred) {
            return Some(found);
        }
    }
    None
}
