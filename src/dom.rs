//! Small helpers over the `RcDom` tree
//!
//! Traversals here use an explicit stack rather than recursion so that
//! pathologically deep documents cannot exhaust the thread stack.

use html5ever::serialize::{SerializeOpts, TraversalScope, serialize};
use markup5ever_rcdom::{Handle, NodeData, SerializableHandle};
use tracing::debug;

/// Local tag name of an element node
pub fn element_name(node: &Handle) -> Option<&str> {
    match node.data {
        NodeData::Element { ref name, .. } => Some(name.local.as_ref()),
        _ => None,
    }
}

/// Check whether a node is an element with the given local name
pub fn is_element(node: &Handle, tag: &str) -> bool {
    element_name(node) == Some(tag)
}

/// Read an attribute value from an element node
pub fn get_attr(node: &Handle, name: &str) -> Option<String> {
    match node.data {
        NodeData::Element { ref attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|attr| attr.name.local.as_ref() == name)
            .map(|attr| attr.value.to_string()),
        _ => None,
    }
}

/// All element nodes below `root` in document order, `root` excluded
pub fn descendant_elements(root: &Handle) -> Vec<Handle> {
    let mut found = Vec::new();
    let mut stack: Vec<Handle> = root.children.borrow().iter().rev().cloned().collect();

    while let Some(node) = stack.pop() {
        if let NodeData::Element { .. } = node.data {
            found.push(node.clone());
        }
        stack.extend(node.children.borrow().iter().rev().cloned());
    }

    found
}

/// First element with the given tag in document order
pub fn find_first(root: &Handle, tag: &str) -> Option<Handle> {
    let mut stack = vec![root.clone()];

    while let Some(node) = stack.pop() {
        if is_element(&node, tag) {
            return Some(node);
        }
        stack.extend(node.children.borrow().iter().rev().cloned());
    }

    None
}

/// Every element with the given tag in document order
pub fn find_all(root: &Handle, tag: &str) -> Vec<Handle> {
    descendant_elements(root)
        .into_iter()
        .filter(|node| is_element(node, tag))
        .collect()
}

/// Concatenated text of every text node below `node`
pub fn text_content(node: &Handle) -> String {
    let mut output = String::new();
    let mut stack = vec![node.clone()];

    while let Some(current) = stack.pop() {
        if let NodeData::Text { ref contents } = current.data {
            output.push_str(&contents.borrow());
        }
        stack.extend(current.children.borrow().iter().rev().cloned());
    }

    output
}

/// Serialize the children of `node` back to HTML (the node's inner HTML)
pub fn inner_html(node: &Handle) -> String {
    let mut bytes = Vec::new();
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::ChildrenOnly(None),
        ..Default::default()
    };

    if let Err(err) = serialize(&mut bytes, &SerializableHandle::from(node.clone()), opts) {
        debug!(error = %err, "serialization failed");
        return String::new();
    }

    String::from_utf8(bytes).unwrap_or_else(|err| String::from_utf8_lossy(err.as_bytes()).into_owned())
}
