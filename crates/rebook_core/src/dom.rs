//! Thin adapter over the kuchikiki HTML tree.
//!
//! Markup written with [`Document::set_inner_html`] or
//! [`Document::append_html`] is spliced into the serialized output verbatim
//! instead of going through the tree builder, so highlighter output whose
//! spans straddle line breaks is kept byte for byte.

use kuchikiki::traits::*;
use kuchikiki::{ElementData, NodeDataRef, NodeRef};

use crate::error::PageError;

const RAW_OPEN: char = '\u{E000}';
const RAW_CLOSE: char = '\u{E001}';

pub struct Document {
    root: NodeRef,
    raw: Vec<String>,
}

impl Document {
    pub fn parse(html: &str) -> Self {
        Self {
            root: kuchikiki::parse_html().one(html),
            raw: Vec::new(),
        }
    }

    /// Collects all matches up front so callers may mutate while iterating.
    pub fn select(&self, selector: &str) -> Result<Vec<NodeDataRef<ElementData>>, PageError> {
        select_all(&self.root, selector)
    }

    pub fn set_inner_html(&mut self, node: &NodeRef, html: &str) {
        for child in node.children().collect::<Vec<_>>() {
            child.detach();
        }
        node.append(self.raw_marker(html));
    }

    pub fn append_html(&mut self, node: &NodeRef, html: &str) {
        node.append(self.raw_marker(html));
    }

    pub fn serialize(&self) -> String {
        let mut out = self.root.to_string();
        for (idx, html) in self.raw.iter().enumerate() {
            out = out.replacen(&marker_text(idx), html, 1);
        }
        out
    }

    fn raw_marker(&mut self, html: &str) -> NodeRef {
        let idx = self.raw.len();
        self.raw.push(html.to_string());
        NodeRef::new_text(marker_text(idx))
    }
}

fn marker_text(idx: usize) -> String {
    format!("{RAW_OPEN}rebook:{idx}{RAW_CLOSE}")
}

pub fn select_all(
    node: &NodeRef,
    selector: &str,
) -> Result<Vec<NodeDataRef<ElementData>>, PageError> {
    let matches = node.select(selector).map_err(|()| PageError::InvalidSelector {
        selector: selector.to_string(),
    })?;
    Ok(matches.collect())
}

pub fn inner_html(node: &NodeRef) -> String {
    node.children().map(|child| child.to_string()).collect()
}

pub fn set_text(node: &NodeRef, text: &str) {
    for child in node.children().collect::<Vec<_>>() {
        child.detach();
    }
    node.append(NodeRef::new_text(text));
}

pub fn get_attr(element: &ElementData, name: &str) -> Option<String> {
    element.attributes.borrow().get(name).map(str::to_string)
}

pub fn set_attr(element: &ElementData, name: &str, value: &str) {
    element
        .attributes
        .borrow_mut()
        .insert(name, value.to_string());
}

pub fn class_tokens(element: &ElementData) -> Vec<String> {
    element
        .attributes
        .borrow()
        .get("class")
        .map(|value| value.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

pub fn has_class(element: &ElementData, class: &str) -> bool {
    class_tokens(element).iter().any(|token| token == class)
}

pub fn add_class(element: &ElementData, class: &str) {
    let mut tokens = class_tokens(element);
    if tokens.iter().any(|token| token == class) {
        return;
    }
    tokens.push(class.to_string());
    write_classes(element, &tokens);
}

pub fn remove_class(element: &ElementData, class: &str) {
    let mut tokens = class_tokens(element);
    let before = tokens.len();
    tokens.retain(|token| token != class);
    if tokens.len() != before {
        write_classes(element, &tokens);
    }
}

/// Returns whether the class is present afterwards.
pub fn toggle_class(element: &ElementData, class: &str) -> bool {
    if has_class(element, class) {
        remove_class(element, class);
        false
    } else {
        add_class(element, class);
        true
    }
}

fn write_classes(element: &ElementData, tokens: &[String]) {
    let mut attrs = element.attributes.borrow_mut();
    if tokens.is_empty() {
        attrs.remove("class");
    } else {
        attrs.insert("class", tokens.join(" "));
    }
}

pub fn is_element_named(node: &NodeRef, name: &str) -> bool {
    node.as_element()
        .map(|element| &*element.name.local == name)
        .unwrap_or(false)
}

pub fn previous_element_sibling(node: &NodeRef) -> Option<NodeRef> {
    node.preceding_siblings()
        .find(|sibling| sibling.as_element().is_some())
}
