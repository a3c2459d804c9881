//! DOM Module for the Cart Core
//!
//! Storefront pages are parsed once with html5ever into an `RcDom`. Every
//! lookup the cart performs (nearest ancestor, first matching descendant,
//! text content) walks that tree directly, and the few mutations the cart
//! makes (counter text, floating control) are applied in place so the page
//! can be serialized back out.
//!
//! Selectors are deliberately small: a comma separated list of compound
//! selectors built from a tag name, `#id`, `.class` and `[attr]` presence.

use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use html5ever::serialize::{serialize, SerializeOpts};
use html5ever::tendril::TendrilSink;
use html5ever::{parse_document, Attribute, LocalName, Namespace, QualName};
use lazy_static::lazy_static;
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom, SerializableHandle};
use regex::Regex;
use tendril::StrTendril;

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

lazy_static! {
    /// One token of a compound selector: tag, #id, .class or [attr]
    static ref SELECTOR_TOKEN_RE: Regex =
        Regex::new(r"([a-zA-Z][\w-]*)|#([\w-]+)|\.([\w-]+)|\[([\w-]+)\]").unwrap();
}

// ═══════════════════════════════════════════════════════════════════════════════
// SELECTORS
// ═══════════════════════════════════════════════════════════════════════════════

/// A compound selector such as `tr[data-price]` or `.product-card[data-price]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompoundSelector {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attributes: Vec<String>,
}

impl CompoundSelector {
    fn parse(source: &str) -> Option<Self> {
        let mut compound = CompoundSelector::default();
        for cap in SELECTOR_TOKEN_RE.captures_iter(source) {
            if let Some(tag) = cap.get(1) {
                compound.tag = Some(tag.as_str().to_ascii_lowercase());
            } else if let Some(id) = cap.get(2) {
                compound.id = Some(id.as_str().to_string());
            } else if let Some(class) = cap.get(3) {
                compound.classes.push(class.as_str().to_string());
            } else if let Some(attr) = cap.get(4) {
                compound.attributes.push(attr.as_str().to_ascii_lowercase());
            }
        }

        let is_empty = compound.tag.is_none()
            && compound.id.is_none()
            && compound.classes.is_empty()
            && compound.attributes.is_empty();
        (!is_empty).then_some(compound)
    }

    fn matches(&self, handle: &Handle) -> bool {
        let NodeData::Element { name, attrs, .. } = &handle.data else {
            return false;
        };

        if let Some(tag) = &self.tag {
            let local: &str = &name.local;
            if !local.eq_ignore_ascii_case(tag) {
                return false;
            }
        }

        let attrs = attrs.borrow();
        let value_of = |wanted: &str| {
            attrs
                .iter()
                .find(|attr| &*attr.name.local == wanted)
                .map(|attr| attr.value.to_string())
        };

        if let Some(id) = &self.id {
            if value_of("id").as_deref() != Some(id.as_str()) {
                return false;
            }
        }

        if !self.classes.is_empty() {
            let class_attr = value_of("class").unwrap_or_default();
            let present: Vec<&str> = class_attr.split_whitespace().collect();
            if !self.classes.iter().all(|c| present.contains(&c.as_str())) {
                return false;
            }
        }

        self.attributes.iter().all(|attr| value_of(attr).is_some())
    }
}

/// A selector list: matches when any of its compound selectors matches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    alternatives: Vec<CompoundSelector>,
}

impl Selector {
    /// Parse `"#cart-count, .cart-count"`-style selector lists.
    /// Unrecognized characters are skipped; an empty list matches nothing.
    pub fn parse(source: &str) -> Self {
        let alternatives = source
            .split(',')
            .filter_map(|part| CompoundSelector::parse(part.trim()))
            .collect();
        Self { alternatives }
    }

    /// Selector matching elements that carry the given class
    pub fn class(class: &str) -> Self {
        Self {
            alternatives: vec![CompoundSelector {
                classes: vec![class.to_string()],
                ..Default::default()
            }],
        }
    }

    pub fn matches(&self, handle: &Handle) -> bool {
        self.alternatives.iter().any(|alt| alt.matches(handle))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// NODE ACCESS
// ═══════════════════════════════════════════════════════════════════════════════

pub fn is_element(handle: &Handle) -> bool {
    matches!(handle.data, NodeData::Element { .. })
}

/// Attribute value, if the node is an element carrying it
pub fn attr(handle: &Handle, name: &str) -> Option<String> {
    match &handle.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|attr| &*attr.name.local == name)
            .map(|attr| attr.value.to_string()),
        _ => None,
    }
}

pub fn has_class(handle: &Handle, class: &str) -> bool {
    attr(handle, "class")
        .map(|value| value.split_whitespace().any(|c| c == class))
        .unwrap_or(false)
}

pub fn parent(handle: &Handle) -> Option<Handle> {
    let weak = handle.parent.take();
    let parent = weak.as_ref().and_then(|w| w.upgrade());
    handle.parent.set(weak);
    parent
}

/// Nearest inclusive ancestor element matching `selector`
pub fn closest(handle: &Handle, selector: &Selector) -> Option<Handle> {
    let mut current = Some(handle.clone());
    while let Some(node) = current {
        if is_element(&node) && selector.matches(&node) {
            return Some(node);
        }
        current = parent(&node);
    }
    None
}

/// First descendant of `root` (excluding `root`) matching `selector`, in document order
pub fn query_selector(root: &Handle, selector: &Selector) -> Option<Handle> {
    for child in root.children.borrow().iter() {
        if is_element(child) && selector.matches(child) {
            return Some(child.clone());
        }
        if let Some(found) = query_selector(child, selector) {
            return Some(found);
        }
    }
    None
}

/// All descendants of `root` matching `selector`, in document order
pub fn query_selector_all(root: &Handle, selector: &Selector) -> Vec<Handle> {
    let mut found = Vec::new();
    collect_matches(root, selector, &mut found);
    found
}

fn collect_matches(root: &Handle, selector: &Selector, found: &mut Vec<Handle>) {
    for child in root.children.borrow().iter() {
        if is_element(child) && selector.matches(child) {
            found.push(child.clone());
        }
        collect_matches(child, selector, found);
    }
}

/// Concatenated text of every descendant text node
pub fn text_content(handle: &Handle) -> String {
    let mut out = String::new();
    collect_text(handle, &mut out);
    out
}

fn collect_text(handle: &Handle, out: &mut String) {
    if let NodeData::Text { contents } = &handle.data {
        out.push_str(&contents.borrow());
    }
    for child in handle.children.borrow().iter() {
        collect_text(child, out);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// MUTATION
// ═══════════════════════════════════════════════════════════════════════════════

pub fn create_element(tag: &str, attributes: &[(&str, &str)]) -> Handle {
    let attrs = attributes
        .iter()
        .map(|(name, value)| Attribute {
            name: QualName::new(None, Namespace::from(""), LocalName::from(*name)),
            value: StrTendril::from_slice(value),
        })
        .collect();

    Node::new(NodeData::Element {
        name: QualName::new(None, Namespace::from(HTML_NAMESPACE), LocalName::from(tag)),
        attrs: RefCell::new(attrs),
        template_contents: RefCell::new(None),
        mathml_annotation_xml_integration_point: false,
    })
}

pub fn create_text(text: &str) -> Handle {
    Node::new(NodeData::Text {
        contents: RefCell::new(StrTendril::from_slice(text)),
    })
}

/// Detach a node from its parent. No-op for detached nodes.
pub fn remove(handle: &Handle) {
    let Some(parent) = parent(handle) else {
        return;
    };
    parent
        .children
        .borrow_mut()
        .retain(|child| !Rc::ptr_eq(child, handle));
    handle.parent.set(None);
}

pub fn append_child(parent: &Handle, child: Handle) {
    remove(&child);
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(child);
}

/// Replace every child of `handle` with a single text node
pub fn set_text_content(handle: &Handle, text: &str) {
    let old_children: Vec<Handle> = handle.children.borrow_mut().drain(..).collect();
    for child in &old_children {
        child.parent.set(None);
    }
    append_child(handle, create_text(text));
}

// ═══════════════════════════════════════════════════════════════════════════════
// PAGE
// ═══════════════════════════════════════════════════════════════════════════════

/// A parsed storefront page
pub struct Page {
    dom: RcDom,
}

impl Page {
    pub fn parse(html: &str) -> Self {
        let dom = parse_document(RcDom::default(), Default::default()).one(html);
        Self { dom }
    }

    pub fn document(&self) -> Handle {
        self.dom.document.clone()
    }

    pub fn body(&self) -> Option<Handle> {
        query_selector(&self.dom.document, &Selector::parse("body"))
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<Handle> {
        let selector = Selector {
            alternatives: vec![CompoundSelector {
                id: Some(id.to_string()),
                ..Default::default()
            }],
        };
        query_selector(&self.dom.document, &selector)
    }

    pub fn query_selector(&self, selector: &Selector) -> Option<Handle> {
        query_selector(&self.dom.document, selector)
    }

    pub fn query_selector_all(&self, selector: &Selector) -> Vec<Handle> {
        query_selector_all(&self.dom.document, selector)
    }

    /// Serialize the (possibly mutated) page back to HTML
    pub fn to_html(&self) -> io::Result<String> {
        let document: SerializableHandle = self.dom.document.clone().into();
        let mut bytes = Vec::new();
        serialize(&mut bytes, &document, SerializeOpts::default())?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════
