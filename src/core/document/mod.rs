//! Owned element tree for job-definition documents.
//!
//! A document is a single root [`Element`] that exclusively owns its children.
//! Rewrite steps receive `&mut Element` and mutate in place; `Clone` is a deep
//! copy and is how the pipeline isolates its working copy from the caller.

use indexmap::IndexMap;
use std::path::PathBuf;

pub mod xml;

/// Tag names used by job-definition documents.
pub mod tags {
    pub const DEFTABLE: &str = "DEFTABLE";
    pub const FOLDER: &str = "FOLDER";
    pub const JOB: &str = "JOB";
    pub const QUANTITATIVE: &str = "QUANTITATIVE";
    pub const ON: &str = "ON";
    pub const DOACTION: &str = "DOACTION";
    pub const DOMAIL: &str = "DOMAIL";
    pub const DOSHOUT: &str = "DOSHOUT";
    pub const DOREMEDY: &str = "DOREMEDY";
    pub const SHOUT: &str = "SHOUT";
    pub const VARIABLE: &str = "VARIABLE";
    pub const OUTCOND: &str = "OUTCOND";
    pub const INCOND: &str = "INCOND";
}

/// Attribute names read or written by the rewrite steps.
pub mod attrs {
    pub const FOLDER_NAME: &str = "FOLDER_NAME";
    pub const FOLDER_ORDER_METHOD: &str = "FOLDER_ORDER_METHOD";
    pub const APPLICATION: &str = "APPLICATION";
    pub const SUB_APPLICATION: &str = "SUB_APPLICATION";
    pub const PARENT_FOLDER: &str = "PARENT_FOLDER";
    pub const JOBNAME: &str = "JOBNAME";
    pub const DATACENTER: &str = "DATACENTER";
    pub const RUN_AS: &str = "RUN_AS";
    pub const NODEID: &str = "NODEID";
    pub const NAME: &str = "NAME";
    pub const VALUE: &str = "VALUE";
    pub const QUANT: &str = "QUANT";
    pub const ONFAIL: &str = "ONFAIL";
    pub const ONOK: &str = "ONOK";
}

/// Errors raised while reading or writing a document.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("invalid attribute: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),
    #[error("document is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("serialized document is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
    #[error("document has no root element")]
    NoRoot,
    #[error("document has more than one root element (second root: <{tag}>)")]
    MultipleRoots { tag: String },
    #[error("text content found outside the root element")]
    TextOutsideRoot,
    #[error("element <{tag}> is never closed")]
    Unclosed { tag: String },
    #[error("closing tag </{tag}> has no matching start tag")]
    UnexpectedEnd { tag: String },
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write document: {0}")]
    Write(#[from] std::io::Error),
}

/// One node of the document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: String,
    attributes: IndexMap<String, String>,
    children: Vec<Element>,
    text: Option<String>,
}

impl Element {
    pub fn new<T: Into<String>>(tag: T) -> Self {
        Element {
            tag: tag.into(),
            attributes: IndexMap::new(),
            children: Vec::new(),
            text: None,
        }
    }

    /// Builder form of [`Element::set_attr`].
    pub fn with_attr<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn is(&self, tag: &str) -> bool {
        self.tag == tag
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn attributes(&self) -> &IndexMap<String, String> {
        &self.attributes
    }

    /// Sets an attribute, keeping its original position when it already exists.
    /// Returns `true` when the stored value changed.
    pub fn set_attr<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) -> bool {
        let value = value.into();
        match self.attributes.entry(key.into()) {
            indexmap::map::Entry::Occupied(mut entry) => {
                if entry.get() == &value {
                    false
                } else {
                    entry.insert(value);
                    true
                }
            }
            indexmap::map::Entry::Vacant(entry) => {
                entry.insert(value);
                true
            }
        }
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub(crate) fn append_text(&mut self, text: &str) {
        match &mut self.text {
            Some(existing) => existing.push_str(text),
            None => self.text = Some(text.to_string()),
        }
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<Element> {
        &mut self.children
    }

    pub fn push_child(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Inserts at `index`, clamped to the end of the child list.
    pub fn insert_child(&mut self, index: usize, child: Element) {
        let index = index.min(self.children.len());
        self.children.insert(index, child);
    }

    /// Keeps only the children for which `keep` returns `true`; returns how many were removed.
    pub fn retain_children<F>(&mut self, keep: F) -> usize
    where
        F: FnMut(&Element) -> bool,
    {
        let before = self.children.len();
        self.children.retain(keep);
        before - self.children.len()
    }

    /// Direct children carrying `tag`.
    pub fn child_elements<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |child| child.is(tag))
    }

    pub fn child_elements_mut<'a>(
        &'a mut self,
        tag: &'a str,
    ) -> impl Iterator<Item = &'a mut Element> + 'a {
        self.children.iter_mut().filter(move |child| child.is(tag))
    }

    /// Index of the first direct child whose tag is one of `tags`.
    pub fn position_of_first(&self, tags: &[&str]) -> Option<usize> {
        self.children
            .iter()
            .position(|child| tags.contains(&child.tag()))
    }

    /// Pre-order walk over this element and every descendant.
    ///
    /// The callback runs on a node before its children are visited, so children
    /// inserted by the callback are visited as well.
    pub fn visit_mut<F>(&mut self, visit: &mut F)
    where
        F: FnMut(&mut Element),
    {
        visit(self);
        for child in &mut self.children {
            child.visit_mut(visit);
        }
    }

    /// All descendants (not including `self`) carrying `tag`, in document order.
    pub fn descendants<'a>(&'a self, tag: &str) -> Vec<&'a Element> {
        let mut found = Vec::new();
        for child in &self.children {
            child.collect_matching(tag, &mut found);
        }
        found
    }

    fn collect_matching<'a>(&'a self, tag: &str, found: &mut Vec<&'a Element>) {
        if self.is(tag) {
            found.push(self);
        }
        for child in &self.children {
            child.collect_matching(tag, found);
        }
    }

    /// First descendant with `tag` whose attribute `key` equals `value`.
    pub fn find<'a>(&'a self, tag: &str, key: &str, value: &str) -> Option<&'a Element> {
        self.descendants(tag)
            .into_iter()
            .find(|element| element.attr(key) == Some(value))
    }
}
