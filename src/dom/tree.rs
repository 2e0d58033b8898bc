//! Mutable document tree
//!
//! Nodes live in an arena owned by [`Document`] and are addressed by
//! [`NodeId`]. Removing a node only unlinks it from its parent; the slot stays
//! allocated so ids held elsewhere never dangle. A `NodeId` is only meaningful
//! for the document that created it; use [`Document::get`] to check an id of
//! unknown origin.
//!
//! Slots are never reclaimed. Splitting text and creating markers add slots,
//! so a document that sees many highlight/unhighlight cycles keeps growing.
//! Re-parse its markup to get a compact copy.

use super::error::DomError;

/// Handle to a node inside a [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Arena slot of this node
    pub fn index(self) -> usize {
        self.0
    }
}

/// What a node is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The document itself (always slot 0)
    Document,
    /// An element with its tag name and attributes
    Element(ElementData),
    /// A run of character data
    Text(String),
    /// A comment; contributes nothing to text content
    Comment(String),
}

/// Tag name and attributes of an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    pub name: String,
    pub attributes: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An owned, mutable document tree
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    /// Create an empty document containing only the root node
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// The document node
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// The first element child of the document (usually `<html>`)
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(self.root())
            .iter()
            .copied()
            .find(|&id| self.is_element(id))
    }

    /// The first `<body>` element in tree order
    pub fn body(&self) -> Option<NodeId> {
        self.elements_by_name("body").into_iter().next()
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Create a detached element
    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.push(NodeKind::Element(ElementData {
            name: name.to_string(),
            attributes: Vec::new(),
        }))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    /// Create a detached comment node
    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Comment(text.to_string()))
    }

    /// Checked lookup; `None` for ids this document never created
    pub fn get(&self, id: NodeId) -> Option<&NodeKind> {
        self.nodes.get(id.0).map(|node| &node.kind)
    }

    /// Allocated slots, attached or not
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.kind(id), NodeKind::Element(_))
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.kind(id), NodeKind::Text(_))
    }

    /// Tag name for elements, `None` otherwise
    pub fn element_name(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Element(data) => Some(data.name.as_str()),
            _ => None,
        }
    }

    /// Character data of a text node
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Element(data) => data
                .attributes
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str()),
            _ => None,
        }
    }

    /// Set or replace an attribute
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        match &mut self.nodes[id.0].kind {
            NodeKind::Element(data) => {
                if let Some(slot) = data.attributes.iter_mut().find(|(key, _)| key == name) {
                    slot.1 = value.to_string();
                } else {
                    data.attributes.push((name.to_string(), value.to_string()));
                }
                Ok(())
            }
            _ => Err(DomError::NotAnElement),
        }
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) {
        if let NodeKind::Element(data) = &mut self.nodes[id.0].kind {
            data.attributes.retain(|(key, _)| key != name);
        }
    }

    /// Position of a node in its parent's child list
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&child| child == id)
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        index
            .checked_sub(1)
            .and_then(|prev| self.children(parent).get(prev).copied())
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        self.children(parent).get(index + 1).copied()
    }

    /// Ancestors of `id`, nearest first, excluding `id` itself
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            next: self.parent(id),
        }
    }

    /// `id` and all of its descendants in tree order
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            doc: self,
            stack: vec![id],
        }
    }

    /// True when `node` is `ancestor` or lies beneath it
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        node == ancestor || self.ancestors(node).any(|a| a == ancestor)
    }

    /// True when the node can be reached from the document root
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.contains(self.root(), id)
    }

    /// Concatenated character data of all descendant text nodes
    pub fn text_content(&self, id: NodeId) -> String {
        match self.kind(id) {
            NodeKind::Text(text) | NodeKind::Comment(text) => text.clone(),
            _ => self
                .descendants(id)
                .filter_map(|node| self.text(node))
                .collect(),
        }
    }

    /// Length of [`Document::text_content`] in characters
    pub fn text_length(&self, id: NodeId) -> usize {
        match self.kind(id) {
            NodeKind::Text(text) | NodeKind::Comment(text) => text.chars().count(),
            _ => self
                .descendants(id)
                .filter_map(|node| self.text(node))
                .map(|text| text.chars().count())
                .sum(),
        }
    }

    /// Boundary length: characters for character data, children otherwise
    pub fn node_length(&self, id: NodeId) -> usize {
        match self.kind(id) {
            NodeKind::Text(text) | NodeKind::Comment(text) => text.chars().count(),
            _ => self.children(id).len(),
        }
    }

    /// All attached elements with the given tag name, in tree order
    pub fn elements_by_name(&self, name: &str) -> Vec<NodeId> {
        self.descendants(self.root())
            .filter(|&id| self.element_name(id) == Some(name))
            .collect()
    }

    /// First attached element whose attribute `name` equals `value`
    pub fn find_by_attribute(&self, name: &str, value: &str) -> Option<NodeId> {
        self.descendants(self.root())
            .find(|&id| self.attribute(id, name) == Some(value))
    }

    fn check_insert(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        match self.kind(parent) {
            NodeKind::Document | NodeKind::Element(_) => {}
            _ => {
                return Err(DomError::HierarchyRequest(
                    "parent cannot have children".to_string(),
                ))
            }
        }
        if matches!(self.kind(child), NodeKind::Document) {
            return Err(DomError::HierarchyRequest(
                "the document node cannot be inserted".to_string(),
            ));
        }
        if self.contains(child, parent) {
            return Err(DomError::HierarchyRequest(
                "a node cannot be inserted into itself".to_string(),
            ));
        }
        Ok(())
    }

    /// Unlink a node from its parent; its subtree stays intact
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|&child| child != id);
        }
    }

    /// Append `child` as the last child of `parent`, moving it if attached
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.check_insert(parent, child)?;
        self.detach(child);
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
        Ok(())
    }

    /// Insert `child` before `reference` (or at the end when `None`)
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<(), DomError> {
        let Some(reference) = reference else {
            return self.append_child(parent, child);
        };
        if self.parent(reference) != Some(parent) {
            return Err(DomError::HierarchyRequest(
                "reference node is not a child of parent".to_string(),
            ));
        }
        if reference == child {
            return Ok(());
        }
        self.check_insert(parent, child)?;
        self.detach(child);
        let index = self
            .index_in_parent(reference)
            .ok_or_else(|| DomError::HierarchyRequest("reference node vanished".to_string()))?;
        self.nodes[parent.0].children.insert(index, child);
        self.nodes[child.0].parent = Some(parent);
        Ok(())
    }

    /// Split a text node at a character offset
    ///
    /// The original node keeps `[0, offset)`; a new sibling inserted right
    /// after it receives the remainder and is returned.
    pub fn split_text(&mut self, id: NodeId, offset: usize) -> Result<NodeId, DomError> {
        let text = self.text(id).ok_or(DomError::NotText)?;
        let length = text.chars().count();
        if offset > length {
            return Err(DomError::IndexSize { offset, length });
        }
        let byte = byte_offset(text, offset);
        let tail = text[byte..].to_string();
        let head = text[..byte].to_string();

        self.nodes[id.0].kind = NodeKind::Text(head);
        let new_node = self.create_text(&tail);
        if let Some(parent) = self.parent(id) {
            let reference = self.next_sibling(id);
            self.insert_before(parent, new_node, reference)?;
        }
        Ok(new_node)
    }

    /// Merge adjacent text nodes and drop empty ones beneath `id`
    pub fn normalize(&mut self, id: NodeId) {
        let children = self.children(id).to_vec();
        let mut previous_text: Option<NodeId> = None;
        for child in children {
            let Some(text) = self.text(child).map(str::to_string) else {
                previous_text = None;
                self.normalize(child);
                continue;
            };
            if text.is_empty() {
                self.detach(child);
            } else if let Some(prev) = previous_text {
                if let NodeKind::Text(existing) = &mut self.nodes[prev.0].kind {
                    existing.push_str(&text);
                }
                self.detach(child);
            } else {
                previous_text = Some(child);
            }
        }
    }

    /// Index path from the root, used to order boundary points
    pub(crate) fn tree_position(&self, id: NodeId) -> Option<Vec<usize>> {
        let mut position = Vec::new();
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            position.push(self.index_in_parent(current)?);
            current = parent;
        }
        if current != self.root() {
            return None;
        }
        position.reverse();
        Some(position)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Byte index of the `chars`-th character, clamped to the string length
pub(crate) fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map(|(index, _)| index)
        .unwrap_or(text.len())
}

/// Iterator over a node's ancestors
pub struct Ancestors<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.doc.parent(current);
        Some(current)
    }
}

/// Pre-order iterator over a subtree
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.stack.pop()?;
        self.stack
            .extend(self.doc.children(current).iter().rev().copied());
        Some(current)
    }
}
