//! Render targets and the arena document.
//!
//! The core never owns the tree it renders into. It appends through the
//! [`RenderTarget`] trait, starting from a root handle the caller supplies,
//! and only ever touches nodes inside that root's subtree.
//!
//! [`Document`] is the in-crate target: an index-based arena, so parent
//! links exist without reference cycles.
//!
//! # Example
//!
//! ```
//! use tagstream_core::tree::Document;
//!
//! let doc = Document::render_chunks(["<p>Hel", "lo <b>world</b></p>"]);
//! let p = doc.root().first_child().unwrap();
//!
//! assert_eq!(p.as_element().unwrap().name(), "p");
//! assert_eq!(p.all_text(), "Hello world");
//! assert_eq!(doc.to_html(), "<p>Hello <b>world</b></p>");
//! ```

use crate::event::Event;
use crate::tags;
use crate::tokenizer::Tokenizer;

// ============================================================================
// RenderTarget
// ============================================================================

/// A tree the builder can append to.
///
/// Handles are small copyable references to nodes owned by the target.
/// The builder keeps them on its construction stack and never dereferences
/// them itself.
pub trait RenderTarget {
    /// Reference to a node in the target.
    type Handle: Copy + Eq + std::fmt::Debug;

    /// Append a new, empty element as the last child of `parent`.
    fn append_element(&mut self, parent: Self::Handle, name: &str) -> Self::Handle;

    /// Append a text node as the last child of `parent`.
    fn append_text(&mut self, parent: Self::Handle, text: &str);
}

// ============================================================================
// Core Types
// ============================================================================

/// Index into the document's node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    fn new(index: usize) -> Self {
        NodeId(index as u32)
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Internal node storage.
#[derive(Debug)]
struct NodeData {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

/// The kind of node in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Document container.
    Root,

    /// Element with a lower-cased name and no attributes.
    Element { name: String },

    /// Text content, verbatim (no entity decoding).
    Text(String),
}

// ============================================================================
// Document
// ============================================================================

/// An arena-allocated element tree.
#[derive(Debug)]
pub struct Document {
    nodes: Vec<NodeData>,
}

impl Document {
    /// Create a document holding only its root node.
    pub fn new() -> Self {
        Document {
            nodes: vec![NodeData {
                parent: None,
                children: Vec::new(),
                kind: NodeKind::Root,
            }],
        }
    }

    /// Render a complete markup string.
    pub fn render(input: &str) -> Self {
        Self::render_chunks([input])
    }

    /// Render markup delivered as a sequence of fragments.
    pub fn render_chunks<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut doc = Document::new();
        let mut builder = TreeBuilder::new(doc.root_id());
        let mut tokenizer = Tokenizer::new();
        let mut no_hooks = |_: &mut Document, _: &str, _: NodeId| {};

        for chunk in chunks {
            tokenizer.feed(chunk.as_ref(), |event| {
                builder.handle_event(&mut doc, event, &mut no_hooks)
            });
        }
        tokenizer.finish(|event| builder.handle_event(&mut doc, event, &mut no_hooks));
        doc
    }

    /// ID of the root node.
    pub fn root_id(&self) -> NodeId {
        NodeId::new(0)
    }

    /// Get the root node.
    pub fn root(&self) -> Node<'_> {
        Node { doc: self, id: self.root_id() }
    }

    /// Get a node by ID.
    pub fn get(&self, id: NodeId) -> Option<Node<'_>> {
        if id.index() < self.nodes.len() {
            Some(Node { doc: self, id })
        } else {
            None
        }
    }

    /// Total number of nodes, including the root.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Append an element under `parent`, returning its ID.
    pub fn push_element(&mut self, parent: NodeId, name: &str) -> NodeId {
        self.push_node(parent, NodeKind::Element { name: name.to_owned() })
    }

    /// Append a text node under `parent`, returning its ID.
    pub fn push_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.push_node(parent, NodeKind::Text(text.to_owned()))
    }

    /// Serialize the whole document (the root's inner HTML).
    pub fn to_html(&self) -> String {
        self.root().inner_html()
    }

    fn push_node(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(NodeData {
            parent: Some(parent),
            children: Vec::new(),
            kind,
        });
        self.nodes[parent.index()].children.push(id);
        id
    }

    fn node_data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderTarget for Document {
    type Handle = NodeId;

    fn append_element(&mut self, parent: NodeId, name: &str) -> NodeId {
        self.push_element(parent, name)
    }

    fn append_text(&mut self, parent: NodeId, text: &str) {
        self.push_text(parent, text);
    }
}

// ============================================================================
// Node (navigation handle)
// ============================================================================

/// A handle for navigating the document tree.
#[derive(Clone, Copy)]
pub struct Node<'doc> {
    doc: &'doc Document,
    id: NodeId,
}

impl<'doc> Node<'doc> {
    /// Get the node's ID.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Get the node's kind.
    pub fn kind(&self) -> &'doc NodeKind {
        &self.doc.node_data(self.id).kind
    }

    /// Get the parent node, if any.
    pub fn parent(&self) -> Option<Node<'doc>> {
        self.doc.node_data(self.id).parent.map(|id| Node { doc: self.doc, id })
    }

    /// Iterate over child nodes.
    pub fn children(&self) -> impl Iterator<Item = Node<'doc>> + 'doc {
        let doc = self.doc;
        doc.node_data(self.id).children.iter().map(move |&id| Node { doc, id })
    }

    /// Get the first child node.
    pub fn first_child(&self) -> Option<Node<'doc>> {
        self.doc.node_data(self.id).children.first().map(|&id| Node { doc: self.doc, id })
    }

    /// Get the last child node.
    pub fn last_child(&self) -> Option<Node<'doc>> {
        self.doc.node_data(self.id).children.last().map(|&id| Node { doc: self.doc, id })
    }

    /// Get the next sibling node.
    pub fn next_sibling(&self) -> Option<Node<'doc>> {
        let parent_id = self.doc.node_data(self.id).parent?;
        let siblings = &self.doc.node_data(parent_id).children;
        let pos = siblings.iter().position(|&id| id == self.id)?;
        siblings.get(pos + 1).map(|&id| Node { doc: self.doc, id })
    }

    /// Get the previous sibling node.
    pub fn prev_sibling(&self) -> Option<Node<'doc>> {
        let parent_id = self.doc.node_data(self.id).parent?;
        let siblings = &self.doc.node_data(parent_id).children;
        let pos = siblings.iter().position(|&id| id == self.id)?;
        if pos > 0 {
            Some(Node { doc: self.doc, id: siblings[pos - 1] })
        } else {
            None
        }
    }

    /// Check if this is an element node.
    pub fn is_element(&self) -> bool {
        matches!(self.kind(), NodeKind::Element { .. })
    }

    /// Check if this is a text node.
    pub fn is_text(&self) -> bool {
        matches!(self.kind(), NodeKind::Text(_))
    }

    /// Get element view if this is an element.
    pub fn as_element(&self) -> Option<ElementView<'doc>> {
        if let NodeKind::Element { name } = self.kind() {
            Some(ElementView { node: *self, name: name.as_str() })
        } else {
            None
        }
    }

    /// Get text content if this is a text node.
    pub fn text_content(&self) -> Option<&'doc str> {
        if let NodeKind::Text(s) = self.kind() {
            Some(s.as_str())
        } else {
            None
        }
    }

    /// Recursively collect all text content under this node.
    pub fn all_text(&self) -> String {
        let mut result = String::new();
        self.collect_text(&mut result);
        result
    }

    /// All descendant elements with the given name, in document order.
    pub fn find_all(&self, name: &str) -> Vec<Node<'doc>> {
        let mut found = Vec::new();
        self.collect_named(name, &mut found);
        found
    }

    /// Serialize the children of this node.
    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        for child in self.children() {
            child.write_html(&mut out);
        }
        out
    }

    /// Serialize this node and its children.
    pub fn outer_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn collect_text(&self, buf: &mut String) {
        match self.kind() {
            NodeKind::Text(s) => buf.push_str(s),
            _ => {
                for child in self.children() {
                    child.collect_text(buf);
                }
            }
        }
    }

    fn collect_named(&self, name: &str, found: &mut Vec<Node<'doc>>) {
        for child in self.children() {
            if let NodeKind::Element { name: n } = child.kind() {
                if n == name {
                    found.push(child);
                }
                child.collect_named(name, found);
            }
        }
    }

    fn write_html(&self, out: &mut String) {
        match self.kind() {
            NodeKind::Root => {
                for child in self.children() {
                    child.write_html(out);
                }
            }
            NodeKind::Text(s) => escape_text(s, out),
            NodeKind::Element { name } => {
                out.push('<');
                out.push_str(name);
                out.push('>');
                if !tags::is_void(name) {
                    for child in self.children() {
                        child.write_html(out);
                    }
                    out.push_str("</");
                    out.push_str(name);
                    out.push('>');
                }
            }
        }
    }
}

impl std::fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("kind", self.kind())
            .finish()
    }
}

/// Escape text for HTML output.
fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
}

// ============================================================================
// ElementView (typed access to elements)
// ============================================================================

/// A typed view for element nodes.
#[derive(Clone, Copy)]
pub struct ElementView<'doc> {
    node: Node<'doc>,
    name: &'doc str,
}

impl<'doc> ElementView<'doc> {
    /// Get the underlying node.
    pub fn node(&self) -> Node<'doc> {
        self.node
    }

    /// Get the element name.
    pub fn name(&self) -> &'doc str {
        self.name
    }

    /// Check if the element is self-closing (`br`, `hr`).
    pub fn is_void(&self) -> bool {
        tags::is_void(self.name)
    }

    /// Iterate over child nodes.
    pub fn children(&self) -> impl Iterator<Item = Node<'doc>> + 'doc {
        self.node.children()
    }
}

impl std::fmt::Debug for ElementView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementView")
            .field("id", &self.node.id())
            .field("name", &self.name)
            .finish()
    }
}

// ============================================================================
// TreeBuilder (event consumer)
// ============================================================================

/// Builds a tree from tokenizer events.
///
/// Holds the construction stack: the chain of open elements, root first.
/// The root is never popped, so the stack is never empty.
#[derive(Debug, Clone)]
pub struct TreeBuilder<H> {
    stack: Vec<H>,
}

impl<H: Copy + std::fmt::Debug> TreeBuilder<H> {
    /// Start building under `root`.
    pub fn new(root: H) -> Self {
        TreeBuilder { stack: vec![root] }
    }

    /// Number of open nodes, including the root. Always at least 1.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// The node new content is appended to.
    pub fn current(&self) -> H {
        self.stack[self.stack.len() - 1]
    }

    /// The caller-supplied root.
    pub fn root(&self) -> H {
        self.stack[0]
    }

    /// Apply one tokenizer event to `target`.
    ///
    /// `on_added` runs for every element created, after it is attached to
    /// its parent and before content can nest inside it.
    pub fn handle_event<R, F>(&mut self, target: &mut R, event: Event<'_>, on_added: &mut F)
    where
        R: RenderTarget<Handle = H>,
        F: FnMut(&mut R, &str, H),
    {
        match event {
            Event::StartTag { name } => {
                let node = target.append_element(self.current(), name);
                tracing::trace!(name, ?node, depth = self.stack.len(), "element added");
                on_added(target, name, node);
                if !tags::is_void(name) {
                    self.stack.push(node);
                }
            }
            Event::EndTag { name } => {
                if self.stack.len() > 1 {
                    self.stack.pop();
                } else {
                    tracing::trace!(name, "end tag at root ignored");
                }
            }
            Event::Text { content } => {
                target.append_text(self.current(), content);
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_element() {
        let doc = Document::render("<div></div>");
        let root = doc.root();

        assert!(matches!(root.kind(), NodeKind::Root));

        let child = root.first_child().unwrap();
        let el = child.as_element().unwrap();
        assert_eq!(el.name(), "div");
        assert_eq!(child.children().count(), 0);
    }

    #[test]
    fn test_nested_elements() {
        let doc = Document::render("<p>First part of <strong>paragraph</strong></p>");
        let p = doc.root().first_child().unwrap();
        let strong = p.last_child().unwrap();

        assert_eq!(p.as_element().unwrap().name(), "p");
        assert_eq!(strong.as_element().unwrap().name(), "strong");
        assert_eq!(strong.parent().unwrap().id(), p.id());
        assert_eq!(p.all_text(), "First part of paragraph");
    }

    #[test]
    fn test_text_nodes_split_at_spaces() {
        let doc = Document::render("<p>Hello big world</p>");
        let p = doc.root().first_child().unwrap();
        let texts: Vec<_> = p.children().filter_map(|n| n.text_content()).collect();

        assert_eq!(texts, ["Hello ", "big ", "world"]);
    }

    #[test]
    fn test_void_elements_are_siblings() {
        let doc = Document::render("A<br>B");
        let root = doc.root();
        let a = root.first_child().unwrap();
        let br = a.next_sibling().unwrap();
        let b = br.next_sibling().unwrap();

        assert_eq!(a.text_content(), Some("A"));
        assert!(br.as_element().unwrap().is_void());
        assert_eq!(b.text_content(), Some("B"));
        assert_eq!(b.parent().unwrap().id(), root.id());
        assert_eq!(b.prev_sibling().unwrap().id(), br.id());
        assert!(b.next_sibling().is_none());
    }

    #[test]
    fn test_siblings() {
        let doc = Document::render("<pre>First code</pre><pre>Second code</pre>");
        let pres = doc.root().find_all("pre");

        assert_eq!(pres.len(), 2);
        assert_eq!(pres[0].all_text(), "First code");
        assert_eq!(pres[1].all_text(), "Second code");
        assert_eq!(pres[0].next_sibling().unwrap().id(), pres[1].id());
    }

    #[test]
    fn test_to_html() {
        let doc = Document::render("First line<br>Second line<hr>");
        assert_eq!(doc.to_html(), "First line<br>Second line<hr>");

        let doc = Document::render("<p>Fish &amp; chips</p>");
        assert_eq!(doc.to_html(), "<p>Fish &amp;amp; chips</p>");

        let doc = Document::render("<div>a<>b & c</div>");
        assert_eq!(doc.to_html(), "<div>a&lt;&gt;b &amp; c</div>");
    }

    #[test]
    fn test_outer_html() {
        let doc = Document::render("<ul><li>one</li><li>two</li></ul>");
        let ul = doc.root().first_child().unwrap();
        assert_eq!(ul.outer_html(), "<ul><li>one</li><li>two</li></ul>");
        assert_eq!(ul.inner_html(), "<li>one</li><li>two</li>");
    }

    #[test]
    fn test_stray_end_tags_never_pop_root() {
        let mut doc = Document::new();
        let mut builder = TreeBuilder::new(doc.root_id());
        let mut hook = |_: &mut Document, _: &str, _: NodeId| {};

        builder.handle_event(&mut doc, Event::EndTag { name: "p" }, &mut hook);
        builder.handle_event(&mut doc, Event::EndTag { name: "div" }, &mut hook);
        assert_eq!(builder.depth(), 1);
        assert_eq!(builder.current(), doc.root_id());

        builder.handle_event(&mut doc, Event::StartTag { name: "p" }, &mut hook);
        assert_eq!(builder.depth(), 2);
        builder.handle_event(&mut doc, Event::EndTag { name: "p" }, &mut hook);
        builder.handle_event(&mut doc, Event::EndTag { name: "p" }, &mut hook);
        assert_eq!(builder.depth(), 1);
        assert_eq!(doc.node_count(), 2);
    }

    #[test]
    fn test_end_tag_pops_regardless_of_name() {
        let doc = Document::render("<p><em>x</p>y");
        assert_eq!(doc.to_html(), "<p><em>x</em>y</p>");
    }

    #[test]
    fn test_render_under_caller_root() {
        let mut doc = Document::new();
        let conversation = doc.push_element(doc.root_id(), "section");
        let question = doc.push_element(conversation, "div");
        doc.push_text(question, "question");
        let answer = doc.push_element(conversation, "div");

        let mut builder = TreeBuilder::new(answer);
        let mut tokenizer = Tokenizer::new();
        let mut hook = |_: &mut Document, _: &str, _: NodeId| {};
        tokenizer.feed("<p>reply</p></div></section>tail", |e| {
            builder.handle_event(&mut doc, e, &mut hook)
        });
        tokenizer.finish(|e| builder.handle_event(&mut doc, e, &mut hook));

        assert_eq!(builder.root(), answer);
        assert_eq!(
            doc.to_html(),
            "<section><div>question</div><div><p>reply</p>tail</div></section>"
        );
    }

    #[test]
    fn test_on_added_sees_attached_node() {
        let mut doc = Document::new();
        let mut builder = TreeBuilder::new(doc.root_id());
        let mut seen = Vec::new();
        let mut hook = |d: &mut Document, name: &str, node: NodeId| {
            assert!(d.get(node).unwrap().parent().is_some());
            seen.push(name.to_owned());
        };

        builder.handle_event(&mut doc, Event::StartTag { name: "pre" }, &mut hook);
        builder.handle_event(&mut doc, Event::StartTag { name: "br" }, &mut hook);
        assert_eq!(seen, ["pre", "br"]);
        assert_eq!(builder.depth(), 2);
    }
}
