//! Path computation and resolution
//!
//! Highlight markers the engine inserts are *transparent*: they are never a
//! path target, are skipped when counting siblings, and their children count
//! as children of the marker's parent. Paths computed next to an applied
//! highlight therefore match the paths computed before it existed.

use thiserror::Error;

use super::parser::PathParseError;
use super::types::{PathStep, StructuralPath};
use crate::dom::{Document, NodeId};

/// Path resolution errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("Malformed path: {0}")]
    Malformed(#[from] PathParseError),

    /// Expected after page mutation; not a programming error
    #[error("Path {path} not found: no match for step {depth} ({step})")]
    NotFound {
        path: String,
        depth: usize,
        step: String,
    },
}

/// Tag and attribute that together mark an element as transparent
#[derive(Debug, Clone, PartialEq, Eq)]
struct TransparentMarker {
    tag: String,
    attribute: String,
}

/// Maps nodes to structural paths and back
#[derive(Debug, Clone, Default)]
pub struct PathResolver {
    transparent: Option<TransparentMarker>,
}

impl PathResolver {
    /// A resolver that treats every element as addressable
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat `tag` elements carrying `attribute` as transparent
    ///
    /// Both must match: a page's own element that happens to carry the
    /// attribute under another tag stays addressable.
    pub fn with_transparent_markers(tag: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self {
            transparent: Some(TransparentMarker {
                tag: tag.into(),
                attribute: attribute.into(),
            }),
        }
    }

    pub fn is_transparent(&self, doc: &Document, node: NodeId) -> bool {
        let Some(marker) = &self.transparent else {
            return false;
        };
        doc.element_name(node) == Some(marker.tag.as_str())
            && doc.attribute(node, &marker.attribute).is_some()
    }

    /// The element a path for `node` points at: the node itself when it is
    /// an addressable element, otherwise its nearest addressable ancestor
    /// (or the document root)
    pub fn addressable(&self, doc: &Document, node: NodeId) -> NodeId {
        let mut current = node;
        loop {
            if current == doc.root()
                || (doc.is_element(current) && !self.is_transparent(doc, current))
            {
                return current;
            }
            match doc.parent(current) {
                Some(parent) => current = parent,
                None => return current,
            }
        }
    }

    fn logical_parent(&self, doc: &Document, node: NodeId) -> Option<NodeId> {
        doc.ancestors(node)
            .find(|&ancestor| !self.is_transparent(doc, ancestor))
    }

    /// Children of `parent` with transparent elements replaced by their own
    /// (logical) children
    pub fn logical_children(&self, doc: &Document, parent: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        for &child in doc.children(parent) {
            if self.is_transparent(doc, child) {
                out.extend(self.logical_children(doc, child));
            } else {
                out.push(child);
            }
        }
        out
    }

    /// Compute the structural path of `node`
    ///
    /// Text nodes are promoted to their containing element. Detached nodes
    /// and the document itself yield the root sentinel.
    pub fn compute_path(&self, doc: &Document, node: NodeId) -> StructuralPath {
        if !doc.is_attached(node) {
            return StructuralPath::root();
        }

        let mut steps = Vec::new();
        let mut current = self.addressable(doc, node);
        while current != doc.root() {
            let Some(parent) = self.logical_parent(doc, current) else {
                return StructuralPath::root();
            };
            let Some(tag) = doc.element_name(current) else {
                return StructuralPath::root();
            };

            let mut ordinal = 0u32;
            for sibling in self.logical_children(doc, parent) {
                if same_tag(doc, sibling, tag) {
                    ordinal += 1;
                }
                if sibling == current {
                    break;
                }
            }
            steps.push(PathStep::new(tag.to_ascii_lowercase(), ordinal));
            current = parent;
        }

        steps.reverse();
        StructuralPath::with_steps(steps)
    }

    /// Resolve a path back to an element; exact-or-fail
    pub fn resolve_path(&self, doc: &Document, path: &StructuralPath) -> Result<NodeId, PathError> {
        let mut current = doc.root();
        for (depth, step) in path.steps().iter().enumerate() {
            let index = step.ordinal.saturating_sub(1) as usize;
            current = self
                .logical_children(doc, current)
                .into_iter()
                .filter(|&child| same_tag(doc, child, &step.tag))
                .nth(index)
                .ok_or_else(|| PathError::NotFound {
                    path: path.to_string(),
                    depth,
                    step: step.to_string(),
                })?;
        }
        Ok(current)
    }

    /// Parse and resolve the text form of a path
    pub fn resolve_str(&self, doc: &Document, path: &str) -> Result<NodeId, PathError> {
        let path: StructuralPath = path.parse()?;
        self.resolve_path(doc, &path)
    }
}

fn same_tag(doc: &Document, node: NodeId, tag: &str) -> bool {
    doc.element_name(node)
        .is_some_and(|name| name.eq_ignore_ascii_case(tag))
}

/// Compute a path with a resolver that has no transparent elements
pub fn compute_path(doc: &Document, node: NodeId) -> StructuralPath {
    PathResolver::new().compute_path(doc, node)
}

/// Resolve a path with a resolver that has no transparent elements
pub fn resolve_path(doc: &Document, path: &StructuralPath) -> Result<NodeId, PathError> {
    PathResolver::new().resolve_path(doc, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse;

    const PAGE: &str = "<html><body><div><p>one</p><span>s</span><p>two <b>bold</b></p></div><p>three</p></body></html>";

    #[test]
    fn test_compute_path_counts_same_tag_only() {
        let doc = parse(PAGE).unwrap();
        let second = doc.elements_by_name("p")[1];

        assert_eq!(
            compute_path(&doc, second).to_string(),
            "/html[1]/body[1]/div[1]/p[2]"
        );
    }

    #[test]
    fn test_text_node_promoted_to_element() {
        let doc = parse(PAGE).unwrap();
        let b = doc.elements_by_name("b")[0];
        let text = doc.children(b)[0];

        assert_eq!(compute_path(&doc, text), compute_path(&doc, b));
    }

    #[test]
    fn test_round_trip_every_element() {
        let doc = parse(PAGE).unwrap();
        for node in doc.descendants(doc.root()) {
            if !doc.is_element(node) {
                continue;
            }
            let path = compute_path(&doc, node);
            assert_eq!(resolve_path(&doc, &path), Ok(node), "path {}", path);
        }
    }

    #[test]
    fn test_root_and_detached_nodes() {
        let mut doc = parse(PAGE).unwrap();
        assert!(compute_path(&doc, doc.root()).is_root());

        let orphan = doc.create_element("p");
        assert!(compute_path(&doc, orphan).is_root());
        assert_eq!(resolve_path(&doc, &StructuralPath::root()), Ok(doc.root()));
    }

    #[test]
    fn test_resolve_not_found() {
        let doc = parse(PAGE).unwrap();
        let path: StructuralPath = "/html[1]/body[1]/div[1]/p[3]".parse().unwrap();

        assert_eq!(
            resolve_path(&doc, &path),
            Err(PathError::NotFound {
                path: path.to_string(),
                depth: 3,
                step: "p[3]".to_string(),
            })
        );
    }

    #[test]
    fn test_unrelated_sibling_does_not_perturb() {
        let mut doc = parse(PAGE).unwrap();
        let second = doc.elements_by_name("p")[1];
        let path = compute_path(&doc, second);

        // a new element of another tag ahead of the target
        let div = doc.elements_by_name("div")[0];
        let aside = doc.create_element("aside");
        let first = doc.children(div)[0];
        doc.insert_before(div, aside, Some(first)).unwrap();

        assert_eq!(compute_path(&doc, second), path);
        assert_eq!(resolve_path(&doc, &path), Ok(second));
    }

    #[test]
    fn test_transparent_markers() {
        let doc = parse(
            r#"<body><p>a<mark data-highlight-id="h1"><i>x</i></mark><i>y</i></p></body>"#,
        )
        .unwrap();
        let resolver = PathResolver::with_transparent_markers("mark", "data-highlight-id");
        let italics = doc.elements_by_name("i");
        let mark = doc.elements_by_name("mark")[0];

        assert_eq!(resolver.compute_path(&doc, italics[0]).to_string(), "/body[1]/p[1]/i[1]");
        assert_eq!(resolver.compute_path(&doc, italics[1]).to_string(), "/body[1]/p[1]/i[2]");
        // text inside a marker addresses the marker's logical parent
        assert_eq!(resolver.compute_path(&doc, mark).to_string(), "/body[1]/p[1]");
        assert_eq!(
            resolver.resolve_str(&doc, "/body[1]/p[1]/i[2]"),
            Ok(italics[1])
        );
    }

    #[test]
    fn test_attribute_without_marker_tag_stays_addressable() {
        let doc = parse(
            r#"<body><div data-highlight-id="native"><p>a</p></div><p>b</p></body>"#,
        )
        .unwrap();
        let resolver = PathResolver::with_transparent_markers("mark", "data-highlight-id");
        let div = doc.elements_by_name("div")[0];
        let inner = doc.elements_by_name("p")[0];

        assert!(!resolver.is_transparent(&doc, div));
        assert_eq!(resolver.compute_path(&doc, inner).to_string(), "/body[1]/div[1]/p[1]");
        assert_eq!(resolver.resolve_str(&doc, "/body[1]/p[1]"), Ok(doc.elements_by_name("p")[1]));
    }

    #[test]
    fn test_resolve_str_malformed() {
        let doc = parse(PAGE).unwrap();
        let result = PathResolver::new().resolve_str(&doc, "not a path");
        assert!(matches!(result, Err(PathError::Malformed(_))));
    }
}
