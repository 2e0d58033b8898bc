//! Highlight marker elements
//!
//! A marker is an inline element wrapping highlighted text. It carries the
//! highlight id and the annotation text as attributes so the page markup is
//! self-describing.

use crate::dom::{Document, DomError, NodeId};

/// Configuration for marker elements
#[derive(Debug, Clone)]
pub struct MarkerConfig {
    /// Tag of the wrapping element
    pub tag: String,
    /// CSS class set on every marker
    pub class: String,
    /// Data attribute holding the highlight id
    pub id_attribute: String,
    /// Data attribute holding the annotation text
    pub comment_attribute: String,
    /// Background color for inline styles
    pub color: String,
    /// Whether to set an inline `style` attribute
    pub include_inline_styles: bool,
    /// Vertical distance of the tooltip above the pointer
    pub tooltip_offset_y: f64,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            tag: "mark".to_string(),
            class: "knotion-highlight".to_string(),
            id_attribute: "data-highlight-id".to_string(),
            comment_attribute: "data-comment".to_string(),
            color: "rgba(255, 230, 0, 0.3)".to_string(),
            include_inline_styles: true,
            tooltip_offset_y: 30.0,
        }
    }
}

/// Create a detached marker element for a highlight
pub fn create_marker(
    doc: &mut Document,
    config: &MarkerConfig,
    id: &str,
    annotation_text: &str,
) -> Result<NodeId, DomError> {
    let marker = doc.create_element(&config.tag);
    doc.set_attribute(marker, "class", &config.class)?;
    doc.set_attribute(marker, &config.id_attribute, id)?;
    doc.set_attribute(marker, &config.comment_attribute, annotation_text)?;
    if config.include_inline_styles {
        let style = format!("background-color: {}; cursor: pointer;", config.color);
        doc.set_attribute(marker, "style", &style)?;
    }
    Ok(marker)
}

/// Highlight id carried by `node`, if it is a marker
pub fn marker_id<'a>(doc: &'a Document, config: &MarkerConfig, node: NodeId) -> Option<&'a str> {
    if doc.element_name(node)? != config.tag {
        return None;
    }
    doc.attribute(node, &config.id_attribute)
}

/// Nearest marker that is `node` or one of its ancestors
pub fn enclosing_marker(doc: &Document, config: &MarkerConfig, node: NodeId) -> Option<NodeId> {
    std::iter::once(node)
        .chain(doc.ancestors(node))
        .find(|&candidate| marker_id(doc, config, candidate).is_some())
}

/// Replace a marker with its children and merge the text it split
pub fn unwrap_marker(doc: &mut Document, marker: NodeId) -> Result<(), DomError> {
    let parent = doc.parent(marker).ok_or(DomError::Detached)?;
    let children = doc.children(marker).to_vec();
    for child in children {
        doc.insert_before(parent, child, Some(marker))?;
    }
    doc.detach(marker);
    doc.normalize(parent);
    Ok(())
}
