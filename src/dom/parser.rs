//! Markup loading
//!
//! Page snapshots are parsed with `roxmltree`, so the input must be
//! well-formed XML (XHTML pages, EPUB chapters, serialized DOM snapshots).
//! Whitespace-only text is kept: a browser keeps it too, and offsets depend
//! on it.

use roxmltree::NodeType;

use super::error::DomError;
use super::tree::{Document, NodeId};

/// Parse markup into a [`Document`]
pub fn parse(markup: &str) -> Result<Document, DomError> {
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    };
    let xml = roxmltree::Document::parse_with_options(markup, options)
        .map_err(|e| DomError::Parse(e.to_string()))?;

    let mut doc = Document::new();
    let root = doc.root();
    for child in xml.root().children() {
        import(&mut doc, root, child)?;
    }
    Ok(doc)
}

fn import(doc: &mut Document, parent: NodeId, node: roxmltree::Node) -> Result<(), DomError> {
    match node.node_type() {
        NodeType::Element => {
            let element = doc.create_element(node.tag_name().name());

            // roxmltree reports namespace declarations separately; restore the
            // default namespace where it changes so the markup round-trips
            if let Some(namespace) = node.tag_name().namespace() {
                let inherited = node
                    .parent_element()
                    .and_then(|p| p.tag_name().namespace());
                if inherited != Some(namespace) {
                    doc.set_attribute(element, "xmlns", namespace)?;
                }
            }
            for attr in node.attributes() {
                doc.set_attribute(element, attr.name(), attr.value())?;
            }

            doc.append_child(parent, element)?;
            for child in node.children() {
                import(doc, element, child)?;
            }
        }
        NodeType::Text => {
            if let Some(text) = node.text() {
                let text = doc.create_text(text);
                doc.append_child(parent, text)?;
            }
        }
        NodeType::Comment => {
            if let Some(text) = node.text() {
                let comment = doc.create_comment(text);
                doc.append_child(parent, comment)?;
            }
        }
        NodeType::Root | NodeType::PI => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_page() {
        let doc = parse("<html><body><p>Hello <b>world</b></p></body></html>").unwrap();

        let body = doc.body().unwrap();
        assert_eq!(doc.text_content(body), "Hello world");
        assert_eq!(doc.elements_by_name("p").len(), 1);
    }

    #[test]
    fn test_parse_keeps_whitespace_text() {
        let doc = parse("<div>\n  <p>a</p>\n  <p>b</p>\n</div>").unwrap();
        let div = doc.document_element().unwrap();

        assert_eq!(doc.children(div).len(), 5);
        assert_eq!(doc.text_content(div), "\n  a\n  b\n");
    }

    #[test]
    fn test_parse_attributes_and_comments() {
        let doc = parse(r#"<p id="intro" class="lead">x<!-- note --></p>"#).unwrap();
        let p = doc.document_element().unwrap();

        assert_eq!(doc.attribute(p, "id"), Some("intro"));
        assert_eq!(doc.attribute(p, "class"), Some("lead"));
        assert_eq!(doc.children(p).len(), 2);
        assert_eq!(doc.text_content(p), "x");
    }

    #[test]
    fn test_parse_xhtml_namespace() {
        let doc = parse(r#"<html xmlns="http://www.w3.org/1999/xhtml"><body/></html>"#).unwrap();
        let html = doc.document_element().unwrap();

        assert_eq!(doc.element_name(html), Some("html"));
        assert_eq!(
            doc.attribute(html, "xmlns"),
            Some("http://www.w3.org/1999/xhtml")
        );
        assert_eq!(doc.attribute(doc.body().unwrap(), "xmlns"), None);
    }

    #[test]
    fn test_parse_malformed() {
        let result = parse("<p>unclosed");
        assert!(matches!(result, Err(DomError::Parse(_))));
    }
}
