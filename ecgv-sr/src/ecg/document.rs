//! XML exam document loading and node lookup
//!
//! Wraps a `roxmltree` tree borrowed from the decoded upload text.
//! Lookups follow the export's loose structure: a node is found by tag
//! name anywhere below the root, not by an absolute path.

use roxmltree::{Document, Node, ParsingOptions};
use tracing::warn;

use crate::error::{Error, Result};

/// Source lines shown before the failing line when a parse error is logged
const CONTEXT_LINES_BEFORE: usize = 2;
/// Source lines shown after the failing line
const CONTEXT_LINES_AFTER: usize = 1;

/// Parsed exam export
pub struct ExamDocument<'input> {
    doc: Document<'input>,
}

impl<'input> ExamDocument<'input> {
    /// Parse document text
    ///
    /// DTDs are tolerated since some exporters emit an internal subset.
    /// On failure the lines around the error position are logged.
    pub fn parse(text: &'input str) -> Result<Self> {
        let mut options = ParsingOptions::default();
        options.allow_dtd = true;

        match Document::parse_with_options(text, options) {
            Ok(doc) => Ok(Self { doc }),
            Err(e) => {
                let pos = e.pos();
                warn!("XML parse error: {}", e);
                if let Some(context) = error_context(text, pos.row as usize, pos.col as usize) {
                    warn!("XML content around error:\n{}", context);
                }
                Err(Error::MalformedDocument {
                    line: pos.row,
                    column: pos.col,
                    message: e.to_string(),
                })
            }
        }
    }

    /// Root element of the document
    pub fn root(&self) -> Node<'_, 'input> {
        self.doc.root_element()
    }

    /// First element named `name` in document order
    pub fn find(&self, name: &str) -> Option<Node<'_, 'input>> {
        self.doc
            .descendants()
            .find(|n| n.is_element() && n.has_tag_name(name))
    }

    /// Every element named `name`, in document order
    pub fn find_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
        self.doc
            .descendants()
            .filter(move |n| n.is_element() && n.has_tag_name(name))
    }

    /// First `child` element directly under any `parent` element
    pub fn find_path(&self, parent: &str, child: &str) -> Option<Node<'_, 'input>> {
        self.doc
            .descendants()
            .filter(|n| n.is_element() && n.has_tag_name(parent))
            .find_map(|p| child_element(p, child))
    }

    /// Trimmed text of `parent/child`; `None` when the node is absent or blank
    pub fn text_at(&self, parent: &str, child: &str) -> Option<&str> {
        self.find_path(parent, child).and_then(node_text)
    }
}

/// Trimmed text content of an element; `None` when absent or blank
pub fn node_text<'a>(node: Node<'a, '_>) -> Option<&'a str> {
    node.text().map(str::trim).filter(|t| !t.is_empty())
}

/// First element child of `node` named `name`
pub fn child_element<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.is_element() && n.has_tag_name(name))
}

/// Render the source lines around a 1-based `row`/`col` with a caret marker
fn error_context(text: &str, row: usize, col: usize) -> Option<String> {
    if row == 0 {
        return None;
    }
    let lines: Vec<&str> = text.lines().collect();
    if lines.is_empty() {
        return None;
    }
    let first = row.saturating_sub(1 + CONTEXT_LINES_BEFORE);
    let last = (row + CONTEXT_LINES_AFTER).min(lines.len());

    let mut out = String::new();
    for (i, line) in lines.iter().enumerate().take(last).skip(first) {
        let line_no = i + 1;
        out.push_str(&format!("Line {}: {}\n", line_no, line));
        if line_no == row {
            let prefix = format!("Line {}: ", line_no).len();
            out.push_str(&" ".repeat(prefix + col.saturating_sub(1)));
            out.push_str("^ error here\n");
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Root>
  <Paciente><Nome>  Maria  </Nome><Sexo></Sexo></Paciente>
  <Exame><Data>01/02/2020</Data></Exame>
  <Outro><Nome>ignored</Nome></Outro>
</Root>"#;

    #[test]
    fn test_find_path() {
        let doc = ExamDocument::parse(SAMPLE).unwrap();
        assert_eq!(doc.text_at("Paciente", "Nome"), Some("Maria"));
        assert_eq!(doc.text_at("Exame", "Data"), Some("01/02/2020"));
        assert_eq!(doc.text_at("Exame", "Hora"), None);
    }

    #[test]
    fn test_blank_text_is_none() {
        let doc = ExamDocument::parse(SAMPLE).unwrap();
        assert!(doc.find_path("Paciente", "Sexo").is_some());
        assert_eq!(doc.text_at("Paciente", "Sexo"), None);
    }

    #[test]
    fn test_find_all_counts_elements() {
        let doc = ExamDocument::parse(SAMPLE).unwrap();
        assert_eq!(doc.find_all("Nome").count(), 2);
        assert_eq!(doc.root().tag_name().name(), "Root");
    }

    #[test]
    fn test_malformed_document_reports_position() {
        let text = "<Root>\n  <Paciente>\n    <Nome>x</Paciente>\n</Root>";
        match ExamDocument::parse(text) {
            Err(Error::MalformedDocument { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected MalformedDocument, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_empty_text_is_malformed() {
        assert!(matches!(
            ExamDocument::parse(""),
            Err(Error::MalformedDocument { .. })
        ));
    }

    #[test]
    fn test_error_context_marks_column() {
        let text = "a\nb\n<bad>\nd\ne";
        let context = error_context(text, 3, 2).unwrap();
        assert!(context.contains("Line 1: a"));
        assert!(context.contains("Line 3: <bad>"));
        assert!(context.contains("Line 4: d"));
        assert!(!context.contains("Line 5"));
        assert!(context.contains("         ^ error here"));
    }
}
