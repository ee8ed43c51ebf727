//! discovery/ast.rs
//!
//! Function signature extraction from Python sources via tree-sitter.

use std::fs;
use std::path::Path;

use tree_sitter::{Node, Parser, Tree};
use tree_sitter_python as python;

use crate::discovery::record::{is_test_name, ArgSpec, FunctionRecord};
use crate::error::ExtractError;

/* ============================================================
   Extractor
   ============================================================ */

pub struct PythonExtractor {
    parser: Parser,
    include_nested: bool,
}

impl PythonExtractor {
    pub fn new() -> Result<Self, tree_sitter::LanguageError> {
        let mut parser = Parser::new();
        parser.set_language(&python::language())?;
        Ok(Self {
            parser,
            include_nested: false,
        })
    }

    /// Also collect methods and functions defined inside other bodies.
    pub fn include_nested(mut self, yes: bool) -> Self {
        self.include_nested = yes;
        self
    }

    pub fn extract_file(&mut self, path: &Path) -> Result<Vec<FunctionRecord>, ExtractError> {
        let source = fs::read_to_string(path).map_err(|source| ExtractError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.extract_source(path, &source)
    }

    /// Parse `source` and return one record per function definition,
    /// in source order.
    pub fn extract_source(
        &mut self,
        path: &Path,
        source: &str,
    ) -> Result<Vec<FunctionRecord>, ExtractError> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| ExtractError::NoTree(path.to_path_buf()))?;

        check_syntax(&tree, path)?;

        let mut defs = Vec::new();
        let root = tree.root_node();
        if self.include_nested {
            collect_all(root, &mut defs);
        } else {
            collect_top_level(root, &mut defs);
        }

        Ok(defs
            .into_iter()
            .filter_map(|node| build_record(node, path, source))
            .collect())
    }
}

/* ============================================================
   Syntax check
   ============================================================ */

fn check_syntax(tree: &Tree, path: &Path) -> Result<(), ExtractError> {
    let root = tree.root_node();
    if !root.has_error() {
        return Ok(());
    }

    let at = first_error(root).unwrap_or(root).start_position();
    Err(ExtractError::Syntax {
        path: path.to_path_buf(),
        line: at.row + 1,
        column: at.column + 1,
    })
}

fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }

    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find_map(first_error);
    found
}

/* ============================================================
   Definition collection
   ============================================================ */

fn collect_top_level<'a>(root: Node<'a>, out: &mut Vec<Node<'a>>) {
    let mut cursor = root.walk();
    for child in root.named_children(&mut cursor) {
        if let Some(def) = as_function(child) {
            out.push(def);
        }
    }
}

fn collect_all<'a>(node: Node<'a>, out: &mut Vec<Node<'a>>) {
    if node.kind() == "function_definition" {
        out.push(node);
    }

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        collect_all(child, out);
    }
}

/// Unwrap `@decorator` wrappers down to the `def` node.
fn as_function(node: Node) -> Option<Node> {
    match node.kind() {
        "function_definition" => Some(node),
        "decorated_definition" => node
            .child_by_field_name("definition")
            .filter(|d| d.kind() == "function_definition"),
        _ => None,
    }
}

/* ============================================================
   Record building
   ============================================================ */

fn build_record(node: Node, path: &Path, src: &str) -> Option<FunctionRecord> {
    let name = text(node.child_by_field_name("name")?, src)?.to_string();

    let args = node
        .child_by_field_name("parameters")
        .map(|p| extract_args(p, src))
        .unwrap_or_default();

    let docstring = node
        .child_by_field_name("body")
        .and_then(|body| extract_docstring(body, src));

    Some(FunctionRecord {
        file: path.to_path_buf(),
        is_test: is_test_name(&name),
        name,
        args,
        docstring,
        line: node.start_position().row + 1,
    })
}

fn extract_args(params: Node, src: &str) -> Vec<ArgSpec> {
    let mut args = Vec::new();
    let mut cursor = params.walk();

    for param in params.named_children(&mut cursor) {
        let spec = match param.kind() {
            "identifier" => text(param, src).map(|n| ArgSpec::new(n, None)),

            // `name: type`; the name is the first child, not a field
            "typed_parameter" => param
                .named_child(0)
                .filter(|n| n.kind() == "identifier")
                .and_then(|n| text(n, src))
                .map(|n| ArgSpec::new(n, annotation(param, src))),

            "default_parameter" | "typed_default_parameter" => param
                .child_by_field_name("name")
                .filter(|n| n.kind() == "identifier")
                .and_then(|n| text(n, src))
                .map(|n| ArgSpec::new(n, annotation(param, src))),

            // *args, **kwargs, bare `*` and `/` separators, comments
            _ => None,
        };

        if let Some(spec) = spec {
            args.push(spec);
        }
    }

    args
}

fn annotation<'s>(param: Node, src: &'s str) -> Option<&'s str> {
    param
        .child_by_field_name("type")
        .and_then(|t| text(t, src))
        .map(str::trim)
}

fn extract_docstring(body: Node, src: &str) -> Option<String> {
    let mut cursor = body.walk();
    let first = body
        .named_children(&mut cursor)
        .find(|n| n.kind() != "comment")?;

    if first.kind() != "expression_statement" || first.named_child_count() != 1 {
        return None;
    }

    let literal = first.named_child(0)?;
    let raw = match literal.kind() {
        "string" => string_literal_value(text(literal, src)?)?,
        // `"a" "b"` is one docstring; any f-string part disqualifies it
        "concatenated_string" => {
            let mut parts = literal.walk();
            let pieces = literal
                .named_children(&mut parts)
                .filter(|n| n.kind() == "string")
                .map(|n| text(n, src).and_then(string_literal_value))
                .collect::<Option<Vec<_>>>()?;
            pieces.concat()
        }
        _ => return None,
    };
    let cleaned = clean_docstring(&raw);

    (!cleaned.is_empty()).then_some(cleaned)
}

fn text<'s>(node: Node, src: &'s str) -> Option<&'s str> {
    node.utf8_text(src.as_bytes()).ok()
}

/* ============================================================
   String literal handling
   ============================================================ */

/// Value of a plain string literal. `None` for f-strings and bytes,
/// which Python does not treat as docstrings.
fn string_literal_value(literal: &str) -> Option<String> {
    let quote_at = literal.find(['"', '\''])?;
    let prefix = literal[..quote_at].to_ascii_lowercase();
    if prefix.contains('f') || prefix.contains('b') {
        return None;
    }

    let body = &literal[quote_at..];
    let inner = ["\"\"\"", "'''", "\"", "'"]
        .iter()
        .find(|q| body.len() >= 2 * q.len() && body.starts_with(**q) && body.ends_with(**q))
        .map(|q| &body[q.len()..body.len() - q.len()])?;

    if prefix.contains('r') {
        Some(inner.to_string())
    } else {
        Some(unescape(inner))
    }
}

/// Common backslash escapes; unknown sequences are kept verbatim.
fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            Some('\n') => {}
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }

    out
}

/// Docstring cleanup following `inspect.cleandoc`: tabs expanded, first
/// line left-stripped, the common indentation of the remaining non-blank
/// lines removed from every later line, then empty lines dropped from both
/// ends. Indentation is counted in chars, and trailing whitespace on inner
/// lines is kept.
pub fn clean_docstring(doc: &str) -> String {
    let expanded: Vec<String> = doc
        .split('\n')
        .map(|l| expand_tabs(l.strip_suffix('\r').unwrap_or(l)))
        .collect();

    let margin = expanded
        .iter()
        .skip(1)
        .filter(|l| !l.trim_start().is_empty())
        .map(|l| l.chars().count() - l.trim_start().chars().count())
        .min();

    let mut lines: Vec<&str> = Vec::with_capacity(expanded.len());
    for (i, line) in expanded.iter().enumerate() {
        lines.push(match (i, margin) {
            (0, _) => line.trim_start(),
            (_, Some(margin)) => skip_chars(line, margin),
            (_, None) => line.as_str(),
        });
    }

    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    let start = lines.iter().position(|l| !l.is_empty()).unwrap_or(lines.len());

    lines[start..].join("\n")
}

fn skip_chars(line: &str, n: usize) -> &str {
    line.char_indices().nth(n).map_or("", |(at, _)| &line[at..])
}

fn expand_tabs(line: &str) -> String {
    const TAB: usize = 8;
    let mut out = String::with_capacity(line.len());
    let mut col = 0;
    for c in line.chars() {
        if c == '\t' {
            let pad = TAB - col % TAB;
            out.extend(std::iter::repeat(' ').take(pad));
            col += pad;
        } else {
            out.push(c);
            col += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn extract(src: &str) -> Vec<FunctionRecord> {
        PythonExtractor::new()
            .unwrap()
            .extract_source(Path::new("sample.py"), src)
            .unwrap()
    }

    #[test]
    fn annotated_signature_round_trips() {
        let recs = extract(
            "def add(a: int, b: int) -> int:\n    \"\"\"Add two numbers.\"\"\"\n    return a + b\n",
        );

        assert_eq!(recs.len(), 1);
        let add = &recs[0];
        assert_eq!(add.name, "add");
        assert_eq!(
            add.args,
            vec![ArgSpec::new("a", Some("int")), ArgSpec::new("b", Some("int"))]
        );
        assert_eq!(add.docstring.as_deref(), Some("Add two numbers."));
        assert_eq!(add.line, 1);
        assert!(!add.is_test);
    }

    #[test]
    fn parameter_kinds() {
        let recs = extract(
            "def f(a, b=1, c: list[str] = None, *args, d: int, **kw):\n    pass\n",
        );

        assert_eq!(
            recs[0].args,
            vec![
                ArgSpec::new("a", None),
                ArgSpec::new("b", None),
                ArgSpec::new("c", Some("list[str]")),
                ArgSpec::new("d", Some("int")),
            ]
        );
        assert_eq!(recs[0].docstring, None);
    }

    #[test]
    fn only_top_level_functions_by_default() {
        let src = "\
import os

@decorator
def outer():
    def inner():
        pass
    return inner

class Box:
    def method(self):
        pass

async def fetch(url: str):
    pass
";
        let names: Vec<_> = extract(src).into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["outer", "fetch"]);
    }

    #[test]
    fn nested_collection_walks_the_whole_tree() {
        let src = "def outer():\n    def inner():\n        pass\n\nclass Box:\n    def method(self):\n        pass\n";
        let recs = PythonExtractor::new()
            .unwrap()
            .include_nested(true)
            .extract_source(Path::new("m.py"), src)
            .unwrap();

        let names: Vec<_> = recs.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["outer", "inner", "method"]);
        assert_eq!(recs[2].line, 6);
    }

    #[test]
    fn decorated_line_is_the_def_line() {
        let recs = extract("@cache\n@other\ndef slow(n):\n    return n\n");
        assert_eq!(recs[0].line, 3);
    }

    #[test]
    fn syntax_error_is_reported() {
        let err = PythonExtractor::new()
            .unwrap()
            .extract_source(Path::new("bad.py"), "def broken(:\n    pass\n")
            .unwrap_err();
        assert!(matches!(err, ExtractError::Syntax { line: 1, .. }));
    }

    #[test]
    fn multiline_docstring_is_cleaned() {
        let src = "def f():\n    # leading comment\n    '''\n    Summary line.\n\n        Indented detail.\n    '''\n";
        let recs = extract(src);
        assert_eq!(
            recs[0].docstring.as_deref(),
            Some("Summary line.\n\n    Indented detail.")
        );
    }

    #[test]
    fn implicitly_concatenated_docstring_is_joined() {
        let recs = extract("def add(a, b):\n    \"Add \" 'two.'\n    return a + b\n");
        assert_eq!(recs[0].docstring.as_deref(), Some("Add two."));

        let recs = extract("def f(x):\n    \"value \" f\"{x}\"\n");
        assert_eq!(recs[0].docstring, None);
    }

    #[test]
    fn cleandoc_keeps_inner_trailing_whitespace() {
        assert_eq!(clean_docstring("Add.\n    more   \n\n    "), "Add.\nmore   ");
        // no indented content below the first line, so nothing is dedented
        assert_eq!(clean_docstring("Add.\n    "), "Add.\n    ");
    }

    #[test]
    fn cleandoc_margin_counts_chars() {
        let doc = "x\n\u{3000}\u{3000}a\n\u{3000}\u{3000}\u{3000}b";
        assert_eq!(clean_docstring(doc), "x\na\n\u{3000}b");
    }

    #[test]
    fn fstring_is_not_a_docstring() {
        let recs = extract("def f(x):\n    f\"value {x}\"\n");
        assert_eq!(recs[0].docstring, None);
    }

    #[test]
    fn escapes_in_plain_strings() {
        assert_eq!(string_literal_value(r#""a\tb""#).as_deref(), Some("a\tb"));
        assert_eq!(string_literal_value(r#"r"a\tb""#).as_deref(), Some(r"a\tb"));
        assert_eq!(string_literal_value(r#"b"x""#), None);
    }
}
