//! Lowering of tree-sitter nodes into the typed syntax model.
//!
//! The JavaScript and TypeScript grammars share node kinds for every
//! construct handled here, so one walker serves both.

use tree_sitter::Node;

use super::{Call, Expr, Literal, ParsedFile, Statement};

/// Walk the whole tree in pre-order and collect statements in source order.
///
/// Statements nested inside functions and callbacks are included, in the
/// position their first token appears.
pub(super) fn statements(parsed: &ParsedFile) -> Vec<Statement> {
    let lowerer = Lowerer { parsed };
    let mut out = Vec::new();
    let mut cursor = parsed.tree.walk();

    loop {
        if let Some(stmt) = lowerer.statement(cursor.node()) {
            out.push(stmt);
        }
        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return out;
            }
        }
    }
}

struct Lowerer<'a> {
    parsed: &'a ParsedFile,
}

impl<'a> Lowerer<'a> {
    fn text(&self, node: Node) -> &'a str {
        self.parsed.node_text(node)
    }

    fn statement(&self, node: Node) -> Option<Statement> {
        match node.kind() {
            "import_statement" => self.import(node),
            "lexical_declaration" | "variable_declaration" => self.declaration(node),
            "expression_statement" => {
                let expr = first_named_child(node)?;
                if expr.kind() != "call_expression" {
                    return None;
                }
                Some(Statement::Call {
                    call: self.call(expr)?,
                    leading_comments: self.leading_comments(node),
                    line: node.start_position().row + 1,
                })
            }
            _ => None,
        }
    }

    fn import(&self, node: Node) -> Option<Statement> {
        let mut cursor = node.walk();
        let children: Vec<Node> = node.named_children(&mut cursor).collect();

        // import x = require("./x")
        if let Some(clause) = children.iter().find(|n| n.kind() == "import_require_clause") {
            let alias = first_named_child(*clause).filter(|n| n.kind() == "identifier")?;
            let source = clause.child_by_field_name("source")?;
            return Some(Statement::Import {
                alias: self.text(alias).to_string(),
                source: unquote(self.text(source)),
            });
        }

        let source = node.child_by_field_name("source")?;
        let clause = children.iter().find(|n| n.kind() == "import_clause")?;
        let alias = self.import_alias(*clause)?;
        Some(Statement::Import {
            alias,
            source: unquote(self.text(source)),
        })
    }

    /// Local name of the first specifier in an import clause.
    fn import_alias(&self, clause: Node) -> Option<String> {
        let first = first_named_child(clause)?;
        match first.kind() {
            "identifier" => Some(self.text(first).to_string()),
            "namespace_import" => first_named_child(first).map(|n| self.text(n).to_string()),
            "named_imports" => {
                let mut cursor = first.walk();
                let spec = first
                    .named_children(&mut cursor)
                    .find(|n| n.kind() == "import_specifier")?;
                let local = spec
                    .child_by_field_name("alias")
                    .or_else(|| spec.child_by_field_name("name"))?;
                Some(self.text(local).to_string())
            }
            _ => None,
        }
    }

    fn declaration(&self, node: Node) -> Option<Statement> {
        let mut cursor = node.walk();
        let declarators: Vec<Node> = node
            .named_children(&mut cursor)
            .filter(|n| n.kind() == "variable_declarator")
            .collect();
        let [declarator] = declarators.as_slice() else {
            return None;
        };

        let name = declarator.child_by_field_name("name")?;
        if name.kind() != "identifier" {
            return None;
        }
        let init = declarator.child_by_field_name("value").map(|v| self.expr(v));

        Some(Statement::Declaration {
            name: self.text(name).to_string(),
            init,
        })
    }

    fn expr(&self, node: Node) -> Expr {
        match node.kind() {
            "string" => Expr::Literal(Literal::Str(unquote(self.text(node)))),
            "number" => parse_number(self.text(node))
                .map(Expr::Literal)
                .unwrap_or(Expr::Other),
            "true" => Expr::Literal(Literal::Bool(true)),
            "false" => Expr::Literal(Literal::Bool(false)),
            "identifier" => Expr::Identifier(self.text(node).to_string()),
            "member_expression" => {
                let object = node.child_by_field_name("object");
                let property = node.child_by_field_name("property");
                match (object, property) {
                    (Some(object), Some(property)) => Expr::Member {
                        object: Box::new(self.expr(object)),
                        property: self.text(property).to_string(),
                    },
                    _ => Expr::Other,
                }
            }
            "subscript_expression" => {
                let object = node.child_by_field_name("object");
                let index = node
                    .child_by_field_name("index")
                    .filter(|n| n.kind() == "string");
                match (object, index) {
                    (Some(object), Some(index)) => Expr::Member {
                        object: Box::new(self.expr(object)),
                        property: unquote(self.text(index)),
                    },
                    _ => Expr::Other,
                }
            }
            "call_expression" => self.call(node).map(Expr::Call).unwrap_or(Expr::Other),
            "arrow_function" | "function_expression" | "function" => Expr::Function,
            "binary_expression" => {
                let operator = node.child_by_field_name("operator").map(|n| n.kind());
                let left = node.child_by_field_name("left");
                let right = node.child_by_field_name("right");
                match (operator, left, right) {
                    (Some("||" | "??"), Some(left), Some(right)) => Expr::Fallback {
                        left: Box::new(self.expr(left)),
                        right: Box::new(self.expr(right)),
                    },
                    _ => Expr::Other,
                }
            }
            "parenthesized_expression" => first_named_child(node)
                .map(|inner| self.expr(inner))
                .unwrap_or(Expr::Other),
            _ => Expr::Other,
        }
    }

    fn call(&self, node: Node) -> Option<Call> {
        let callee = node.child_by_field_name("function")?;
        let args = match node.child_by_field_name("arguments") {
            Some(args) if args.kind() == "arguments" => {
                let mut cursor = args.walk();
                args.named_children(&mut cursor)
                    .filter(|n| n.kind() != "comment")
                    .map(|n| self.expr(n))
                    .collect()
            }
            _ => Vec::new(),
        };
        Some(Call {
            callee: Box::new(self.expr(callee)),
            args,
        })
    }

    /// Comments directly preceding a statement, nearest last.
    fn leading_comments(&self, node: Node) -> Vec<String> {
        let mut comments = Vec::new();
        let mut prev = node.prev_sibling();
        while let Some(sibling) = prev {
            if sibling.kind() != "comment" {
                break;
            }
            comments.push(comment_body(self.text(sibling)).to_string());
            prev = sibling.prev_sibling();
        }
        comments.reverse();
        comments
    }
}

fn first_named_child(node: Node) -> Option<Node> {
    let mut cursor = node.walk();
    let first = node
        .named_children(&mut cursor)
        .find(|n| n.kind() != "comment");
    first
}

/// Strip comment delimiters, keeping the inner text untouched.
fn comment_body(text: &str) -> &str {
    if let Some(rest) = text.strip_prefix("//") {
        rest
    } else if let Some(rest) = text.strip_prefix("/*") {
        rest.strip_suffix("*/").unwrap_or(rest)
    } else {
        text
    }
}

/// Remove surrounding quotes and decode the common escape sequences.
fn unquote(raw: &str) -> String {
    let inner = raw
        .strip_prefix(['"', '\''])
        .and_then(|s| s.strip_suffix(['"', '\'']))
        .unwrap_or(raw);

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('\n') => {}
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Parse a JS numeric literal (decimal, float, hex/octal/binary, separators).
fn parse_number(raw: &str) -> Option<Literal> {
    let text = raw.replace('_', "");
    if text.ends_with('n') {
        // BigInt literals have no JSON number representation.
        return None;
    }

    let radix = match text.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return i64::from_str_radix(&text[2..], radix).ok().map(Literal::Int);
    }

    if let Ok(n) = text.parse::<i64>() {
        return Some(Literal::Int(n));
    }
    let value = text.parse::<f64>().ok()?;
    // `1e3` and `5.0` are integers in JS and serialize without a fraction.
    if value.is_finite() && value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64 {
        return Some(Literal::Int(value as i64));
    }
    Some(Literal::Float(value))
}
