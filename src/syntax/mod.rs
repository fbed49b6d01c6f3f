//! Typed syntax model for the constructs the extractor understands.
//!
//! Tree-sitter nodes are lowered once into these closed variants, so the
//! binding builder and call-site matcher dispatch with exhaustive `match`
//! instead of probing raw node kinds.
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────────┐
//! │ Source text │────▶│ tree-sitter  │────▶│ Vec<Statement>   │
//! └─────────────┘     │ (js / ts)    │     │ (source order)   │
//!                     └──────────────┘     └──────────────────┘
//! ```

mod languages;
mod lower;

pub use languages::{parse_file, parse_source, ParsedFile, SourceLanguage};

use std::fmt;

use serde::Serialize;

/// A literal value the extractor can carry into the output document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Literal {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Literal {
    /// Returns the string payload, if this is a string literal.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Whether the value counts as "set" when rendering (non-empty, non-zero, true).
    pub fn is_truthy(&self) -> bool {
        match self {
            Literal::Str(s) => !s.is_empty(),
            Literal::Int(n) => *n != 0,
            Literal::Float(f) => *f != 0.0 && !f.is_nan(),
            Literal::Bool(b) => *b,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Str(s) => write!(f, "{}", s),
            Literal::Int(n) => write!(f, "{}", n),
            Literal::Float(x) => write!(f, "{}", x),
            Literal::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// Expression shapes relevant to route extraction.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    Identifier(String),
    /// `object.property`, or `object["property"]` with a string index.
    Member { object: Box<Expr>, property: String },
    Call(Call),
    /// Arrow function or function expression.
    Function,
    /// `left || right` or `left ?? right`.
    Fallback { left: Box<Expr>, right: Box<Expr> },
    Other,
}

impl Expr {
    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Expr::Identifier(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_string_literal(&self) -> Option<&str> {
        match self {
            Expr::Literal(lit) => lit.as_str(),
            _ => None,
        }
    }

    /// Name of the callee when this is a call like `name(...)`.
    pub fn called_identifier(&self) -> Option<&str> {
        match self {
            Expr::Call(call) => call.callee.as_identifier(),
            _ => None,
        }
    }

    /// Whether this is an environment lookup of the form `process.env.NAME`.
    pub fn is_env_lookup(&self) -> bool {
        let Expr::Member { object, .. } = self else {
            return false;
        };
        match object.as_ref() {
            Expr::Member { object, property } => {
                property == "env" && object.as_identifier() == Some("process")
            }
            _ => false,
        }
    }
}

/// A call expression with its lowered arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub callee: Box<Expr>,
    pub args: Vec<Expr>,
}

impl Call {
    /// Splits a `receiver.method(...)` callee into its parts.
    pub fn method_target(&self) -> Option<(&str, &str)> {
        match self.callee.as_ref() {
            Expr::Member { object, property } => {
                object.as_identifier().map(|obj| (obj, property.as_str()))
            }
            _ => None,
        }
    }
}

/// Statements visited by the extractor, in source order.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `import alias from "source"`; alias is the first specifier's local name.
    Import { alias: String, source: String },
    /// A variable declaration with exactly one declarator bound to an identifier.
    Declaration { name: String, init: Option<Expr> },
    /// An expression statement whose expression is a call.
    Call {
        call: Call,
        leading_comments: Vec<String>,
        line: usize,
    },
}
