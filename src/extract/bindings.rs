//! Per-file binding table: declared names, resolved literal values and
//! framework roles.
//!
//! The table is filled in declaration order while the file is being walked,
//! and every lookup sees only what has been declared so far. A name used
//! before its declaration therefore resolves to `None`.

use std::collections::HashSet;

use crate::config::FrameworkConfig;
use crate::syntax::{Expr, Literal};

/// One variable declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub name: String,
    pub value: Option<Literal>,
    /// Value is the literal fallback of a `process.env.X || literal` expression.
    pub is_env_default: bool,
}

/// Framework role carried by a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// The application instance returned by the app factory.
    Server,
    /// A sub-router returned by the router factory.
    Router,
}

/// Bindings and role sets for a single file.
#[derive(Debug, Clone, Default)]
pub struct BindingTable {
    bindings: Vec<Binding>,
    servers: HashSet<String>,
    routers: HashSet<String>,
}

impl BindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a declaration and tag its role, if any.
    pub fn declare(&mut self, name: &str, init: Option<&Expr>, framework: &FrameworkConfig) {
        let (value, is_env_default) = match init {
            Some(expr) => initial_value(expr),
            None => (None, false),
        };
        self.bindings.push(Binding {
            name: name.to_string(),
            value,
            is_env_default,
        });

        match init.and_then(|expr| factory_role(expr, framework)) {
            Some(Role::Server) => {
                self.servers.insert(name.to_string());
            }
            Some(Role::Router) => {
                self.routers.insert(name.to_string());
            }
            None => {}
        }
    }

    /// First binding declared under `name`.
    pub fn lookup(&self, name: &str) -> Option<&Binding> {
        self.bindings.iter().find(|b| b.name == name)
    }

    /// Resolve an argument: a literal directly, an identifier through the table.
    pub fn resolve(&self, expr: &Expr) -> Option<Literal> {
        match expr {
            Expr::Literal(lit) => Some(lit.clone()),
            Expr::Identifier(name) => self.lookup(name).and_then(|b| b.value.clone()),
            Expr::Member { .. }
            | Expr::Call(_)
            | Expr::Function
            | Expr::Fallback { .. }
            | Expr::Other => None,
        }
    }

    /// Role of `name`. Router takes precedence if a name was tagged both ways.
    pub fn role(&self, name: &str) -> Option<Role> {
        if self.routers.contains(name) {
            Some(Role::Router)
        } else if self.servers.contains(name) {
            Some(Role::Server)
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }
}

/// Value and env flag for an initializer.
fn initial_value(init: &Expr) -> (Option<Literal>, bool) {
    match init {
        Expr::Fallback { left, right } => {
            let other = match (left.is_env_lookup(), right.is_env_lookup()) {
                (true, false) => right,
                (false, true) => left,
                _ => return (None, false),
            };
            let value = match other.as_ref() {
                Expr::Literal(lit) => Some(lit.clone()),
                _ => None,
            };
            (value, true)
        }
        Expr::Literal(lit) => (Some(lit.clone()), false),
        Expr::Identifier(_)
        | Expr::Member { .. }
        | Expr::Call(_)
        | Expr::Function
        | Expr::Other => (None, false),
    }
}

/// Detect `express()` and `express.Router()` (with configured names).
fn factory_role(init: &Expr, framework: &FrameworkConfig) -> Option<Role> {
    let Expr::Call(call) = init else {
        return None;
    };
    match call.callee.as_ref() {
        Expr::Identifier(name) if *name == framework.app_factory => Some(Role::Server),
        Expr::Member { object, property }
            if object.as_identifier() == Some(framework.app_factory.as_str())
                && *property == framework.router_factory =>
        {
            Some(Role::Router)
        }
        _ => None,
    }
}
