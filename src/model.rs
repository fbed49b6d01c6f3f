//! Facts extracted from source files and the merged document.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::syntax::Literal;

/// Placeholder name for middleware registered as an inline function.
pub const ANONYMOUS_MIDDLEWARE: &str = "Anonymous Middleware";

/// HTTP methods recognized on route registrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    /// Map a router/app property name (`get`, `post`, ...) to a method.
    pub fn from_property(name: &str) -> Option<Self> {
        match name {
            "get" => Some(HttpMethod::Get),
            "post" => Some(HttpMethod::Post),
            "put" => Some(HttpMethod::Put),
            "patch" => Some(HttpMethod::Patch),
            "delete" => Some(HttpMethod::Delete),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Patch => "patch",
            HttpMethod::Delete => "delete",
        }
    }

    /// Uppercase label used for grouping in rendered output.
    pub fn label(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A route registered on an app or router.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDeclaration {
    pub path: String,
    pub method: HttpMethod,
    /// Declaring router binding, `None` for routes declared on the app.
    pub router: Option<String>,
    pub source_file: PathBuf,
    /// Identifier arguments between the path and the final handler.
    pub middleware: Vec<String>,
    pub description: Option<String>,
}

/// Server settings taken from an `app.listen(port, host, backlog)` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    pub port_number: Option<Literal>,
    pub is_port_env: bool,
    pub host: Option<Literal>,
    pub backlog: Option<Literal>,
}

/// Middleware registered with `app.use(mw())` or `app.use(fn)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GlobalMiddleware {
    pub name: String,
}

/// One path a local middleware is mounted on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MiddlewarePath {
    pub path: String,
}

/// Global and path-scoped middleware registrations.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Middlewares {
    pub global: Vec<GlobalMiddleware>,
    pub local: BTreeMap<String, Vec<MiddlewarePath>>,
}

/// `app.use("/path", router)`: the local name `alias` is mounted at `path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mount {
    pub alias: String,
    pub path: String,
}

/// The merged result of a run, handed to the report writers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedDocument {
    /// Serialized as `{}` when no file started the server.
    #[serde(serialize_with = "serialize_api_details")]
    pub api_details: Option<ServerConfig>,
    pub routes: Vec<RouteDeclaration>,
    pub middlewares: Middlewares,
}

impl AggregatedDocument {
    /// Routes grouped by method, preserving first-seen method order.
    pub fn routes_by_method(&self) -> Vec<(HttpMethod, Vec<&RouteDeclaration>)> {
        let mut groups: Vec<(HttpMethod, Vec<&RouteDeclaration>)> = Vec::new();
        for route in &self.routes {
            match groups.iter_mut().find(|(m, _)| *m == route.method) {
                Some((_, routes)) => routes.push(route),
                None => groups.push((route.method, vec![route])),
            }
        }
        groups
    }
}

fn serialize_api_details<S>(details: &Option<ServerConfig>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match details {
        Some(config) => config.serialize(serializer),
        None => serializer.serialize_map(Some(0))?.end(),
    }
}
