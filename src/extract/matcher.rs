//! Call-site pattern matching.
//!
//! The matcher recognizes a closed set of Express idioms on identifiers with
//! a known role. Every other call shape is skipped without error: dynamic
//! route tables, spread handlers and chained `.route()` builders simply
//! produce no facts.

use crate::extract::bindings::{BindingTable, Role};
use crate::extract::{ExtractOptions, FileExtract};
use crate::model::{
    GlobalMiddleware, HttpMethod, MiddlewarePath, Mount, RouteDeclaration, ServerConfig,
    ANONYMOUS_MIDDLEWARE,
};
use crate::syntax::{Call, Expr};

/// Comment marker that turns a leading comment into a route description.
pub const DESCRIPTION_MARKER: &str = "--Docly--";

/// Classify one call statement and record whatever facts it yields.
pub(crate) fn match_call(
    call: &Call,
    leading_comments: &[String],
    table: &BindingTable,
    options: &ExtractOptions,
    out: &mut FileExtract,
) {
    let Some((object, property)) = call.method_target() else {
        return;
    };
    let Some(role) = table.role(object) else {
        return;
    };
    let args = call.args.as_slice();

    match (role, property) {
        (Role::Server, "use") => server_use(args, out),
        (Role::Server, "listen") => out.server = Some(listen_config(args, table)),
        (Role::Router, "use" | "listen") => {}
        (_, method) => {
            if let Some(method) = HttpMethod::from_property(method) {
                if let Some(route) = route_declaration(object, role, method, args, leading_comments, out) {
                    out.routes.push(route);
                }
            }
        }
    }

    if property == "use" && options.resolve_mounts {
        if let Some(mount) = mount(args) {
            tracing::debug!("{}: {} mounted at {}", out.file.display(), mount.alias, mount.path);
            out.mounts.push(mount);
        }
    }
}

/// `app.use(mw())`, `app.use((req, res, next) => ...)`, `app.use("/p", mw())`.
fn server_use(args: &[Expr], out: &mut FileExtract) {
    match args {
        [arg] => {
            let name = match arg {
                Expr::Call(_) => arg.called_identifier().map(str::to_string),
                Expr::Function => Some(ANONYMOUS_MIDDLEWARE.to_string()),
                Expr::Literal(_)
                | Expr::Identifier(_)
                | Expr::Member { .. }
                | Expr::Fallback { .. }
                | Expr::Other => None,
            };
            if let Some(name) = name {
                out.middlewares.global.push(GlobalMiddleware { name });
            }
        }
        [path, mw] => {
            if let (Some(path), Some(name)) = (path.as_string_literal(), mw.called_identifier()) {
                out.middlewares
                    .local
                    .entry(name.to_string())
                    .or_default()
                    .push(MiddlewarePath {
                        path: path.to_string(),
                    });
            }
        }
        _ => {}
    }
}

/// `app.listen(port, host, backlog)`, each argument a literal or a binding.
fn listen_config(args: &[Expr], table: &BindingTable) -> ServerConfig {
    let resolve = |index: usize| args.get(index).and_then(|arg| table.resolve(arg));
    let is_port_env = args
        .first()
        .and_then(Expr::as_identifier)
        .and_then(|name| table.lookup(name))
        .map(|binding| binding.is_env_default)
        .unwrap_or(false);

    ServerConfig {
        port_number: resolve(0),
        is_port_env,
        host: resolve(1),
        backlog: resolve(2),
    }
}

/// `app.get("/path", mw1, mw2, handler)` and the router equivalent.
fn route_declaration(
    object: &str,
    role: Role,
    method: HttpMethod,
    args: &[Expr],
    leading_comments: &[String],
    out: &FileExtract,
) -> Option<RouteDeclaration> {
    let path = args.first()?.as_string_literal()?;

    let middleware = if args.len() > 2 {
        args[1..args.len() - 1]
            .iter()
            .filter_map(Expr::as_identifier)
            .map(str::to_string)
            .collect()
    } else {
        Vec::new()
    };

    Some(RouteDeclaration {
        path: path.to_string(),
        method,
        router: match role {
            Role::Router => Some(object.to_string()),
            Role::Server => None,
        },
        source_file: out.file.clone(),
        middleware,
        description: description(leading_comments),
    })
}

/// Text of the nearest leading comment carrying the marker, marker removed.
pub fn description(leading_comments: &[String]) -> Option<String> {
    leading_comments
        .iter()
        .rev()
        .find(|c| c.contains(DESCRIPTION_MARKER))
        .map(|c| c.replacen(DESCRIPTION_MARKER, "", 1).trim().to_string())
}

/// `use("/prefix", ..., router)`: a string path first and an identifier last.
fn mount(args: &[Expr]) -> Option<Mount> {
    let [first, .., last] = args else {
        return None;
    };
    let path = first.as_string_literal()?;
    let alias = last.as_identifier()?;
    Some(Mount {
        alias: alias.to_string(),
        path: path.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FrameworkConfig;
    use crate::syntax::Literal;
    use std::path::PathBuf;

    fn ident(name: &str) -> Expr {
        Expr::Identifier(name.to_string())
    }

    fn string(s: &str) -> Expr {
        Expr::Literal(Literal::Str(s.to_string()))
    }

    fn method_call(object: &str, property: &str, args: Vec<Expr>) -> Call {
        Call {
            callee: Box::new(Expr::Member {
                object: Box::new(ident(object)),
                property: property.to_string(),
            }),
            args,
        }
    }

    fn invoke(name: &str) -> Expr {
        Expr::Call(Call {
            callee: Box::new(ident(name)),
            args: Vec::new(),
        })
    }

    fn setup() -> (BindingTable, FileExtract) {
        let framework = FrameworkConfig::default();
        let mut table = BindingTable::new();
        table.declare("app", Some(&invoke("express")), &framework);
        table.declare(
            "router",
            Some(&Expr::Call(Call {
                callee: Box::new(Expr::Member {
                    object: Box::new(ident("express")),
                    property: "Router".to_string(),
                }),
                args: Vec::new(),
            })),
            &framework,
        );
        (table, FileExtract::new(PathBuf::from("/srv/app.js")))
    }

    #[test]
    fn test_route_middleware_positions() {
        let (table, mut out) = setup();
        let options = ExtractOptions::default();

        let call = method_call("app", "get", vec![string("/x"), ident("auth"), ident("log"), ident("handler")]);
        match_call(&call, &[], &table, &options, &mut out);
        let call = method_call("app", "get", vec![string("/y"), ident("handler")]);
        match_call(&call, &[], &table, &options, &mut out);

        assert_eq!(out.routes[0].middleware, vec!["auth", "log"]);
        assert!(out.routes[1].middleware.is_empty());
        assert_eq!(out.routes[0].router, None);
    }

    #[test]
    fn test_router_attribution_and_description() {
        let (table, mut out) = setup();
        let comments = vec![" --Docly-- Returns health status ".to_string()];
        let call = method_call("router", "post", vec![string("/health"), Expr::Function]);
        match_call(&call, &comments, &table, &ExtractOptions::default(), &mut out);

        let route = &out.routes[0];
        assert_eq!(route.method, HttpMethod::Post);
        assert_eq!(route.router.as_deref(), Some("router"));
        assert_eq!(route.description.as_deref(), Some("Returns health status"));
    }

    #[test]
    fn test_non_literal_path_is_skipped() {
        let (table, mut out) = setup();
        let call = method_call("app", "get", vec![ident("PATH"), ident("handler")]);
        match_call(&call, &[], &table, &ExtractOptions::default(), &mut out);
        let call = method_call("unknown", "get", vec![string("/x"), ident("handler")]);
        match_call(&call, &[], &table, &ExtractOptions::default(), &mut out);
        assert!(out.routes.is_empty());
    }

    #[test]
    fn test_global_and_local_middleware() {
        let (table, mut out) = setup();
        let options = ExtractOptions::default();
        match_call(&method_call("app", "use", vec![invoke("cors")]), &[], &table, &options, &mut out);
        match_call(&method_call("app", "use", vec![Expr::Function]), &[], &table, &options, &mut out);
        match_call(&method_call("app", "use", vec![ident("helmet")]), &[], &table, &options, &mut out);
        match_call(
            &method_call("app", "use", vec![string("/admin"), invoke("requireAdmin")]),
            &[],
            &table,
            &options,
            &mut out,
        );
        // Routers never register middleware.
        match_call(&method_call("router", "use", vec![invoke("cors")]), &[], &table, &options, &mut out);

        let names: Vec<_> = out.middlewares.global.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["cors", ANONYMOUS_MIDDLEWARE]);
        assert_eq!(
            out.middlewares.local["requireAdmin"],
            vec![MiddlewarePath { path: "/admin".to_string() }]
        );
    }

    #[test]
    fn test_listen_resolves_bindings() {
        let (mut table, mut out) = setup();
        let framework = FrameworkConfig::default();
        table.declare("backlog", Some(&Expr::Literal(Literal::Int(511))), &framework);
        let call = method_call("app", "listen", vec![ident("port"), string("localhost"), ident("backlog")]);
        match_call(&call, &[], &table, &ExtractOptions::default(), &mut out);

        let server = out.server.unwrap();
        assert_eq!(server.port_number, None);
        assert!(!server.is_port_env);
        assert_eq!(server.host, Some(Literal::Str("localhost".to_string())));
        assert_eq!(server.backlog, Some(Literal::Int(511)));
    }

    #[test]
    fn test_mounts_only_when_enabled() {
        let (table, mut out) = setup();
        let call = method_call("app", "use", vec![string("/users"), ident("usersRouter")]);

        match_call(&call, &[], &table, &ExtractOptions::default(), &mut out);
        assert!(out.mounts.is_empty());

        let options = ExtractOptions {
            resolve_mounts: true,
            ..Default::default()
        };
        match_call(&call, &[], &table, &options, &mut out);
        let nested = method_call("router", "use", vec![string("/v1"), ident("auth"), ident("v1")]);
        match_call(&nested, &[], &table, &options, &mut out);

        assert_eq!(
            out.mounts,
            vec![
                Mount { alias: "usersRouter".to_string(), path: "/users".to_string() },
                Mount { alias: "v1".to_string(), path: "/v1".to_string() },
            ]
        );
    }

    #[test]
    fn test_description_picks_nearest_marker() {
        let comments = vec![
            "--Docly-- older".to_string(),
            " unrelated".to_string(),
            "--Docly--   newer  ".to_string(),
        ];
        assert_eq!(description(&comments).as_deref(), Some("newer"));
        assert_eq!(description(&[" plain".to_string()]), None);
    }
}
