//! Output writers for the aggregated document.
//!
//! - JSON: `output.json`, the document as-is
//! - HTML: `apidoc.html`, routes grouped by method into columns
//! - Pretty: colored terminal summary

use colored::*;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::model::{AggregatedDocument, HttpMethod};

/// File name of the JSON document.
pub const JSON_FILE_NAME: &str = "output.json";
/// File name of the HTML document.
pub const HTML_FILE_NAME: &str = "apidoc.html";

// =============================================================================
// JSON Format
// =============================================================================

/// Serialize the document as pretty-printed JSON.
pub fn render_json(doc: &AggregatedDocument) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(doc)?)
}

/// Write `output.json` into `out_dir`.
pub fn write_json(doc: &AggregatedDocument, out_dir: &Path) -> anyhow::Result<PathBuf> {
    let path = out_dir.join(JSON_FILE_NAME);
    fs::write(&path, render_json(doc)?)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

// =============================================================================
// HTML Format
// =============================================================================

const STYLE: &str = r#"
  body{font-family:Segoe UI, Arial, sans-serif; background:#eef1f7; padding:30px; color:#333;}
  h1{color:#2c3e50; text-align:center; margin-bottom:40px;}
  .server-row{display:flex;justify-content:center;gap:30px;margin-bottom:20px;flex-wrap:wrap;}
  .server-box{background:#fff;padding:15px 25px;border-radius:10px;box-shadow:0 2px 6px rgba(0,0,0,0.1);}
  .column{flex:1;min-width:250px;margin-bottom:20px;}
  .column h2{text-align:center;background:#37353E;color:#fff;padding:10px;border-radius:8px;}
  .endpoint{background:#fff;margin:15px 0;padding:15px;border-radius:10px;box-shadow:0 2px 6px rgba(0,0,0,0.1);}
  .endpoint h3{margin:0;font-size:16px;}
  .method{font-weight:bold;padding:3px 6px;border-radius:4px;color:#fff;}
  .GET{background:#2ecc71;}
  .POST{background:#3498db;}
  .PUT{background:#f39c12;}
  .PATCH{background:#9b59b6;}
  .DELETE{background:#e74c3c;}
  .path{font-family:monospace;margin-left:8px;color:#555;}
  .desc{margin:8px 0;}
  .tag{display:inline-block;padding:3px 6px;font-size:12px;border-radius:5px;background:#ecf0f1;margin:2px;}
"#;

/// Render the HTML page.
///
/// Columns switch to a wrapping flex layout once more than two methods are
/// present.
pub fn render_html(doc: &AggregatedDocument) -> String {
    let groups = doc.routes_by_method();
    let columns_css = if groups.len() > 2 {
        "display:flex;gap:20px;align-items:flex-start;flex-wrap:wrap;"
    } else {
        "display:block;"
    };

    let mut html = String::new();
    html.push_str("<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>API Docs</title>\n  <style>");
    html.push_str(STYLE);
    let _ = writeln!(html, "  .columns{{{}}}", columns_css);
    html.push_str("  </style>\n  </head><body>");
    html.push_str("<h1>API Documentation</h1>");

    html.push_str("<div class=\"server-row\">");
    if let Some(details) = &doc.api_details {
        if let Some(port) = details.port_number.as_ref().filter(|p| p.is_truthy()) {
            let env = if details.is_port_env { "(env)" } else { "" };
            let _ = write!(
                html,
                "<div class=\"server-box\"><b>Port:</b> {} {}</div>",
                escape_html(&port.to_string()),
                env
            );
        }
        if let Some(host) = details.host.as_ref().filter(|h| h.is_truthy()) {
            let _ = write!(
                html,
                "<div class=\"server-box\"><b>Host:</b> {}</div>",
                escape_html(&host.to_string())
            );
        }
        if let Some(backlog) = details.backlog.as_ref().filter(|b| b.is_truthy()) {
            let _ = write!(
                html,
                "<div class=\"server-box\"><b>Backlog:</b> {}</div>",
                escape_html(&backlog.to_string())
            );
        }
    }
    if !doc.middlewares.global.is_empty() {
        html.push_str("<div class=\"server-box\"><b>Global Middleware:</b> ");
        for mw in &doc.middlewares.global {
            push_tag(&mut html, &mw.name);
        }
        html.push_str("</div>");
    }
    html.push_str("</div>");

    html.push_str("<div class=\"columns\">");
    for (method, routes) in &groups {
        let label = method.label();
        let _ = write!(html, "<div class=\"column\"><h2>{}</h2>", label);
        for route in routes {
            html.push_str("<div class=\"endpoint\">");
            let _ = write!(
                html,
                "<h3><span class=\"method {label}\">{label}</span><span class=\"path\">{}</span></h3>",
                escape_html(&route.path)
            );
            if let Some(desc) = route.description.as_deref().filter(|d| !d.is_empty()) {
                let _ = write!(html, "<p class=\"desc\">{}</p>", escape_html(desc));
            }
            if !route.middleware.is_empty() {
                html.push_str("<div><b>Middleware:</b> ");
                for mw in &route.middleware {
                    push_tag(&mut html, mw);
                }
                html.push_str("</div>");
            }
            html.push_str("</div>");
        }
        html.push_str("</div>");
    }
    html.push_str("</div>");
    html.push_str("</body></html>");
    html
}

/// Write `apidoc.html` into `out_dir`.
pub fn write_html(doc: &AggregatedDocument, out_dir: &Path) -> anyhow::Result<PathBuf> {
    let path = out_dir.join(HTML_FILE_NAME);
    fs::write(&path, render_html(doc))
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

fn push_tag(html: &mut String, text: &str) {
    let _ = write!(html, "<span class=\"tag\">{}</span>", escape_html(text));
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Print a human-readable summary of the run.
pub fn write_pretty(root: &str, files_scanned: usize, doc: &AggregatedDocument, written: &[PathBuf]) {
    println!();
    print!("  ");
    print!("{}", "docly".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    print!("  {}", "Scanning: ".dimmed());
    println!("{}", root);
    print!("  {}", "Files:    ".dimmed());
    println!("{}", files_scanned);
    println!();

    match &doc.api_details {
        Some(details) => {
            let port = details
                .port_number
                .as_ref()
                .map(|p| p.to_string())
                .unwrap_or_else(|| "?".to_string());
            print!("  {} {}", "Server".bold(), port);
            if details.is_port_env {
                print!(" {}", "(env)".dimmed());
            }
            if let Some(host) = &details.host {
                print!("  host {}", host);
            }
            println!();
        }
        None => println!("  {}", "No listen() call found".dimmed()),
    }
    println!();

    println!("  {} ({}):", "Routes".bold(), doc.routes.len());
    for route in &doc.routes {
        print!("    ");
        write_method_tag(route.method);
        print!(" {}", route.path);
        if !route.middleware.is_empty() {
            print!("  {}", format!("[{}]", route.middleware.join(", ")).dimmed());
        }
        println!();
    }
    println!();

    for path in written {
        println!("  {} {}", "Wrote".green(), path.display());
    }
    println!();
}

fn write_method_tag(method: HttpMethod) {
    let label = format!("{:<6}", method.label());
    match method {
        HttpMethod::Get => print!("{}", label.green()),
        HttpMethod::Post => print!("{}", label.blue()),
        HttpMethod::Put => print!("{}", label.yellow()),
        HttpMethod::Patch => print!("{}", label.magenta()),
        HttpMethod::Delete => print!("{}", label.red()),
    }
}
