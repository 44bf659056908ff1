//! Local web server for trying the widget in a browser
//!
//! Serves a form page; submitting it renders the short summary or the full
//! table into the page's `fitblast` element.

use anyhow::Result;
use tiny_http::{Header, Response, Server};

use crate::config::Config;
use crate::loader::{load_view, HttpBackend, SearchBackend};
use crate::page::HtmlPage;
use crate::render::View;

const WIDGET_ID: &str = "fitblast";

/// Start the web server and handle requests until interrupted
pub fn start_server(server_root: &str, config: &Config, port: u16, open_browser: bool) -> Result<()> {
    let backend = HttpBackend::from_config(config)?;

    let addr = format!("127.0.0.1:{}", port);
    let server = Server::http(&addr).map_err(|e| anyhow::anyhow!("Failed to start server: {}", e))?;

    let url = format!("http://localhost:{}", port);
    log::info!("Server running at {} (searching {})", url, server_root);
    log::info!("Press Ctrl+C to stop");

    if open_browser {
        if let Err(e) = webbrowser::open(&url) {
            log::warn!("Could not open browser: {}. Please open {} manually.", e, url);
        }
    }

    let html_header = Header::from_bytes(&b"Content-Type"[..], &b"text/html; charset=utf-8"[..])
        .map_err(|_| anyhow::anyhow!("Invalid Content-Type header"))?;

    for request in server.incoming_requests() {
        let (status, body) = route(request.url(), server_root, config, &backend);
        log::debug!("{} {} -> {}", request.method(), request.url(), status);

        let response = Response::from_string(body)
            .with_status_code(status)
            .with_header(html_header.clone());
        if let Err(e) = request.respond(response) {
            log::error!("Failed to send response: {}", e);
        }
    }

    Ok(())
}

/// Handle one request path, returning the status code and HTML body
fn route<B: SearchBackend + ?Sized>(
    path: &str,
    server_root: &str,
    config: &Config,
    backend: &B,
) -> (u16, String) {
    let Ok(url) = reqwest::Url::parse(&format!("http://localhost{}", path)) else {
        return (400, "Bad request".to_string());
    };

    let view = match url.path() {
        "/" | "/index.html" => return (200, form_page("", View::Short).into_string()),
        "/short" => View::Short,
        "/table" => View::Table,
        _ => return (404, "Not found".to_string()),
    };

    let sequence: String = url
        .query_pairs()
        .find(|(key, _)| key == "seq")
        .map(|(_, value)| value.chars().filter(|c| !c.is_whitespace()).collect())
        .unwrap_or_default();
    if sequence.is_empty() {
        return (200, form_page("", view).into_string());
    }

    let mut page = form_page(&sequence, view);
    // Errors are already rendered into the page
    if let Err(e) = load_view(view, &mut page, backend, WIDGET_ID, server_root, &sequence, config) {
        log::debug!("{} search for {} residues failed: {}", view, sequence.len(), e);
    }
    (200, page.into_string())
}

/// Page with a query form and an empty widget element
fn form_page(sequence: &str, view: View) -> HtmlPage {
    let checked = |v: View| if v == view { " checked" } else { "" };
    HtmlPage::new(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Fitness BLAST</title>
    <style>
        body {{ font-family: Arial, Helvetica, sans-serif; margin: 20px; }}
        textarea {{ width: 100%; max-width: 800px; font-family: monospace; }}
        table.fitblast {{ border-collapse: collapse; margin-top: 12px; }}
        table.fitblast th, table.fitblast td {{ padding: 2px 6px; text-align: left; }}
    </style>
</head>
<body>
<h2>Fitness BLAST</h2>
<form method="get" action="/short" onsubmit="this.action = '/' + this.view.value;">
    <textarea name="seq" rows="6" placeholder="Protein sequence">{}</textarea><br>
    <label><input type="radio" name="view" value="short"{}> Summary</label>
    <label><input type="radio" name="view" value="table"{}> Table</label>
    <button type="submit">Search</button>
</form>
<div id="{}"></div>
</body>
</html>
"#,
        html_escape(sequence),
        checked(View::Short),
        checked(View::Table),
        WIDGET_ID
    ))
}

/// Minimal HTML entity escaping for user-supplied text
fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
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
