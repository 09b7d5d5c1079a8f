//! Client-side redirect document.

/// Final affiliate URL plus the HTML page that sends the visitor there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectPayload {
    pub target_url: String,
    pub html: String,
}

impl RedirectPayload {
    /// Content type the host must send with `html`.
    pub const CONTENT_TYPE: &'static str = "text/html; charset=utf-8";

    /// Value for the `X-Robots-Tag` response header.
    pub const ROBOTS: &'static str = "noindex, nofollow";

    pub fn new(target_url: String) -> Self {
        let html = render(&target_url);
        Self { target_url, html }
    }
}

/// Render the redirect page: meta refresh, script redirect and a visible
/// fallback link, marked noindex/nofollow.
pub fn render(target_url: &str) -> String {
    let attr_url = escape_html(target_url);
    let script_url = script_string(target_url);

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Redirecting...</title>
    <meta name="robots" content="{robots}">
    <meta http-equiv="refresh" content="0; url={attr_url}">
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif;
               line-height: 1.5; padding: 2rem; text-align: center; }}
        .container {{ max-width: 600px; margin: 0 auto; }}
        .spinner {{ width: 40px; height: 40px; margin: 20px auto;
                   border: 3px solid #f3f3f3; border-top: 3px solid #3498db;
                   border-radius: 50%; animation: spin 1s linear infinite; }}
        @keyframes spin {{ 0% {{ transform: rotate(0deg); }}
                          100% {{ transform: rotate(360deg); }} }}
    </style>
    <script>
        window.location.href = {script_url};
    </script>
</head>
<body>
    <div class="container">
        <h1>Redirecting...</h1>
        <div class="spinner"></div>
        <p>If you are not redirected automatically, <a href="{attr_url}" rel="nofollow">click here</a>.</p>
    </div>
</body>
</html>
"#,
        robots = RedirectPayload::ROBOTS,
    )
}

/// Escape text for an HTML attribute or element body.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// JSON string literal that is safe inside a `<script>` element.
fn script_string(text: &str) -> String {
    serde_json::Value::String(text.to_string())
        .to_string()
        .replace('/', "\\/")
}
