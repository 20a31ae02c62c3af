//! HTML fragment rendering.
//!
//! The rendered surface is three small fragments, built with `format!`:
//! the bootstrap page embedding the secure iframe, the read-only value
//! view, and the input form. The `css` query parameter is passed through
//! into a `<style>` block unsanitized — a known risk inherited from the
//! embedding contract, where the embedding caller supplies its own
//! styling.

use serde_json::Value;

/// Render the bootstrap page: an iframe pointed at the secure endpoint,
/// carrying the one-time token (and the css passthrough) in its query
/// string.
#[must_use]
pub fn buffer_page(
    route_prefix: &str,
    key_paths: &str,
    token: &str,
    css: Option<&str>,
) -> String {
    let mut src = format!(
        "/{route_prefix}/secure/{key_paths}?token={}",
        urlencoding::encode(token)
    );
    if let Some(css) = css {
        src.push_str("&css=");
        src.push_str(&urlencoding::encode(css));
    }

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n</head>\n<body>\n\
         <iframe class=\"framegate-buffer\" src=\"{}\" frameborder=\"0\"></iframe>\n\
         </body>\n</html>\n",
        escape(&src)
    )
}

/// Render the secure read-only view: one span per resolved key path.
#[must_use]
pub fn info_page(values: &[(&str, &Value)], css: Option<&str>) -> String {
    let spans: String = values
        .iter()
        .map(|(path, value)| {
            format!(
                "<span class=\"framegate-value\" data-key-path=\"{}\">{}</span>\n",
                escape(path),
                escape(&value_text(value))
            )
        })
        .collect();

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n{}</head>\n<body>\n{spans}</body>\n</html>\n",
        style_block(css)
    )
}

/// Render the secure input form. The form POSTs the `input-text` field
/// back to the secure endpoint with a fresh token in the query string.
#[must_use]
pub fn input_page(key_path: &str, value: &str, token: &str, css: Option<&str>) -> String {
    let action = format!(
        "/input/secure/{key_path}?token={}",
        urlencoding::encode(token)
    );

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n{}</head>\n<body>\n\
         <form class=\"framegate-input\" method=\"POST\" action=\"{}\">\n\
         <input type=\"text\" name=\"input-text\" value=\"{}\">\n\
         <button type=\"submit\">Save</button>\n\
         </form>\n</body>\n</html>\n",
        style_block(css),
        escape(&action),
        escape(value)
    )
}

/// A JSON value as user-facing text: strings bare, everything else as
/// compact JSON.
#[must_use]
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn style_block(css: Option<&str>) -> String {
    // Deliberately unescaped; see module docs.
    css.map(|css| format!("<style>{css}</style>\n"))
        .unwrap_or_default()
}

/// Minimal HTML attribute/text escaping.
fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn buffer_page_embeds_token_and_path() {
        let html = buffer_page("info", "a.b", "deadbeef", None);
        assert!(html.contains("/info/secure/a.b?token=deadbeef"));
        assert!(html.contains("<iframe"));
    }

    #[test]
    fn buffer_page_carries_css_passthrough() {
        let html = buffer_page("input", "a", "t0k3n", Some("p { color: red }"));
        assert!(html.contains("&amp;css=p%20%7B%20color%3A%20red%20%7D"));
    }

    #[test]
    fn info_page_renders_each_value() {
        let one = json!(1);
        let two = json!("two");
        let html = info_page(&[("a.x", &one), ("b", &two)], None);
        assert!(html.contains(">1</span>"));
        assert!(html.contains(">two</span>"));
    }

    #[test]
    fn info_page_injects_css_verbatim() {
        let v = json!("v");
        let html = info_page(&[("a", &v)], Some("span { font-weight: bold }"));
        assert!(html.contains("<style>span { font-weight: bold }</style>"));
    }

    #[test]
    fn input_page_escapes_the_value_attribute() {
        let html = input_page("a.b", "\"><script>", "t", None);
        assert!(!html.contains("\"><script>"));
        assert!(html.contains("&quot;&gt;&lt;script&gt;"));
    }

    #[test]
    fn input_page_posts_to_secure_endpoint_with_fresh_token() {
        let html = input_page("a.b", "v", "fresh", None);
        assert!(html.contains("action=\"/input/secure/a.b?token=fresh\""));
        assert!(html.contains("name=\"input-text\""));
    }

    #[test]
    fn scalars_render_bare_and_composites_as_json() {
        assert_eq!(value_text(&json!("s")), "s");
        assert_eq!(value_text(&json!(3)), "3");
        assert_eq!(value_text(&json!({"a": 1})), "{\"a\":1}");
    }
}
