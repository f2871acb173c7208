//! HTML helper functions

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Truncate a string longer than `limit` chars to its first `keep` chars
/// followed by `omission`
///
/// # Examples
/// ```ignore
/// truncate("Hello World", 8, 5, "...") // -> "Hello..."
/// ```
pub fn truncate(s: &str, limit: usize, keep: usize, omission: &str) -> String {
    if s.chars().count() <= limit {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(keep).collect();
        format!("{}{}", truncated, omission)
    }
}

/// Build a `<script>` tag with attributes in the given order.
///
/// `None` values produce bare boolean attributes such as `async`.
pub fn script_tag(attrs: &[(&str, Option<&str>)]) -> String {
    let mut tag = String::from("<script");
    for (name, value) in attrs {
        tag.push(' ');
        tag.push_str(name);
        if let Some(value) = value {
            tag.push_str(&format!(r#"="{}""#, html_escape(value)));
        }
    }
    tag.push_str("></script>");
    tag
}
