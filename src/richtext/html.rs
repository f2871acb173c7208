//! HTML serialization of rich text

use super::{Block, Link, RichText, Span, SpanKind, TextBlock};
use crate::helpers::{html_escape, post_path};

/// Serialize rich text to HTML.
///
/// Consecutive list items are grouped into a single `<ul>` or `<ol>`.
pub fn as_html(rich_text: &RichText) -> String {
    let mut out = String::new();
    let mut open_list: Option<&'static str> = None;

    for block in rich_text.blocks() {
        let list = match block {
            Block::ListItem(_) => Some("ul"),
            Block::OrderedListItem(_) => Some("ol"),
            _ => None,
        };

        if open_list != list {
            if let Some(tag) = open_list {
                out.push_str(&format!("</{}>", tag));
            }
            if let Some(tag) = list {
                out.push_str(&format!("<{}>", tag));
            }
            open_list = list;
        }

        match block {
            Block::Paragraph(t) => wrap(&mut out, "p", t),
            Block::Heading1(t) => wrap(&mut out, "h1", t),
            Block::Heading2(t) => wrap(&mut out, "h2", t),
            Block::Heading3(t) => wrap(&mut out, "h3", t),
            Block::Heading4(t) => wrap(&mut out, "h4", t),
            Block::Heading5(t) => wrap(&mut out, "h5", t),
            Block::Heading6(t) => wrap(&mut out, "h6", t),
            Block::Preformatted(t) => wrap(&mut out, "pre", t),
            Block::ListItem(t) | Block::OrderedListItem(t) => wrap(&mut out, "li", t),
            Block::Image(image) => {
                let alt = image.alt.as_deref().unwrap_or("");
                let copyright = image
                    .copyright
                    .as_deref()
                    .map(|c| format!(r#" copyright="{}""#, html_escape(c)))
                    .unwrap_or_default();
                out.push_str(&format!(
                    r#"<p class="block-img"><img src="{}" alt="{}"{} /></p>"#,
                    html_escape(&image.url),
                    html_escape(alt),
                    copyright
                ));
            }
            Block::Embed(embed) => {
                let oembed = &embed.oembed;
                out.push_str(&format!(
                    r#"<div data-oembed="{}" data-oembed-type="{}">{}</div>"#,
                    html_escape(oembed.embed_url.as_deref().unwrap_or("")),
                    html_escape(oembed.kind.as_deref().unwrap_or("")),
                    oembed.html.as_deref().unwrap_or("")
                ));
            }
            Block::Unknown => {}
        }
    }

    if let Some(tag) = open_list {
        out.push_str(&format!("</{}>", tag));
    }

    out
}

fn wrap(out: &mut String, tag: &str, block: &TextBlock) {
    out.push('<');
    out.push_str(tag);
    out.push('>');
    out.push_str(&serialize_spans(&block.text, &block.spans));
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

/// Render text with its inline spans.
///
/// Spans are opened outermost first; when an inner span outlives the one
/// being closed it is closed and reopened so tags stay well nested.
fn serialize_spans(text: &str, spans: &[Span]) -> String {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();

    let mut ordered: Vec<&Span> = spans
        .iter()
        .filter(|s| s.start < s.end.min(len))
        .collect();
    ordered.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut out = String::with_capacity(text.len());
    let mut stack: Vec<&Span> = Vec::new();
    let mut next = 0;

    for pos in 0..=len {
        if stack.iter().any(|s| s.end.min(len) <= pos) {
            let mut reopen = Vec::new();
            while let Some(top) = stack.pop() {
                out.push_str(&close_tag(top));
                if top.end.min(len) > pos {
                    reopen.push(top);
                }
                if !stack.iter().any(|s| s.end.min(len) <= pos) {
                    break;
                }
            }
            for span in reopen.into_iter().rev() {
                out.push_str(&open_tag(span));
                stack.push(span);
            }
        }

        while next < ordered.len() && ordered[next].start == pos {
            out.push_str(&open_tag(ordered[next]));
            stack.push(ordered[next]);
            next += 1;
        }

        if let Some(&c) = chars.get(pos) {
            match c {
                '\n' => out.push_str("<br />"),
                '&' => out.push_str("&amp;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                '"' => out.push_str("&quot;"),
                '\'' => out.push_str("&#39;"),
                c => out.push(c),
            }
        }
    }

    out
}

fn open_tag(span: &Span) -> String {
    match &span.kind {
        SpanKind::Strong => "<strong>".to_string(),
        SpanKind::Em => "<em>".to_string(),
        SpanKind::Label(label) => format!(r#"<span class="{}">"#, html_escape(label)),
        SpanKind::Hyperlink(link) => match link {
            Link::Web { url, target } => match target.as_deref() {
                Some(target) => format!(
                    r#"<a href="{}" target="{}" rel="noopener noreferrer">"#,
                    html_escape(url),
                    html_escape(target)
                ),
                None => format!(r#"<a href="{}">"#, html_escape(url)),
            },
            Link::Document { uid: Some(uid), .. } => {
                format!(r#"<a href="{}">"#, html_escape(&post_path(uid)))
            }
            Link::Document { uid: None, .. } => r##"<a href="#">"##.to_string(),
            Link::Media { url } => format!(r#"<a href="{}">"#, html_escape(url)),
        },
        SpanKind::Unknown(_) => "<span>".to_string(),
    }
}

fn close_tag(span: &Span) -> String {
    match &span.kind {
        SpanKind::Strong => "</strong>",
        SpanKind::Em => "</em>",
        SpanKind::Hyperlink(_) => "</a>",
        SpanKind::Label(_) | SpanKind::Unknown(_) => "</span>",
    }
    .to_string()
}
