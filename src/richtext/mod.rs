//! Structured rich text
//!
//! Post bodies arrive as a list of blocks, each carrying plain text plus
//! character-offset spans for inline formatting. The same value is
//! projected twice: to plain text for word counting and to HTML for
//! rendering.

mod html;

use serde::{Deserialize, Serialize};

pub use html::as_html;

/// A rich text field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RichText(pub Vec<Block>);

impl RichText {
    pub fn blocks(&self) -> &[Block] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Plain-text projection: text blocks joined by a single space
    pub fn as_text(&self) -> String {
        self.0
            .iter()
            .filter_map(Block::text)
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// HTML projection
    pub fn as_html(&self) -> String {
        as_html(self)
    }
}

/// One block of rich text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Block {
    #[serde(rename = "paragraph")]
    Paragraph(TextBlock),
    #[serde(rename = "heading1")]
    Heading1(TextBlock),
    #[serde(rename = "heading2")]
    Heading2(TextBlock),
    #[serde(rename = "heading3")]
    Heading3(TextBlock),
    #[serde(rename = "heading4")]
    Heading4(TextBlock),
    #[serde(rename = "heading5")]
    Heading5(TextBlock),
    #[serde(rename = "heading6")]
    Heading6(TextBlock),
    #[serde(rename = "preformatted")]
    Preformatted(TextBlock),
    #[serde(rename = "list-item")]
    ListItem(TextBlock),
    #[serde(rename = "o-list-item")]
    OrderedListItem(TextBlock),
    #[serde(rename = "image")]
    Image(ImageBlock),
    #[serde(rename = "embed")]
    Embed(EmbedBlock),
    #[serde(other)]
    Unknown,
}

impl Block {
    /// The text payload, for blocks that have one
    pub fn text(&self) -> Option<&TextBlock> {
        match self {
            Block::Paragraph(t)
            | Block::Heading1(t)
            | Block::Heading2(t)
            | Block::Heading3(t)
            | Block::Heading4(t)
            | Block::Heading5(t)
            | Block::Heading6(t)
            | Block::Preformatted(t)
            | Block::ListItem(t)
            | Block::OrderedListItem(t) => Some(t),
            Block::Image(_) | Block::Embed(_) | Block::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub spans: Vec<Span>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageBlock {
    pub url: String,
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default)]
    pub copyright: Option<String>,
    #[serde(default)]
    pub dimensions: Option<Dimensions>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedBlock {
    pub oembed: Oembed,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Oembed {
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub embed_url: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

/// Inline formatting over `[start, end)`, counted in chars
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawSpan", into = "RawSpan")]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub kind: SpanKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SpanKind {
    Strong,
    Em,
    Hyperlink(Link),
    Label(String),
    Unknown(String),
}

/// Hyperlink target
#[derive(Debug, Clone, PartialEq)]
pub enum Link {
    Web { url: String, target: Option<String> },
    Document { id: String, uid: Option<String> },
    Media { url: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawSpan {
    start: usize,
    end: usize,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<serde_json::Value>,
}

impl From<RawSpan> for Span {
    fn from(raw: RawSpan) -> Self {
        let data = raw.data.unwrap_or(serde_json::Value::Null);
        let kind = match raw.kind.as_str() {
            "strong" => SpanKind::Strong,
            "em" => SpanKind::Em,
            "hyperlink" => match Link::from_json(&data) {
                Some(link) => SpanKind::Hyperlink(link),
                None => SpanKind::Unknown(raw.kind),
            },
            "label" => SpanKind::Label(str_field(&data, "label").unwrap_or_default()),
            _ => SpanKind::Unknown(raw.kind),
        };
        Span {
            start: raw.start,
            end: raw.end,
            kind,
        }
    }
}

impl From<Span> for RawSpan {
    fn from(span: Span) -> Self {
        let (kind, data) = match span.kind {
            SpanKind::Strong => ("strong".to_string(), None),
            SpanKind::Em => ("em".to_string(), None),
            SpanKind::Hyperlink(link) => ("hyperlink".to_string(), Some(link.to_json())),
            SpanKind::Label(label) => (
                "label".to_string(),
                Some(serde_json::json!({ "label": label })),
            ),
            SpanKind::Unknown(kind) => (kind, None),
        };
        RawSpan {
            start: span.start,
            end: span.end,
            kind,
            data,
        }
    }
}

impl Link {
    fn from_json(data: &serde_json::Value) -> Option<Self> {
        match str_field(data, "link_type")?.as_str() {
            "Web" => Some(Link::Web {
                url: str_field(data, "url")?,
                target: str_field(data, "target"),
            }),
            "Document" => Some(Link::Document {
                id: str_field(data, "id")?,
                uid: str_field(data, "uid"),
            }),
            "Media" => Some(Link::Media {
                url: str_field(data, "url")?,
            }),
            _ => None,
        }
    }

    fn to_json(&self) -> serde_json::Value {
        match self {
            Link::Web { url, target } => {
                serde_json::json!({ "link_type": "Web", "url": url, "target": target })
            }
            Link::Document { id, uid } => {
                serde_json::json!({ "link_type": "Document", "id": id, "uid": uid })
            }
            Link::Media { url } => serde_json::json!({ "link_type": "Media", "url": url }),
        }
    }
}

fn str_field(value: &serde_json::Value, key: &str) -> Option<String> {
    value.get(key).and_then(|v| v.as_str()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> RichText {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_parse_blocks_and_spans() {
        let rt = parse(
            r#"[
            {"type": "heading2", "text": "Intro", "spans": []},
            {"type": "paragraph", "text": "Read the docs", "spans": [
                {"start": 0, "end": 4, "type": "strong"},
                {"start": 9, "end": 13, "type": "hyperlink",
                 "data": {"link_type": "Web", "url": "https://docs.rs"}}
            ]},
            {"type": "image", "url": "https://img/x.png", "alt": "x",
             "dimensions": {"width": 10, "height": 20}},
            {"type": "group-of-things"}
        ]"#,
        );

        assert_eq!(rt.blocks().len(), 4);
        let para = rt.blocks()[1].text().unwrap();
        assert_eq!(para.spans[0].kind, SpanKind::Strong);
        assert_eq!(
            para.spans[1].kind,
            SpanKind::Hyperlink(Link::Web {
                url: "https://docs.rs".to_string(),
                target: None
            })
        );
        assert_eq!(rt.blocks()[3], Block::Unknown);
    }

    #[test]
    fn test_as_text_joins_text_blocks() {
        let rt = parse(
            r#"[
            {"type": "paragraph", "text": "one two", "spans": []},
            {"type": "image", "url": "https://img/x.png"},
            {"type": "list-item", "text": "three", "spans": []}
        ]"#,
        );
        assert_eq!(rt.as_text(), "one two three");
    }

    #[test]
    fn test_as_text_of_empty_field() {
        assert_eq!(RichText::default().as_text(), "");
    }

    #[test]
    fn test_unknown_span_type_is_kept() {
        let rt = parse(
            r#"[{"type": "paragraph", "text": "abc", "spans": [
                {"start": 0, "end": 1, "type": "sparkle"}
            ]}]"#,
        );
        let span = &rt.blocks()[0].text().unwrap().spans[0];
        assert_eq!(span.kind, SpanKind::Unknown("sparkle".to_string()));
    }

    #[test]
    fn test_document_link_span() {
        let rt = parse(
            r#"[{"type": "paragraph", "text": "see other", "spans": [
                {"start": 4, "end": 9, "type": "hyperlink",
                 "data": {"link_type": "Document", "id": "YX1", "uid": "other-post", "type": "posts"}}
            ]}]"#,
        );
        let span = &rt.blocks()[0].text().unwrap().spans[0];
        assert_eq!(
            span.kind,
            SpanKind::Hyperlink(Link::Document {
                id: "YX1".to_string(),
                uid: Some("other-post".to_string())
            })
        );
    }
}
