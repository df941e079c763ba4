//! Structured rich text as delivered by the content API
//!
//! A body is a list of typed blocks (paragraphs, headings, list items,
//! images...). Each textual block carries its text plus a list of spans
//! marking character ranges as bold, italic or linked.

use serde::{Deserialize, Serialize};

use crate::helpers::html_escape;

/// One block of structured rich text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichTextBlock {
    #[serde(rename = "type")]
    pub kind: BlockKind,

    #[serde(default)]
    pub text: String,

    #[serde(default)]
    pub spans: Vec<Span>,

    /// Image source, for `image` blocks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Image alt text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,

    /// oEmbed payload, for `embed` blocks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oembed: Option<Embed>,
}

impl RichTextBlock {
    /// Build a plain block with no spans
    pub fn new(kind: BlockKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            spans: Vec::new(),
            url: None,
            alt: None,
            oembed: None,
        }
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::new(BlockKind::Paragraph, text)
    }

    /// Add a span to this block
    pub fn with_span(mut self, span: Span) -> Self {
        self.spans.push(span);
        self
    }

    fn has_text(&self) -> bool {
        !matches!(
            self.kind,
            BlockKind::Image | BlockKind::Embed | BlockKind::Unknown
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockKind {
    Paragraph,
    Heading1,
    Heading2,
    Heading3,
    Heading4,
    Heading5,
    Heading6,
    Preformatted,
    ListItem,
    OListItem,
    Image,
    Embed,
    #[serde(other)]
    Unknown,
}

/// Inline formatting over a character range `[start, end)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    #[serde(rename = "type")]
    pub kind: SpanKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<SpanData>,
}

impl Span {
    pub fn new(kind: SpanKind, start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            kind,
            data: None,
        }
    }

    pub fn hyperlink(start: usize, end: usize, url: impl Into<String>) -> Self {
        Self {
            start,
            end,
            kind: SpanKind::Hyperlink,
            data: Some(SpanData {
                url: Some(url.into()),
                ..Default::default()
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpanKind {
    Strong,
    Em,
    Hyperlink,
    Label,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpanData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embed {
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub embed_url: Option<String>,
}

/// Converts rich text into something a page can show
pub trait RichTextRenderer: Send + Sync {
    /// Render blocks to HTML, emitted verbatim into the page
    fn as_html(&self, body: &[RichTextBlock]) -> String;

    /// Flatten blocks to plain text
    fn as_text(&self, body: &[RichTextBlock]) -> String;
}

/// Default renderer for the API's structured text format
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuredText;

impl RichTextRenderer for StructuredText {
    fn as_html(&self, body: &[RichTextBlock]) -> String {
        let mut out = String::new();
        let mut open_list: Option<&'static str> = None;

        for block in body {
            let list = match block.kind {
                BlockKind::ListItem => Some("ul"),
                BlockKind::OListItem => Some("ol"),
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

            render_block(&mut out, block);
        }

        if let Some(tag) = open_list {
            out.push_str(&format!("</{}>", tag));
        }

        out
    }

    fn as_text(&self, body: &[RichTextBlock]) -> String {
        body.iter()
            .filter(|b| b.has_text())
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn render_block(out: &mut String, block: &RichTextBlock) {
    let tag = match block.kind {
        BlockKind::Paragraph => "p",
        BlockKind::Heading1 => "h1",
        BlockKind::Heading2 => "h2",
        BlockKind::Heading3 => "h3",
        BlockKind::Heading4 => "h4",
        BlockKind::Heading5 => "h5",
        BlockKind::Heading6 => "h6",
        BlockKind::Preformatted => "pre",
        BlockKind::ListItem | BlockKind::OListItem => "li",
        BlockKind::Image => {
            if let Some(url) = &block.url {
                out.push_str(&format!(
                    r#"<p class="block-img"><img src="{}" alt="{}" /></p>"#,
                    html_escape(url),
                    html_escape(block.alt.as_deref().unwrap_or(""))
                ));
            }
            return;
        }
        BlockKind::Embed => {
            if let Some(html) = block.oembed.as_ref().and_then(|e| e.html.as_deref()) {
                out.push_str(r#"<div data-oembed="embed">"#);
                out.push_str(html);
                out.push_str("</div>");
            }
            return;
        }
        BlockKind::Unknown => return,
    };

    out.push_str(&format!("<{}>", tag));
    out.push_str(&render_inline(&block.text, &block.spans));
    out.push_str(&format!("</{}>", tag));
}

/// Render text with spans, keeping tags properly nested
fn render_inline(text: &str, spans: &[Span]) -> String {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();

    let mut spans: Vec<&Span> = spans
        .iter()
        .filter(|s| s.start < s.end && s.start < len && s.kind != SpanKind::Unknown)
        .collect();
    // Outer spans first so they open before the spans they contain
    spans.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let ends_at = |s: &Span, i: usize| s.end.min(len) == i;

    let mut out = String::with_capacity(text.len());
    let mut stack: Vec<&Span> = Vec::new();

    for i in 0..=len {
        if stack.iter().any(|s| ends_at(s, i)) {
            let mut reopen = Vec::new();
            while let Some(top) = stack.pop() {
                out.push_str(close_tag(top));
                if !ends_at(top, i) {
                    reopen.push(top);
                }
                if !stack.iter().any(|s| ends_at(s, i)) {
                    break;
                }
            }
            for span in reopen.into_iter().rev() {
                out.push_str(&open_tag(span));
                stack.push(span);
            }
        }

        if i == len {
            break;
        }

        for span in spans.iter().filter(|s| s.start == i) {
            out.push_str(&open_tag(span));
            stack.push(span);
        }

        match chars[i] {
            '\n' => out.push_str("<br />"),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }

    out
}

fn open_tag(span: &Span) -> String {
    match span.kind {
        SpanKind::Strong => "<strong>".to_string(),
        SpanKind::Em => "<em>".to_string(),
        SpanKind::Hyperlink => {
            let data = span.data.as_ref();
            let url = data.and_then(|d| d.url.as_deref()).unwrap_or("#");
            match data.and_then(|d| d.target.as_deref()) {
                Some(target) => format!(
                    r#"<a href="{}" target="{}" rel="noopener">"#,
                    html_escape(url),
                    html_escape(target)
                ),
                None => format!(r#"<a href="{}">"#, html_escape(url)),
            }
        }
        SpanKind::Label => {
            let label = span
                .data
                .as_ref()
                .and_then(|d| d.label.as_deref())
                .unwrap_or("");
            format!(r#"<span class="{}">"#, html_escape(label))
        }
        SpanKind::Unknown => String::new(),
    }
}

fn close_tag(span: &Span) -> &'static str {
    match span.kind {
        SpanKind::Strong => "</strong>",
        SpanKind::Em => "</em>",
        SpanKind::Hyperlink => "</a>",
        SpanKind::Label => "</span>",
        SpanKind::Unknown => "",
    }
}
