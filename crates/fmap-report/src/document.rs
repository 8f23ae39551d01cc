//! Narrative document output.

use fmap_map::RenderedBlock;

use crate::error::Result;
use crate::html::HtmlWriter;

/// A composed document ready for output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NarrativeDocument {
    blocks: Vec<RenderedBlock>,
}

impl NarrativeDocument {
    pub fn new(blocks: Vec<RenderedBlock>) -> Self {
        Self { blocks }
    }

    pub fn blocks(&self) -> &[RenderedBlock] {
        &self.blocks
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Markdown: `##` section headings, bold entry titles, values as
    /// paragraphs. Multi-line values go in a fenced block.
    pub fn to_markdown(&self) -> String {
        let mut parts = Vec::with_capacity(self.blocks.len());
        for block in &self.blocks {
            match block {
                RenderedBlock::Heading(title) => parts.push(format!("## {title}")),
                RenderedBlock::Entry { title, body } if body.contains('\n') => {
                    let fence = code_fence(body);
                    parts.push(format!("**{title}**\n\n{fence}\n{body}\n{fence}"));
                }
                RenderedBlock::Entry { title, body } => parts.push(format!("**{title}** {body}")),
            }
        }
        let mut out = parts.join("\n\n");
        if !out.is_empty() {
            out.push('\n');
        }
        out
    }

    /// Plain text: headings on their own line, `Title: value` entries.
    pub fn to_plain_text(&self) -> String {
        let mut out = String::new();
        for block in &self.blocks {
            match block {
                RenderedBlock::Heading(title) => {
                    if !out.is_empty() {
                        out.push('\n');
                    }
                    out.push_str(title);
                    out.push('\n');
                }
                RenderedBlock::Entry { title, body } => {
                    out.push_str(title);
                    out.push(' ');
                    out.push_str(body);
                    out.push('\n');
                }
            }
        }
        out
    }

    /// HTML fragment: `<h3>` headings and `<p><strong>Title</strong> value</p>`
    /// entries. Multi-line values go in `<pre>`.
    pub fn to_html(&self) -> Result<String> {
        let mut html = HtmlWriter::new();
        for block in &self.blocks {
            match block {
                RenderedBlock::Heading(title) => html.element("h3", title)?,
                RenderedBlock::Entry { title, body } => {
                    html.start("p")?;
                    html.element("strong", title)?;
                    if body.contains('\n') {
                        html.end("p")?;
                        html.element("pre", body)?;
                    } else {
                        html.text(" ")?;
                        html.text(body)?;
                        html.end("p")?;
                    }
                }
            }
        }
        html.finish()
    }
}

/// A backtick fence longer than any backtick run inside `body`.
fn code_fence(body: &str) -> String {
    let longest = body
        .split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    "`".repeat((longest + 1).max(3))
}
