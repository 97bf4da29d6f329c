//! Upstream content items to protocol text content.

use rmcp::model::{CallToolResult, Content};

use crate::domain::{InvocationResult, TextContent, UpstreamContent};

/// Every upstream item becomes text; non-text kinds keep only their `text` field.
impl From<UpstreamContent> for TextContent {
    fn from(c: UpstreamContent) -> Self {
        if let Some(kind) = c.kind.as_deref().filter(|k| *k != "text") {
            tracing::debug!(kind = kind, "coercing non-text upstream content to text");
        }
        TextContent {
            text: c.text.unwrap_or_default(),
        }
    }
}

impl From<InvocationResult> for CallToolResult {
    fn from(r: InvocationResult) -> Self {
        let content: Vec<Content> = r.content.into_iter().map(|c| Content::text(c.text)).collect();
        if r.is_error {
            CallToolResult::error(content)
        } else {
            CallToolResult::success(content)
        }
    }
}
