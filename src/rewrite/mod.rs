//! Natural-language diagram edits backed by a language model.
//!
//! The model is a best-effort collaborator: [`rewrite_or_original`] never
//! fails, it hands back the original diagram whenever the model errors or
//! answers with something that is not a usable diagram.

mod anthropic;
pub mod prompt;

pub use anthropic::{AnthropicRewriter, DEFAULT_API_URL, DEFAULT_MODEL};

use async_trait::async_trait;
use tracing::warn;

use crate::error::Result;
use prompt::{MIN_RESPONSE_LEN, clean_response, looks_like_mermaid};

#[async_trait]
pub trait DiagramRewriter: Send + Sync {
    /// Returns the model's rewrite of `current_code` following `user_request`.
    async fn rewrite(&self, current_code: &str, user_request: &str) -> Result<String>;
}

pub async fn rewrite_or_original(
    rewriter: &dyn DiagramRewriter,
    current_code: &str,
    user_request: &str,
) -> String {
    let raw = match rewriter.rewrite(current_code, user_request).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Diagram rewrite failed, keeping original: {e}");
            return current_code.to_string();
        }
    };

    let updated = clean_response(&raw);

    if updated.chars().count() < MIN_RESPONSE_LEN {
        warn!(
            "Diagram rewrite too short ({} chars), keeping original",
            updated.chars().count()
        );
        return current_code.to_string();
    }

    if !looks_like_mermaid(&updated) {
        warn!("Diagram rewrite does not look like mermaid, keeping original");
        return current_code.to_string();
    }

    updated
}
