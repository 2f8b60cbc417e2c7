//! Widget generation through a hosted text model.
//!
//! [`WidgetGenerator`] owns everything on our side of the call: validating the
//! prompt, building the instruction, and turning whatever text comes back into
//! a complete HTML document. The call itself goes through a [`TextModel`],
//! constructed once at startup and injected.

pub mod prompt;

#[cfg(feature = "gemini")]
pub mod gemini;

pub use prompt::build_instruction;

use log::{debug, error};
use regex::Regex;
use std::future::Future;
use std::sync::OnceLock;

use crate::markup::is_complete_document;
use crate::widget::AspectRatio;
use crate::{Error, Result};

/// Message used when the remote side fails without saying why.
pub const GENERIC_FAILURE: &str = "Failed to generate widget HTML. Please check your API key and try again.";

/// A hosted model that turns one instruction into one blob of text.
pub trait TextModel: Send + Sync {
    /// Name of the model, used in error messages.
    fn model_name(&self) -> &str;

    /// Send `instruction` and return the raw response text.
    fn complete(&self, instruction: &str) -> impl Future<Output = Result<String>> + Send;
}

/// Builds widget markup from a natural-language description.
pub struct WidgetGenerator<M> {
    model: M,
}

impl<M: TextModel> WidgetGenerator<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Generate a complete HTML document for `prompt` at `aspect_ratio`.
    pub async fn generate(&self, prompt: &str, aspect_ratio: AspectRatio) -> Result<String> {
        if prompt.trim().is_empty() {
            return Err(Error::EmptyPrompt);
        }

        let instruction = build_instruction(prompt, aspect_ratio);
        debug!(
            "generating {} widget with {} ({} byte instruction)",
            aspect_ratio,
            self.model.model_name(),
            instruction.len()
        );

        let raw = self.model.complete(&instruction).await.map_err(|e| {
            error!("Error generating widget HTML: {}", e);
            e
        })?;

        let html = finish_markup(&raw);
        debug!("model returned {} bytes, {} after cleanup", raw.len(), html.len());
        Ok(html)
    }
}

fn fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"```(?:html)?\n?").unwrap_or_else(|e| panic!("invalid fence pattern: {e}")))
}

/// Remove markdown code fences and surrounding whitespace.
pub fn strip_code_fences(text: &str) -> String {
    fence_re().replace_all(text, "").trim().to_string()
}

/// Wrap `fragment` in a minimal document unless it already is one.
pub fn ensure_document(fragment: &str) -> String {
    if is_complete_document(fragment) {
        return fragment.to_string();
    }
    format!(
        "<!DOCTYPE html>
<html lang=\"en\">
<head>
  <meta charset=\"UTF-8\">
  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">
  <title>Widget</title>
</head>
<body>
{}
</body>
</html>",
        fragment
    )
}

/// Turn raw model output into the markup we store.
pub fn finish_markup(raw: &str) -> String {
    ensure_document(&strip_code_fences(raw))
}

/// Map a remote failure onto the error taxonomy.
///
/// `status` is the HTTP status when one was received; `message` is whatever
/// the service said.
pub fn classify_failure(status: Option<u16>, message: &str, model: &str) -> Error {
    let lower = message.to_ascii_lowercase();
    if status == Some(404) || lower.contains("404") || lower.contains("not found") {
        return Error::ModelNotFound(model.to_string());
    }
    if matches!(status, Some(401) | Some(403)) || message.contains("API key") {
        return Error::InvalidCredential;
    }
    if message.trim().is_empty() {
        Error::Remote(GENERIC_FAILURE.to_string())
    } else {
        Error::Remote(message.trim().to_string())
    }
}
