//! The widget detail screen: prompt, title, aspect ratio and preview.

use log::debug;
use std::sync::Arc;

use super::{Generation, ScreenEpoch};
use crate::generation::{TextModel, WidgetGenerator};
use crate::markup::{normalize, to_embeddable_uri, SANDBOX_POLICY};
use crate::naming::derive_name;
use crate::store::WidgetStore;
use crate::widget::{AspectRatio, WidgetRecord, PLACEHOLDER_NAME};
use crate::{Error, Result};

/// Horizontal padding around the preview (24 on each side).
pub const CONTAINER_PADDING: f64 = 48.0;

/// Longest title the rename field accepts.
pub const MAX_NAME_INPUT: usize = 50;

/// On-screen size of the preview surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewSize {
    pub width: f64,
    pub height: f64,
}

impl PreviewSize {
    /// 2x2 fills the container, 1x1 is a quarter of that, 2x1 is full width
    /// at 1x1 height.
    pub fn fit(screen_width: f64, aspect_ratio: AspectRatio) -> Self {
        let full = (screen_width - CONTAINER_PADDING).max(0.0);
        let half = full / 2.0;
        let (width, height) = match aspect_ratio {
            AspectRatio::Square => (half, half),
            AspectRatio::Wide => (full, half),
            AspectRatio::Large => (full, full),
        };
        Self { width, height }
    }
}

/// Everything the embedded surface needs to show a widget.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedWidget {
    pub document: String,
    pub uri: String,
    pub preview: PreviewSize,
    /// Sandbox flags the surface must be created with
    pub sandbox: &'static str,
}

/// State and actions of the screen showing a single widget.
pub struct DetailScreen<M> {
    store: Arc<WidgetStore>,
    generator: Arc<WidgetGenerator<M>>,
    epoch: ScreenEpoch,
    record: WidgetRecord,
    name: String,
    editing_name: bool,
    prompt: String,
    aspect_ratio: AspectRatio,
    html: String,
    reset_pending: bool,
}

impl<M: TextModel> DetailScreen<M> {
    /// A screen for a brand-new widget. Nothing is stored until the first save.
    pub fn new_widget(store: Arc<WidgetStore>, generator: Arc<WidgetGenerator<M>>) -> Self {
        Self::with_record(store, generator, WidgetRecord::new())
    }

    /// A screen for a stored widget.
    pub fn open(store: Arc<WidgetStore>, generator: Arc<WidgetGenerator<M>>, id: &str) -> Result<Self> {
        let record = store.get(id).ok_or_else(|| Error::NotFound(id.to_string()))?;
        Ok(Self::with_record(store, generator, record))
    }

    fn with_record(store: Arc<WidgetStore>, generator: Arc<WidgetGenerator<M>>, record: WidgetRecord) -> Self {
        Self {
            store,
            generator,
            epoch: ScreenEpoch::new(),
            name: record.display_name().to_string(),
            editing_name: false,
            prompt: record.prompt.clone(),
            aspect_ratio: record.aspect_ratio,
            html: record.html.clone(),
            reset_pending: false,
            record,
        }
    }

    pub fn record(&self) -> &WidgetRecord {
        &self.record
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn aspect_ratio(&self) -> AspectRatio {
        self.aspect_ratio
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn is_editing_name(&self) -> bool {
        self.editing_name
    }

    pub fn is_reset_pending(&self) -> bool {
        self.reset_pending
    }

    /// Handle for the navigator; calling [`ScreenEpoch::leave`] on it makes
    /// any in-flight generation stale.
    pub fn epoch(&self) -> ScreenEpoch {
        self.epoch.clone()
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    pub fn begin_rename(&mut self) {
        self.editing_name = true;
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.chars().take(MAX_NAME_INPUT).collect();
    }

    /// Commit the title being edited (on blur or submit).
    ///
    /// Blank titles are not saved; the field falls back to the stored name.
    pub fn commit_name(&mut self) -> Result<()> {
        self.editing_name = false;
        let trimmed = self.name.trim();
        if trimmed.is_empty() {
            self.name = self.record.display_name().to_string();
            return Ok(());
        }
        self.name = trimmed.to_string();
        self.record.name = self.name.clone();
        self.record.touch();
        self.store.save(&self.record)
    }

    /// Generate markup for the current prompt and ratio, then save.
    ///
    /// A placeholder or blank title is replaced by one derived from the prompt.
    pub async fn generate(&mut self) -> Result<Generation> {
        if self.prompt.trim().is_empty() {
            return Err(Error::EmptyPrompt);
        }

        let ticket = self.epoch.current();
        let result = self.generator.generate(&self.prompt, self.aspect_ratio).await;

        if !self.epoch.is_current(ticket) {
            debug!("discarding generation for {}: screen was left", self.record.id);
            return Ok(Generation::Discarded);
        }
        let html = result?;

        if self.name == PLACEHOLDER_NAME || self.name.trim().is_empty() {
            self.name = derive_name(&self.prompt);
        }
        self.html = html;
        self.record.name = self.name.clone();
        self.record.prompt = self.prompt.clone();
        self.record.html = self.html.clone();
        self.record.aspect_ratio = self.aspect_ratio;
        self.record.touch();
        self.store.save(&self.record)?;
        Ok(Generation::Applied)
    }

    /// Switch the canvas shape, regenerating existing content for it.
    ///
    /// Without a prompt and content only the selection changes. When
    /// regeneration fails the previous markup and ratio stay in place.
    pub async fn change_aspect_ratio(&mut self, aspect_ratio: AspectRatio) -> Result<Generation> {
        let previous = self.aspect_ratio;
        self.aspect_ratio = aspect_ratio;
        if previous == aspect_ratio || self.prompt.trim().is_empty() || self.html.is_empty() {
            return Ok(Generation::Skipped);
        }

        let ticket = self.epoch.current();
        let result = self.generator.generate(&self.prompt, aspect_ratio).await;

        if !self.epoch.is_current(ticket) {
            debug!("discarding regeneration for {}: screen was left", self.record.id);
            return Ok(Generation::Discarded);
        }

        let html = match result {
            Ok(html) => html,
            Err(e) => {
                self.aspect_ratio = previous;
                return Err(e);
            }
        };

        self.html = html;
        if self.record.name.trim().is_empty() {
            self.record.name = derive_name(&self.prompt);
        }
        self.record.prompt = self.prompt.clone();
        self.record.html = self.html.clone();
        self.record.aspect_ratio = aspect_ratio;
        self.record.touch();
        self.store.save(&self.record)?;
        Ok(Generation::Applied)
    }

    /// Ask for confirmation before clearing the markup.
    pub fn request_reset(&mut self) {
        self.reset_pending = true;
    }

    pub fn cancel_reset(&mut self) {
        self.reset_pending = false;
    }

    /// Clear the markup if a reset was requested. Returns whether it ran.
    pub fn confirm_reset(&mut self) -> Result<bool> {
        if !self.reset_pending {
            return Ok(false);
        }
        self.reset_pending = false;
        self.html.clear();
        self.record.html.clear();
        self.record.touch();
        self.store.save(&self.record)?;
        Ok(true)
    }

    /// Document, URI and preview size for the embedded surface, if there is
    /// anything to show.
    pub fn render(&self, screen_width: f64) -> Option<RenderedWidget> {
        if self.html.is_empty() {
            return None;
        }
        let document = normalize(&self.html, self.aspect_ratio);
        let uri = to_embeddable_uri(&document);
        Some(RenderedWidget {
            document,
            uri,
            preview: PreviewSize::fit(screen_width, self.aspect_ratio),
            sandbox: SANDBOX_POLICY,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_sizes_follow_ratio() {
        assert_eq!(PreviewSize::fit(448.0, AspectRatio::Square), PreviewSize { width: 200.0, height: 200.0 });
        assert_eq!(PreviewSize::fit(448.0, AspectRatio::Wide), PreviewSize { width: 400.0, height: 200.0 });
        assert_eq!(PreviewSize::fit(448.0, AspectRatio::Large), PreviewSize { width: 400.0, height: 400.0 });
        assert_eq!(PreviewSize::fit(10.0, AspectRatio::Large), PreviewSize { width: 0.0, height: 0.0 });
    }
}
