//! The persisted widget record and its canvas shapes

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Display title used until a name is derived or typed.
pub const PLACEHOLDER_NAME: &str = "Untitled Widget";

/// One of the three fixed canvas shapes a widget can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "1x1")]
    Square,
    #[serde(rename = "2x1")]
    Wide,
    #[serde(rename = "2x2")]
    Large,
}

/// Pixel size treated as "100% of the canvas" for an aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceSize {
    pub width: u32,
    pub height: u32,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 3] = [AspectRatio::Square, AspectRatio::Wide, AspectRatio::Large];

    pub fn reference_size(self) -> ReferenceSize {
        match self {
            AspectRatio::Square => ReferenceSize { width: 400, height: 400 },
            AspectRatio::Wide => ReferenceSize { width: 800, height: 400 },
            AspectRatio::Large => ReferenceSize { width: 800, height: 800 },
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AspectRatio::Square => "1x1",
            AspectRatio::Wide => "2x1",
            AspectRatio::Large => "2x2",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AspectRatio {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1x1" => Ok(AspectRatio::Square),
            "2x1" => Ok(AspectRatio::Wide),
            "2x2" => Ok(AspectRatio::Large),
            other => Err(Error::ConfigError(format!(
                "unknown aspect ratio '{}', expected one of 1x1, 2x1, 2x2",
                other
            ))),
        }
    }
}

/// A user-defined widget as stored in the collection.
///
/// Field names serialize in camelCase so the stored blob keeps the same shape
/// as records written by earlier clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetRecord {
    pub id: String,
    pub name: String,
    pub prompt: String,
    /// Raw markup as returned by the generator; empty until first success
    pub html: String,
    pub aspect_ratio: AspectRatio,
    /// Milliseconds since the Unix epoch
    pub created_at: i64,
    /// Milliseconds since the Unix epoch
    pub updated_at: i64,
}

impl WidgetRecord {
    /// A fresh, unsaved record with a new id and the placeholder name.
    pub fn new() -> Self {
        let now = now_millis();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: PLACEHOLDER_NAME.to_string(),
            prompt: String::new(),
            html: String::new(),
            aspect_ratio: AspectRatio::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Name to show in lists and headers.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            PLACEHOLDER_NAME
        } else {
            &self.name
        }
    }

    pub fn has_content(&self) -> bool {
        !self.html.is_empty()
    }

    /// Bump `updated_at`, never moving it backwards.
    pub fn touch(&mut self) {
        self.updated_at = now_millis().max(self.updated_at);
    }
}

impl Default for WidgetRecord {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
