//! Widgetsmith
//!
//! Describe a small visual widget in plain words, have a hosted text model
//! write it as a self-contained HTML document, and display it scaled to one
//! of three fixed aspect ratios inside an embedded browser surface.
//!
//! # Features
//!
//! - **Gemini backend** (default): generation through Google's hosted models
//! - **Pluggable models**: anything implementing [`TextModel`] can generate
//! - **Local records**: widgets persist as one JSON collection in a key-value store
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use widgetsmith::{AspectRatio, GeminiModel, GeneratorConfig, WidgetGenerator, WidgetStore};
//! use widgetsmith::screens::DetailScreen;
//!
//! # async fn run() -> widgetsmith::Result<()> {
//! let model = GeminiModel::new(GeneratorConfig::from_env())?;
//! let generator = Arc::new(WidgetGenerator::new(model));
//! let store = Arc::new(WidgetStore::in_memory());
//!
//! let mut screen = DetailScreen::new_widget(store, generator);
//! screen.set_prompt("a minimal analog clock");
//! screen.change_aspect_ratio(AspectRatio::Wide).await?;
//! screen.generate().await?;
//!
//! if let Some(rendered) = screen.render(400.0) {
//!     println!("{}", rendered.uri);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod generation;
pub mod markup;
pub mod naming;
pub mod screens;
pub mod store;
pub mod widget;

pub use config::GeneratorConfig;
pub use error::{Error, Result};
pub use generation::{TextModel, WidgetGenerator};
pub use markup::{normalize, normalize_with, to_embeddable_uri, UnitMode};
pub use naming::derive_name;
pub use store::{FileStore, KeyValueStore, MemoryStore, WidgetStore};
pub use widget::{AspectRatio, ReferenceSize, WidgetRecord, PLACEHOLDER_NAME};

#[cfg(feature = "gemini")]
pub use generation::gemini::GeminiModel;
