//! The widget list

use std::sync::Arc;

use super::Route;
use crate::store::WidgetStore;
use crate::widget::{AspectRatio, WidgetRecord};
use crate::Result;

const PREVIEW_CHARS: usize = 50;

/// One line of the list as it would be drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetRow {
    pub id: String,
    pub name: String,
    pub preview: String,
    pub aspect_ratio: AspectRatio,
    /// Last update as a calendar date (UTC)
    pub updated: String,
}

impl WidgetRow {
    fn from_record(record: &WidgetRecord) -> Self {
        let mut preview: String = record.prompt.chars().take(PREVIEW_CHARS).collect();
        if record.prompt.chars().count() > PREVIEW_CHARS {
            preview.push_str("...");
        }
        let updated = chrono::DateTime::<chrono::Utc>::from_timestamp_millis(record.updated_at)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();

        Self {
            id: record.id.clone(),
            name: record.display_name().to_string(),
            preview,
            aspect_ratio: record.aspect_ratio,
            updated,
        }
    }
}

/// The collection overview, reloaded each time it gains focus.
pub struct ListScreen {
    store: Arc<WidgetStore>,
    widgets: Vec<WidgetRecord>,
    loading: bool,
}

impl ListScreen {
    pub fn new(store: Arc<WidgetStore>) -> Self {
        Self {
            store,
            widgets: Vec::new(),
            loading: true,
        }
    }

    /// Reload everything; called whenever the list becomes visible.
    pub fn on_focus(&mut self) {
        self.loading = true;
        self.widgets = self.store.list_all();
        self.loading = false;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    pub fn widgets(&self) -> &[WidgetRecord] {
        &self.widgets
    }

    pub fn rows(&self) -> Vec<WidgetRow> {
        self.widgets.iter().map(WidgetRow::from_record).collect()
    }

    pub fn delete(&mut self, id: &str) -> Result<()> {
        self.store.delete(id)?;
        self.on_focus();
        Ok(())
    }

    pub fn create(&self) -> Route {
        Route::NewWidget
    }

    pub fn open(&self, id: &str) -> Route {
        Route::Widget(id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> Arc<WidgetStore> {
        let store = Arc::new(WidgetStore::in_memory());
        let long = "x".repeat(60);
        for (id, prompt) in [("a", "short"), ("b", long.as_str())] {
            let record = WidgetRecord {
                id: id.into(),
                prompt: prompt.into(),
                updated_at: 86_400_000,
                ..WidgetRecord::new()
            };
            store.save(&record).unwrap();
        }
        store
    }

    #[test]
    fn starts_loading_until_focused() {
        let mut screen = ListScreen::new(seeded());
        assert!(screen.is_loading());
        screen.on_focus();
        assert!(!screen.is_loading());
        assert_eq!(screen.widgets().len(), 2);
    }

    #[test]
    fn rows_truncate_long_prompts() {
        let mut screen = ListScreen::new(seeded());
        screen.on_focus();
        let rows = screen.rows();
        assert_eq!(rows[0].preview, "short");
        assert_eq!(rows[1].preview, format!("{}...", "x".repeat(50)));
        assert_eq!(rows[1].updated, "1970-01-02");
        assert_eq!(rows[1].name, "Untitled Widget");
    }

    #[test]
    fn delete_reloads() {
        let mut screen = ListScreen::new(seeded());
        screen.on_focus();
        screen.delete("a").unwrap();
        assert_eq!(screen.widgets().len(), 1);
        assert_eq!(screen.widgets()[0].id, "b");
    }

    #[test]
    fn navigation_targets() {
        let screen = ListScreen::new(seeded());
        assert_eq!(screen.create(), Route::NewWidget);
        assert_eq!(screen.open("a"), Route::Widget("a".into()));
    }
}
