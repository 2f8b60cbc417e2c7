//! Screen controllers.
//!
//! Each screen owns the state a view would render and exposes the actions a
//! user can take. They hold no logic of their own beyond sequencing calls to
//! the store, the generator and the markup post-processor.

pub mod detail;
pub mod list;

pub use detail::{DetailScreen, PreviewSize, RenderedWidget};
pub use list::{ListScreen, WidgetRow};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Where navigation should go next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    List,
    NewWidget,
    Widget(String),
}

/// What became of an asynchronous generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Generation {
    /// The result was stored and is now on screen
    Applied,
    /// The user left the screen before the result arrived; nothing changed
    Discarded,
    /// There was nothing to regenerate
    Skipped,
}

/// Visit counter shared between a screen and whoever navigates away from it.
///
/// A screen reads the epoch before starting a generation and only applies the
/// result if the epoch is unchanged when it resolves.
#[derive(Debug, Clone, Default)]
pub struct ScreenEpoch(Arc<AtomicU64>);

impl ScreenEpoch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    /// Mark the screen as left; outstanding results become stale.
    pub fn leave(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        self.current() == ticket
    }
}
