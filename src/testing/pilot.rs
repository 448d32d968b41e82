//! Pilot: drive one widget on a page without a browser.
//!
//! The `Pilot` parses a page, builds a [`LetterWidget`] for one of its hosts
//! and subscribes to it, then exposes the handful of operations a test needs:
//! mount, pick an option, read back the rendered letter and the events seen.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;

use crate::error::WidgetError;
use crate::event::{Envelope, WidgetEvent};
use crate::page::Page;
use crate::source::DataSource;
use crate::widget::{LetterWidget, MountOutcome, WidgetState};

// ---------------------------------------------------------------------------
// Pilot
// ---------------------------------------------------------------------------

/// A page plus one subscribed widget.
///
/// # Examples
///
/// ```ignore
/// use letter_box::testing::{Pilot, StaticSource};
///
/// let source = StaticSource::new().with_json("/people", r#"[{"id":1,"last_name":"Ada"}]"#);
/// let mut pilot = Pilot::new(PAGE, source)?;
/// pilot.mount().await?;
/// assert_eq!(pilot.selector_labels(), vec!["Ada"]);
/// ```
pub struct Pilot {
    page: Page,
    widget: LetterWidget,
    events: UnboundedReceiver<Envelope>,
}

impl Pilot {
    /// Drive the first `<letter-box>` in `markup`.
    pub fn new(markup: &str, source: impl DataSource + 'static) -> Result<Self, WidgetError> {
        Self::with_host(markup, 0, Arc::new(source))
    }

    /// Drive the `index`-th `<letter-box>` in `markup`.
    pub fn with_host(markup: &str, index: usize, source: Arc<dyn DataSource>) -> Result<Self, WidgetError> {
        let page = Page::from_markup(markup)?;
        let host = page.hosts().get(index).copied().ok_or_else(|| {
            WidgetError::InvalidConfig(format!("page has no letter-box host #{index}"))
        })?;
        let mut widget = LetterWidget::from_host(&page, host, source)?;
        let (_id, events) = widget.subscribe();
        Ok(Self {
            page,
            widget,
            events,
        })
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Mount and wait for the fetch.
    pub async fn mount(&mut self) -> Result<MountOutcome, WidgetError> {
        self.widget.mount_and_wait(&mut self.page).await
    }

    pub fn unmount(&mut self) {
        self.widget.unmount(&mut self.page);
    }

    // ── Interaction ──────────────────────────────────────────────────

    /// Pick the option with this value.
    pub fn select(&mut self, value: &str) -> Result<(), WidgetError> {
        self.widget.select(&mut self.page, value)
    }

    /// Pick the option at `index`.
    pub fn select_index(&mut self, index: usize) -> Result<(), WidgetError> {
        self.widget.select_index(&mut self.page, index)
    }

    // ── Inspection ───────────────────────────────────────────────────

    pub fn state(&self) -> WidgetState {
        self.widget.state()
    }

    /// The rendered letter as markup.
    pub fn rendered_html(&self) -> Option<String> {
        self.widget.rendered_html(&self.page)
    }

    /// The rendered letter as plain text.
    pub fn rendered_text(&self) -> Option<String> {
        let content = self.widget.content_node()?;
        let root = self.page.dom.shadow_root(content)?;
        Some(self.page.dom.text_content(root))
    }

    pub fn selector_labels(&self) -> Vec<String> {
        self.widget.selector_labels()
    }

    /// The host element as it appears in the document.
    pub fn host_html(&self) -> String {
        self.page.dom.outer_html(self.widget.host())
    }

    /// Events received since the last call, oldest first.
    pub fn events(&mut self) -> Vec<WidgetEvent> {
        std::iter::from_fn(|| self.events.try_recv().ok())
            .map(|envelope| envelope.event)
            .collect()
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut Page {
        &mut self.page
    }

    pub fn widget(&self) -> &LetterWidget {
        &self.widget
    }

    pub fn widget_mut(&mut self) -> &mut LetterWidget {
        &mut self.widget
    }
}

// ===========================================================================
// Tests
// ===========================================================================
