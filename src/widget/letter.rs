//! The letter-box widget: fetch records, build a selector, render letters.
//!
//! Mounting is split in three steps so the fetch can be awaited anywhere
//! while the page stays available to the host:
//!
//! ```ignore
//! let pending = widget.mount(&mut page);          // Unmounted -> Loading
//! let fetched = pending.resolve().await;          // the only await point
//! widget.finish_mount(&mut page, fetched)?;       // Loading -> Ready
//! ```
//!
//! Each `mount` hands out a ticket stamped with the widget's generation.
//! `unmount` and re-`mount` bump the generation, so a fetch that resolves
//! after teardown is discarded without touching the page.

use std::fmt;
use std::sync::Arc;

use crate::config::WidgetConfig;
use crate::dom::node::{NodeData, NodeId};
use crate::dom::tree::Dom;
use crate::error::WidgetError;
use crate::event::{Envelope, ListenerId, Listeners, WidgetEvent};
use crate::page::Page;
use crate::record::{Record, RecordCollection};
use crate::render::{self, RenderTarget, SlotOrigin, SlotSet};
use crate::selector::{SelectionChanges, Selector, SelectorBuilder};
use crate::source::DataSource;
use crate::template::Template;

use super::state::WidgetState;

/// Tag of the element the widget renders into.
pub const CONTENT_TAG: &str = "letter-box-content";

// ---------------------------------------------------------------------------
// Mount steps
// ---------------------------------------------------------------------------

/// Identifies which mount a fetch belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MountTicket {
    generation: u64,
}

/// A fetch that has been requested but not yet awaited.
pub struct PendingMount {
    ticket: MountTicket,
    source: Arc<dyn DataSource>,
    location: String,
}

impl PendingMount {
    pub fn ticket(&self) -> MountTicket {
        self.ticket
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// Run the fetch.
    pub async fn resolve(self) -> FetchedRecords {
        let result = self.source.fetch(&self.location).await;
        FetchedRecords {
            ticket: self.ticket,
            result,
        }
    }
}

impl fmt::Debug for PendingMount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingMount")
            .field("ticket", &self.ticket)
            .field("location", &self.location)
            .finish()
    }
}

/// The result of a fetch, still stamped with its ticket.
#[derive(Debug)]
pub struct FetchedRecords {
    ticket: MountTicket,
    result: Result<RecordCollection, WidgetError>,
}

impl FetchedRecords {
    pub fn ticket(&self) -> MountTicket {
        self.ticket
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// How [`LetterWidget::finish_mount`] used a fetch result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountOutcome {
    /// The widget is mounted and showing the first record, if any.
    Ready,
    /// The result arrived for a mount that no longer exists.
    Discarded,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Everything a mounted widget owns. Dropped as a whole on unmount.
struct Session {
    records: Arc<RecordCollection>,
    template: Option<Arc<Template>>,
    selector: Selector,
    changes: SelectionChanges,
    content: NodeId,
    target: RenderTarget,
    origins: Vec<SlotOrigin>,
    current: Option<Arc<Record>>,
}

impl Session {
    fn render(&mut self, page: &mut Page, config: &WidgetConfig, record: &Record) -> Result<(), WidgetError> {
        let template = match &self.template {
            Some(template) => Arc::clone(template),
            None => {
                let template = page.templates.require(&config.template_id)?;
                self.template = Some(Arc::clone(&template));
                template
            }
        };
        let slots = self.target.reclaim(&mut page.dom);
        render::render(
            &mut page.dom,
            &template,
            &mut self.target,
            slots,
            &config.properties,
            record,
        )
    }

    /// Remove what the widget inserted and put every fragment back where the
    /// author wrote it.
    fn teardown(mut self, dom: &mut Dom, host: NodeId) {
        self.selector.detach_handler();
        let fragments = self.target.reclaim(dom).nodes();
        dom.remove(self.selector.node());
        dom.remove(self.content);

        for origin in &self.origins {
            origin.restore(dom);
        }
        // Whatever lost its authored parent goes to the end of the host.
        for node in fragments {
            if dom.parent(node).is_some() {
                continue;
            }
            if dom.contains(host) {
                dom.reparent(node, host);
            } else {
                dom.remove(node);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// LetterWidget
// ---------------------------------------------------------------------------

/// One `<letter-box>` instance.
pub struct LetterWidget {
    host: NodeId,
    config: WidgetConfig,
    source: Arc<dyn DataSource>,
    state: WidgetState,
    generation: u64,
    session: Option<Session>,
    listeners: Listeners,
    last_error: Option<WidgetError>,
}

impl fmt::Debug for LetterWidget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LetterWidget")
            .field("host", &self.host)
            .field("src", &self.config.src)
            .field("state", &self.state)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl LetterWidget {
    pub fn new(host: NodeId, config: WidgetConfig, source: Arc<dyn DataSource>) -> Self {
        Self {
            host,
            config,
            source,
            state: WidgetState::Unmounted,
            generation: 0,
            session: None,
            listeners: Listeners::new(),
            last_error: None,
        }
    }

    /// Build a widget from a host element's attributes.
    pub fn from_host(page: &Page, host: NodeId, source: Arc<dyn DataSource>) -> Result<Self, WidgetError> {
        let element = page
            .dom
            .get(host)
            .and_then(NodeData::as_element)
            .ok_or_else(|| WidgetError::InvalidConfig("host is not an element".into()))?;
        let config = WidgetConfig::from_element(element)?;
        Ok(Self::new(host, config, source))
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn host(&self) -> NodeId {
        self.host
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn state(&self) -> WidgetState {
        self.state
    }

    /// The record last handed to the renderer.
    pub fn current_record(&self) -> Option<&Arc<Record>> {
        self.session.as_ref().and_then(|s| s.current.as_ref())
    }

    /// The collection fetched by the current mount.
    pub fn records(&self) -> Option<&Arc<RecordCollection>> {
        self.session.as_ref().map(|s| &s.records)
    }

    /// The most recent failure, cleared by the next mount.
    pub fn last_error(&self) -> Option<&WidgetError> {
        self.last_error.as_ref()
    }

    /// Option labels, in record order. Empty when not mounted.
    pub fn selector_labels(&self) -> Vec<String> {
        self.session
            .as_ref()
            .map(|s| s.selector.list().labels().into_iter().map(str::to_owned).collect())
            .unwrap_or_default()
    }

    /// The `<select>` element, while mounted.
    pub fn selector_node(&self) -> Option<NodeId> {
        self.session.as_ref().map(|s| s.selector.node())
    }

    /// The content region element, while mounted.
    pub fn content_node(&self) -> Option<NodeId> {
        self.session.as_ref().map(|s| s.content)
    }

    /// Serialized rendered view, while mounted.
    pub fn rendered_html(&self, page: &Page) -> Option<String> {
        self.session
            .as_ref()
            .map(|s| page.dom.inner_html(s.target.root()))
    }

    // ── Host observation ─────────────────────────────────────────────

    /// Observe selection, render and failure events.
    pub fn subscribe(&mut self) -> (ListenerId, tokio::sync::mpsc::UnboundedReceiver<Envelope>) {
        self.listeners.subscribe()
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Start mounting. A widget that is already mounted is unmounted first.
    pub fn mount(&mut self, page: &mut Page) -> PendingMount {
        if self.state.is_mounted() {
            self.unmount(page);
        }
        self.generation += 1;
        self.last_error = None;
        self.transition(WidgetState::Loading);
        tracing::debug!(host = ?self.host, src = %self.config.src, "fetching records");
        PendingMount {
            ticket: MountTicket {
                generation: self.generation,
            },
            source: Arc::clone(&self.source),
            location: self.config.src.clone(),
        }
    }

    /// Apply a fetch result: build the selector and render the first record.
    pub fn finish_mount(&mut self, page: &mut Page, fetched: FetchedRecords) -> Result<MountOutcome, WidgetError> {
        if fetched.ticket.generation != self.generation || self.state != WidgetState::Loading {
            tracing::debug!(host = ?self.host, "discarding fetch result for a stale mount");
            return Ok(MountOutcome::Discarded);
        }
        if !page.dom.contains(self.host) {
            tracing::debug!(host = ?self.host, "host left the page during fetch");
            self.transition(WidgetState::Unmounted);
            return Ok(MountOutcome::Discarded);
        }

        let records = match fetched.result {
            Ok(records) => Arc::new(records),
            Err(err) => {
                tracing::warn!(src = %self.config.src, error = %err, "record fetch failed");
                self.fail(err.clone());
                return Err(err);
            }
        };

        let slots = SlotSet::collect(&page.dom, self.host);
        let origins = slots.origins(&page.dom);
        let content = page.dom.prepend_child(self.host, NodeData::element(CONTENT_TAG));
        let mut target = RenderTarget::attach(&mut page.dom, content);
        target.park(slots);
        let (selector, changes) = SelectorBuilder::build(
            &mut page.dom,
            self.host,
            Arc::clone(&records),
            &self.config.label_field,
        );

        let first = records.first().cloned();
        let count = records.len();
        self.session = Some(Session {
            records,
            template: page.templates.get(&self.config.template_id),
            selector,
            changes,
            content,
            target,
            origins,
            current: None,
        });
        self.transition(WidgetState::Ready);
        tracing::info!(host = ?self.host, records = count, "widget ready");

        match first {
            Some(record) => self.render_record(page, record).map(|()| MountOutcome::Ready),
            None => Ok(MountOutcome::Ready),
        }
    }

    /// Run all three mount steps.
    pub async fn mount_and_wait(&mut self, page: &mut Page) -> Result<MountOutcome, WidgetError> {
        let pending = self.mount(page);
        let fetched = pending.resolve().await;
        self.finish_mount(page, fetched)
    }

    /// Tear down: detach the selector, return fragments to the host, and
    /// remove everything the widget inserted. Subscriptions are kept.
    pub fn unmount(&mut self, page: &mut Page) {
        self.generation += 1;
        if let Some(session) = self.session.take() {
            session.teardown(&mut page.dom, self.host);
        }
        if self.state.is_mounted() {
            tracing::debug!(host = ?self.host, "unmounted");
        }
        self.transition(WidgetState::Unmounted);
    }

    // ── Selection ────────────────────────────────────────────────────

    /// Pick the option whose value is `value`, as a user would.
    ///
    /// Does nothing when the widget has no selector.
    pub fn select(&mut self, page: &mut Page, value: &str) -> Result<(), WidgetError> {
        let Some(session) = self.session.as_mut() else {
            tracing::debug!(host = ?self.host, value, "selection ignored; widget not mounted");
            return Ok(());
        };
        session.selector.select_value(&mut page.dom, value);
        self.process_changes(page)
    }

    /// Pick the option at `index`.
    pub fn select_index(&mut self, page: &mut Page, index: usize) -> Result<(), WidgetError> {
        let Some(session) = self.session.as_mut() else {
            return Ok(());
        };
        session.selector.select_index(&mut page.dom, index);
        self.process_changes(page)
    }

    /// Render once per pending selection, in emission order.
    ///
    /// Returns the first render error; later selections are still rendered.
    fn process_changes(&mut self, page: &mut Page) -> Result<(), WidgetError> {
        let pending = match self.session.as_mut() {
            Some(session) => session.changes.drain(),
            None => return Ok(()),
        };
        let mut outcome = Ok(());
        for envelope in pending {
            self.listeners.emit(&envelope);
            let Some(record) = envelope.event.record().cloned() else {
                continue;
            };
            if let Err(err) = self.render_record(page, record) {
                outcome = outcome.and(Err(err));
            }
        }
        outcome
    }

    fn render_record(&mut self, page: &mut Page, record: Arc<Record>) -> Result<(), WidgetError> {
        if self.session.is_none() {
            return Ok(());
        }
        self.transition(WidgetState::Rendering);
        let result = match self.session.as_mut() {
            Some(session) => {
                session.current = Some(Arc::clone(&record));
                session.render(page, &self.config, &record)
            }
            None => Ok(()),
        };
        match result {
            Ok(()) => {
                self.transition(WidgetState::Ready);
                self.emit(WidgetEvent::Rendered { id: record.id() });
                Ok(())
            }
            Err(err) => {
                if let WidgetError::TemplateMissing(id) = &err {
                    tracing::error!(host = ?self.host, template = %id, "template not found");
                }
                self.fail(err.clone());
                Err(err)
            }
        }
    }

    fn fail(&mut self, err: WidgetError) {
        self.transition(WidgetState::Error);
        self.last_error = Some(err.clone());
        self.emit(WidgetEvent::Failed(err));
    }

    fn emit(&mut self, event: WidgetEvent) {
        let envelope = Envelope::new(event, self.host);
        self.listeners.emit(&envelope);
    }

    fn transition(&mut self, to: WidgetState) {
        debug_assert!(
            self.state.can_transition(to),
            "illegal transition {} -> {}",
            self.state,
            to
        );
        self.state = to;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StaticSource;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    const PAGE: &str = r#"<template id="letter-box-template"><p>Dear {{last_name}},</p><slot name="footer"></slot></template><letter-box src="/people" properties="last_name"><i slot="footer">Regards</i></letter-box>"#;
    const PEOPLE: &str = r#"[{"id":1,"last_name":"Ada"},{"id":2,"last_name":"Grace"}]"#;

    fn setup(source: StaticSource) -> (Page, LetterWidget) {
        let page = Page::from_markup(PAGE).unwrap();
        let host = page.hosts()[0];
        let widget = LetterWidget::from_host(&page, host, Arc::new(source)).unwrap();
        (page, widget)
    }

    #[test]
    fn from_host_reads_config() {
        let (_page, widget) = setup(StaticSource::new());
        assert_eq!(widget.config().src, "/people");
        assert_eq!(widget.config().properties.iter().collect::<Vec<_>>(), vec!["last_name"]);
        assert_eq!(widget.state(), WidgetState::Unmounted);
    }

    #[test]
    fn from_host_requires_src() {
        let page = Page::from_markup("<letter-box></letter-box>").unwrap();
        let host = page.hosts()[0];
        let err = LetterWidget::from_host(&page, host, Arc::new(StaticSource::new())).unwrap_err();
        assert!(matches!(err, WidgetError::InvalidConfig(_)));
    }

    #[test]
    fn mount_renders_first_record() {
        let (mut page, mut widget) = setup(StaticSource::new().with_json("/people", PEOPLE));
        let outcome = tokio_test::block_on(widget.mount_and_wait(&mut page)).unwrap();
        assert_eq!(outcome, MountOutcome::Ready);
        assert_eq!(widget.state(), WidgetState::Ready);
        assert_eq!(
            widget.rendered_html(&page).unwrap(),
            r#"<p>Dear Ada,</p><i slot="footer">Regards</i>"#
        );
        assert_eq!(widget.selector_labels(), vec!["Ada", "Grace"]);
    }

    #[test]
    fn host_children_order_after_mount() {
        let (mut page, mut widget) = setup(StaticSource::new().with_json("/people", PEOPLE));
        tokio_test::block_on(widget.mount_and_wait(&mut page)).unwrap();
        let tags: Vec<_> = page
            .dom
            .children(widget.host())
            .iter()
            .map(|&c| page.dom.get(c).unwrap().tag().unwrap().to_owned())
            .collect();
        assert_eq!(tags, vec!["select", CONTENT_TAG]);
    }

    #[tokio::test]
    async fn loading_exposes_nothing() {
        let (mut page, mut widget) = setup(StaticSource::new().with_json("/people", PEOPLE));
        let pending = widget.mount(&mut page);
        assert_eq!(widget.state(), WidgetState::Loading);
        assert!(widget.selector_node().is_none());
        assert!(widget.rendered_html(&page).is_none());
        let fetched = pending.resolve().await;
        widget.finish_mount(&mut page, fetched).unwrap();
        assert!(widget.selector_node().is_some());
    }

    #[tokio::test]
    async fn fetch_failure_enters_error() {
        let (mut page, mut widget) = setup(StaticSource::new().with_status("/people", 500));
        let (_id, mut events) = widget.subscribe();
        let err = widget.mount_and_wait(&mut page).await.unwrap_err();
        assert_eq!(
            err,
            WidgetError::SourceUnavailable {
                code: 500,
                reason: "Internal Server Error".into()
            }
        );
        assert_eq!(widget.state(), WidgetState::Error);
        assert_eq!(widget.last_error(), Some(&err));
        assert!(widget.selector_node().is_none());
        assert_eq!(events.try_recv().unwrap().event, WidgetEvent::Failed(err));
    }

    #[tokio::test]
    async fn late_fetch_after_unmount_is_discarded() {
        let source = StaticSource::new()
            .with_json("/people", PEOPLE)
            .with_latency(Duration::from_millis(5));
        let (mut page, mut widget) = setup(source);
        let before = page.html();

        let pending = widget.mount(&mut page);
        widget.unmount(&mut page);
        let fetched = pending.resolve().await;
        assert!(fetched.is_ok());

        let outcome = widget.finish_mount(&mut page, fetched).unwrap();
        assert_eq!(outcome, MountOutcome::Discarded);
        assert_eq!(widget.state(), WidgetState::Unmounted);
        assert_eq!(page.html(), before);
    }

    #[tokio::test]
    async fn superseded_fetch_is_discarded() {
        let (mut page, mut widget) = setup(StaticSource::new().with_json("/people", PEOPLE));
        let stale = widget.mount(&mut page);
        let fresh = widget.mount(&mut page);
        assert_ne!(stale.ticket(), fresh.ticket());

        let stale = stale.resolve().await;
        assert_eq!(widget.finish_mount(&mut page, stale).unwrap(), MountOutcome::Discarded);
        assert_eq!(widget.state(), WidgetState::Loading);

        let fresh = fresh.resolve().await;
        assert_eq!(widget.finish_mount(&mut page, fresh).unwrap(), MountOutcome::Ready);
    }

    #[tokio::test]
    async fn remount_refetches() {
        let source = Arc::new(StaticSource::new().with_json("/people", PEOPLE));
        let mut page = Page::from_markup(PAGE).unwrap();
        let host = page.hosts()[0];
        let mut widget = LetterWidget::from_host(&page, host, source.clone()).unwrap();

        widget.mount_and_wait(&mut page).await.unwrap();
        widget.select(&mut page, "2").unwrap();
        widget.mount_and_wait(&mut page).await.unwrap();

        assert_eq!(source.calls(), 2);
        assert_eq!(widget.current_record().unwrap().text("last_name"), "Ada");
        // One selector, one content region: the first mount was torn down.
        assert_eq!(page.dom.children(host).len(), 2);
    }

    #[tokio::test]
    async fn unmount_restores_host() {
        let (mut page, mut widget) = setup(StaticSource::new().with_json("/people", PEOPLE));
        let before = page.html();
        widget.mount_and_wait(&mut page).await.unwrap();
        widget.select(&mut page, "2").unwrap();
        widget.unmount(&mut page);

        assert_eq!(widget.state(), WidgetState::Unmounted);
        assert_eq!(page.html(), before);
        assert!(widget.rendered_html(&page).is_none());
        assert!(widget.selector_labels().is_empty());
    }

    #[tokio::test]
    async fn unmount_puts_nested_fragments_back_in_place() {
        let markup = r#"<template id="letter-box-template"><slot name="header"></slot><p>{{last_name}}</p><slot name="footer"></slot></template><letter-box src="/people" properties="last_name"><p>intro</p><div class="sig"><b>--</b><i slot="footer">Regards {{last_name}}</i><u>end</u></div><em slot="header">Hi</em></letter-box>"#;
        let mut page = Page::from_markup(markup).unwrap();
        let host = page.hosts()[0];
        let source = Arc::new(StaticSource::new().with_json("/people", PEOPLE));
        let mut widget = LetterWidget::from_host(&page, host, source).unwrap();
        let before = page.html();

        for _ in 0..2 {
            widget.mount_and_wait(&mut page).await.unwrap();
            widget.select(&mut page, "2").unwrap();
            assert_eq!(
                widget.rendered_html(&page).unwrap(),
                r#"<em slot="header">Hi</em><p>Grace</p><i slot="footer">Regards Grace</i>"#
            );
            widget.unmount(&mut page);
            assert_eq!(page.html(), before);
        }
    }

    #[tokio::test]
    async fn missing_template_then_recovery() {
        let page_markup = r#"<letter-box src="/people" properties="last_name"></letter-box>"#;
        let mut page = Page::from_markup(page_markup).unwrap();
        let host = page.hosts()[0];
        let source = Arc::new(StaticSource::new().with_json("/people", PEOPLE));
        let mut widget = LetterWidget::from_host(&page, host, source).unwrap();

        let err = widget.mount_and_wait(&mut page).await.unwrap_err();
        assert_eq!(err, WidgetError::TemplateMissing("letter-box-template".into()));
        assert_eq!(widget.state(), WidgetState::Error);
        // The selector is still there and wired.
        assert_eq!(widget.selector_labels().len(), 2);

        page.append_markup(r#"<template id="letter-box-template"><b>{{last_name}}</b></template>"#)
            .unwrap();
        widget.select(&mut page, "2").unwrap();
        assert_eq!(widget.state(), WidgetState::Ready);
        assert_eq!(widget.rendered_html(&page).unwrap(), "<b>Grace</b>");
    }

    #[tokio::test]
    async fn events_follow_selection() {
        let (mut page, mut widget) = setup(StaticSource::new().with_json("/people", PEOPLE));
        let (_id, mut events) = widget.subscribe();
        widget.mount_and_wait(&mut page).await.unwrap();
        widget.select(&mut page, "2").unwrap();

        let names: Vec<_> = std::iter::from_fn(|| events.try_recv().ok())
            .map(|env| env.event.name())
            .collect();
        assert_eq!(names, vec!["letter:rendered", "data-item:selected", "letter:rendered"]);
    }

    #[tokio::test]
    async fn select_before_mount_is_ignored() {
        let (mut page, mut widget) = setup(StaticSource::new());
        widget.select(&mut page, "1").unwrap();
        widget.select_index(&mut page, 0).unwrap();
        assert_eq!(widget.state(), WidgetState::Unmounted);
    }

    #[tokio::test]
    async fn host_removed_during_fetch() {
        let (mut page, mut widget) = setup(StaticSource::new().with_json("/people", PEOPLE));
        let pending = widget.mount(&mut page);
        page.dom.remove(widget.host());
        let fetched = pending.resolve().await;
        assert_eq!(widget.finish_mount(&mut page, fetched).unwrap(), MountOutcome::Discarded);
        assert_eq!(widget.state(), WidgetState::Unmounted);
    }
}
