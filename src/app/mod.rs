use std::collections::HashSet;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use eframe::egui::{self, Align, Context, Layout, Vec2};

use crate::ekg::{
    Backend, CachedQuery, DateRange, Entity, EventPage, EventRecord, EvolutionLink, FilterState,
    GraphSnapshot, GraphStats, STALE_AFTER, SnapshotKey, filter_events,
};

mod encoding;
mod graph;
mod layout;
mod render_utils;
mod ui;

use graph::RenderGraph;
use layout::{LayoutEngine, LayoutMode};

/// Settings resolved at startup from flags and environment.
pub struct AppConfig {
    pub page_size: usize,
    pub max_nodes: usize,
    pub preselect_event: Option<String>,
    pub preselect_date: Option<String>,
}

pub struct ExplorerApp {
    config: AppConfig,
    backend: Arc<Backend>,
    view: View,
    overview: OverviewState,
    graph: GraphState,
    timeline: TimelineState,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum View {
    Overview,
    Graph,
    Timeline,
}

/// Lifecycle of one background fetch. Loading holds the channel end the
/// worker thread reports into; the UI polls it every frame.
enum QueryState<T> {
    Idle,
    Loading(Receiver<Result<T, String>>),
    Ready(T),
    Error(String),
}

impl<T> QueryState<T> {
    fn poll(&mut self) {
        if let Self::Loading(rx) = self {
            match rx.try_recv() {
                Ok(Ok(value)) => *self = Self::Ready(value),
                Ok(Err(error)) => *self = Self::Error(error),
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => {
                    *self = Self::Error("background fetch worker disconnected".to_owned());
                }
            }
        }
    }

    fn take_ready(&mut self) -> Option<T> {
        if matches!(self, Self::Ready(_)) {
            match std::mem::replace(self, Self::Idle) {
                Self::Ready(value) => Some(value),
                _ => None,
            }
        } else {
            None
        }
    }

    fn is_loading(&self) -> bool {
        matches!(self, Self::Loading(_))
    }

    fn error(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message.as_str()),
            _ => None,
        }
    }
}

/// Runs a blocking backend call off the UI thread. Errors cross the channel
/// as their full context chain so the UI can show them verbatim.
fn spawn_query<T, F>(backend: &Arc<Backend>, job: F) -> QueryState<T>
where
    T: Send + 'static,
    F: FnOnce(&Backend) -> anyhow::Result<T> + Send + 'static,
{
    let backend = Arc::clone(backend);
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let result = job(&backend).map_err(|error| format!("{error:#}"));
        let _ = tx.send(result);
    });

    QueryState::Loading(rx)
}

/// One cached query family: the held value, its keyed cache, and any
/// in-flight fetch. `maintain` re-resolves through the cache whenever the
/// held value is missing, keyed differently, or past the freshness window.
struct CachedFetch<K, T> {
    name: &'static str,
    cache: CachedQuery<K, T>,
    query: QueryState<T>,
    asked: Option<K>,
    value: Option<(K, T)>,
}

impl<K: PartialEq + Clone, T: Clone + Send + 'static> CachedFetch<K, T> {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            cache: CachedQuery::new(),
            query: QueryState::Idle,
            asked: None,
            value: None,
        }
    }

    fn maintain<F>(&mut self, backend: &Arc<Backend>, key: K, job: F)
    where
        F: FnOnce(&Backend) -> anyhow::Result<T> + Send + 'static,
    {
        self.query.poll();
        if let Some(value) = self.query.take_ready() {
            let done = self.asked.clone().unwrap_or_else(|| key.clone());
            self.cache.store(done.clone(), value.clone());
            self.value = Some((done, value));
        }

        if self.query.is_loading() {
            return;
        }

        let held = matches!(&self.value, Some((held, _)) if held == &key);
        if let Some(value) = self.cache.lookup(&key, STALE_AFTER) {
            if !held {
                log::debug!("{} query served from cache", self.name);
                self.value = Some((key, value));
            }
            return;
        }

        // Missing or stale. An error holds until retried, unless the key
        // has moved on since the failed fetch.
        if self.query.error().is_none() || self.asked.as_ref() != Some(&key) {
            self.asked = Some(key.clone());
            self.query = spawn_query(backend, job);
        }
    }

    fn value(&self) -> Option<&T> {
        self.value.as_ref().map(|(_, value)| value)
    }

    fn is_loading(&self) -> bool {
        self.query.is_loading()
    }

    fn error(&self) -> Option<&str> {
        self.query.error()
    }

    /// Drops the held value and its cache entries so the next `maintain`
    /// fetches from the backend again.
    fn retry(&mut self) {
        self.cache.invalidate();
        self.value = None;
        self.asked = None;
        self.query = QueryState::Idle;
    }
}

struct OverviewState {
    stats: CachedFetch<(), GraphStats>,
    recent: CachedFetch<(usize, usize), EventPage>,
    entities: CachedFetch<(), Vec<Entity>>,
    links: CachedFetch<u32, Vec<EvolutionLink>>,
}

struct TimelineState {
    page: CachedFetch<(usize, usize), EventPage>,
    offset: usize,
    /// Date filter applied to the displayed page, independent of the graph
    /// view's filters.
    range: DateRange,
    selected: Option<String>,
}

struct GraphState {
    node_limit: usize,
    min_score: f32,
    cache: CachedQuery<SnapshotKey, GraphSnapshot>,
    query: QueryState<GraphSnapshot>,
    expand: QueryState<GraphSnapshot>,
    snapshot: Option<GraphSnapshot>,
    /// Event projections of the current snapshot, derivation input for the
    /// filter panel and visibility.
    events: Vec<EventRecord>,
    filters: FilterState,
    header_range: DateRange,
    layout_mode: LayoutMode,
    group_by_type: bool,
    layout: LayoutEngine,
    render: RenderGraph,
    render_revision: u64,
    graph_dirty: bool,
    pan: Vec2,
    zoom: f32,
    selected: Option<String>,
    search_match_cache: Option<SearchMatchCache>,
}

struct SearchMatchCache {
    query: String,
    render_revision: u64,
    matches: Arc<HashSet<usize>>,
}

/// A --date of 2023-03-19 preselects its whole calendar year.
fn preselect_year_range(date: &str) -> Option<DateRange> {
    let year = date.get(0..4)?;
    Some(DateRange {
        start_date: format!("{year}-01-01"),
        end_date: format!("{year}-12-31"),
    })
}

impl ExplorerApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, backend: Backend, config: AppConfig) -> Self {
        let mut graph = GraphState::new();
        let mut timeline_range = DateRange::default();
        if let Some(range) = config.preselect_date.as_deref().and_then(preselect_year_range) {
            graph.filters.start_date = range.start_date.clone();
            graph.filters.end_date = range.end_date.clone();
            timeline_range = range;
        }
        graph.selected = config.preselect_event.clone();

        Self {
            backend: Arc::new(backend),
            view: View::Graph,
            overview: OverviewState {
                stats: CachedFetch::new("stats"),
                recent: CachedFetch::new("recent events"),
                entities: CachedFetch::new("entities"),
                links: CachedFetch::new("evolution links"),
            },
            graph,
            timeline: TimelineState {
                page: CachedFetch::new("timeline page"),
                offset: 0,
                range: timeline_range,
                selected: config.preselect_event.clone(),
            },
            config,
        }
    }
}

impl GraphState {
    fn new() -> Self {
        Self {
            node_limit: 100,
            min_score: 0.5,
            cache: CachedQuery::new(),
            query: QueryState::Idle,
            expand: QueryState::Idle,
            snapshot: None,
            events: Vec::new(),
            filters: FilterState::default(),
            header_range: DateRange::default(),
            layout_mode: LayoutMode::default(),
            group_by_type: false,
            layout: LayoutEngine::default(),
            render: RenderGraph::default(),
            render_revision: 0,
            graph_dirty: false,
            pan: Vec2::ZERO,
            zoom: 1.0,
            selected: None,
            search_match_cache: None,
        }
    }

    /// Drives fetches forward: completes in-flight queries, consults the
    /// cache, and starts a snapshot fetch when nothing is held.
    fn maintain(&mut self, backend: &Arc<Backend>, max_nodes: usize) {
        self.query.poll();
        if let Some(snapshot) = self.query.take_ready() {
            self.cache
                .store(SnapshotKey::new(self.node_limit, self.min_score), snapshot.clone());
            self.snapshot = Some(snapshot);
            self.graph_dirty = true;
        }

        self.expand.poll();
        if let Some(fragment) = self.expand.take_ready()
            && let Some(snapshot) = &mut self.snapshot
        {
            snapshot.merge(fragment);
            // The merged snapshot no longer matches its query key.
            self.cache.invalidate();
            self.graph_dirty = true;
        }

        if self.snapshot.is_none() && !self.query.is_loading() && self.query.error().is_none() {
            let key = SnapshotKey::new(self.node_limit, self.min_score);
            if let Some(snapshot) = self.cache.lookup(&key, STALE_AFTER) {
                log::debug!("snapshot query served from cache");
                self.snapshot = Some(snapshot);
                self.graph_dirty = true;
            } else {
                let limit = self.node_limit.min(max_nodes);
                let min_score = key.min_score();
                self.query =
                    spawn_query(backend, move |backend| backend.graph_snapshot(limit, min_score));
            }
        }
    }

    /// Discards the held snapshot so the next frame re-resolves it through
    /// the cache (or refetches after `refetch`).
    fn reload(&mut self, refetch: bool) {
        if refetch {
            self.cache.invalidate();
        }
        self.snapshot = None;
        self.query = QueryState::Idle;
    }

    /// Recomputes the visible subgraph and restarts the layout. A refused
    /// layout start leaves the view degraded instead of crashing the frame.
    fn rebuild(&mut self) {
        let Some(snapshot) = &self.snapshot else {
            return;
        };

        self.events = snapshot.events();
        let visible_ids = filter_events(&self.events, &self.filters, &self.header_range)
            .into_iter()
            .map(|event| event.event_id)
            .collect::<HashSet<_>>();

        let (nodes, edges) = crate::ekg::visible_subgraph(snapshot, &visible_ids);
        self.render = RenderGraph::build(&nodes, &edges, &self.render);
        self.render_revision += 1;
        self.search_match_cache = None;
        self.graph_dirty = false;

        // A refused start leaves the engine uninitialized; the canvas
        // renders raw positions until the next rebuild.
        if let Err(error) = self.layout.restart(self.layout_mode, &mut self.render) {
            log::error!("layout initialization failed: {error:#}");
        }
    }

    fn visible_event_count(&self) -> usize {
        filter_events(&self.events, &self.filters, &self.header_range).len()
    }
}

impl eframe::App for ExplorerApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("FE-EKG Explorer");
                    ui.separator();
                    ui.selectable_value(&mut self.view, View::Overview, "Overview");
                    ui.selectable_value(&mut self.view, View::Graph, "Graph");
                    ui.selectable_value(&mut self.view, View::Timeline, "Timeline");

                    if self.view == View::Graph {
                        ui.separator();
                        self.graph.draw_header_range(ui);
                    }

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(self.backend.location_hint());
                    });
                });
            });

        match self.view {
            View::Overview => {
                self.overview.maintain(&self.backend);
                egui::CentralPanel::default()
                    .show(ctx, |ui| self.overview.draw(ui, &self.backend));
            }
            View::Graph => {
                self.graph.maintain(&self.backend, self.config.max_nodes);
                if self.graph.graph_dirty {
                    self.graph.rebuild();
                }

                egui::SidePanel::left("filters")
                    .resizable(true)
                    .default_width(280.0)
                    .show(ctx, |ui| self.graph.draw_controls(ui, &self.config));

                let backend = Arc::clone(&self.backend);
                egui::SidePanel::right("details")
                    .resizable(true)
                    .default_width(320.0)
                    .show(ctx, |ui| self.graph.draw_details(ui, &backend));

                let hint = backend.location_hint();
                egui::CentralPanel::default().show(ctx, |ui| self.graph.draw_canvas(ui, &hint));

                if self.graph.query.is_loading() || self.graph.expand.is_loading() {
                    ctx.request_repaint_after(Duration::from_millis(100));
                }
            }
            View::Timeline => {
                self.timeline.maintain(&self.backend, self.config.page_size);
                egui::CentralPanel::default()
                    .show(ctx, |ui| self.timeline.draw(ui, &self.backend, &self.config));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settle(
        fetch: &mut CachedFetch<(usize, usize), EventPage>,
        backend: &Arc<Backend>,
        offset: usize,
        limit: usize,
    ) {
        for _ in 0..200 {
            fetch.maintain(backend, (offset, limit), move |backend| {
                backend.events_page(offset, limit)
            });
            if !fetch.is_loading()
                && matches!(&fetch.value, Some((key, _)) if key == &(offset, limit))
            {
                return;
            }
            thread::sleep(Duration::from_millis(5));
        }
        panic!("fetch for offset {offset} did not settle");
    }

    #[test]
    fn revisiting_a_page_is_served_from_cache() {
        let backend = Arc::new(Backend::mock());
        let mut fetch = CachedFetch::new("timeline page");

        settle(&mut fetch, &backend, 0, 3);
        settle(&mut fetch, &backend, 3, 3);

        // Flipping back to a fresh page must not start another fetch.
        fetch.maintain(&backend, (0, 3), |backend| backend.events_page(0, 3));
        assert!(!fetch.is_loading());
        assert_eq!(fetch.value.as_ref().map(|(key, _)| *key), Some((0, 3)));
    }

    #[test]
    fn fresh_value_is_not_refetched() {
        let backend = Arc::new(Backend::mock());
        let mut fetch = CachedFetch::new("timeline page");
        settle(&mut fetch, &backend, 0, 3);

        fetch.maintain(&backend, (0, 3), |backend| backend.events_page(0, 3));
        assert!(!fetch.is_loading());
    }

    #[test]
    fn retry_drops_the_held_value_and_refetches() {
        let backend = Arc::new(Backend::mock());
        let mut fetch = CachedFetch::new("timeline page");
        settle(&mut fetch, &backend, 0, 3);

        fetch.retry();
        assert!(fetch.value().is_none());
        fetch.maintain(&backend, (0, 3), |backend| backend.events_page(0, 3));
        assert!(fetch.is_loading());
    }

    #[test]
    fn preselected_date_expands_to_its_year() {
        let range = preselect_year_range("2023-03-19").expect("valid date");
        assert_eq!(range.start_date, "2023-01-01");
        assert_eq!(range.end_date, "2023-12-31");

        assert!(preselect_year_range("20").is_none());
    }
}
