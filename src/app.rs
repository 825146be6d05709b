use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use eframe::egui;

use crate::api::client::ApiClient;
use crate::chart::assemble::{build_plan, AssembleOutcome};
use crate::chart::fetch::{fetch_batch, RawSeries};
use crate::state::prefs::Prefs;
use crate::state::registry::{load_registry, Registry, RegistryLoad};
use crate::state::selection::{ChartSelection, Focus, FocusMode};
use crate::state::theme::Theme;
use crate::ui::catalog_panel::{show_catalog_panel, CatalogAction};
use crate::ui::chart_panel::{show_chart_panel, ChartAction};
use crate::ui::chat_panel::ChatPanel;
use crate::ui::details_panel::{show_details_panel, DetailsAction};

/// Quiet window after the last selection or window change before a refresh
/// actually fires. A new change within the window restarts it.
const CHART_DEBOUNCE: Duration = Duration::from_millis(300);

/// Initial lookback window, in days.
const DEFAULT_DAYS: u32 = 90;

/// Chart fetch in flight. Results land in the slot from a worker task and
/// are picked up on the next frame.
struct PendingChart {
    generation: u64,
    slot: Arc<Mutex<Option<Vec<Option<RawSeries>>>>>,
}

/// The main dashboard application.
pub struct LiquidityPulseApp {
    runtime: tokio::runtime::Runtime,
    client: ApiClient,
    registry: Registry,
    selection: ChartSelection,
    focus: Focus,
    /// Lookback window for chart fetches.
    days: u32,
    theme: Theme,
    prefs: Prefs,
    chat: ChatPanel,
    /// Dismissable error shown in the status bar.
    error_banner: Option<String>,
    /// What the chart panel currently renders.
    outcome: AssembleOutcome,
    /// When the debounced refresh should fire, if one is scheduled.
    refresh_due: Option<Instant>,
    /// Selection revision already accounted for by the scheduler.
    seen_revision: u64,
    /// Days value already accounted for by the scheduler.
    seen_days: u32,
    /// Monotonic refresh counter; results from an older generation than the
    /// last applied one are discarded.
    generation: u64,
    applied_generation: u64,
    pending_registry: Option<Arc<Mutex<Option<RegistryLoad>>>>,
    pending_charts: Vec<PendingChart>,
}

impl LiquidityPulseApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let prefs = Prefs::load(cc.storage);
        let theme = Theme::default();

        let ctx = &cc.egui_ctx;
        let mut style = (*ctx.style()).clone();
        style
            .text_styles
            .insert(egui::TextStyle::Body, egui::FontId::proportional(15.0));
        style
            .text_styles
            .insert(egui::TextStyle::Button, egui::FontId::proportional(14.5));
        style
            .text_styles
            .insert(egui::TextStyle::Heading, egui::FontId::proportional(20.0));
        style.spacing.item_spacing = egui::vec2(8.0, 6.0);
        ctx.set_style(style);
        ctx.set_visuals(theme.visuals());

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .expect("failed to start the async runtime");
        let client = ApiClient::from_env();

        let mut app = Self {
            runtime,
            client,
            registry: Registry::default(),
            selection: ChartSelection::default(),
            focus: Focus::default(),
            days: DEFAULT_DAYS,
            theme,
            prefs,
            chat: ChatPanel::new(),
            error_banner: None,
            outcome: AssembleOutcome::EmptySelection,
            refresh_due: None,
            seen_revision: 0,
            seen_days: DEFAULT_DAYS,
            generation: 0,
            applied_generation: 0,
            pending_registry: None,
            pending_charts: Vec::new(),
        };
        app.start_registry_load(ctx);
        app.chat
            .load_history(app.runtime.handle(), &app.client, &app.prefs.session_id, ctx);
        app
    }

    fn start_registry_load(&mut self, ctx: &egui::Context) {
        let slot = Arc::new(Mutex::new(None));
        self.pending_registry = Some(slot.clone());

        let client = self.client.clone();
        let ctx = ctx.clone();
        self.runtime.spawn(async move {
            let load = load_registry(&client).await;
            *slot.lock().unwrap() = Some(load);
            ctx.request_repaint();
        });
    }

    /// Fire the refresh now: either clear the chart for an empty selection or
    /// spawn a batch fetch for the current one.
    fn start_assembly(&mut self, ctx: &egui::Context) {
        self.generation += 1;
        if self.selection.is_empty() {
            // Immediate, and in-flight results from before the clear are
            // outdated by construction.
            self.applied_generation = self.generation;
            self.outcome = AssembleOutcome::EmptySelection;
            return;
        }

        let slot = Arc::new(Mutex::new(None));
        self.pending_charts.push(PendingChart {
            generation: self.generation,
            slot: slot.clone(),
        });

        let client = self.client.clone();
        let indicator_ids = self.selection.indicator_ids();
        let series_ids = self.selection.series_ids();
        let days = self.days;
        let ctx = ctx.clone();
        self.runtime.spawn(async move {
            let results = fetch_batch(&client, &indicator_ids, &series_ids, days).await;
            *slot.lock().unwrap() = Some(results);
            ctx.request_repaint();
        });
    }

    fn poll_registry(&mut self) {
        let Some(slot) = &self.pending_registry else {
            return;
        };
        let done = slot.lock().unwrap().take();
        if let Some(load) = done {
            self.pending_registry = None;
            if let Some(err) = self.registry.apply(load) {
                self.error_banner = Some(err);
            }
            // Axis assignment depends on registry units, so re-run any
            // already-charted selection with the real catalog in hand.
            if !self.selection.is_empty() {
                self.refresh_due = Some(Instant::now());
            }
        }
    }

    fn poll_charts(&mut self) {
        let mut finished = Vec::new();
        self.pending_charts.retain(|pending| {
            match pending.slot.lock().unwrap().take() {
                Some(results) => {
                    finished.push((pending.generation, results));
                    false
                }
                None => true,
            }
        });
        for (generation, results) in finished {
            if generation <= self.applied_generation {
                tracing::debug!("discarding outdated chart results (gen {generation})");
                continue;
            }
            self.applied_generation = generation;
            let registry = &self.registry;
            self.outcome = build_plan(&results, |id| registry.units_for(id));
        }
    }

    /// Debounce scheduling: any selection or window change restarts the quiet
    /// period; when it elapses the refresh fires once.
    fn drive_refresh(&mut self, ctx: &egui::Context) {
        if self.selection.revision() != self.seen_revision || self.days != self.seen_days {
            self.seen_revision = self.selection.revision();
            self.seen_days = self.days;
            self.refresh_due = Some(Instant::now() + CHART_DEBOUNCE);
        }

        if let Some(due) = self.refresh_due {
            let now = Instant::now();
            if now >= due {
                self.refresh_due = None;
                self.start_assembly(ctx);
            } else {
                ctx.request_repaint_after(due - now);
            }
        }
    }

    fn show_header(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Liquidity Pulse");
                ui.label(egui::RichText::new("macro liquidity dashboard").weak());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui
                        .selectable_label(self.chat.open, "Assistant")
                        .clicked()
                    {
                        self.chat.open = !self.chat.open;
                    }
                    if ui.button(self.theme.label()).clicked() {
                        self.theme = self.theme.toggle();
                        ctx.set_visuals(self.theme.visuals());
                    }
                });
            });
        });
    }

    fn show_status_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if let Some(message) = self.error_banner.clone() {
                    if ui.small_button("\u{2715}").clicked() {
                        self.error_banner = None;
                    }
                    ui.colored_label(self.theme.error_color(), message);
                } else if self.registry.loaded {
                    ui.label(
                        egui::RichText::new(format!(
                            "{} indicators \u{2022} {} series",
                            self.registry.indicators.len(),
                            self.registry.series.len()
                        ))
                        .weak(),
                    );
                } else {
                    ui.spinner();
                    ui.label(egui::RichText::new("Loading registry...").weak());
                }
            });
        });
    }

    fn apply_catalog_action(&mut self, action: CatalogAction) {
        match action {
            CatalogAction::None => {}
            // A catalog click is one gesture with two halves: chart
            // membership and focus both toggle.
            CatalogAction::ToggleIndicator(id) => {
                self.selection.toggle_indicator(&id);
                self.focus.toggle(FocusMode::Indicator, &id);
            }
            CatalogAction::ToggleSeries(id) => {
                self.selection.toggle_series(&id);
                self.focus.toggle(FocusMode::Series, &id);
            }
        }
    }

    fn apply_details_action(&mut self, action: DetailsAction) {
        match action {
            DetailsAction::None => {}
            DetailsAction::FocusIndicator(id) => self.focus.set(FocusMode::Indicator, &id),
            DetailsAction::FocusSeries(id) => self.focus.set(FocusMode::Series, &id),
            DetailsAction::ClearFocus => self.focus.clear(),
        }
    }
}

impl eframe::App for LiquidityPulseApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_registry();
        self.poll_charts();
        self.chat.poll();

        self.show_header(ctx);
        self.show_status_bar(ctx);

        let catalog_action = egui::SidePanel::left("catalog")
            .default_width(280.0)
            .show(ctx, |ui| {
                show_catalog_panel(ui, &self.registry, &self.selection, &self.focus, &self.outcome)
            })
            .inner;

        let details_action = if self.focus.current().is_some() {
            egui::SidePanel::right("details")
                .default_width(320.0)
                .show(ctx, |ui| show_details_panel(ui, &self.registry, &self.focus))
                .inner
        } else {
            DetailsAction::None
        };

        let busy = !self.pending_charts.is_empty() || self.refresh_due.is_some();
        let chart_action = egui::CentralPanel::default()
            .show(ctx, |ui| {
                show_chart_panel(
                    ui,
                    &self.outcome,
                    &self.selection,
                    &mut self.days,
                    busy,
                    &self.theme,
                )
            })
            .inner;

        self.apply_catalog_action(catalog_action);
        self.apply_details_action(details_action);
        if let ChartAction::Clear = chart_action {
            self.selection.clear();
        }

        let handle = self.runtime.handle().clone();
        self.chat
            .show(ctx, &handle, &self.client, &mut self.prefs, &self.theme);

        self.drive_refresh(ctx);
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        self.prefs.save(storage);
    }
}
