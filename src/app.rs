//! Audio classifier window: egui/eframe application.
//!
//! # Architecture
//!
//! [`ClassifierApp`] is the top-level [`eframe::App`].  It owns the file
//! list model, the current [`Inspection`], the status line and one channel
//! endpoint:
//!
//! * `playback_rx`: [`PlaybackEvent`]s from the [`Player`] running on the
//!   tokio blocking pool.
//!
//! Scanning, inspection and classification run synchronously inside
//! `update`; only playback leaves the UI thread.
//!
//! # Layout
//!
//! | Area | Content |
//! |------|---------|
//! | Top | File / Help menus |
//! | Left | Sort buttons + file list (classified rows muted) |
//! | Centre | Header, waveform, MFCC, volume, quick actions, label grids |
//! | Bottom | Status line (clears after 5 s) |

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use eframe::egui::{self, Color32, RichText};
use tokio::sync::mpsc;

use crate::audio::{PlaybackEvent, Player};
use crate::classify::{default_label, Classifier, ClassifyOutcome, DialogPrompt};
use crate::config::{ConfigStore, QuickAction};
use crate::inspect::{header_text, plot, Envelope, Inspection, Mfcc};
use crate::library::{FileListModel, SelectionChanged, SortMode, WalkDirScanner};
use crate::shortcuts::{self, Shortcut};
use crate::status::StatusLine;

const APP_NAME: &str = "Audio Classifier";
const APP_AUTHOR: &str = "Seth Persigehl";
const APP_URL: &str = "https://persigehl.com/audio-classifier";

const PLOT_HEIGHT: f32 = 160.0;
const LABELS_PER_ROW: usize = 4;
const LABEL_BUTTON_SIZE: [f32; 2] = [140.0, 28.0];
const DEFAULT_VOLUME: f32 = 100.0;

const GREEN: Color32 = Color32::from_rgb(46, 160, 67);
const RED: Color32 = Color32::from_rgb(200, 55, 55);

// ---------------------------------------------------------------------------
// UI-side state
// ---------------------------------------------------------------------------

/// What the centre panel currently shows.
#[derive(Debug)]
enum InspectorView {
    Empty,
    Ready(Inspection),
    Failed { header: String, message: String },
}

/// Requests collected while drawing, applied once the frame's UI is built.
#[derive(Debug, Clone, PartialEq)]
enum UiAction {
    LoadDirectory,
    SetAutoPlay(bool),
    Sort(SortMode),
    Select(usize),
    Play,
    Next,
    Previous,
    AcceptDefault,
    Unknown,
    Classify { label: String, secondary: bool },
    UnsupportedQuickAction(String),
    ShowAbout,
    ShowShortcuts,
}

impl From<Shortcut> for UiAction {
    fn from(shortcut: Shortcut) -> Self {
        match shortcut {
            Shortcut::LoadDirectory => UiAction::LoadDirectory,
            Shortcut::Play => UiAction::Play,
            Shortcut::Next => UiAction::Next,
            Shortcut::Previous => UiAction::Previous,
            Shortcut::AcceptDefault => UiAction::AcceptDefault,
            Shortcut::Unknown => UiAction::Unknown,
            Shortcut::About => UiAction::ShowAbout,
            Shortcut::ShowShortcuts => UiAction::ShowShortcuts,
        }
    }
}

/// File list scroll geometry from the previous frame.
#[derive(Debug, Default)]
struct ListView {
    offset: f32,
    viewport_height: f32,
    /// Bring the selected row into view on the next frame (keyboard
    /// navigation only; rebuilds restore the previous offset instead).
    reveal_selected: bool,
}

// ---------------------------------------------------------------------------
// ClassifierApp
// ---------------------------------------------------------------------------

pub struct ClassifierApp {
    // ── Model ────────────────────────────────────────────────────────────
    store: ConfigStore,
    classifier: Classifier,
    scanner: WalkDirScanner,
    files: FileListModel,
    inspector: InspectorView,

    // ── Playback ─────────────────────────────────────────────────────────
    player: Player,
    playback_rx: mpsc::Receiver<PlaybackEvent>,
    /// Requests queued or playing; keeps the frame loop polling.
    pending_playback: usize,
    now_playing: Option<PathBuf>,
    /// Percent, `0..=200`.
    volume: f32,

    // ── UI state ─────────────────────────────────────────────────────────
    status: StatusLine,
    list_view: ListView,
    show_about: bool,
    show_shortcuts: bool,
}

impl ClassifierApp {
    /// Build the app and load `initial_directory` when it exists.
    pub fn new(
        store: ConfigStore,
        player: Player,
        playback_rx: mpsc::Receiver<PlaybackEvent>,
        initial_directory: &Path,
    ) -> Self {
        let config = store.config();
        let mut app = Self {
            classifier: Classifier::from_config(config),
            files: FileListModel::new(config.output_directory.clone()),
            store,
            scanner: WalkDirScanner,
            inspector: InspectorView::Empty,
            player,
            playback_rx,
            pending_playback: 0,
            now_playing: None,
            volume: DEFAULT_VOLUME,
            status: StatusLine::new(),
            list_view: ListView::default(),
            show_about: false,
            show_shortcuts: false,
        };

        if initial_directory.is_dir() {
            app.load_directory(initial_directory);
        } else {
            log::warn!(
                "input directory {} does not exist; waiting for Load Directory",
                initial_directory.display()
            );
        }
        app
    }

    // ── Actions ──────────────────────────────────────────────────────────

    fn apply(&mut self, action: UiAction) {
        match action {
            UiAction::LoadDirectory => self.pick_directory(),
            UiAction::SetAutoPlay(enabled) => self.set_auto_play(enabled),
            UiAction::Sort(mode) => {
                let change = self.files.set_sort_mode(mode);
                self.on_selection_changed(change);
            }
            UiAction::Select(index) => {
                let change = self.files.select(index);
                self.on_selection_changed(change);
            }
            UiAction::Play => self.play_selected(),
            UiAction::Next => {
                let change = self.files.select_next();
                self.list_view.reveal_selected = true;
                self.on_selection_changed(change);
            }
            UiAction::Previous => {
                let change = self.files.select_previous();
                self.list_view.reveal_selected = true;
                self.on_selection_changed(change);
            }
            UiAction::AcceptDefault => self.accept_default(),
            UiAction::Unknown => self.classify_unknown(),
            UiAction::Classify { label, secondary } => self.classify(&label, secondary),
            UiAction::UnsupportedQuickAction(name) => {
                log::warn!("unsupported quick action: {name}");
            }
            UiAction::ShowAbout => self.show_about = true,
            UiAction::ShowShortcuts => self.show_shortcuts = true,
        }
    }

    fn pick_directory(&mut self) {
        let mut dialog = rfd::FileDialog::new().set_title("Load Directory");
        if let Some(current) = self.files.input_root() {
            dialog = dialog.set_directory(current);
        }
        if let Some(dir) = dialog.pick_folder() {
            self.load_directory(&dir);
        }
    }

    fn load_directory(&mut self, dir: &Path) {
        let change = self.files.load(dir, &self.scanner);
        log::info!("loaded {} files from {}", self.files.len(), dir.display());
        self.status.set(format!(
            "Loaded {} files from {}",
            self.files.len(),
            dir.display()
        ));
        self.on_selection_changed(change);
    }

    fn set_auto_play(&mut self, enabled: bool) {
        match self.store.update_auto_play(enabled) {
            Ok(()) => {
                let state = if enabled { "enabled" } else { "disabled" };
                self.status.set(format!("Auto play sound {state}."));
            }
            Err(e) => {
                log::warn!("could not persist auto_play_sound: {e}");
                self.status.set(format!("Error: {e}"));
            }
        }
    }

    fn on_selection_changed(&mut self, change: Option<SelectionChanged>) {
        if let Some(change) = change {
            self.inspect(&change.path);
            if self.store.config().auto_play_sound {
                self.play(&change.path);
            }
        }
        if self.files.selected_path().is_none() {
            self.inspector = InspectorView::Empty;
        }
    }

    fn inspect(&mut self, path: &Path) {
        self.inspector = match Inspection::load(path) {
            Ok(inspection) => InspectorView::Ready(inspection),
            Err(e) => {
                log::warn!("cannot inspect {}: {e}", path.display());
                self.status.set(format!("Error: {e}"));
                InspectorView::Failed {
                    header: header_text(path),
                    message: e.to_string(),
                }
            }
        };
    }

    fn play_selected(&mut self) {
        if let Some(path) = self.files.selected_path().map(Path::to_path_buf) {
            self.play(&path);
        }
    }

    fn play(&mut self, path: &Path) {
        self.pending_playback += 1;
        self.player.play(path, self.volume);
    }

    fn accept_default(&mut self) {
        let Some(path) = self.files.selected_path() else {
            return;
        };
        match default_label(path) {
            Some(label) => self.classify(&label, false),
            None => self.status.set(format!(
                "Error: no default label for {}",
                path.display()
            )),
        }
    }

    fn classify(&mut self, label: &str, secondary: bool) {
        let (Some(index), Some(path)) = (
            self.files.selected_index(),
            self.files.selected_path().map(Path::to_path_buf),
        ) else {
            return;
        };
        let result = self
            .classifier
            .classify(&path, label, secondary, &DialogPrompt);
        self.finish_classification(index, result);
    }

    fn classify_unknown(&mut self) {
        let (Some(index), Some(path)) = (
            self.files.selected_index(),
            self.files.selected_path().map(Path::to_path_buf),
        ) else {
            return;
        };
        let result = self.classifier.classify_unknown(&path);
        self.finish_classification(index, result);
    }

    fn finish_classification(
        &mut self,
        old_index: usize,
        result: Result<ClassifyOutcome, crate::classify::ClassifyError>,
    ) {
        match result {
            Ok(outcome) => {
                log::info!("{}", outcome.status_message().replace('\n', " "));
                self.status.set(outcome.status_message());
                if outcome.changed_filesystem() {
                    let change = self.files.reconcile(old_index, &self.scanner);
                    self.on_selection_changed(change);
                }
            }
            Err(e) => {
                log::warn!("classification failed: {e}");
                self.status.set(format!("Error: {e}"));
            }
        }
    }

    // ── Channel polling ──────────────────────────────────────────────────

    fn poll_playback(&mut self) {
        while let Ok(event) = self.playback_rx.try_recv() {
            match event {
                PlaybackEvent::Started { path } => {
                    self.now_playing = Some(path);
                }
                PlaybackEvent::Finished { .. } => {
                    self.pending_playback = self.pending_playback.saturating_sub(1);
                    self.now_playing = None;
                }
                PlaybackEvent::Failed { path, message } => {
                    self.pending_playback = self.pending_playback.saturating_sub(1);
                    self.now_playing = None;
                    self.status.set(format!(
                        "Error: cannot play {}: {message}",
                        path.display()
                    ));
                }
            }
        }
    }

    // ── Panels ───────────────────────────────────────────────────────────

    fn draw_menu(&mut self, ui: &mut egui::Ui, actions: &mut Vec<UiAction>) {
        egui::menu::bar(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.button("Load Directory").clicked() {
                    actions.push(UiAction::LoadDirectory);
                    ui.close_menu();
                }
                let mut auto_play = self.store.config().auto_play_sound;
                if ui.checkbox(&mut auto_play, "Auto Play Sound").changed() {
                    actions.push(UiAction::SetAutoPlay(auto_play));
                }
            });
            ui.menu_button("Help", |ui| {
                if ui.button("About").clicked() {
                    actions.push(UiAction::ShowAbout);
                    ui.close_menu();
                }
                if ui.button("Keyboard Shortcuts").clicked() {
                    actions.push(UiAction::ShowShortcuts);
                    ui.close_menu();
                }
            });
        });
    }

    fn draw_file_panel(&mut self, ui: &mut egui::Ui, actions: &mut Vec<UiAction>) {
        ui.horizontal(|ui| {
            let mode = self.files.sort_mode();
            if ui
                .selectable_label(mode == SortMode::Name, "Organize by File Name")
                .clicked()
            {
                actions.push(UiAction::Sort(SortMode::Name));
            }
            if ui
                .selectable_label(mode == SortMode::Path, "Organize by Path")
                .clicked()
            {
                actions.push(UiAction::Sort(SortMode::Path));
            }
        });
        ui.label(
            RichText::new(format!("{} files", self.files.len()))
                .color(ui.visuals().weak_text_color())
                .size(11.0),
        );
        ui.separator();

        let row_height = ui.spacing().interact_size.y;
        let row_stride = row_height + ui.spacing().item_spacing.y;
        let content_height = self.files.len() as f32 * row_stride;

        let mut area = egui::ScrollArea::vertical()
            .id_salt("file_list")
            .auto_shrink([false, false]);
        if let Some(fraction) = self.files.take_scroll_request() {
            area = area.vertical_scroll_offset(scroll_offset(
                fraction,
                content_height,
                self.list_view.viewport_height,
            ));
            self.list_view.reveal_selected = false;
        } else if std::mem::take(&mut self.list_view.reveal_selected) {
            if let Some(index) = self.files.selected_index() {
                let top = index as f32 * row_stride;
                let bottom = top + row_height;
                let view = self.list_view.viewport_height;
                if top < self.list_view.offset {
                    area = area.vertical_scroll_offset(top);
                } else if bottom > self.list_view.offset + view {
                    area = area.vertical_scroll_offset(bottom - view);
                }
            }
        }

        let selected = self.files.selected_index();
        let muted = ui.visuals().weak_text_color();
        let entries = self.files.entries();
        let output = area.show_rows(ui, row_height, entries.len(), |ui, rows| {
            for index in rows {
                let entry = &entries[index];
                let mut text = RichText::new(&entry.display);
                if entry.is_classified() {
                    text = text.color(muted);
                }
                let row = ui
                    .add_sized(
                        [ui.available_width(), row_height],
                        egui::SelectableLabel::new(selected == Some(index), text),
                    )
                    .on_hover_text(entry.tooltip());
                if row.clicked() {
                    actions.push(UiAction::Select(index));
                }
            }
        });

        self.list_view.offset = output.state.offset.y;
        self.list_view.viewport_height = output.inner_rect.height();
        self.files
            .set_scroll_fraction(scroll_fraction(output.state.offset.y, output.content_size.y));
    }

    fn draw_inspector(&mut self, ui: &mut egui::Ui, actions: &mut Vec<UiAction>) {
        let header = match &self.inspector {
            InspectorView::Empty => "No file selected",
            InspectorView::Ready(inspection) => inspection.header.as_str(),
            InspectorView::Failed { header, .. } => header.as_str(),
        };
        ui.label(RichText::new(header).strong().size(14.0));
        if let InspectorView::Failed { message, .. } = &self.inspector {
            ui.colored_label(RED, format!("Error: {message}"));
        }
        ui.add_space(4.0);

        ui.horizontal(|ui| {
            let plots_width = (ui.available_width() - 72.0).max(120.0);
            ui.allocate_ui(egui::vec2(plots_width, 2.0 * PLOT_HEIGHT + 8.0), |ui| {
                ui.vertical(|ui| match &self.inspector {
                    InspectorView::Ready(inspection) => {
                        plot::paint_waveform(
                            ui,
                            &inspection.envelope,
                            inspection.duration_secs,
                            PLOT_HEIGHT,
                        );
                        plot::paint_mfcc(ui, &inspection.mfcc, PLOT_HEIGHT);
                    }
                    _ => {
                        plot::paint_waveform(ui, &Envelope::default(), 0.0, PLOT_HEIGHT);
                        plot::paint_mfcc(ui, &Mfcc::default(), PLOT_HEIGHT);
                    }
                });
            });
            ui.vertical(|ui| {
                ui.label("Volume");
                ui.add(
                    egui::Slider::new(&mut self.volume, 0.0..=200.0)
                        .vertical()
                        .suffix("%"),
                );
                if self.now_playing.is_some() {
                    ui.colored_label(GREEN, "Playing");
                }
            });
        });

        ui.add_space(8.0);
        self.draw_quick_actions(ui, actions);

        ui.add_space(8.0);
        let labels = &self.store.config().labels;
        label_grid(ui, "Primary Labels", &labels.primary, false, actions);
        ui.add_space(4.0);
        label_grid(ui, "Secondary Labels", &labels.secondary, true, actions);
    }

    fn draw_quick_actions(&self, ui: &mut egui::Ui, actions: &mut Vec<UiAction>) {
        let default = self.files.selected_path().and_then(default_label);
        ui.horizontal_wrapped(|ui| {
            for quick in &self.store.config().quick_actions {
                let (caption, fill, action) = match quick {
                    QuickAction::Play => ("Play".to_string(), Some(GREEN), UiAction::Play),
                    QuickAction::AcceptDefault => (
                        match &default {
                            Some(label) => format!("Accept Default: {label}"),
                            None => "Accept Default".to_string(),
                        },
                        Some(GREEN),
                        UiAction::AcceptDefault,
                    ),
                    QuickAction::Unknown => ("Unknown".to_string(), Some(RED), UiAction::Unknown),
                    QuickAction::Next => (quick.caption(), None, UiAction::Next),
                    QuickAction::Previous => (quick.caption(), None, UiAction::Previous),
                    QuickAction::Other(name) => (
                        quick.caption(),
                        None,
                        UiAction::UnsupportedQuickAction(name.clone()),
                    ),
                };
                let button = match fill {
                    Some(fill) => egui::Button::new(RichText::new(caption).color(Color32::WHITE))
                        .fill(fill),
                    None => egui::Button::new(caption),
                };
                if ui.add(button).clicked() {
                    actions.push(action);
                }
            }
        });
    }

    fn draw_dialogs(&mut self, ctx: &egui::Context) {
        egui::Window::new("About")
            .open(&mut self.show_about)
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(RichText::new(APP_NAME).strong());
                ui.label(APP_AUTHOR);
                ui.hyperlink(APP_URL);
                ui.label(format!("Version: {}", env!("CARGO_PKG_VERSION")));
                ui.label(
                    RichText::new(format!("Settings: {}", self.store.path().display()))
                        .color(ui.visuals().weak_text_color()),
                );
            });

        egui::Window::new("Keyboard Shortcuts")
            .open(&mut self.show_shortcuts)
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(shortcuts::help_text());
            });
    }
}

/// Top of the visible area as a fraction of the total content height.
fn scroll_fraction(offset: f32, content_height: f32) -> f32 {
    if content_height > 0.0 {
        offset / content_height
    } else {
        0.0
    }
}

/// Inverse of [`scroll_fraction`], clamped to the scrollable range.
fn scroll_offset(fraction: f32, content_height: f32, viewport_height: f32) -> f32 {
    let max_offset = (content_height - viewport_height).max(0.0);
    (fraction * content_height).clamp(0.0, max_offset)
}

/// Label buttons, at most [`LABELS_PER_ROW`] per row.
fn label_grid(
    ui: &mut egui::Ui,
    title: &str,
    labels: &[String],
    secondary: bool,
    actions: &mut Vec<UiAction>,
) {
    if labels.is_empty() {
        return;
    }
    ui.label(RichText::new(title).strong());
    for row in labels.chunks(LABELS_PER_ROW) {
        ui.horizontal(|ui| {
            for label in row {
                if ui
                    .add_sized(LABEL_BUTTON_SIZE, egui::Button::new(label))
                    .clicked()
                {
                    actions.push(UiAction::Classify {
                        label: label.clone(),
                        secondary,
                    });
                }
            }
        });
    }
}

// ---------------------------------------------------------------------------
// eframe::App impl
// ---------------------------------------------------------------------------

impl eframe::App for ClassifierApp {
    /// Polls playback, draws every panel, then applies the frame's actions.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_playback();

        let mut actions: Vec<UiAction> = shortcuts::poll(ctx)
            .into_iter()
            .map(UiAction::from)
            .collect();

        egui::TopBottomPanel::top("menu").show(ctx, |ui| {
            self.draw_menu(ui, &mut actions);
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            let text = self.status.current().unwrap_or_default().to_string();
            ui.label(text);
        });

        let panel_width = self.store.config().file_panel_width as f32;
        egui::SidePanel::left("files")
            .default_width(panel_width)
            .resizable(true)
            .show(ctx, |ui| {
                self.draw_file_panel(ui, &mut actions);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .id_salt("inspector")
                .show(ui, |ui| self.draw_inspector(ui, &mut actions));
        });

        self.draw_dialogs(ctx);

        for action in actions {
            self.apply(action);
        }

        // --- Schedule repaints for background work and timers -------------
        if self.pending_playback > 0 {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
        if let Some(remaining) = self.status.remaining_at(Instant::now()) {
            ctx.request_repaint_after(remaining);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
