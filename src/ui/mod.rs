//! Control panel and suggestion popup.

pub mod popup;

use crate::checker::worker::{SuggestionReply, SuggestionWorker};
use crate::clipboard::{ClipboardSink, SystemClipboard};
use crate::keyboard::{KeyboardListener, ListenerEvent};
use crate::session::{CheckOutcome, Session};
use crate::Config;
use anyhow::Result;
use crossbeam_channel::Receiver;
use egui::{Color32, RichText};
use popup::{PopupAction, PopupTimings, SuggestionPopup};
use std::time::{Duration, Instant};

const PANEL_TITLE: &str = "System Spell Checker";
const POPUP_TITLE: &str = "Spell Check Suggestion";
const RECENT_WORDS_SHOWN: usize = 20;

#[derive(Debug, Clone, PartialEq)]
enum Status {
    Stopped,
    Monitoring,
    Failed(String),
}

pub struct SpellWatchApp {
    session: Session,
    listener: Option<KeyboardListener>,
    events: Option<Receiver<ListenerEvent>>,
    suggestions: Option<SuggestionWorker>,
    /// Request whose reply may open the next popup
    pending: Option<u64>,
    popup: Option<SuggestionPopup>,
    clipboard: Box<dyn ClipboardSink>,
    min_length_text: String,
    status: Status,
    timings: PopupTimings,
    popup_position: [f32; 2],
    channel_capacity: usize,
}

/// Open the control panel and block until it is closed
pub fn run(session: Session, config: &Config) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(PANEL_TITLE)
            .with_inner_size([400.0, 300.0])
            .with_always_on_top(),
        ..Default::default()
    };

    let app = SpellWatchApp::new(session, config, Box::new(SystemClipboard::default()));

    eframe::run_native(
        "spellwatch",
        options,
        Box::new(move |_cc| Ok(Box::new(app))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to start the GUI: {}", e))
}

impl SpellWatchApp {
    pub fn new(session: Session, config: &Config, clipboard: Box<dyn ClipboardSink>) -> Self {
        Self {
            min_length_text: session.min_word_length().to_string(),
            session,
            listener: None,
            events: None,
            suggestions: None,
            pending: None,
            popup: None,
            clipboard,
            status: Status::Stopped,
            timings: PopupTimings {
                timeout: Duration::from_millis(config.popup_timeout_ms),
                copy_confirm: Duration::from_millis(config.copy_confirm_ms),
            },
            popup_position: config.popup_position,
            channel_capacity: config.channel_capacity,
        }
    }

    fn start_monitoring(&mut self, ctx: &egui::Context) {
        if self.session.is_monitoring() {
            return;
        }

        if self.suggestions.is_none() {
            let repaint = ctx.clone();
            let suggester = self.session.checker().suggester();
            match SuggestionWorker::spawn(suggester, move || repaint.request_repaint()) {
                Ok(worker) => self.suggestions = Some(worker),
                Err(e) => {
                    tracing::error!(error = %e, "could not start suggestion thread");
                    self.status = Status::Failed(e.to_string());
                    return;
                }
            }
        }

        match &self.listener {
            Some(listener) => listener.set_enabled(true),
            None => {
                let repaint = ctx.clone();
                match KeyboardListener::spawn(self.channel_capacity, move || {
                    repaint.request_repaint()
                }) {
                    Ok((listener, events)) => {
                        self.listener = Some(listener);
                        self.events = Some(events);
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "could not start keyboard hook");
                        self.status = Status::Failed(e.to_string());
                        return;
                    }
                }
            }
        }

        self.session.start();
        self.status = Status::Monitoring;
        tracing::info!("monitoring started");
    }

    fn stop_monitoring(&mut self) {
        if !self.session.is_monitoring() {
            return;
        }

        if let Some(listener) = &self.listener {
            listener.set_enabled(false);
        }
        self.session.stop();
        self.pending = None;
        self.popup = None;
        self.status = Status::Stopped;
        tracing::info!(
            words_checked = self.session.stats().words_checked(),
            misspelled = self.session.stats().misspelled(),
            "monitoring stopped"
        );
    }

    /// Apply everything the hook thread queued since the last frame
    fn drain_events(&mut self) {
        let Some(events) = &self.events else {
            return;
        };
        let queued: Vec<ListenerEvent> = events.try_iter().collect();

        for event in queued {
            match event {
                ListenerEvent::Key { input, at } => {
                    if let Some(outcome) = self.session.handle_key(input, at) {
                        self.apply_outcome(outcome);
                    }
                }
                ListenerEvent::Failed(message) => {
                    self.session.stop();
                    self.listener = None;
                    self.events = None;
                    self.pending = None;
                    self.popup = None;
                    self.status = Status::Failed(message);
                    return;
                }
            }
        }
    }

    fn apply_outcome(&mut self, outcome: CheckOutcome) {
        let CheckOutcome::Misspelled {
            word,
            show_popup: true,
        } = outcome
        else {
            return;
        };

        match &mut self.suggestions {
            Some(worker) => self.pending = Some(worker.request(word)),
            None => tracing::warn!(word = %word, "no suggestion thread, popup skipped"),
        }
    }

    /// Open popups for suggestions that finished since the last frame
    fn drain_suggestions(&mut self, now: Instant) {
        let Some(worker) = &self.suggestions else {
            return;
        };
        let replies: Vec<SuggestionReply> = worker.replies().try_iter().collect();

        for reply in replies {
            self.apply_reply(reply, now);
        }
    }

    fn apply_reply(&mut self, reply: SuggestionReply, now: Instant) {
        if self.pending != Some(reply.id) {
            tracing::debug!(id = reply.id, "stale suggestions dropped");
            return;
        }
        self.pending = None;

        // A new popup always replaces the old one, even when it has nothing to show
        self.popup = SuggestionPopup::open(reply.word, reply.suggestions, now, self.timings);
    }

    fn apply_popup_action(&mut self, action: PopupAction, now: Instant) {
        match action {
            PopupAction::None => {}
            PopupAction::Copy(suggestion) => {
                if let Some(popup) = &mut self.popup {
                    popup.copy(&suggestion, self.clipboard.as_mut(), now);
                }
            }
            PopupAction::AddToDictionary => {
                if let Some(popup) = self.popup.take() {
                    if let Err(e) = self.session.checker_mut().add_personal_word(popup.word()) {
                        tracing::warn!(error = %e, "could not update personal dictionary");
                    }
                }
            }
            PopupAction::Close => self.popup = None,
        }
    }

    fn set_min_length(&mut self, value: usize) {
        self.session.set_min_word_length(value);
        self.min_length_text = self.session.min_word_length().to_string();
    }

    fn status_line(&self) -> (String, Color32) {
        match &self.status {
            Status::Stopped => ("Status: Stopped".to_string(), Color32::RED),
            Status::Monitoring => ("Status: Monitoring...".to_string(), Color32::GREEN),
            Status::Failed(message) => (
                format!("Status: Keyboard hook failed ({})", message),
                Color32::RED,
            ),
        }
    }

    fn render_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading("System-wide Spell Checker");
                let (status, color) = self.status_line();
                ui.colored_label(color, status);
            });
            ui.add_space(6.0);

            let monitoring = self.session.is_monitoring();
            ui.horizontal(|ui| {
                let start = egui::Button::new(RichText::new("Start Monitoring").strong())
                    .fill(Color32::DARK_GREEN);
                if ui.add_enabled(!monitoring, start).clicked() {
                    self.start_monitoring(ctx);
                }
                let stop = egui::Button::new(RichText::new("Stop Monitoring").strong())
                    .fill(Color32::DARK_RED);
                if ui.add_enabled(monitoring, stop).clicked() {
                    self.stop_monitoring();
                }
            });
            ui.add_space(6.0);

            ui.group(|ui| {
                ui.label(RichText::new("Settings").strong());
                ui.horizontal(|ui| {
                    ui.label("Minimum word length:");
                    if ui.small_button("-").clicked() {
                        self.set_min_length(self.session.min_word_length().saturating_sub(1));
                    }
                    let field = ui.add(
                        egui::TextEdit::singleline(&mut self.min_length_text).desired_width(32.0),
                    );
                    if field.lost_focus() {
                        let parsed = crate::config::parse_min_word_length(&self.min_length_text);
                        self.set_min_length(parsed);
                    }
                    if ui.small_button("+").clicked() {
                        self.set_min_length(self.session.min_word_length() + 1);
                    }
                });
            });

            ui.group(|ui| {
                let stats = self.session.stats();
                ui.label(RichText::new("Statistics").strong());
                ui.label(format!("Words checked: {}", stats.words_checked()));
                ui.label(format!("Misspelled words: {}", stats.misspelled()));
                egui::ScrollArea::vertical().max_height(64.0).show(ui, |ui| {
                    ui.add(
                        egui::Label::new(self.session.history().recent(RECENT_WORDS_SHOWN)).wrap(),
                    );
                });
            });
        });
    }

    fn render_popup(&mut self, ctx: &egui::Context, now: Instant) {
        let Some(popup) = &self.popup else {
            return;
        };

        let builder = egui::ViewportBuilder::default()
            .with_title(POPUP_TITLE)
            .with_inner_size([300.0, 150.0])
            .with_position(self.popup_position)
            .with_resizable(false)
            .with_always_on_top();

        let action = ctx.show_viewport_immediate(
            egui::ViewportId::from_hash_of("suggestion_popup"),
            builder,
            |ctx, class| {
                let mut action = PopupAction::None;
                if matches!(class, egui::ViewportClass::Embedded) {
                    // Backend without multi-window support
                    egui::Window::new(POPUP_TITLE)
                        .collapsible(false)
                        .resizable(false)
                        .default_pos(self.popup_position)
                        .show(ctx, |ui| action = popup_contents(ui, popup));
                } else {
                    egui::CentralPanel::default().show(ctx, |ui| action = popup_contents(ui, popup));
                    if ctx.input(|i| i.viewport().close_requested()) {
                        action = PopupAction::Close;
                    }
                }
                action
            },
        );

        self.apply_popup_action(action, now);
    }
}

fn popup_contents(ui: &mut egui::Ui, popup: &SuggestionPopup) -> PopupAction {
    let mut action = PopupAction::None;

    ui.vertical_centered(|ui| {
        ui.label(
            RichText::new(format!("Misspelled: '{}'", popup.word()))
                .strong()
                .color(Color32::RED),
        );
        ui.label("Suggestions:");
        for suggestion in popup.suggestions() {
            if ui.button(suggestion).clicked() {
                action = PopupAction::Copy(suggestion.clone());
            }
        }
        match popup.copied() {
            Some(copied) => {
                ui.colored_label(Color32::GREEN, format!("Copied '{}' to clipboard!", copied));
            }
            None => {
                if ui.small_button("Add to dictionary").clicked() {
                    action = PopupAction::AddToDictionary;
                }
            }
        }
    });

    action
}

impl eframe::App for SpellWatchApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();

        self.drain_events();
        self.drain_suggestions(now);
        if self.popup.as_ref().is_some_and(|popup| popup.is_expired(now)) {
            self.popup = None;
        }

        self.render_panel(ctx);
        self.render_popup(ctx, now);

        if let Some(popup) = &self.popup {
            ctx.request_repaint_after(popup.deadline().saturating_duration_since(now));
        }
    }
}
