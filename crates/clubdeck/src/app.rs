use std::time::{Duration as StdDuration, Instant};

use chrono::{NaiveDateTime, NaiveTime, Timelike};
use eframe::egui;

use crate::clock::{Clock, SecondTicker, SystemClock};
use crate::config::{Config, DAY_NAMES, FinalSlideKind, Settings};
use crate::countdown::{self, Countdown};
use crate::deck::{self, Accent, Deck};
use crate::render::{
    self,
    image_cache::ImageCache,
    transition::{SlideTransition, TransitionDirection, ease_in_out},
};
use crate::schedule::{self, ScheduleTracker};
use crate::theme::Theme;

const APP_TITLE: &str = "clubdeck";

struct Toast {
    message: String,
    start: Instant,
}

impl Toast {
    fn new(message: String) -> Self {
        Self {
            message,
            start: Instant::now(),
        }
    }

    fn opacity(&self) -> f32 {
        let elapsed = self.start.elapsed().as_secs_f32();
        let duration = 2.5;
        let fade_start = 2.0;
        if elapsed < fade_start {
            1.0
        } else if elapsed < duration {
            1.0 - (elapsed - fade_start) / (duration - fade_start)
        } else {
            0.0
        }
    }

    fn is_expired(&self) -> bool {
        self.start.elapsed().as_secs_f32() >= 2.5
    }
}

struct StandbyState {
    ticker: SecondTicker,
}

impl StandbyState {
    fn new() -> Self {
        Self {
            ticker: SecondTicker::new(),
        }
    }
}

struct CountdownState {
    countdown: Countdown,
    ticker: SecondTicker,
    /// Set for the scheduled lead-in; remembered when the user cancels so the
    /// lead-in check does not bounce straight back into Countdown.
    occurrence: Option<NaiveDateTime>,
}

impl CountdownState {
    fn manual(minutes: u32, now: NaiveDateTime) -> Self {
        Self {
            countdown: Countdown::fixed(minutes),
            ticker: SecondTicker::primed(now),
            occurrence: None,
        }
    }

    fn automatic(occurrence: NaiveDateTime, now: NaiveDateTime) -> Self {
        Self {
            countdown: Countdown::until(occurrence),
            ticker: SecondTicker::primed(now),
            occurrence: Some(occurrence),
        }
    }
}

struct SlideshowState {
    deck: Deck,
    current: usize,
    tracker: ScheduleTracker,
    ticker: SecondTicker,
    transition: Option<SlideTransition>,
    slide_shown_at: NaiveDateTime,
    confirm_exit: bool,
}

impl SlideshowState {
    fn new(deck: Deck, now: NaiveDateTime) -> Self {
        Self {
            deck,
            current: 0,
            tracker: ScheduleTracker::new(),
            ticker: SecondTicker::primed(now),
            transition: None,
            slide_shown_at: now,
            confirm_exit: false,
        }
    }

    fn begin_transition(&mut self, to: usize) {
        let direction = if to >= self.current {
            TransitionDirection::Forward
        } else {
            TransitionDirection::Backward
        };
        self.transition = Some(SlideTransition::new(self.current, to, direction));
    }

    /// Commit a finished fade: the target slide becomes current.
    fn settle_transition(&mut self, now: NaiveDateTime) {
        if self.transition.as_ref().is_some_and(|t| t.is_complete()) {
            if let Some(t) = self.transition.take() {
                self.current = t.to;
                self.slide_shown_at = now;
            }
        }
    }

    fn maybe_auto_advance(&mut self, now: NaiveDateTime) {
        let slide = &self.deck.slides()[self.current];
        if slide.window.is_some() {
            return;
        }
        let Some(duration) = slide.duration else {
            return;
        };
        if self.current >= self.deck.last_index() {
            return;
        }
        if (now - self.slide_shown_at).num_seconds() >= i64::from(duration) {
            self.begin_transition(self.current + 1);
        }
    }
}

struct SettingsForm {
    draft: Settings,
}

/// Top-level mode. Each variant owns its view state, including its 1 Hz
/// ticker, so leaving a mode tears its timer down with it.
enum Mode {
    Standby(StandbyState),
    Countdown(CountdownState),
    Slideshow(SlideshowState),
    Settings(SettingsForm),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    StartManual,
    OpenSettings,
    SkipCountdown,
    CancelCountdown,
    NextSlide,
    PrevSlide,
    RequestExit,
    ConfirmExit,
    DismissExit,
    SaveSettings,
    CancelSettings,
}

pub struct KioskApp {
    settings: Settings,
    mode: Mode,
    clock: Box<dyn Clock>,
    theme: Theme,
    image_cache: ImageCache,
    toast: Option<Toast>,
    /// Occurrence whose automatic countdown the user cancelled.
    dismissed_occurrence: Option<NaiveDateTime>,
}

impl KioskApp {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            mode: Mode::Standby(StandbyState::new()),
            clock: Box::new(SystemClock),
            theme: Theme::dark(),
            image_cache: ImageCache::new(),
            toast: None,
            dismissed_occurrence: None,
        }
    }

    fn apply(&mut self, action: Action, now: NaiveDateTime) {
        match action {
            Action::StartManual => {
                self.mode = Mode::Countdown(CountdownState::manual(
                    self.settings.countdown_minutes,
                    now,
                ));
            }
            Action::OpenSettings => {
                self.mode = Mode::Settings(SettingsForm {
                    draft: self.settings.clone(),
                });
            }
            Action::SkipCountdown => {
                let fired = match &mut self.mode {
                    Mode::Countdown(state) => state.countdown.skip(),
                    _ => false,
                };
                if fired {
                    self.enter_slideshow(now);
                }
            }
            Action::CancelCountdown => {
                if let Mode::Countdown(state) = &self.mode {
                    self.dismissed_occurrence = state.occurrence;
                }
                self.mode = Mode::Standby(StandbyState::new());
            }
            Action::NextSlide => {
                if let Mode::Slideshow(state) = &mut self.mode {
                    if state.transition.is_none() && state.current < state.deck.last_index() {
                        state.begin_transition(state.current + 1);
                    }
                }
            }
            Action::PrevSlide => {
                if let Mode::Slideshow(state) = &mut self.mode {
                    if state.transition.is_none() && state.current > 0 {
                        state.begin_transition(state.current - 1);
                    }
                }
            }
            Action::RequestExit => {
                if let Mode::Slideshow(state) = &mut self.mode {
                    state.confirm_exit = true;
                }
            }
            Action::DismissExit => {
                if let Mode::Slideshow(state) = &mut self.mode {
                    state.confirm_exit = false;
                }
            }
            Action::ConfirmExit => {
                self.mode = Mode::Standby(StandbyState::new());
            }
            Action::SaveSettings => {
                if let Mode::Settings(form) = &self.mode {
                    self.settings = form.draft.clone().clamped();
                }
                // a changed schedule re-arms any dismissed occurrence
                self.dismissed_occurrence = None;
                self.toast = Some(Toast::new("Settings saved".to_string()));
                self.mode = Mode::Standby(StandbyState::new());
            }
            Action::CancelSettings => {
                self.mode = Mode::Standby(StandbyState::new());
            }
        }
    }

    fn enter_slideshow(&mut self, now: NaiveDateTime) {
        match deck::build(&self.settings) {
            Ok(deck) => self.mode = Mode::Slideshow(SlideshowState::new(deck, now)),
            Err(err) => {
                self.toast = Some(Toast::new(format!("Deck error: {err:#}")));
                self.mode = Mode::Standby(StandbyState::new());
            }
        }
    }

    /// Per-frame wall-clock work. Each mode collapses frames to one tick per
    /// second through its own ticker.
    fn tick(&mut self, now: NaiveDateTime) {
        enum After {
            None,
            AutoCountdown(NaiveDateTime),
            StartShow,
        }
        let mut after = After::None;

        match &mut self.mode {
            Mode::Standby(state) => {
                if state.ticker.tick(now) {
                    if let Some(occurrence) =
                        schedule::auto_start_due(&self.settings, now, self.dismissed_occurrence)
                    {
                        after = After::AutoCountdown(occurrence);
                    }
                }
            }
            Mode::Countdown(state) => {
                if state.ticker.tick(now) {
                    let (_, completed) = state.countdown.tick(now);
                    if completed {
                        after = After::StartShow;
                    }
                }
            }
            Mode::Slideshow(state) => {
                state.settle_transition(now);
                if state.ticker.tick(now) && state.transition.is_none() {
                    if let Some(target) = state.tracker.check(&state.deck, now, state.current) {
                        state.begin_transition(target);
                    } else {
                        state.maybe_auto_advance(now);
                    }
                }
            }
            Mode::Settings(_) => {}
        }

        match after {
            After::AutoCountdown(occurrence) => {
                self.mode = Mode::Countdown(CountdownState::automatic(occurrence, now));
            }
            After::StartShow => self.enter_slideshow(now),
            After::None => {}
        }
    }

    fn handle_input(
        &self,
        ctx: &egui::Context,
        viewport_cmds: &mut Vec<egui::ViewportCommand>,
    ) -> Option<Action> {
        let mut action = None;
        ctx.input(|i| {
            // Fullscreen toggle: F (from any mode)
            if i.key_pressed(egui::Key::F) {
                viewport_cmds.push(egui::ViewportCommand::Fullscreen(
                    !i.viewport().fullscreen.unwrap_or(false),
                ));
                return;
            }

            match &self.mode {
                Mode::Standby(_) => {
                    if i.key_pressed(egui::Key::Space) {
                        action = Some(Action::StartManual);
                    }
                    if i.key_pressed(egui::Key::S) {
                        action = Some(Action::OpenSettings);
                    }
                    if i.key_pressed(egui::Key::Q) {
                        viewport_cmds.push(egui::ViewportCommand::Close);
                    }
                }
                Mode::Countdown(_) => {
                    if i.key_pressed(egui::Key::Space)
                        || i.key_pressed(egui::Key::ArrowRight)
                        || i.key_pressed(egui::Key::PageDown)
                    {
                        action = Some(Action::SkipCountdown);
                    }
                    if i.key_pressed(egui::Key::Escape) {
                        action = Some(Action::CancelCountdown);
                    }
                }
                Mode::Slideshow(state) => {
                    if state.confirm_exit {
                        if i.key_pressed(egui::Key::Enter) {
                            action = Some(Action::ConfirmExit);
                        }
                        if i.key_pressed(egui::Key::Escape) {
                            action = Some(Action::DismissExit);
                        }
                    } else {
                        if i.key_pressed(egui::Key::Escape) {
                            action = Some(Action::RequestExit);
                        }
                        // Navigation is ignored while a fade is settling
                        if state.transition.is_none() {
                            if i.key_pressed(egui::Key::Space)
                                || i.key_pressed(egui::Key::ArrowRight)
                                || i.key_pressed(egui::Key::PageDown)
                            {
                                action = Some(Action::NextSlide);
                            }
                            if i.key_pressed(egui::Key::ArrowLeft)
                                || i.key_pressed(egui::Key::PageUp)
                            {
                                action = Some(Action::PrevSlide);
                            }
                        }
                    }
                }
                Mode::Settings(_) => {
                    if i.key_pressed(egui::Key::Escape) {
                        action = Some(Action::CancelSettings);
                    }
                }
            }
        });
        action
    }

    fn draw(&mut self, ui: &mut egui::Ui, now: NaiveDateTime) -> Option<Action> {
        let rect = ui.max_rect();
        ui.painter().rect_filled(rect, 0.0, self.theme.background);
        let scale = compute_scale(rect);

        match &mut self.mode {
            Mode::Standby(_) => draw_standby(ui, rect, scale, &self.settings, &self.theme, now),
            Mode::Countdown(state) => draw_countdown(ui, rect, scale, state, &self.theme, now),
            Mode::Slideshow(state) => {
                draw_slideshow(ui, rect, scale, state, &self.theme, &self.image_cache, now)
            }
            Mode::Settings(form) => draw_settings(ui, rect, form, &self.theme, &self.image_cache),
        }
    }

    fn draw_toast(&self, ui: &egui::Ui, rect: egui::Rect, scale: f32) {
        let Some(toast) = &self.toast else {
            return;
        };
        let opacity = toast.opacity();
        if opacity <= 0.0 {
            return;
        }
        let toast_color = Theme::with_opacity(self.theme.foreground, opacity * 0.9);
        let toast_bg = Theme::with_opacity(self.theme.panel_background, opacity * 0.9);
        let galley = ui.painter().layout_no_wrap(
            toast.message.clone(),
            egui::FontId::proportional(20.0 * scale),
            toast_color,
        );
        let padding = 16.0 * scale;
        let toast_rect = egui::Rect::from_min_size(
            egui::pos2(
                rect.center().x - galley.rect.width() / 2.0 - padding,
                rect.bottom() - 80.0 * scale,
            ),
            egui::vec2(
                galley.rect.width() + padding * 2.0,
                galley.rect.height() + padding * 2.0,
            ),
        );
        ui.painter().rect_filled(toast_rect, 8.0 * scale, toast_bg);
        let text_pos = egui::pos2(toast_rect.left() + padding, toast_rect.top() + padding);
        ui.painter().galley(text_pos, galley, toast_color);
    }

    fn schedule_repaint(&self, ctx: &egui::Context, now: NaiveDateTime) {
        let animating = self.toast.is_some()
            || matches!(&self.mode, Mode::Slideshow(state) if state.transition.is_some());
        if animating {
            ctx.request_repaint();
            return;
        }
        // wake close to the next wall-clock second so ticks land on time
        let elapsed_ms = u64::from(now.nanosecond() % 1_000_000_000) / 1_000_000;
        let wait = 1_000u64.saturating_sub(elapsed_ms).clamp(16, 1_000);
        ctx.request_repaint_after(StdDuration::from_millis(wait));
    }
}

impl eframe::App for KioskApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = self.clock.now();

        // Collect viewport commands to send AFTER the input closure
        // (sending inside ctx.input() causes RwLock deadlock)
        let mut viewport_cmds: Vec<egui::ViewportCommand> = Vec::new();
        let key_action = self.handle_input(ctx, &mut viewport_cmds);
        for cmd in viewport_cmds {
            ctx.send_viewport_cmd(cmd);
        }
        if let Some(action) = key_action {
            self.apply(action, now);
        }

        self.tick(now);

        if self.toast.as_ref().is_some_and(|t| t.is_expired()) {
            self.toast = None;
        }

        let mut ui_action = None;
        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(self.theme.background).inner_margin(0.0))
            .show(ctx, |ui| {
                ui_action = self.draw(ui, now);
                let rect = ui.max_rect();
                self.draw_toast(ui, rect, compute_scale(rect));
            });
        if let Some(action) = ui_action {
            self.apply(action, now);
        }

        self.schedule_repaint(ctx, now);
    }
}

fn compute_scale(rect: egui::Rect) -> f32 {
    let ref_w = 1920.0;
    let ref_h = 1080.0;
    (rect.width() / ref_w).min(rect.height() / ref_h)
}

/// Paint a line of text centered on `cx`, returning its height.
fn paint_centered(
    ui: &egui::Ui,
    text: String,
    font: egui::FontId,
    color: egui::Color32,
    cx: f32,
    y: f32,
) -> f32 {
    let galley = ui.painter().layout_no_wrap(text, font, color);
    let height = galley.rect.height();
    let pos = egui::pos2(cx - galley.rect.width() / 2.0, y);
    ui.painter().galley(pos, galley, color);
    height
}

fn draw_standby(
    ui: &mut egui::Ui,
    rect: egui::Rect,
    scale: f32,
    settings: &Settings,
    theme: &Theme,
    now: NaiveDateTime,
) -> Option<Action> {
    let mut action = None;
    let cx = rect.center().x;
    let cy = rect.center().y;

    paint_centered(
        ui,
        now.format("%A, %B %-d").to_string(),
        egui::FontId::proportional(44.0 * scale),
        theme.muted,
        cx,
        cy - 260.0 * scale,
    );

    paint_centered(
        ui,
        now.format("%-I:%M:%S %p").to_string(),
        egui::FontId::proportional(theme.clock_size * scale),
        theme.accent(Accent::Gold),
        cx,
        cy - 190.0 * scale,
    );

    let trigger_time = NaiveTime::from_hms_opt(settings.auto_start_hour, settings.auto_start_minute, 0)
        .map(|t| t.format("%-I:%M %p").to_string())
        .unwrap_or_default();
    paint_centered(
        ui,
        format!(
            "Automatic countdown scheduled for {} at {}",
            settings.auto_start_day_name(),
            trigger_time
        ),
        egui::FontId::proportional(24.0 * scale),
        theme.muted,
        cx,
        cy + 120.0 * scale,
    );

    let start_label = format!("Start {}-minute timer now", settings.countdown_minutes);
    let start_rect = egui::Rect::from_center_size(
        egui::pos2(cx, cy + 220.0 * scale),
        egui::vec2(440.0 * scale, 64.0 * scale),
    );
    if ui
        .put(
            start_rect,
            egui::Button::new(egui::RichText::new(start_label).size(24.0 * scale)),
        )
        .clicked()
    {
        action = Some(Action::StartManual);
    }

    let gear_rect = egui::Rect::from_min_size(
        egui::pos2(rect.right() - 150.0 * scale, rect.top() + 28.0 * scale),
        egui::vec2(120.0 * scale, 42.0 * scale),
    );
    if ui
        .put(
            gear_rect,
            egui::Button::new(egui::RichText::new("Settings").size(18.0 * scale)),
        )
        .clicked()
    {
        action = Some(Action::OpenSettings);
    }

    let hint = "Space: start timer  |  S: settings  |  F: fullscreen  |  Q: quit";
    paint_centered(
        ui,
        hint.to_string(),
        egui::FontId::proportional(14.0 * scale),
        Theme::with_opacity(theme.muted, 0.6),
        cx,
        rect.bottom() - 36.0 * scale,
    );

    action
}

fn draw_countdown(
    ui: &mut egui::Ui,
    rect: egui::Rect,
    scale: f32,
    state: &CountdownState,
    theme: &Theme,
    now: NaiveDateTime,
) -> Option<Action> {
    let mut action = None;
    let cx = rect.center().x;
    let remaining = state.countdown.remaining(now);

    paint_centered(
        ui,
        "CLUB STARTS IN".to_string(),
        egui::FontId::proportional(40.0 * scale),
        theme.muted,
        cx,
        rect.top() + 64.0 * scale,
    );

    // Larger bands get a smaller face so the text still fits the screen
    let digit_size = if remaining >= 86_400 {
        theme.countdown_size * 0.35
    } else if remaining >= 3_600 {
        theme.countdown_size * 0.55
    } else {
        theme.countdown_size
    };
    let color = if state.countdown.is_urgent(now) {
        theme.urgent
    } else {
        theme.foreground
    };
    let galley = ui.painter().layout_no_wrap(
        countdown::format_remaining(remaining),
        egui::FontId::proportional(digit_size * scale),
        color,
    );
    let pos = egui::pos2(
        cx - galley.rect.width() / 2.0,
        rect.center().y - galley.rect.height() / 2.0,
    );
    let time_rect = egui::Rect::from_min_size(pos, galley.rect.size());
    ui.painter().galley(pos, galley, color);

    // Clicking the time display skips the countdown
    let response = ui.interact(
        time_rect,
        egui::Id::new("countdown_time"),
        egui::Sense::click(),
    );
    if response.clicked() {
        action = Some(Action::SkipCountdown);
    }
    if response.hovered() {
        paint_centered(
            ui,
            "Click to skip".to_string(),
            egui::FontId::proportional(16.0 * scale),
            Theme::with_opacity(theme.muted, 0.8),
            cx,
            time_rect.bottom() + 12.0 * scale,
        );
    }

    let cancel_rect = egui::Rect::from_center_size(
        egui::pos2(cx, rect.bottom() - 72.0 * scale),
        egui::vec2(300.0 * scale, 44.0 * scale),
    );
    if ui
        .put(
            cancel_rect,
            egui::Button::new(egui::RichText::new("Cancel and return to standby").size(16.0 * scale)),
        )
        .clicked()
    {
        action = Some(Action::CancelCountdown);
    }

    action
}

fn draw_slideshow(
    ui: &mut egui::Ui,
    rect: egui::Rect,
    scale: f32,
    state: &SlideshowState,
    theme: &Theme,
    image_cache: &ImageCache,
    now: NaiveDateTime,
) -> Option<Action> {
    let mut action = None;

    if let Some(t) = &state.transition {
        let p = ease_in_out(t.progress());
        let slides = state.deck.slides();
        render::render_slide(ui, &slides[t.from], theme, rect, 1.0 - p, image_cache, now, scale);
        render::render_slide(ui, &slides[t.to], theme, rect, p, image_cache, now, scale);
    } else {
        render::render_slide(
            ui,
            &state.deck.slides()[state.current],
            theme,
            rect,
            1.0,
            image_cache,
            now,
            scale,
        );
    }

    // Slide counter
    let counter_text = format!("{} / {}", state.current + 1, state.deck.len());
    let counter_color = Theme::with_opacity(theme.muted, 0.5);
    let counter_galley = ui.painter().layout_no_wrap(
        counter_text,
        egui::FontId::monospace(14.0 * scale),
        counter_color,
    );
    let counter_pos = egui::pos2(
        rect.right() - counter_galley.rect.width() - 16.0 * scale,
        rect.bottom() - 30.0 * scale,
    );
    ui.painter()
        .galley(counter_pos, counter_galley, counter_color);

    // Navigation arrows, revealed on hover, disabled at the deck edges and
    // while a fade is settling
    if ui.rect_contains_pointer(rect) && !state.confirm_exit {
        let busy = state.transition.is_some();
        let can_prev = state.current > 0 && !busy;
        let can_next = state.current < state.deck.last_index() && !busy;

        let size = egui::vec2(56.0 * scale, 56.0 * scale);
        let next_rect = egui::Rect::from_min_size(
            egui::pos2(rect.right() - 88.0 * scale, rect.bottom() - 100.0 * scale),
            size,
        );
        let prev_rect = next_rect.translate(egui::vec2(-72.0 * scale, 0.0));

        let mut prev_ui =
            ui.new_child(egui::UiBuilder::new().max_rect(prev_rect).id_salt("nav_prev"));
        if prev_ui
            .add_enabled(
                can_prev,
                egui::Button::new(egui::RichText::new("\u{2190}").size(24.0 * scale))
                    .min_size(size),
            )
            .clicked()
        {
            action = Some(Action::PrevSlide);
        }
        let mut next_ui =
            ui.new_child(egui::UiBuilder::new().max_rect(next_rect).id_salt("nav_next"));
        if next_ui
            .add_enabled(
                can_next,
                egui::Button::new(egui::RichText::new("\u{2192}").size(24.0 * scale))
                    .min_size(size),
            )
            .clicked()
        {
            action = Some(Action::NextSlide);
        }
    }

    if state.confirm_exit {
        ui.painter()
            .rect_filled(rect, 0.0, egui::Color32::from_black_alpha(180));
        let panel = egui::Rect::from_center_size(
            rect.center(),
            egui::vec2(520.0 * scale, 200.0 * scale),
        );
        ui.painter()
            .rect_filled(panel, 12.0 * scale, theme.panel_background);
        paint_centered(
            ui,
            "Exit the slideshow?".to_string(),
            egui::FontId::proportional(28.0 * scale),
            theme.foreground,
            panel.center().x,
            panel.top() + 40.0 * scale,
        );
        let stay_rect = egui::Rect::from_center_size(
            panel.center() + egui::vec2(-110.0 * scale, 48.0 * scale),
            egui::vec2(160.0 * scale, 48.0 * scale),
        );
        let exit_rect = egui::Rect::from_center_size(
            panel.center() + egui::vec2(110.0 * scale, 48.0 * scale),
            egui::vec2(160.0 * scale, 48.0 * scale),
        );
        if ui
            .put(
                stay_rect,
                egui::Button::new(egui::RichText::new("Stay").size(18.0 * scale)),
            )
            .clicked()
        {
            action = Some(Action::DismissExit);
        }
        if ui
            .put(
                exit_rect,
                egui::Button::new(egui::RichText::new("Exit").size(18.0 * scale)),
            )
            .clicked()
        {
            action = Some(Action::ConfirmExit);
        }
    }

    action
}

fn draw_settings(
    ui: &mut egui::Ui,
    rect: egui::Rect,
    form: &mut SettingsForm,
    theme: &Theme,
    image_cache: &ImageCache,
) -> Option<Action> {
    let mut action = None;

    let panel_rect = egui::Rect::from_center_size(
        rect.center(),
        egui::vec2(560.0, (rect.height() - 80.0).min(620.0)),
    );
    ui.painter()
        .rect_filled(panel_rect.expand(24.0), 12.0, theme.panel_background);

    let mut panel = ui.new_child(
        egui::UiBuilder::new()
            .max_rect(panel_rect)
            .id_salt("settings_panel"),
    );
    panel.heading("Presentation Settings");
    panel.add_space(16.0);

    panel.label("Countdown duration (minutes)");
    panel.add(egui::DragValue::new(&mut form.draft.countdown_minutes).range(1..=60));

    panel.add_space(12.0);
    panel.separator();
    panel.label(egui::RichText::new("Automatic start").strong());
    egui::ComboBox::from_label("Day of week")
        .selected_text(DAY_NAMES[form.draft.auto_start_day.min(6) as usize])
        .show_ui(&mut panel, |ui| {
            for (i, name) in DAY_NAMES.iter().enumerate() {
                ui.selectable_value(&mut form.draft.auto_start_day, i as u32, *name);
            }
        });
    panel.horizontal(|ui| {
        ui.label("Hour (0-23)");
        ui.add(egui::DragValue::new(&mut form.draft.auto_start_hour).range(0..=23));
        ui.label("Minute");
        ui.add(egui::DragValue::new(&mut form.draft.auto_start_minute).range(0..=59));
    });

    panel.add_space(12.0);
    panel.separator();
    panel.label(egui::RichText::new("Final slide").strong());
    egui::ComboBox::from_label("Type")
        .selected_text(form.draft.final_slide.display_name())
        .show_ui(&mut panel, |ui| {
            for kind in FinalSlideKind::all() {
                ui.selectable_value(&mut form.draft.final_slide, *kind, kind.display_name());
            }
        });
    match form.draft.final_slide {
        FinalSlideKind::Black => {}
        FinalSlideKind::Text => {
            panel.add(
                egui::TextEdit::multiline(&mut form.draft.final_slide_content)
                    .hint_text("Thank You!")
                    .desired_rows(3),
            );
        }
        FinalSlideKind::Image => {
            panel.add(
                egui::TextEdit::singleline(&mut form.draft.final_slide_content)
                    .hint_text("/path/to/image.png"),
            );
            if !form.draft.final_slide_content.is_empty() {
                let path = std::path::Path::new(&form.draft.final_slide_content);
                match image_cache.get(panel.ctx(), path) {
                    Some(texture) => {
                        panel.add(
                            egui::Image::new(&texture).max_size(egui::vec2(220.0, 124.0)),
                        );
                    }
                    None => {
                        panel.colored_label(theme.urgent, "Image could not be loaded");
                    }
                }
            }
        }
    }

    panel.add_space(20.0);
    panel.horizontal(|ui| {
        if ui.button("Cancel").clicked() {
            action = Some(Action::CancelSettings);
        }
        if ui.button("Save settings").clicked() {
            action = Some(Action::SaveSettings);
        }
    });

    action
}

pub fn run(windowed: bool) -> anyhow::Result<()> {
    let config = Config::load_or_default();
    let settings = config.initial_settings();
    let windowed = windowed || config.windowed();

    let viewport = if windowed {
        egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_title(APP_TITLE)
    } else {
        egui::ViewportBuilder::default()
            .with_fullscreen(true)
            .with_title(APP_TITLE)
    };

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        APP_TITLE,
        options,
        Box::new(move |_cc| Ok(Box::new(KioskApp::new(settings)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    // 2026-08-05 is a Wednesday
    fn wednesday(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 5)
            .expect("date")
            .and_hms_opt(h, m, s)
            .expect("time")
    }

    fn wednesday_app() -> KioskApp {
        KioskApp::new(Settings {
            auto_start_day: 3,
            auto_start_hour: 18,
            auto_start_minute: 0,
            countdown_minutes: 5,
            ..Settings::default()
        })
    }

    #[test]
    fn lead_in_enters_countdown_and_fires_on_time() {
        let mut app = wednesday_app();
        app.tick(wednesday(17, 59, 0));
        let Mode::Countdown(state) = &app.mode else {
            panic!("expected countdown");
        };
        assert_eq!(state.occurrence, Some(wednesday(18, 0, 0)));
        assert_eq!(state.countdown.remaining(wednesday(17, 59, 0)), 60);

        app.tick(wednesday(17, 59, 30));
        assert!(matches!(app.mode, Mode::Countdown(_)));

        app.tick(wednesday(18, 0, 0));
        assert!(matches!(app.mode, Mode::Slideshow(_)));
    }

    #[test]
    fn manual_start_counts_the_configured_duration() {
        let mut app = wednesday_app();
        app.apply(Action::StartManual, wednesday(12, 0, 0));
        let Mode::Countdown(state) = &app.mode else {
            panic!("expected countdown");
        };
        assert_eq!(state.occurrence, None);
        assert_eq!(state.countdown.remaining(wednesday(12, 0, 0)), 300);
    }

    #[test]
    fn skip_jumps_straight_to_the_slideshow() {
        let mut app = wednesday_app();
        app.apply(Action::StartManual, wednesday(12, 0, 0));
        app.apply(Action::SkipCountdown, wednesday(12, 0, 10));
        assert!(matches!(app.mode, Mode::Slideshow(_)));
    }

    #[test]
    fn cancelling_an_automatic_countdown_does_not_rearm_immediately() {
        let mut app = wednesday_app();
        app.tick(wednesday(17, 59, 0));
        assert!(matches!(app.mode, Mode::Countdown(_)));

        app.apply(Action::CancelCountdown, wednesday(17, 59, 5));
        assert!(matches!(app.mode, Mode::Standby(_)));

        app.tick(wednesday(17, 59, 6));
        assert!(
            matches!(app.mode, Mode::Standby(_)),
            "lead-in re-armed for a dismissed occurrence"
        );

        // the following week's occurrence is unaffected
        app.tick(wednesday(17, 59, 7) + Duration::days(7));
        assert!(matches!(app.mode, Mode::Countdown(_)));
    }

    #[test]
    fn settings_save_clamps_and_cancel_discards() {
        let mut app = wednesday_app();
        app.apply(Action::OpenSettings, wednesday(12, 0, 0));
        let Mode::Settings(form) = &mut app.mode else {
            panic!("expected settings");
        };
        form.draft.countdown_minutes = 90; // out of range on purpose
        form.draft.auto_start_day = 5;
        app.apply(Action::SaveSettings, wednesday(12, 0, 1));
        assert!(matches!(app.mode, Mode::Standby(_)));
        assert_eq!(app.settings.countdown_minutes, 60);
        assert_eq!(app.settings.auto_start_day, 5);

        app.apply(Action::OpenSettings, wednesday(12, 0, 2));
        let Mode::Settings(form) = &mut app.mode else {
            panic!("expected settings");
        };
        form.draft.auto_start_day = 0;
        app.apply(Action::CancelSettings, wednesday(12, 0, 3));
        assert_eq!(app.settings.auto_start_day, 5);
    }

    #[test]
    fn welcome_slide_advances_after_its_duration() {
        let mut app = wednesday_app();
        app.apply(Action::StartManual, wednesday(12, 0, 0));
        app.apply(Action::SkipCountdown, wednesday(12, 0, 1));
        let Mode::Slideshow(state) = &app.mode else {
            panic!("expected slideshow");
        };
        assert_eq!(state.current, 0);

        app.tick(wednesday(12, 0, 11));
        let Mode::Slideshow(state) = &app.mode else {
            panic!("expected slideshow");
        };
        let transition = state.transition.as_ref().expect("transition");
        assert_eq!(transition.to, 1);
    }

    #[test]
    fn scheduled_jump_fires_from_the_tick_loop() {
        let mut app = wednesday_app();
        app.apply(Action::StartManual, wednesday(18, 9, 0));
        app.apply(Action::SkipCountdown, wednesday(18, 9, 1));

        app.tick(wednesday(18, 10, 0));
        let Mode::Slideshow(state) = &app.mode else {
            panic!("expected slideshow");
        };
        let transition = state.transition.as_ref().expect("transition");
        assert_eq!(transition.to, 4, "expected a jump to the first game slide");
    }

    #[test]
    fn exit_is_gated_by_confirmation() {
        let mut app = wednesday_app();
        app.apply(Action::StartManual, wednesday(12, 0, 0));
        app.apply(Action::SkipCountdown, wednesday(12, 0, 1));

        app.apply(Action::RequestExit, wednesday(12, 0, 2));
        let Mode::Slideshow(state) = &app.mode else {
            panic!("expected slideshow");
        };
        assert!(state.confirm_exit);

        app.apply(Action::DismissExit, wednesday(12, 0, 3));
        assert!(matches!(app.mode, Mode::Slideshow(_)));

        app.apply(Action::RequestExit, wednesday(12, 0, 4));
        app.apply(Action::ConfirmExit, wednesday(12, 0, 5));
        assert!(matches!(app.mode, Mode::Standby(_)));
    }

    #[test]
    fn navigation_respects_deck_edges() {
        let mut app = wednesday_app();
        app.apply(Action::StartManual, wednesday(12, 0, 0));
        app.apply(Action::SkipCountdown, wednesday(12, 0, 1));

        // at the first slide, going back is a no-op
        app.apply(Action::PrevSlide, wednesday(12, 0, 2));
        let Mode::Slideshow(state) = &app.mode else {
            panic!("expected slideshow");
        };
        assert!(state.transition.is_none());
        assert_eq!(state.current, 0);
    }
}
