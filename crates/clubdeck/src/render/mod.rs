pub mod image_cache;
pub mod transition;

use chrono::NaiveDateTime;
use eframe::egui;

use crate::countdown;
use crate::deck::Slide;
use crate::schedule;
use crate::theme::Theme;

use image_cache::ImageCache;

/// Paint one slide into `rect`. `opacity` below 1.0 is used while a fade
/// transition is in flight.
pub fn render_slide(
    ui: &egui::Ui,
    slide: &Slide,
    theme: &Theme,
    rect: egui::Rect,
    opacity: f32,
    cache: &ImageCache,
    now: NaiveDateTime,
    scale: f32,
) {
    let accent = Theme::with_opacity(theme.accent(slide.accent), opacity);
    let padding = 80.0 * scale;
    let content_width = rect.width() - padding * 2.0;

    // Game slides carry no title; their body takes the accent color instead.
    let body_color = if slide.title.is_empty() {
        accent
    } else {
        Theme::with_opacity(theme.foreground, opacity)
    };
    let body_size = if slide.title.is_empty() {
        theme.title_size * 1.4
    } else {
        theme.body_size
    };

    // Lay out title and body first so the stack can be vertically centered.
    let title_galley = (!slide.title.is_empty()).then(|| {
        ui.painter().layout(
            slide.title.clone(),
            egui::FontId::proportional(theme.title_size * scale),
            accent,
            content_width,
        )
    });
    let body_galley = slide.body.as_ref().map(|body| {
        ui.painter().layout(
            body.clone(),
            egui::FontId::proportional(body_size * scale),
            body_color,
            content_width,
        )
    });

    let gap = 48.0 * scale;
    let mut total_height = 0.0;
    if let Some(galley) = &title_galley {
        total_height += galley.rect.height();
    }
    if let Some(galley) = &body_galley {
        if total_height > 0.0 {
            total_height += gap;
        }
        total_height += galley.rect.height();
    }

    let mut y = rect.center().y - total_height / 2.0;
    if let Some(galley) = title_galley {
        let x = rect.center().x - galley.rect.width() / 2.0;
        ui.painter().galley(egui::pos2(x, y), galley.clone(), accent);
        y += galley.rect.height() + if body_galley.is_some() { gap } else { 0.0 };
    }
    if let Some(galley) = body_galley {
        let x = rect.center().x - galley.rect.width() / 2.0;
        ui.painter().galley(egui::pos2(x, y), galley, body_color);
    }

    // Image slides (the configured final slide). A failed load leaves the
    // screen black rather than erroring the deck.
    if let Some(path) = &slide.image {
        if let Some(texture) = cache.get(ui.ctx(), path) {
            let fit = fit_rect(texture.size_vec2(), rect.shrink(padding));
            ui.painter().image(
                texture.id(),
                fit,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                Theme::with_opacity(egui::Color32::WHITE, opacity),
            );
        }
    }

    if slide.show_clock {
        draw_clock(ui, theme, rect, opacity, now, scale);
    }

    // Urgent end-of-window readout, only inside the warning band.
    if let Some(window) = &slide.window {
        if let Some(diff) = schedule::window_warning(window, now) {
            let text = format!("{} remaining", countdown::format_remaining(diff));
            let color = Theme::with_opacity(theme.urgent, opacity);
            let galley = ui.painter().layout_no_wrap(
                text,
                egui::FontId::proportional(theme.caption_size * 1.6 * scale),
                color,
            );
            let pos = egui::pos2(
                rect.center().x - galley.rect.width() / 2.0,
                rect.bottom() - 120.0 * scale,
            );
            ui.painter().galley(pos, galley, color);
        }
    }

    if let Some(footer) = &slide.footer {
        let color = Theme::with_opacity(theme.muted, opacity);
        let galley = ui.painter().layout_no_wrap(
            footer.clone(),
            egui::FontId::proportional(theme.caption_size * scale),
            color,
        );
        let pos = egui::pos2(
            rect.center().x - galley.rect.width() / 2.0,
            rect.bottom() - 48.0 * scale,
        );
        ui.painter().galley(pos, galley, color);
    }
}

fn draw_clock(
    ui: &egui::Ui,
    theme: &Theme,
    rect: egui::Rect,
    opacity: f32,
    now: NaiveDateTime,
    scale: f32,
) {
    let color = Theme::with_opacity(theme.muted, opacity);
    let galley = ui.painter().layout_no_wrap(
        now.format("%-I:%M:%S %p").to_string(),
        egui::FontId::monospace(theme.caption_size * 1.8 * scale),
        color,
    );
    let pos = egui::pos2(
        rect.center().x - galley.rect.width() / 2.0,
        rect.top() + 48.0 * scale,
    );
    ui.painter().galley(pos, galley, color);
}

/// Largest rect with the texture's aspect ratio that fits inside `bounds`.
fn fit_rect(texture_size: egui::Vec2, bounds: egui::Rect) -> egui::Rect {
    let scale = (bounds.width() / texture_size.x).min(bounds.height() / texture_size.y);
    let size = texture_size * scale;
    egui::Rect::from_center_size(bounds.center(), size)
}
