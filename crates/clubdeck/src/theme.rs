use eframe::egui::Color32;

use crate::deck::Accent;

/// Fixed dark palette for the projector. Font sizes are in reference pixels
/// at 1920x1080 and scaled to the actual viewport at draw time.
#[derive(Debug, Clone)]
pub struct Theme {
    pub background: Color32,
    pub foreground: Color32,
    pub muted: Color32,
    pub urgent: Color32,
    pub panel_background: Color32,
    pub clock_size: f32,
    pub countdown_size: f32,
    pub title_size: f32,
    pub body_size: f32,
    pub caption_size: f32,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            background: Color32::BLACK,
            foreground: Color32::from_rgb(0xE8, 0xE8, 0xE8),
            muted: Color32::from_rgb(0x7E, 0x82, 0x8C),
            urgent: Color32::from_rgb(0xEF, 0x44, 0x44),
            panel_background: Color32::from_rgb(0x15, 0x15, 0x1A),
            clock_size: 170.0,
            countdown_size: 420.0,
            title_size: 88.0,
            body_size: 56.0,
            caption_size: 28.0,
        }
    }

    pub fn accent(&self, accent: Accent) -> Color32 {
        match accent {
            Accent::Gold => Color32::from_rgb(0xFA, 0xCC, 0x15),
            Accent::White => self.foreground,
            Accent::Green => Color32::from_rgb(0x22, 0xC5, 0x5E),
            Accent::Red => Color32::from_rgb(0xEF, 0x44, 0x44),
            Accent::Blue => Color32::from_rgb(0x3B, 0x82, 0xF6),
        }
    }

    /// Apply opacity to a color
    pub fn with_opacity(color: Color32, opacity: f32) -> Color32 {
        Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), (opacity * 255.0) as u8)
    }
}
