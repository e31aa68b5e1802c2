use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use eframe::egui;

/// Lazily loads slide images as egui textures. Failed loads are cached as
/// `None` so a bad path is not re-read from disk on every frame.
#[derive(Default)]
pub struct ImageCache {
    textures: RefCell<HashMap<PathBuf, Option<egui::TextureHandle>>>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, ctx: &egui::Context, path: &Path) -> Option<egui::TextureHandle> {
        if let Some(entry) = self.textures.borrow().get(path) {
            return entry.clone();
        }
        let texture = load_texture(ctx, path);
        self.textures
            .borrow_mut()
            .insert(path.to_path_buf(), texture.clone());
        texture
    }
}

fn load_texture(ctx: &egui::Context, path: &Path) -> Option<egui::TextureHandle> {
    let image = image::open(path).ok()?.into_rgba8();
    let size = [image.width() as usize, image.height() as usize];
    let pixels = egui::ColorImage::from_rgba_unmultiplied(size, image.as_raw());
    Some(ctx.load_texture(path.to_string_lossy(), pixels, egui::TextureOptions::LINEAR))
}
