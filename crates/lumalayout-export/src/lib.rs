//! CPU scene rasterizer for LumaLayout exports.
//!
//! Consumes a deep-cloned [`Scene`] snapshot (never live state) and renders
//! it into an RGBA canvas with a fit-to-content viewport, encoded as PNG.
//! Icon vector rendering stays outside the core: callers provide an
//! [`IconRasterizer`]; unresolved icons render as placeholder boxes of the
//! same bounds.

mod raster;

pub use raster::{Viewport, fit_viewport, render_scene, scene_bounds};

use image::RgbaImage;
use lumalayout_core::{IconRef, Scene};
use thiserror::Error;

/// Off-screen render width in pixels.
pub const EXPORT_WIDTH: u32 = 1920;
/// Off-screen render height in pixels.
pub const EXPORT_HEIGHT: u32 = 1080;

/// Export errors.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// Rasterization parameters.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub width: u32,
    pub height: u32,
    /// World-space padding around the content bounds.
    pub padding: f64,
    /// Upper bound on the fit-to-content scale.
    pub max_scale: f64,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            width: EXPORT_WIDTH,
            height: EXPORT_HEIGHT,
            padding: 60.0,
            max_scale: 3.0,
        }
    }
}

/// Resolves icon references to raster images at a requested pixel size.
pub trait IconRasterizer {
    /// Rasterize an icon, or `None` to fall back to a placeholder box.
    fn rasterize(&self, icon: &IconRef, width: u32, height: u32) -> Option<RgbaImage>;
}

/// Rasterizer that resolves nothing; every element renders as a
/// placeholder box.
pub struct PlaceholderIcons;

impl IconRasterizer for PlaceholderIcons {
    fn rasterize(&self, _icon: &IconRef, _width: u32, _height: u32) -> Option<RgbaImage> {
        None
    }
}

/// Render one scene to PNG bytes.
pub fn export_scene_png(
    scene: &Scene,
    icons: &dyn IconRasterizer,
    options: &ExportOptions,
) -> Result<Vec<u8>, ExportError> {
    let image = render_scene(scene, icons, options);
    let mut bytes = Vec::new();
    image.write_to(
        &mut std::io::Cursor::new(&mut bytes),
        image::ImageFormat::Png,
    )?;
    Ok(bytes)
}

/// Render every scene to PNG bytes, one image per scene, tagged with the
/// scene name. File naming is the caller's concern.
pub fn export_all_scenes_png(
    scenes: &[Scene],
    icons: &dyn IconRasterizer,
    options: &ExportOptions,
) -> Result<Vec<(String, Vec<u8>)>, ExportError> {
    scenes
        .iter()
        .map(|scene| {
            log::debug!("exporting scene {:?}", scene.name);
            export_scene_png(scene, icons, options).map(|bytes| (scene.name.clone(), bytes))
        })
        .collect()
}
