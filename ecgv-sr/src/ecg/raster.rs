//! SVG scene to PNG bytes

use std::sync::Arc;

use tracing::{debug, info};
use usvg::fontdb;

use super::figure::Figure;
use super::layout::POINTS_PER_INCH;
use crate::error::{Error, Result};

/// Renders figures to PNG with a shared, read-only font database
#[derive(Clone)]
pub struct Rasterizer {
    fontdb: Arc<fontdb::Database>,
}

impl Default for Rasterizer {
    /// No fonts: shapes render, text is dropped
    fn default() -> Self {
        Self {
            fontdb: Arc::new(fontdb::Database::new()),
        }
    }
}

impl Rasterizer {
    /// Load system fonts once; clones share the database
    pub fn with_system_fonts() -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        info!("Loaded {} font faces for chart text", db.len());
        Self {
            fontdb: Arc::new(db),
        }
    }

    pub fn font_count(&self) -> usize {
        self.fontdb.len()
    }

    /// Rasterize at `dpi`, one point being 1/72 inch
    pub fn render_png(&self, figure: Figure, dpi: f32) -> Result<Vec<u8>> {
        self.svg_to_png(&figure.into_svg(), dpi)
    }

    pub fn svg_to_png(&self, svg: &str, dpi: f32) -> Result<Vec<u8>> {
        let scale = dpi / POINTS_PER_INCH as f32;

        let mut opt = usvg::Options::default();
        opt.fontdb = Arc::clone(&self.fontdb);
        opt.font_family = "DejaVu Sans".to_string();

        let tree = usvg::Tree::from_str(svg, &opt)
            .map_err(|e| Error::Render(format!("failed to parse chart scene: {}", e)))?;

        let size = tree.size();
        let width_px = (size.width() * scale).ceil().max(1.0) as u32;
        let height_px = (size.height() * scale).ceil().max(1.0) as u32;

        let mut pixmap = tiny_skia::Pixmap::new(width_px, height_px).ok_or_else(|| {
            Error::Render(format!(
                "failed to allocate {}x{} pixmap",
                width_px, height_px
            ))
        })?;
        pixmap.fill(tiny_skia::Color::WHITE);

        resvg::render(
            &tree,
            tiny_skia::Transform::from_scale(scale, scale),
            &mut pixmap.as_mut(),
        );

        let png = pixmap
            .encode_png()
            .map_err(|e| Error::Render(format!("failed to encode PNG: {}", e)))?;
        debug!("Rasterized {}x{} px, {} bytes", width_px, height_px, png.len());
        Ok(png)
    }
}
