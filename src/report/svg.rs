use anyhow::{Context, Result};
use resvg::{tiny_skia, usvg};
use std::path::Path;

/// Output pixels per SVG user unit. Figures are laid out at 100 units per
/// inch, so this yields 150 DPI.
pub const RASTER_SCALE: f32 = 1.5;

/// Rasterizes SVG documents; system fonts are loaded once per instance.
pub struct Rasterizer {
    opt: usvg::Options<'static>,
}

impl Rasterizer {
    pub fn new() -> Self {
        let mut opt = usvg::Options::default();
        opt.fontdb_mut().load_system_fonts();
        log::debug!("loaded {} font faces", opt.fontdb.len());
        Self { opt }
    }

    pub fn write_png(&self, svg: &str, path: &Path) -> Result<()> {
        let tree = usvg::Tree::from_str(svg, &self.opt)
            .map_err(|e| anyhow::anyhow!("usvg parse failed: {e}"))?;
        let size = tree.size();
        let width = (size.width() * RASTER_SCALE).ceil() as u32;
        let height = (size.height() * RASTER_SCALE).ceil() as u32;
        let mut pixmap =
            tiny_skia::Pixmap::new(width, height).context("failed to allocate pixmap")?;
        pixmap.fill(tiny_skia::Color::WHITE);
        resvg::render(
            &tree,
            tiny_skia::Transform::from_scale(RASTER_SCALE, RASTER_SCALE),
            &mut pixmap.as_mut(),
        );
        pixmap
            .save_png(path)
            .map_err(|e| anyhow::anyhow!("failed to write {}: {e}", path.display()))?;
        Ok(())
    }

    /// Converts to a single-page PDF, reusing the fonts loaded for PNG output.
    pub fn to_pdf(&self, svg: &str) -> Result<Vec<u8>> {
        use svg2pdf::{ConversionOptions, PageOptions};

        let tree = svg2pdf::usvg::Tree::from_str(svg, &self.opt)
            .map_err(|e| anyhow::anyhow!("usvg parse failed: {e}"))?;
        let pdf = svg2pdf::to_pdf(&tree, ConversionOptions::default(), PageOptions::default())
            .map_err(|e| anyhow::anyhow!("svg2pdf conversion failed: {e}"))?;
        Ok(pdf)
    }
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new()
    }
}

pub fn escape_svg(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SQUARE: &str = "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"40\" height=\"20\" viewBox=\"0 0 40 20\"><rect x=\"0\" y=\"0\" width=\"20\" height=\"20\" fill=\"#081d58\"/></svg>";

    #[test]
    fn png_is_scaled_to_print_resolution() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sq.png");
        Rasterizer::new().write_png(SQUARE, &path).unwrap();
        let png = tiny_skia::Pixmap::load_png(&path).unwrap();
        assert_eq!((png.width(), png.height()), (60, 30));
    }

    #[test]
    fn pdf_has_magic() {
        let pdf = Rasterizer::default().to_pdf(SQUARE).unwrap();
        assert!(pdf.starts_with(b"%PDF"));
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_svg("a<b>&c"), "a&lt;b&gt;&amp;c");
    }
}
