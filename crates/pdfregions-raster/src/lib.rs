//! pdfregions-raster: preview images of interpreted pages.
//!
//! The capture flow needs a picture of the page to select regions on. This
//! crate draws a wireframe of the page at a given DPI: painted paths, one
//! shaded box per glyph, and a pixel grid so drag corners can be read off
//! the image. Glyph outlines are not rasterized.

use std::io::Write;
use std::path::Path;

use pdfregions::pdfregions_core::write_atomic;
use pdfregions::{BBox, Page, PagePath, Scale};
use tiny_skia::{Color, FillRule, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};

/// Largest accepted image side, in pixels.
pub const MAX_DIMENSION_PX: u32 = 20_000;

const GLYPH_FILL: [u8; 4] = [205, 214, 230, 255];
const GLYPH_OUTLINE: [u8; 4] = [90, 110, 150, 255];
const PATH_STROKE: [u8; 4] = [40, 40, 40, 255];
const PATH_FILL: [u8; 4] = [225, 225, 225, 255];
const GRID_MINOR: [u8; 4] = [255, 170, 170, 255];
const GRID_MAJOR: [u8; 4] = [220, 60, 60, 255];

/// Every this many grid lines, one is drawn heavier.
const MAJOR_GRID_EVERY: u32 = 5;

/// Errors producing a preview image.
#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    #[error("invalid render DPI: {0}")]
    InvalidDpi(f64),

    #[error("page renders to an unusable image size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },

    #[error("PNG encoding failed: {0}")]
    Png(String),

    #[error("cannot write image: {0}")]
    Io(#[from] std::io::Error),
}

/// Options for preview rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Output resolution. Pixel coordinates read off the image convert back
    /// to points with the same DPI.
    pub dpi: f64,
    /// Spacing of grid lines in pixels. `0` disables the grid.
    pub grid_step_px: u32,
    /// Draw a shaded box for every glyph.
    pub glyph_boxes: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            dpi: pdfregions::pdfregions_core::DEFAULT_DPI,
            grid_step_px: 100,
            glyph_boxes: true,
        }
    }
}

/// A rendered page image.
pub struct RenderedPage {
    pixmap: Pixmap,
    scale: Scale,
}

impl RenderedPage {
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// The point-to-pixel scale the page was rendered at.
    pub fn scale(&self) -> Scale {
        self.scale
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// RGBA of the pixel at `(x, y)`, un-premultiplied.
    #[cfg(test)]
    fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let p: tiny_skia::PremultipliedColorU8 = self.pixmap.pixel(x, y)?;
        let c = p.demultiply();
        Some([c.red(), c.green(), c.blue(), c.alpha()])
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, RasterError> {
        self.pixmap
            .encode_png()
            .map_err(|e| RasterError::Png(e.to_string()))
    }

    /// Write the image as PNG, replacing any existing file.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), RasterError> {
        let png = self.encode_png()?;
        write_atomic(path.as_ref(), |w| w.write_all(&png))?;
        Ok(())
    }
}

/// Render `page` to a wireframe preview.
pub fn render_page(page: &Page, options: &RenderOptions) -> Result<RenderedPage, RasterError> {
    let scale = Scale::from_dpi(options.dpi).ok_or(RasterError::InvalidDpi(options.dpi))?;
    let width = pixel_extent(scale.to_pixel(page.width()));
    let height = pixel_extent(scale.to_pixel(page.height()));
    if width == 0 || height == 0 || width > MAX_DIMENSION_PX || height > MAX_DIMENSION_PX {
        return Err(RasterError::InvalidSize { width, height });
    }
    let mut pixmap = Pixmap::new(width, height).ok_or(RasterError::InvalidSize { width, height })?;
    pixmap.fill(Color::WHITE);

    for path in page.paths() {
        draw_path(&mut pixmap, path, scale);
    }
    if options.glyph_boxes {
        for ch in page.chars() {
            if !ch.text.trim().is_empty() {
                draw_glyph_box(&mut pixmap, &ch.bbox, scale);
            }
        }
    }
    if options.grid_step_px > 0 {
        draw_grid(&mut pixmap, options.grid_step_px);
    }

    tracing::debug!(width, height, dpi = options.dpi, "rendered page preview");
    Ok(RenderedPage { pixmap, scale })
}

/// Render and save in one step.
pub fn render_to_png(
    page: &Page,
    options: &RenderOptions,
    path: impl AsRef<Path>,
) -> Result<RenderedPage, RasterError> {
    let rendered = render_page(page, options)?;
    rendered.save_png(path)?;
    Ok(rendered)
}

/// Whole pixels needed to cover `v`, ignoring float noise just above an
/// integer.
fn pixel_extent(v: f64) -> u32 {
    if v.is_finite() && v > 0.0 {
        (v - 1e-6).ceil().min(u32::MAX as f64) as u32
    } else {
        0
    }
}

fn paint(rgba: [u8; 4]) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(rgba[0], rgba[1], rgba[2], rgba[3]);
    paint.anti_alias = true;
    paint
}

fn draw_path(pixmap: &mut Pixmap, path: &PagePath, scale: Scale) {
    let mut pb = PathBuilder::new();
    for subpath in &path.subpaths {
        let mut points = subpath.points.iter();
        let Some(first) = points.next() else {
            continue;
        };
        pb.move_to(scale.to_pixel(first.x) as f32, scale.to_pixel(first.y) as f32);
        for p in points {
            pb.line_to(scale.to_pixel(p.x) as f32, scale.to_pixel(p.y) as f32);
        }
        if subpath.closed {
            pb.close();
        }
    }
    let Some(skia_path) = pb.finish() else {
        return;
    };

    if path.paint.fills() {
        pixmap.fill_path(
            &skia_path,
            &paint(PATH_FILL),
            FillRule::Winding,
            Transform::identity(),
            None,
        );
    }
    if path.paint.strokes() {
        let stroke = Stroke {
            width: scale.to_pixel(path.line_width).max(1.0) as f32,
            ..Stroke::default()
        };
        pixmap.stroke_path(
            &skia_path,
            &paint(PATH_STROKE),
            &stroke,
            Transform::identity(),
            None,
        );
    }
}

fn draw_glyph_box(pixmap: &mut Pixmap, bbox: &BBox, scale: Scale) {
    let px = scale.rect_to_pixel(bbox);
    let Some(rect) = Rect::from_ltrb(px.x0 as f32, px.y0 as f32, px.x1 as f32, px.y1 as f32)
    else {
        return;
    };
    pixmap.fill_rect(rect, &paint(GLYPH_FILL), Transform::identity(), None);
    let outline = PathBuilder::from_rect(rect);
    pixmap.stroke_path(
        &outline,
        &paint(GLYPH_OUTLINE),
        &Stroke::default(),
        Transform::identity(),
        None,
    );
}

/// One-pixel grid lines at multiples of `step`, skipping the image edges.
fn draw_grid(pixmap: &mut Pixmap, step: u32) {
    let (width, height) = (pixmap.width(), pixmap.height());
    let mut lines = Vec::new();
    let mut x = step;
    while x < width {
        lines.push((Rect::from_xywh(x as f32, 0.0, 1.0, height as f32), x / step));
        x += step;
    }
    let mut y = step;
    while y < height {
        lines.push((Rect::from_xywh(0.0, y as f32, width as f32, 1.0), y / step));
        y += step;
    }

    let minor = paint(GRID_MINOR);
    let major = paint(GRID_MAJOR);
    for (rect, index) in lines {
        let Some(rect) = rect else { continue };
        let color = if index % MAJOR_GRID_EVERY == 0 {
            &major
        } else {
            &minor
        };
        pixmap.fill_rect(rect, color, Transform::identity(), None);
    }
}
