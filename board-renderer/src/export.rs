//! Scene rasterization.
//!
//! Renders a [`Scene`] straight onto a tiny-skia pixmap and hands back an
//! RGBA image, the software equivalent of reading the drawing surface's
//! backing canvas.

use board_core::{Element, ElementKind, Scene, StrokePoint};
use image::RgbaImage;
use tiny_skia::{
    Color, FillRule, LineCap, LineJoin, Paint, Path, PathBuilder, Pixmap, Rect, Stroke, Transform,
};

use crate::error::{RenderError, RenderResult};

/// Configuration for scene rasterization.
#[derive(Debug, Clone)]
pub struct RasterConfig {
    /// Scale factor (e.g. 2.0 for retina).
    pub scale: f32,
    /// Background override; `None` uses the scene background.
    pub background: Option<[u8; 4]>,
    /// Enable anti-aliasing.
    pub anti_alias: bool,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            scale: 1.0,
            background: None,
            anti_alias: true,
        }
    }
}

/// Rasterizes whiteboard scenes.
#[derive(Debug, Clone, Default)]
pub struct SceneRasterizer {
    config: RasterConfig,
}

impl SceneRasterizer {
    /// Create a new rasterizer with the given configuration.
    #[must_use]
    pub fn new(config: RasterConfig) -> Self {
        Self { config }
    }

    /// Get the rasterizer configuration.
    #[must_use]
    pub fn config(&self) -> &RasterConfig {
        &self.config
    }

    /// Output dimensions (width, height) in pixels for a scene.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn output_dimensions(&self, scene: &Scene) -> (u32, u32) {
        let scale = self.config.scale;
        let w = (scene.viewport_width.max(1.0) * scale) as u32;
        let h = (scene.viewport_height.max(1.0) * scale) as u32;
        (w.max(1), h.max(1))
    }

    /// Render the scene to an RGBA image, elements in drawing order.
    ///
    /// # Errors
    ///
    /// Returns an error if the pixmap cannot be allocated or converted.
    pub fn render(&self, scene: &Scene) -> RenderResult<RgbaImage> {
        let (width, height) = self.output_dimensions(scene);
        let mut pixmap =
            Pixmap::new(width, height).ok_or(RenderError::InvalidDimensions { width, height })?;

        let background = match self.config.background {
            Some([r, g, b, a]) => Color::from_rgba8(r, g, b, a),
            None => parse_hex_color(&scene.background).unwrap_or(Color::WHITE),
        };
        pixmap.fill(background);

        let transform = Transform::from_scale(self.config.scale, self.config.scale);
        for element in scene.elements() {
            self.draw_element(&mut pixmap, element, transform);
        }

        tracing::debug!(
            width,
            height,
            elements = scene.element_count(),
            "scene rasterized"
        );
        pixmap_to_rgba(&pixmap)
    }

    fn draw_element(&self, pixmap: &mut Pixmap, element: &Element, transform: Transform) {
        let style = &element.style;
        let Some(stroke_color) = parse_hex_color(&style.stroke_color) else {
            tracing::warn!(color = %style.stroke_color, id = %element.id, "unparseable stroke color, skipping element");
            return;
        };

        let mut paint = Paint::default();
        paint.anti_alias = self.config.anti_alias;
        paint.set_color(stroke_color);

        let stroke = Stroke {
            width: style.stroke_width,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Stroke::default()
        };

        match &element.kind {
            ElementKind::Freedraw { points } => {
                if let [only] = points.as_slice() {
                    // A tap leaves a dot.
                    if let Some(dot) =
                        PathBuilder::from_circle(only.x, only.y, style.stroke_width / 2.0)
                    {
                        pixmap.fill_path(&dot, &paint, FillRule::Winding, transform, None);
                    }
                } else if let Some(path) = polyline(points) {
                    pixmap.stroke_path(&path, &paint, &stroke, transform, None);
                }
            }
            ElementKind::Line { start, end } => {
                if let Some(path) = polyline(&[*start, *end]) {
                    pixmap.stroke_path(&path, &paint, &stroke, transform, None);
                }
            }
            ElementKind::Rectangle {
                x,
                y,
                width,
                height,
            } => {
                if let Some(rect) = Rect::from_xywh(*x, *y, *width, *height) {
                    let path = PathBuilder::from_rect(rect);
                    fill_shape(pixmap, &path, style.fill_color.as_deref(), &paint, transform);
                    pixmap.stroke_path(&path, &paint, &stroke, transform, None);
                }
            }
            ElementKind::Ellipse {
                x,
                y,
                width,
                height,
            } => {
                if let Some(path) =
                    Rect::from_xywh(*x, *y, *width, *height).and_then(PathBuilder::from_oval)
                {
                    fill_shape(pixmap, &path, style.fill_color.as_deref(), &paint, transform);
                    pixmap.stroke_path(&path, &paint, &stroke, transform, None);
                }
            }
        }
    }
}

fn fill_shape(
    pixmap: &mut Pixmap,
    path: &Path,
    fill_color: Option<&str>,
    stroke_paint: &Paint<'_>,
    transform: Transform,
) {
    let Some(color) = fill_color.and_then(parse_hex_color) else {
        return;
    };
    let mut paint = stroke_paint.clone();
    paint.set_color(color);
    pixmap.fill_path(path, &paint, FillRule::Winding, transform, None);
}

fn polyline(points: &[StrokePoint]) -> Option<Path> {
    let (first, rest) = points.split_first()?;
    let mut pb = PathBuilder::new();
    pb.move_to(first.x, first.y);
    for point in rest {
        pb.line_to(point.x, point.y);
    }
    pb.finish()
}

/// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` into a color.
#[must_use]
pub fn parse_hex_color(hex: &str) -> Option<Color> {
    let digits = hex.strip_prefix('#')?;
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match digits.len() {
        3 => {
            let mut rgb = [0u8; 3];
            for (slot, c) in rgb.iter_mut().zip(digits.chars()) {
                let v = c.to_digit(16)?;
                *slot = u8::try_from(v * 17).ok()?;
            }
            Some(Color::from_rgba8(rgb[0], rgb[1], rgb[2], 255))
        }
        6 | 8 => {
            let r = channel(digits.get(0..2)?)?;
            let g = channel(digits.get(2..4)?)?;
            let b = channel(digits.get(4..6)?)?;
            let a = match digits.get(6..8) {
                Some(alpha) => channel(alpha)?,
                None => 255,
            };
            Some(Color::from_rgba8(r, g, b, a))
        }
        _ => None,
    }
}

fn pixmap_to_rgba(pixmap: &Pixmap) -> RenderResult<RgbaImage> {
    let mut data = Vec::with_capacity(pixmap.data().len());
    for pixel in pixmap.pixels() {
        let c = pixel.demultiply();
        data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    RgbaImage::from_raw(pixmap.width(), pixmap.height(), data)
        .ok_or_else(|| RenderError::Rasterize("pixel buffer size mismatch".to_string()))
}
