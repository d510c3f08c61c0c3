//! Drawing surface with high-DPI scaling
//!
//! Renderers work exclusively in logical coordinates. The surface owns the
//! physical backing pixmap (logical size multiplied by the device pixel
//! ratio) and applies the uniform scale transform to every draw, so a
//! renderer never sees the backing resolution.

use tiny_skia::{
    Color, FillRule, GradientStop, LinearGradient, Paint, Path, PathBuilder, Pixmap, Point,
    RadialGradient, Rect, Shader, SpreadMode, Stroke, Transform,
};
use tracing::debug;

use crate::color::Background;

/// Fallback logical size when nothing else is measurable.
const FALLBACK_SIZE: (f32, f32) = (800.0, 400.0);

/// A 2D drawing target with a stable logical coordinate space.
pub struct Surface {
    pixmap: Pixmap,
    /// Logical size recorded by the last rescale; sticky once set.
    logical: Option<(f32, f32)>,
    /// Explicit size attributes, if the embedder set any.
    attr: Option<(f32, f32)>,
    /// Last observed display-box measurement.
    measured: Option<(f32, f32)>,
    dpr: f32,
}

impl Surface {
    /// Creates a surface with an explicit logical size and device pixel ratio.
    pub fn new(logical_width: f32, logical_height: f32, dpr: f32) -> Self {
        let mut surface = Self {
            pixmap: Pixmap::new(1, 1).expect("1x1 pixmap"),
            logical: None,
            attr: Some((logical_width, logical_height)),
            measured: None,
            dpr: dpr.max(0.1),
        };
        surface.rescale();
        surface
    }

    /// Creates an unmeasured surface; the first rescale uses the fallback size.
    pub fn unmeasured(dpr: f32) -> Self {
        let mut surface = Self {
            pixmap: Pixmap::new(1, 1).expect("1x1 pixmap"),
            logical: None,
            attr: None,
            measured: None,
            dpr: dpr.max(0.1),
        };
        surface.rescale();
        surface
    }

    /// Logical width in CSS-like pixels.
    pub fn width(&self) -> f32 {
        self.logical.unwrap_or(FALLBACK_SIZE).0
    }

    /// Logical height in CSS-like pixels.
    pub fn height(&self) -> f32 {
        self.logical.unwrap_or(FALLBACK_SIZE).1
    }

    /// Device pixel ratio currently applied.
    pub fn dpr(&self) -> f32 {
        self.dpr
    }

    /// Physical backing size in device pixels.
    pub fn backing_size(&self) -> (u32, u32) {
        (self.pixmap.width(), self.pixmap.height())
    }

    /// Records a new display-box measurement. Call [`Surface::rescale`]
    /// afterwards, mirroring a resize notification.
    pub fn set_measured(&mut self, width: f32, height: f32) {
        self.measured = Some((width, height));
    }

    /// Overrides the recorded logical size (explicit embedder resize).
    pub fn set_logical_size(&mut self, width: f32, height: f32) {
        self.logical = Some((width, height));
        self.rescale();
    }

    /// Updates the device pixel ratio.
    pub fn set_dpr(&mut self, dpr: f32) {
        self.dpr = dpr.max(0.1);
    }

    /// Normalizes the backing resolution to the device pixel ratio while
    /// preserving the logical coordinate space.
    ///
    /// Logical size preference: previously recorded logical size, else
    /// explicit size attributes, else the measured display box, else a fixed
    /// fallback.
    pub fn rescale(&mut self) {
        let (lw, lh) = self
            .logical
            .or(self.attr)
            .or(self.measured)
            .filter(|&(w, h)| w > 0.0 && h > 0.0)
            .unwrap_or(FALLBACK_SIZE);

        self.logical = Some((lw, lh));

        let pw = ((lw * self.dpr).round() as u32).max(1);
        let ph = ((lh * self.dpr).round() as u32).max(1);
        if (pw, ph) != (self.pixmap.width(), self.pixmap.height()) {
            debug!(
                "surface rescale: logical {}x{}, backing {}x{} (dpr {})",
                lw, lh, pw, ph, self.dpr
            );
            self.pixmap = Pixmap::new(pw, ph).expect("non-zero pixmap");
        }
    }

    fn transform(&self) -> Transform {
        Transform::from_scale(self.dpr, self.dpr)
    }

    /// Clears or fills the surface per the background configuration.
    pub fn fill_background(&mut self, background: &Background) {
        match background.solid() {
            None => self.pixmap.fill(Color::TRANSPARENT),
            Some(c) => self.pixmap.fill(c.opaque()),
        }
    }

    /// Fills an axis-aligned rectangle in logical coordinates.
    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        if w <= 0.0 || h <= 0.0 {
            return;
        }
        if let Some(rect) = Rect::from_xywh(x, y, w, h) {
            let mut paint = Paint::default();
            paint.set_color(color);
            paint.anti_alias = false;
            self.pixmap
                .fill_rect(rect, &paint, self.transform(), None);
        }
    }

    /// Strokes a rectangle outline.
    pub fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color, width: f32) {
        let mut pb = PathBuilder::new();
        pb.move_to(x, y);
        pb.line_to(x + w, y);
        pb.line_to(x + w, y + h);
        pb.line_to(x, y + h);
        pb.close();
        if let Some(path) = pb.finish() {
            self.stroke_path(&path, color, width);
        }
    }

    /// Fills a path built in logical coordinates.
    pub fn fill_path(&mut self, path: &Path, color: Color) {
        let mut paint = Paint::default();
        paint.set_color(color);
        paint.anti_alias = true;
        self.pixmap
            .fill_path(path, &paint, FillRule::Winding, self.transform(), None);
    }

    /// Strokes a path built in logical coordinates.
    pub fn stroke_path(&mut self, path: &Path, color: Color, width: f32) {
        let mut paint = Paint::default();
        paint.set_color(color);
        paint.anti_alias = true;
        let stroke = Stroke {
            width: width.max(0.1),
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(path, &paint, &stroke, self.transform(), None);
    }

    /// Fills a circle.
    pub fn fill_circle(&mut self, cx: f32, cy: f32, r: f32, color: Color) {
        if r <= 0.0 {
            return;
        }
        if let Some(path) = PathBuilder::from_circle(cx, cy, r) {
            self.fill_path(&path, color);
        }
    }

    /// Strokes a circle outline.
    pub fn stroke_circle(&mut self, cx: f32, cy: f32, r: f32, color: Color, width: f32) {
        if r <= 0.0 {
            return;
        }
        if let Some(path) = PathBuilder::from_circle(cx, cy, r) {
            self.stroke_path(&path, color, width);
        }
    }

    /// Strokes a polyline through the given logical points.
    pub fn stroke_polyline(&mut self, points: &[(f32, f32)], color: Color, width: f32, closed: bool) {
        if let Some(path) = build_polyline(points, closed) {
            self.stroke_path(&path, color, width);
        }
    }

    /// Fills the polygon enclosed by the given points.
    pub fn fill_polygon(&mut self, points: &[(f32, f32)], color: Color) {
        if let Some(path) = build_polyline(points, true) {
            self.fill_path(&path, color);
        }
    }

    /// Fills a rotated ellipse centered at (cx, cy). Rotation is in radians.
    pub fn fill_ellipse(&mut self, cx: f32, cy: f32, rx: f32, ry: f32, rotation: f32, color: Color) {
        if rx <= 0.0 || ry <= 0.0 {
            return;
        }
        let Some(rect) = Rect::from_xywh(-rx, -ry, rx * 2.0, ry * 2.0) else {
            return;
        };
        let mut pb = PathBuilder::new();
        pb.push_oval(rect);
        let Some(path) = pb.finish() else {
            return;
        };
        let placement = Transform::from_rotate(rotation.to_degrees()).post_translate(cx, cy);
        let Some(path) = path.transform(placement) else {
            return;
        };
        self.fill_path(&path, color);
    }

    /// Fills a circle with a radial gradient (center to rim stops).
    pub fn fill_circle_radial(&mut self, cx: f32, cy: f32, r: f32, stops: &[(f32, Color)]) {
        if r <= 0.0 {
            return;
        }
        let Some(path) = PathBuilder::from_circle(cx, cy, r) else {
            return;
        };
        let Some(shader) = radial_shader(cx, cy, r, stops) else {
            return;
        };
        self.fill_shader(&path, shader);
    }

    /// Fills a path with a radial gradient centered at (cx, cy).
    pub fn fill_path_radial(
        &mut self,
        path: &Path,
        cx: f32,
        cy: f32,
        r: f32,
        stops: &[(f32, Color)],
    ) {
        if r <= 0.0 {
            return;
        }
        if let Some(shader) = radial_shader(cx, cy, r, stops) {
            self.fill_shader(path, shader);
        }
    }

    /// Strokes a line with a linear gradient along it.
    pub fn stroke_line_linear(
        &mut self,
        from: (f32, f32),
        to: (f32, f32),
        stops: &[(f32, Color)],
        width: f32,
    ) {
        let mut pb = PathBuilder::new();
        pb.move_to(from.0, from.1);
        pb.line_to(to.0, to.1);
        let Some(path) = pb.finish() else {
            return;
        };
        let gradient_stops: Vec<GradientStop> =
            stops.iter().map(|&(p, c)| GradientStop::new(p, c)).collect();
        let Some(shader) = LinearGradient::new(
            Point::from_xy(from.0, from.1),
            Point::from_xy(to.0, to.1),
            gradient_stops,
            SpreadMode::Pad,
            Transform::identity(),
        ) else {
            return;
        };
        let mut paint = Paint::default();
        paint.shader = shader;
        paint.anti_alias = true;
        let stroke = Stroke {
            width: width.max(0.1),
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(&path, &paint, &stroke, self.transform(), None);
    }

    fn fill_shader(&mut self, path: &Path, shader: Shader) {
        let mut paint = Paint::default();
        paint.shader = shader;
        paint.anti_alias = true;
        self.pixmap
            .fill_path(path, &paint, FillRule::Winding, self.transform(), None);
    }

    /// Samples the pixel at logical coordinates, if inside the surface.
    pub fn pixel(&self, x: f32, y: f32) -> Option<tiny_skia::PremultipliedColorU8> {
        let px = (x * self.dpr) as u32;
        let py = (y * self.dpr) as u32;
        self.pixmap.pixel(px, py)
    }

    /// Read-only access to the backing pixmap (PNG export and tests).
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("logical", &self.logical)
            .field("dpr", &self.dpr)
            .field("backing", &self.backing_size())
            .finish()
    }
}

fn radial_shader(cx: f32, cy: f32, r: f32, stops: &[(f32, Color)]) -> Option<Shader<'static>> {
    let gradient_stops: Vec<GradientStop> =
        stops.iter().map(|&(p, c)| GradientStop::new(p, c)).collect();
    RadialGradient::new(
        Point::from_xy(cx, cy),
        0.0,
        Point::from_xy(cx, cy),
        r,
        gradient_stops,
        SpreadMode::Pad,
        Transform::identity(),
    )
}

/// Builds an open or closed polyline path from logical points.
pub fn build_polyline(points: &[(f32, f32)], closed: bool) -> Option<Path> {
    if points.len() < 2 {
        return None;
    }
    let mut pb = PathBuilder::new();
    pb.move_to(points[0].0, points[0].1);
    for &(x, y) in &points[1..] {
        pb.line_to(x, y);
    }
    if closed {
        pb.close();
    }
    pb.finish()
}

/// Appends a sampled arc to a path builder, approximating the sweep from
/// `start_angle` to `end_angle` (radians) with short line segments.
pub fn arc_to(
    pb: &mut PathBuilder,
    cx: f32,
    cy: f32,
    r: f32,
    start_angle: f32,
    end_angle: f32,
    line_to_start: bool,
) {
    let sweep = end_angle - start_angle;
    let steps = ((sweep.abs() / 0.05).ceil() as usize).max(2);
    for i in 0..=steps {
        let a = start_angle + sweep * (i as f32 / steps as f32);
        let x = cx + a.cos() * r;
        let y = cy + a.sin() * r;
        if i == 0 && !line_to_start {
            pb.move_to(x, y);
        } else {
            pb.line_to(x, y);
        }
    }
}

/// Points along an arc, for stroked partial rings.
pub fn arc_points(cx: f32, cy: f32, r: f32, start_angle: f32, end_angle: f32) -> Vec<(f32, f32)> {
    let sweep = end_angle - start_angle;
    let steps = ((sweep.abs() / 0.05).ceil() as usize).max(2);
    (0..=steps)
        .map(|i| {
            let a = start_angle + sweep * (i as f32 / steps as f32);
            (cx + a.cos() * r, cy + a.sin() * r)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;

    #[test]
    fn test_backing_follows_dpr() {
        let surface = Surface::new(300.0, 150.0, 2.0);
        assert_eq!(surface.backing_size(), (600, 300));
        assert_eq!(surface.width(), 300.0);
        assert_eq!(surface.height(), 150.0);
    }

    #[test]
    fn test_fallback_size() {
        let surface = Surface::unmeasured(1.0);
        assert_eq!(surface.backing_size(), (800, 400));
    }

    #[test]
    fn test_logical_size_sticky_across_rescale() {
        let mut surface = Surface::new(200.0, 100.0, 1.0);
        surface.set_measured(640.0, 480.0);
        surface.rescale();
        // Recorded logical size wins over later measurements.
        assert_eq!(surface.width(), 200.0);
        assert_eq!(surface.backing_size(), (200, 100));
    }

    #[test]
    fn test_measured_used_when_nothing_recorded() {
        let mut surface = Surface::unmeasured(1.0);
        surface.set_logical_size(123.0, 45.0);
        assert_eq!(surface.backing_size(), (123, 45));
    }

    #[test]
    fn test_fill_rect_lands_in_logical_space() {
        let mut surface = Surface::new(100.0, 100.0, 2.0);
        surface.fill_background(&Background::Solid(Rgb::new(0, 0, 0)));
        surface.fill_rect(10.0, 10.0, 5.0, 5.0, Rgb::new(255, 0, 0).opaque());
        let px = surface.pixel(12.0, 12.0).unwrap();
        assert_eq!(px.red(), 255);
        let outside = surface.pixel(40.0, 40.0).unwrap();
        assert_eq!(outside.red(), 0);
    }
}
