//! Scene rasterization: viewport fitting and per-layer pixel drawing.

use crate::{ExportOptions, IconRasterizer};
use image::{Rgba, RgbaImage};
use kurbo::{Point, Rect};
use lumalayout_core::geometry::point_in_polygon;
use lumalayout_core::{Color, Scene};

/// Room outline stroke width in world units.
const ROOM_STROKE_WIDTH: f64 = 3.0;
/// Room interior fill once the polygon closes.
const ROOM_FILL: Color = Color::new(226, 232, 240, 102);
/// Room outline color.
const ROOM_STROKE: Color = Color::rgb(0x33, 0x41, 0x55);
/// Placeholder box fill for unresolved icons.
const PLACEHOLDER_FILL: Color = Color::new(100, 120, 200, 64);
/// Placeholder box border for unresolved icons.
const PLACEHOLDER_BORDER: Color = Color::new(100, 120, 200, 128);

/// Fit-to-content view transform for an export canvas.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
}

impl Viewport {
    fn to_screen(&self, p: Point) -> Point {
        Point::new(p.x * self.scale + self.x, p.y * self.scale + self.y)
    }

    fn to_world(&self, p: Point) -> Point {
        Point::new((p.x - self.x) / self.scale, (p.y - self.y) / self.scale)
    }
}

/// World-space bounds of everything in a scene: scaled element boxes,
/// shape boxes, and room vertices. Empty scenes get a default page.
pub fn scene_bounds(scene: &Scene) -> Rect {
    let mut bounds: Option<Rect> = None;
    let mut include = |rect: Rect| {
        bounds = Some(match bounds {
            Some(b) => b.union(rect),
            None => rect,
        });
    };

    for el in &scene.elements {
        include(el.bounds());
    }
    for shape in &scene.shapes {
        include(shape.bounds());
    }
    for &pt in &scene.room.points {
        include(Rect::new(pt.x, pt.y, pt.x, pt.y));
    }

    bounds.unwrap_or(Rect::new(0.0, 0.0, 800.0, 600.0))
}

/// Center the padded content bounds on the canvas at the largest scale that
/// fits, capped by `max_scale`.
pub fn fit_viewport(bounds: Rect, options: &ExportOptions) -> Viewport {
    let content_w = bounds.width() + options.padding * 2.0;
    let content_h = bounds.height() + options.padding * 2.0;
    let scale = (options.width as f64 / content_w)
        .min(options.height as f64 / content_h)
        .min(options.max_scale);
    Viewport {
        x: (options.width as f64 - content_w * scale) / 2.0 - (bounds.x0 - options.padding) * scale,
        y: (options.height as f64 - content_h * scale) / 2.0
            - (bounds.y0 - options.padding) * scale,
        scale,
    }
}

/// Render a scene snapshot into an RGBA canvas.
pub fn render_scene(scene: &Scene, icons: &dyn IconRasterizer, options: &ExportOptions) -> RgbaImage {
    let viewport = fit_viewport(scene_bounds(scene), options);
    let mut canvas = Canvas::new(options.width, options.height);

    draw_room(&mut canvas, scene, viewport);
    for shape in scene.shapes_by_paint_order() {
        draw_shape(&mut canvas, shape, viewport);
    }
    for element in scene.elements_by_paint_order() {
        draw_element(&mut canvas, element, icons, viewport);
    }

    canvas.into_image()
}

fn draw_room(canvas: &mut Canvas, scene: &Scene, viewport: Viewport) {
    let room = &scene.room;
    if room.points.len() < 2 {
        return;
    }
    let screen_pts: Vec<Point> = room.points.iter().map(|&p| viewport.to_screen(p)).collect();

    if room.closed {
        fill_polygon(canvas, &screen_pts, ROOM_FILL);
    }
    stroke_polyline(
        canvas,
        &screen_pts,
        room.closed,
        ROOM_STROKE_WIDTH * viewport.scale,
        ROOM_STROKE,
    );
}

fn draw_shape(canvas: &mut Canvas, shape: &lumalayout_core::BlueprintShape, viewport: Viewport) {
    // Conservative screen-space bounds: the enclosing circle of the rotated
    // box plus the stroke.
    let half_diag = (shape.width.hypot(shape.height) / 2.0 + shape.stroke_width) * viewport.scale;
    let center = viewport.to_screen(shape.position);
    let region = pixel_region(canvas, center, half_diag);

    let mut outer = shape.clone();
    outer.width += shape.stroke_width;
    outer.height += shape.stroke_width;
    let mut inner = shape.clone();
    inner.width = (shape.width - shape.stroke_width).max(0.0);
    inner.height = (shape.height - shape.stroke_width).max(0.0);

    for (px, py) in region {
        let world = viewport.to_world(Point::new(px as f64 + 0.5, py as f64 + 0.5));
        if shape.hit_test(world) {
            canvas.blend(px, py, shape.fill);
        }
        if outer.hit_test(world) && !inner.hit_test(world) {
            canvas.blend(px, py, shape.stroke);
        }
    }
}

fn draw_element(
    canvas: &mut Canvas,
    element: &lumalayout_core::LightingElement,
    icons: &dyn IconRasterizer,
    viewport: Viewport,
) {
    let (hw, hh) = element.scaled_half_extents();
    if hw <= 0.0 || hh <= 0.0 {
        return;
    }
    let icon_px_w = ((hw * 2.0 * viewport.scale).round() as u32).max(1);
    let icon_px_h = ((hh * 2.0 * viewport.scale).round() as u32).max(1);
    let icon = icons
        .rasterize(&element.icon, icon_px_w, icon_px_h)
        .filter(|img| img.width() > 0 && img.height() > 0);

    let center = viewport.to_screen(element.position);
    let half_diag = hw.hypot(hh) * viewport.scale;
    let region = pixel_region(canvas, center, half_diag);

    let theta = -element.rotation.to_radians();
    let (sin_t, cos_t) = theta.sin_cos();
    // Border thickness in icon-local units, one-ish screen pixel.
    let border_x = 1.5 / (viewport.scale * element.scale_x.abs().max(f64::EPSILON));
    let border_y = 1.5 / (viewport.scale * element.scale_y.abs().max(f64::EPSILON));

    for (px, py) in region {
        let world = viewport.to_world(Point::new(px as f64 + 0.5, py as f64 + 0.5));
        let dx = world.x - element.position.x;
        let dy = world.y - element.position.y;
        let rx = dx * cos_t - dy * sin_t;
        let ry = dx * sin_t + dy * cos_t;
        let lx = rx / element.scale_x;
        let ly = ry / element.scale_y;
        if lx.abs() > element.width / 2.0 || ly.abs() > element.height / 2.0 {
            continue;
        }

        match &icon {
            Some(img) => {
                let u = ((lx / element.width + 0.5) * img.width() as f64) as u32;
                let v = ((ly / element.height + 0.5) * img.height() as f64) as u32;
                let u = u.min(img.width() - 1);
                let v = v.min(img.height() - 1);
                let Rgba([r, g, b, a]) = *img.get_pixel(u, v);
                canvas.blend(px, py, Color::new(r, g, b, a));
            }
            None => {
                let near_edge = element.width / 2.0 - lx.abs() <= border_x
                    || element.height / 2.0 - ly.abs() <= border_y;
                let color = if near_edge {
                    PLACEHOLDER_BORDER
                } else {
                    PLACEHOLDER_FILL
                };
                canvas.blend(px, py, color);
            }
        }
    }
}

/// Iterate pixels of a clamped square region around a screen center.
fn pixel_region(canvas: &Canvas, center: Point, half_extent: f64) -> Vec<(u32, u32)> {
    let x0 = ((center.x - half_extent).floor().max(0.0)) as u32;
    let y0 = ((center.y - half_extent).floor().max(0.0)) as u32;
    let x1 = ((center.x + half_extent).ceil()).min(canvas.width as f64 - 1.0);
    let y1 = ((center.y + half_extent).ceil()).min(canvas.height as f64 - 1.0);
    if x1 < 0.0 || y1 < 0.0 {
        return Vec::new();
    }
    let (x1, y1) = (x1 as u32, y1 as u32);
    let mut pixels = Vec::new();
    for py in y0..=y1 {
        for px in x0..=x1 {
            pixels.push((px, py));
        }
    }
    pixels
}

fn fill_polygon(canvas: &mut Canvas, points: &[Point], color: Color) {
    if points.len() < 3 {
        return;
    }
    let min_x = points.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
    let min_y = points.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
    let max_x = points.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
    let max_y = points.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);

    let x0 = min_x.floor().max(0.0) as u32;
    let y0 = min_y.floor().max(0.0) as u32;
    let x1 = (max_x.ceil().min(canvas.width as f64 - 1.0)).max(0.0) as u32;
    let y1 = (max_y.ceil().min(canvas.height as f64 - 1.0)).max(0.0) as u32;

    for py in y0..=y1 {
        for px in x0..=x1 {
            let p = Point::new(px as f64 + 0.5, py as f64 + 0.5);
            if point_in_polygon(p, points) {
                canvas.blend(px, py, color);
            }
        }
    }
}

fn stroke_polyline(canvas: &mut Canvas, points: &[Point], closed: bool, width: f64, color: Color) {
    let half = (width / 2.0).max(0.5);
    let mut draw_segment = |a: Point, b: Point| {
        let x0 = (a.x.min(b.x) - half).floor().max(0.0) as u32;
        let y0 = (a.y.min(b.y) - half).floor().max(0.0) as u32;
        let x1 = ((a.x.max(b.x) + half).ceil().min(canvas.width as f64 - 1.0)).max(0.0) as u32;
        let y1 = ((a.y.max(b.y) + half).ceil().min(canvas.height as f64 - 1.0)).max(0.0) as u32;
        for py in y0..=y1 {
            for px in x0..=x1 {
                let p = Point::new(px as f64 + 0.5, py as f64 + 0.5);
                if lumalayout_core::geometry::point_to_segment_dist(p, a, b) <= half {
                    canvas.blend(px, py, color);
                }
            }
        }
    };

    for w in points.windows(2) {
        draw_segment(w[0], w[1]);
    }
    if closed && points.len() >= 3 {
        draw_segment(points[points.len() - 1], points[0]);
    }
}

/// White-backed RGBA canvas with alpha blending.
struct Canvas {
    img: RgbaImage,
    width: u32,
    height: u32,
}

impl Canvas {
    fn new(width: u32, height: u32) -> Self {
        let img = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));
        Self { img, width, height }
    }

    fn blend(&mut self, x: u32, y: u32, color: Color) {
        if x >= self.width || y >= self.height {
            return;
        }
        let dst = self.img.get_pixel_mut(x, y);
        let a = color.a as f64 / 255.0;
        for (channel, src) in [color.r, color.g, color.b].into_iter().enumerate() {
            let blended = src as f64 * a + dst.0[channel] as f64 * (1.0 - a);
            dst.0[channel] = blended.round().clamp(0.0, 255.0) as u8;
        }
        dst.0[3] = 255;
    }

    fn into_image(self) -> RgbaImage {
        self.img
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PlaceholderIcons;
    use lumalayout_core::{IconRef, LightingElement, NewShape, ShapeKind};

    fn options(width: u32, height: u32) -> ExportOptions {
        ExportOptions {
            width,
            height,
            ..ExportOptions::default()
        }
    }

    #[test]
    fn test_empty_scene_uses_default_bounds() {
        let scene = Scene::new("Scene 1");
        let bounds = scene_bounds(&scene);
        assert_eq!(bounds, Rect::new(0.0, 0.0, 800.0, 600.0));
    }

    #[test]
    fn test_bounds_cover_scaled_elements() {
        let mut scene = Scene::new("Scene 1");
        let mut el = LightingElement::new(
            IconRef::catalog("par-64"),
            Point::new(100.0, 100.0),
            (60.0, 60.0),
        );
        el.scale_x = 2.0;
        scene.elements.push(el);

        let bounds = scene_bounds(&scene);
        assert!((bounds.x0 - 40.0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 160.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_viewport_centers_content() {
        let bounds = Rect::new(0.0, 0.0, 200.0, 100.0);
        let opts = options(640, 480);
        let vp = fit_viewport(bounds, &opts);

        // The content center maps to the canvas center.
        let center = vp.to_screen(Point::new(100.0, 50.0));
        assert!((center.x - 320.0).abs() < 1e-6);
        assert!((center.y - 240.0).abs() < 1e-6);
        assert!(vp.scale <= opts.max_scale);

        // Round trip through the viewport transform.
        let p = Point::new(37.0, 91.0);
        let back = vp.to_world(vp.to_screen(p));
        assert!((back.x - p.x).abs() < 1e-9);
        assert!((back.y - p.y).abs() < 1e-9);
    }

    #[test]
    fn test_filled_shape_colors_canvas_center() {
        let mut scene = Scene::new("Scene 1");
        let mut store_shape = lumalayout_core::BlueprintShape::new(
            ShapeKind::Rect,
            Point::new(0.0, 0.0),
            200.0,
            200.0,
        );
        store_shape.fill = Color::rgb(255, 0, 0);
        scene.shapes.push(store_shape);

        let img = render_scene(&scene, &PlaceholderIcons, &options(100, 100));
        let center = img.get_pixel(50, 50);
        assert!(center.0[0] > 200 && center.0[1] < 100 && center.0[2] < 100);
        // Corners stay white.
        let corner = img.get_pixel(1, 1);
        assert_eq!(corner.0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_placeholder_element_changes_pixels() {
        let mut scene = Scene::new("Scene 1");
        scene.elements.push(LightingElement::new(
            IconRef::catalog("unresolved"),
            Point::new(0.0, 0.0),
            (60.0, 60.0),
        ));

        let img = render_scene(&scene, &PlaceholderIcons, &options(100, 100));
        let center = img.get_pixel(50, 50);
        assert_ne!(center.0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_closed_room_is_filled() {
        let mut scene = Scene::new("Scene 1");
        scene.room.points = vec![
            Point::new(0.0, 0.0),
            Point::new(200.0, 0.0),
            Point::new(200.0, 200.0),
            Point::new(0.0, 200.0),
        ];
        scene.room.closed = true;

        let img = render_scene(&scene, &PlaceholderIcons, &options(100, 100));
        let center = img.get_pixel(50, 50);
        assert_ne!(center.0, [255, 255, 255, 255]);

        // Open rooms draw only the outline.
        scene.room.closed = false;
        let img = render_scene(&scene, &PlaceholderIcons, &options(100, 100));
        let center = img.get_pixel(50, 50);
        assert_eq!(center.0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_new_shape_defaults_used_by_store() {
        // Guard that the store's default shape styling renders non-white.
        let new = NewShape::new(ShapeKind::Circle, Point::new(0.0, 0.0), 100.0, 100.0);
        let mut scene = Scene::new("Scene 1");
        let mut shape =
            lumalayout_core::BlueprintShape::new(new.kind, new.position, new.width, new.height);
        shape.fill = new.fill;
        scene.shapes.push(shape);

        let img = render_scene(&scene, &PlaceholderIcons, &options(80, 80));
        let center = img.get_pixel(40, 40);
        assert_ne!(center.0, [255, 255, 255, 255]);
    }
}
