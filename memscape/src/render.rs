//! Scene rasterization (PNG) and vector output (SVG)

use crate::scene::{Backdrop, Color, Header, Scene, SceneNode};
use anyhow::{Context, Result};
use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{ImageFormat, Rgb, RgbImage};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

const CIRCLE_ALPHA: f64 = 0.8;
const BACKDROP_DOT_RADIUS: f64 = 1.5;
const HEADER_MARGIN: i64 = 16;
const HEADER_SCALE: u32 = 2;
const GLYPH_SIZE: u32 = 8;

pub trait Renderer {
    fn render(&self, scene: &Scene, path: &Path) -> Result<()>;
}

/// Picks a renderer from the output extension; anything but `.svg` is PNG.
pub fn renderer_for(path: &Path) -> Box<dyn Renderer> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("svg") => Box::new(SvgRenderer),
        _ => Box::new(PngRenderer),
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating output directory {}", parent.display()))?;
        }
    }
    Ok(())
}

/// Label glyph scale for a circle: 16px text on large circles, 8px on small.
fn label_scale(radius: f64) -> u32 {
    if radius >= 48.0 {
        2
    } else {
        1
    }
}

/// Backdrop, then alpha-blended circles, then labels and header in an 8x8
/// bitmap font.
pub struct PngRenderer;

impl PngRenderer {
    pub fn rasterize(scene: &Scene) -> RgbImage {
        let bg = scene.background;
        let mut img = RgbImage::from_pixel(scene.width, scene.height, Rgb([bg.r, bg.g, bg.b]));
        if let Some(backdrop) = &scene.backdrop {
            draw_backdrop(&mut img, backdrop);
        }
        for node in &scene.nodes {
            fill_circle(&mut img, node.x, node.y, node.radius, node.color, CIRCLE_ALPHA);
        }
        for node in &scene.nodes {
            draw_label(&mut img, node);
        }
        if let Some(header) = &scene.header {
            draw_header(&mut img, header);
        }
        img
    }
}

impl Renderer for PngRenderer {
    fn render(&self, scene: &Scene, path: &Path) -> Result<()> {
        ensure_parent(path)?;
        Self::rasterize(scene)
            .save_with_format(path, ImageFormat::Png)
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}

fn blend(dst: u8, src: u8, alpha: f64) -> u8 {
    (dst as f64 * (1.0 - alpha) + src as f64 * alpha).round() as u8
}

fn blend_pixel(img: &mut RgbImage, px: i64, py: i64, color: Color, alpha: f64) {
    let (w, h) = img.dimensions();
    if px < 0 || py < 0 || px >= w as i64 || py >= h as i64 {
        return;
    }
    let pixel = img.get_pixel_mut(px as u32, py as u32);
    pixel.0 = [
        blend(pixel.0[0], color.r, alpha),
        blend(pixel.0[1], color.g, alpha),
        blend(pixel.0[2], color.b, alpha),
    ];
}

fn fill_circle(img: &mut RgbImage, cx: f64, cy: f64, radius: f64, color: Color, alpha: f64) {
    if radius <= 0.0 {
        return;
    }
    let x0 = (cx - radius - 1.0).floor() as i64;
    let y0 = (cy - radius - 1.0).floor() as i64;
    let x1 = (cx + radius + 1.0).ceil() as i64;
    let y1 = (cy + radius + 1.0).ceil() as i64;
    let (w, h) = img.dimensions();

    for py in y0.max(0)..=y1.min(h as i64 - 1) {
        for px in x0.max(0)..=x1.min(w as i64 - 1) {
            let d = (px as f64 + 0.5 - cx).hypot(py as f64 + 0.5 - cy);
            // one pixel of edge antialiasing
            let coverage = (radius + 0.5 - d).clamp(0.0, 1.0);
            if coverage > 0.0 {
                blend_pixel(img, px, py, color, alpha * coverage);
            }
        }
    }
}

fn draw_line(img: &mut RgbImage, from: (f64, f64), to: (f64, f64), color: Color, alpha: f64) {
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as u32;
    for i in 0..=steps {
        let t = i as f64 / steps as f64;
        let x = from.0 + dx * t;
        let y = from.1 + dy * t;
        blend_pixel(img, x.floor() as i64, y.floor() as i64, color, alpha);
    }
}

fn draw_backdrop(img: &mut RgbImage, backdrop: &Backdrop) {
    for &(a, b) in &backdrop.edges {
        if let (Some(&from), Some(&to)) = (backdrop.points.get(a), backdrop.points.get(b)) {
            draw_line(img, from, to, backdrop.color, backdrop.alpha);
        }
    }
    for &(x, y) in &backdrop.points {
        fill_circle(img, x, y, BACKDROP_DOT_RADIUS, backdrop.color, backdrop.alpha);
    }
}

fn text_width(text: &str, scale: u32) -> u32 {
    text.chars().count() as u32 * GLYPH_SIZE * scale
}

/// Opaque glyphs with the top-left corner at `(left, top)`. Characters
/// outside the basic Latin set are drawn as `?`.
fn draw_text(img: &mut RgbImage, left: i64, top: i64, text: &str, scale: u32, color: Color) {
    let advance = (GLYPH_SIZE * scale) as i64;
    for (i, c) in text.chars().enumerate() {
        let glyph = BASIC_FONTS
            .get(c)
            .or_else(|| BASIC_FONTS.get('?'))
            .unwrap_or([0; 8]);
        let gx = left + i as i64 * advance;
        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..GLYPH_SIZE {
                if bits & (1u8 << col) == 0 {
                    continue;
                }
                for dy in 0..scale {
                    for dx in 0..scale {
                        let px = gx + (col * scale + dx) as i64;
                        let py = top + (row as u32 * scale + dy) as i64;
                        blend_pixel(img, px, py, color, 1.0);
                    }
                }
            }
        }
    }
}

/// Lines stacked and centered on the circle, like the SVG tspans.
fn draw_label(img: &mut RgbImage, node: &SceneNode) {
    if node.label.is_empty() {
        return;
    }
    let scale = label_scale(node.radius);
    let line_height = ((GLYPH_SIZE + 2) * scale) as i64;
    let block = node.label.len() as i64 * line_height - (2 * scale) as i64;
    let mut top = node.y.round() as i64 - block / 2;
    for line in &node.label {
        let left = node.x.round() as i64 - text_width(line, scale) as i64 / 2;
        draw_text(img, left, top, line, scale, Color::WHITE);
        top += line_height;
    }
}

fn draw_header(img: &mut RgbImage, header: &Header) {
    let width = img.width() as i64;
    draw_text(img, HEADER_MARGIN, HEADER_MARGIN, &header.title, HEADER_SCALE, Color::TITLE);
    let clock_left = width - HEADER_MARGIN - text_width(&header.timestamp, HEADER_SCALE) as i64;
    draw_text(img, clock_left, HEADER_MARGIN, &header.timestamp, HEADER_SCALE, Color::CLOCK);
}

/// Circles with centered multi-line labels.
pub struct SvgRenderer;

impl SvgRenderer {
    pub fn document(scene: &Scene) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = scene.width,
            h = scene.height
        );
        let _ = writeln!(
            out,
            r#"  <rect width="100%" height="100%" fill="{}"/>"#,
            scene.background.to_hex()
        );
        if let Some(backdrop) = &scene.backdrop {
            write_backdrop(&mut out, backdrop);
        }
        for node in &scene.nodes {
            let _ = writeln!(
                out,
                r#"  <circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="{}" fill-opacity="{}"/>"#,
                node.x,
                node.y,
                node.radius,
                node.color.to_hex(),
                CIRCLE_ALPHA
            );
            let font_size = (node.radius / 4.0).clamp(8.0, 14.0);
            let first_dy = -(node.label.len().saturating_sub(1) as f64) * 0.6;
            let _ = writeln!(
                out,
                r#"  <text x="{:.2}" y="{:.2}" fill="{}" font-size="{:.1}" font-weight="bold" font-family="sans-serif" text-anchor="middle" dominant-baseline="middle">"#,
                node.x,
                node.y,
                Color::WHITE.to_hex(),
                font_size
            );
            for (i, line) in node.label.iter().enumerate() {
                let dy = if i == 0 { first_dy } else { 1.2 };
                let _ = writeln!(
                    out,
                    r#"    <tspan x="{:.2}" dy="{:.2}em">{}</tspan>"#,
                    node.x,
                    dy,
                    escape_xml(line)
                );
            }
            out.push_str("  </text>\n");
        }
        if let Some(header) = &scene.header {
            let _ = writeln!(
                out,
                r#"  <text x="{m}" y="{m}" fill="{}" font-size="16" font-weight="bold" font-family="monospace" dominant-baseline="hanging">{}</text>"#,
                Color::TITLE.to_hex(),
                escape_xml(&header.title),
                m = HEADER_MARGIN
            );
            let _ = writeln!(
                out,
                r#"  <text x="{}" y="{m}" fill="{}" font-size="14" font-family="monospace" text-anchor="end" dominant-baseline="hanging">{}</text>"#,
                scene.width as i64 - HEADER_MARGIN,
                Color::CLOCK.to_hex(),
                escape_xml(&header.timestamp),
                m = HEADER_MARGIN
            );
        }
        out.push_str("</svg>\n");
        out
    }
}

fn write_backdrop(out: &mut String, backdrop: &Backdrop) {
    let _ = writeln!(
        out,
        r#"  <g class="backdrop" stroke="{c}" fill="{c}" stroke-width="0.6" stroke-opacity="{a}" fill-opacity="{a}">"#,
        c = backdrop.color.to_hex(),
        a = backdrop.alpha
    );
    for &(a, b) in &backdrop.edges {
        if let (Some(from), Some(to)) = (backdrop.points.get(a), backdrop.points.get(b)) {
            let _ = writeln!(
                out,
                r#"    <line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}"/>"#,
                from.0, from.1, to.0, to.1
            );
        }
    }
    for (x, y) in &backdrop.points {
        let _ = writeln!(out, r#"    <circle cx="{:.1}" cy="{:.1}" r="{}"/>"#, x, y, BACKDROP_DOT_RADIUS);
    }
    out.push_str("  </g>\n");
}

impl Renderer for SvgRenderer {
    fn render(&self, scene: &Scene, path: &Path) -> Result<()> {
        ensure_parent(path)?;
        fs::write(path, Self::document(scene))
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
