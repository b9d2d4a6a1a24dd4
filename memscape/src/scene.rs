//! Scene description handed to a renderer

use crate::packer::PlacedCircle;
use crate::ranker::RankedEntry;
use rand::Rng;
use time::macros::format_description;
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuTier {
    Low,
    Medium,
    High,
}

impl CpuTier {
    pub fn from_cpu(cpu_percent: f64) -> Self {
        if cpu_percent > 50.0 {
            CpuTier::High
        } else if cpu_percent > 20.0 {
            CpuTier::Medium
        } else {
            CpuTier::Low
        }
    }

    pub fn color(self) -> Color {
        match self {
            CpuTier::High => Color::rgb(0xff, 0x00, 0x00),
            CpuTier::Medium => Color::rgb(0xff, 0xa5, 0x00),
            CpuTier::Low => Color::rgb(0x00, 0x80, 0x00),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);
    pub const TITLE: Color = Color::rgb(0x22, 0xd3, 0xee);
    pub const CLOCK: Color = Color::rgb(0x94, 0xa3, 0xb8);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rrggbb` (leading `#` optional).
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Color::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub label: Vec<String>,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub color: Color,
    pub tier: CpuTier,
}

/// Title and render time shown across the top of the wallpaper.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub title: String,
    pub timestamp: String,
}

/// Faint random network drawn beneath the circles.
#[derive(Debug, Clone, PartialEq)]
pub struct Backdrop {
    pub points: Vec<(f64, f64)>,
    pub edges: Vec<(usize, usize)>,
    pub color: Color,
    pub alpha: f64,
}

impl Backdrop {
    /// `nodes` points scattered over the canvas, each linked to one to
    /// three random others.
    pub fn random<R: Rng>(
        rng: &mut R,
        width: u32,
        height: u32,
        nodes: usize,
        color: Color,
        alpha: f64,
    ) -> Self {
        let points: Vec<(f64, f64)> = (0..nodes)
            .map(|_| (rng.gen::<f64>() * width as f64, rng.gen::<f64>() * height as f64))
            .collect();
        let mut edges = Vec::new();
        for i in 0..nodes {
            for _ in 0..rng.gen_range(1..=3) {
                edges.push((i, rng.gen_range(0..nodes)));
            }
        }
        Self {
            points,
            edges,
            color,
            alpha: alpha.clamp(0.0, 1.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub width: u32,
    pub height: u32,
    pub background: Color,
    pub header: Option<Header>,
    pub backdrop: Option<Backdrop>,
    pub nodes: Vec<SceneNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneOptions {
    pub width: u32,
    pub height: u32,
    pub background: Color,
    /// `None` leaves the header off.
    pub title: Option<String>,
}

fn label_for(entry: &RankedEntry) -> Vec<String> {
    let s = &entry.sample;
    vec![
        s.identity.clone(),
        format!("PID {}", s.representative_pid),
        format!("{} MB", s.memory_mb as u64),
        format!("{}%", s.cpu_percent as u64),
    ]
}

pub fn format_clock(at: OffsetDateTime) -> String {
    at.format(format_description!("[hour]:[minute]:[second]"))
        .unwrap_or_default()
}

/// Pairs ranked entries with their circles. Both slices are in rank order.
pub fn build_scene(
    entries: &[RankedEntry],
    circles: &[PlacedCircle],
    options: &SceneOptions,
    rendered_at: OffsetDateTime,
) -> Scene {
    let nodes = entries
        .iter()
        .zip(circles)
        .map(|(entry, circle)| {
            let tier = CpuTier::from_cpu(entry.sample.cpu_percent);
            SceneNode {
                label: label_for(entry),
                x: circle.x,
                y: circle.y,
                radius: circle.radius,
                color: tier.color(),
                tier,
            }
        })
        .collect();
    let header = options.title.as_ref().map(|title| Header {
        title: title.clone(),
        timestamp: format_clock(rendered_at),
    });
    Scene {
        width: options.width,
        height: options.height,
        background: options.background,
        header,
        backdrop: None,
        nodes,
    }
}
