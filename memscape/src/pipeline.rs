//! One sample -> rank -> pack -> render -> apply pass

use crate::background::BackgroundSetter;
use crate::collector::ProcessCollector;
use crate::config::Config;
use crate::packer::{Canvas, Packer, PlacedCircle};
use crate::ranker::RankedEntry;
use crate::render::Renderer;
use crate::sampler::Sampler;
use crate::scene::{build_scene, Backdrop, Color, SceneOptions};
use crate::store::PositionStore;
use anyhow::{Context, Result};
use rand::Rng;
use std::path::PathBuf;
use time::OffsetDateTime;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Nothing cleared the memory floor; no file was touched.
    Skipped,
    Rendered {
        entries: Vec<RankedEntry>,
        circles: Vec<PlacedCircle>,
        image: PathBuf,
    },
}

pub struct Pipeline<'a> {
    pub config: &'a Config,
    pub collector: &'a dyn ProcessCollector,
    pub renderer: &'a dyn Renderer,
    /// `None` renders without touching the desktop.
    pub background: Option<&'a dyn BackgroundSetter>,
}

impl<'a> Pipeline<'a> {
    pub fn run<R: Rng>(&self, mut rng: R) -> Result<RunOutcome> {
        let cfg = self.config;
        let sampler = Sampler::new(cfg.sampling.split_unnamed);
        let entries = sampler.sample_top(self.collector, cfg.sampling.min_mb, cfg.sampling.limit);
        if entries.is_empty() {
            info!("No process uses at least {} MB, nothing to render", cfg.sampling.min_mb);
            return Ok(RunOutcome::Skipped);
        }
        info!("Ranked {} processes", entries.len());

        let store_path = &cfg.paths.position_store;
        let store = PositionStore::load_or_default(store_path);
        let canvas = Canvas::new(cfg.canvas.width as f64, cfg.canvas.height as f64);
        let (circles, store) = Packer::new(&cfg.layout, &mut rng).place(&entries, store, canvas);
        if let Err(e) = store.save(store_path) {
            warn!("Failed to save positions to {:?}: {}", store_path, e);
        }

        let background = Color::from_hex(&cfg.canvas.background).unwrap_or_else(|| {
            warn!("Invalid canvas background {:?}, using black", cfg.canvas.background);
            Color::BLACK
        });
        let options = SceneOptions {
            width: cfg.canvas.width,
            height: cfg.canvas.height,
            background,
            title: cfg.decor.show_header.then(|| cfg.decor.title.clone()),
        };
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        let mut scene = build_scene(&entries, &circles, &options, now);
        if cfg.decor.backdrop_nodes > 0 {
            let color = Color::from_hex(&cfg.decor.backdrop_color).unwrap_or_else(|| {
                warn!("Invalid backdrop color {:?}, using the title color", cfg.decor.backdrop_color);
                Color::TITLE
            });
            scene.backdrop = Some(Backdrop::random(
                &mut rng,
                cfg.canvas.width,
                cfg.canvas.height,
                cfg.decor.backdrop_nodes,
                color,
                cfg.decor.backdrop_alpha,
            ));
        }
        let image = cfg.paths.output_image.clone();
        self.renderer
            .render(&scene, &image)
            .with_context(|| format!("rendering {}", image.display()))?;
        info!("Rendered {:?}", image);

        if let Some(setter) = self.background {
            setter.apply(&image);
        }

        Ok(RunOutcome::Rendered {
            entries,
            circles,
            image,
        })
    }
}
