use anyhow::{Context, Result};
use clap::Parser;
use lantern::{FrameCapture, Scene, Session};
use log::{debug, info};
use winit::dpi::PhysicalSize;

use crate::cli::Args;
use crate::logger::init_logger;

mod cli;
mod logger;

fn main() -> Result<()> {
    let args = Args::parse();
    init_logger(args.log_level.clone().into());

    let scene = match &args.scene {
        Some(path) => Scene::load(path)
            .with_context(|| format!("failed to load scene from {}", path.display()))?,
        None => Scene::sample(),
    };
    info!(
        "scene: {} spheres, {} materials",
        scene.spheres.len(),
        scene.materials.len()
    );

    let mut session = Session::new(scene);
    session.set_accumulate(!args.no_accumulate);

    let viewport = PhysicalSize::new(args.width, args.height);
    let mut capture = FrameCapture::new();
    let mut total = 0.0;

    for frame in 1..=args.frames {
        let elapsed = session.render(viewport, &mut capture);
        total += elapsed;
        debug!("frame {frame}: {elapsed:.3}ms");
    }

    if args.frames > 0 {
        info!(
            "rendered {} frames at {}x{}, {:.3}ms per frame",
            args.frames,
            args.width,
            args.height,
            total / args.frames as f32
        );
    }

    capture
        .save_png(&args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    info!("wrote {}", args.output.display());

    Ok(())
}
