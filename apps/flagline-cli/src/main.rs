use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use flagline_common::SceneConfig;
use flagline_render::{DebugTextRenderer, RenderView, Renderer};
use flagline_scene::FlagScene;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "flagline-cli", about = "Headless tool for the flag displacement field")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene configuration file (YAML); defaults to the built-in scene
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and scene summary
    Info,
    /// Sample one flag's displacement at a point in time
    Sample {
        /// Elapsed time in seconds
        #[arg(short, long, default_value = "0.0")]
        time: f32,
        /// Flag index on the line
        #[arg(short, long, default_value = "0")]
        flag: usize,
    },
    /// Run deformation frames and check the core invariants
    Validate {
        /// Number of frames to simulate at 60 fps
        #[arg(short, long, default_value = "300")]
        frames: u32,
    },
    /// Render the deformed scene as text
    Render {
        /// Elapsed time in seconds
        #[arg(short, long, default_value = "1.0")]
        time: f32,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = match &cli.config {
        Some(path) => SceneConfig::load(path)?,
        None => SceneConfig::default(),
    };
    let mut scene = FlagScene::new(config)?;

    match cli.command {
        Commands::Info => {
            println!("flagline-cli v{}", env!("CARGO_PKG_VERSION"));
            let config = scene.config();
            println!(
                "flags: {} ({} x {} world units, {} x {} segments)",
                config.flag_count,
                config.flag.width,
                config.flag.height,
                config.flag.cols,
                config.flag.rows
            );
            println!("vertices per flag: {}", config.flag.vertex_count());
            println!("rope vertices: {}", scene.rope().positions().len());
            println!("max depth: {:.4}", config.wind.max_depth());
        }
        Commands::Sample { time, flag } => {
            if flag >= scene.flags().len() {
                bail!(
                    "flag index {flag} out of range (scene has {} flags)",
                    scene.flags().len()
                );
            }
            scene.advance(time);

            let f = &scene.flags()[flag];
            let grid = f.grid();
            let dims = *grid.dims();
            let center =
                (dims.rows as usize / 2) * (dims.cols as usize + 1) + dims.cols as usize / 2;
            let p = grid.positions()[center];

            let (mut z_min, mut z_max) = (f32::INFINITY, f32::NEG_INFINITY);
            for v in grid.positions() {
                z_min = z_min.min(v.z);
                z_max = z_max.max(v.z);
            }

            println!("flag {flag} at t={time:.2}s (phase {:.2}):", f.phase());
            println!("  center vertex: ({:+.4}, {:+.4}, {:+.4})", p.x, p.y, p.z);
            println!("  depth range: [{z_min:+.4}, {z_max:+.4}]");
        }
        Commands::Validate { frames } => {
            println!("Validating {frames} frames at 60 fps");

            let rest: Vec<Vec<f32>> = scene
                .flags()
                .iter()
                .map(|f| f.grid().rest_y().to_vec())
                .collect();
            let bound = scene.config().wind.max_depth();

            let mut violations = 0u32;
            for frame in 0..frames {
                scene.advance(frame as f32 / 60.0);
                for (i, flag) in scene.flags().iter().enumerate() {
                    if flag.grid().rest_y() != &rest[i][..] {
                        println!("VIOLATION: flag {i} rest pose mutated at frame {frame}");
                        violations += 1;
                    }
                    for p in flag.grid().positions() {
                        if p.z.abs() > bound + 1e-5 {
                            println!(
                                "VIOLATION: flag {i} depth {:.4} beyond bound {bound:.4}",
                                p.z
                            );
                            violations += 1;
                        }
                    }
                }
            }

            // Deformation must be stateless: replaying one time point on a
            // fresh scene reproduces the buffers exactly.
            let t = (frames.max(1) - 1) as f32 / 60.0;
            let mut fresh = FlagScene::new(scene.config().clone())?;
            fresh.advance(t);
            scene.advance(t);
            let stateless = scene
                .flags()
                .iter()
                .zip(fresh.flags())
                .all(|(a, b)| a.grid().positions() == b.grid().positions());

            println!("rest pose: {}", if violations == 0 { "OK" } else { "VIOLATED" });
            println!("replay: {}", if stateless { "OK" } else { "MISMATCH" });
            if violations > 0 || !stateless {
                bail!("{violations} invariant violations");
            }
        }
        Commands::Render { time } => {
            scene.advance(time);
            let view = RenderView::from(*scene.camera());
            print!("{}", DebugTextRenderer::new().render(&scene, &view));
        }
    }

    Ok(())
}
