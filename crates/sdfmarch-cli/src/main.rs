//! sdfmarch CLI - Render CSG scenes of SDF primitives from the command line

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use sdfmarch_engine::{Background, DEFAULT_FPS, Engine, RenderSettings, SceneDocument};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sdfmarch")]
#[command(about = "Ray march CSG scenes of signed distance field primitives", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Overrides applied on top of a document's render settings
#[derive(Args, Debug, Clone, Default)]
struct RenderOverrides {
    /// Image width
    #[arg(long)]
    width: Option<u32>,

    /// Image height
    #[arg(long)]
    height: Option<u32>,

    /// Blend smooth operations; `false` renders them as hard operations
    #[arg(long, value_name = "BOOL")]
    blend: Option<bool>,

    /// Render hard shadows
    #[arg(long, value_name = "BOOL")]
    shadows: Option<bool>,

    /// Use a sky gradient instead of the solid background
    #[arg(long)]
    sky: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a scene to an image file
    Render {
        /// Scene document (JSON). Uses the demo scene if omitted
        #[arg(short, long)]
        scene: Option<PathBuf>,

        /// Output image file (.png)
        #[arg(short, long, default_value = "render.png")]
        output: PathBuf,

        #[command(flatten)]
        overrides: RenderOverrides,
    },

    /// Render a drifting animation as a numbered PNG sequence
    Animate {
        /// Scene document (JSON). Uses the demo scene if omitted
        #[arg(short, long)]
        scene: Option<PathBuf>,

        /// Output directory for Image{n}.png files
        #[arg(short, long, default_value = "frames")]
        output: PathBuf,

        /// Number of frames
        #[arg(short, long, default_value = "48")]
        frames: u64,

        /// Frames per second of scene time
        #[arg(long, default_value_t = DEFAULT_FPS)]
        fps: f32,

        #[command(flatten)]
        overrides: RenderOverrides,
    },

    /// Validate a scene document without rendering
    Check {
        /// Scene document (JSON)
        scene: PathBuf,
    },

    /// Write the demo scene document
    Demo {
        /// Output file
        #[arg(short, long, default_value = "demo.json")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            scene,
            output,
            overrides,
        } => {
            run_render(scene.as_deref(), &output, &overrides)?;
        }
        Commands::Animate {
            scene,
            output,
            frames,
            fps,
            overrides,
        } => {
            run_animate(scene.as_deref(), &output, frames, fps, &overrides)?;
        }
        Commands::Check { scene } => {
            run_check(&scene)?;
        }
        Commands::Demo { output } => {
            SceneDocument::demo().save(&output)?;
            println!("Demo scene written to: {}", output.display());
        }
    }

    Ok(())
}

fn load_engine(scene: Option<&Path>, overrides: &RenderOverrides) -> Result<Engine> {
    let mut engine = match scene {
        Some(path) => Engine::load(path)?,
        None => Engine::default(),
    };

    apply_overrides(engine.orchestrator_mut().settings_mut(), overrides);
    Ok(engine)
}

fn apply_overrides(settings: &mut RenderSettings, overrides: &RenderOverrides) {
    if let Some(width) = overrides.width {
        settings.width = width;
    }
    if let Some(height) = overrides.height {
        settings.height = height;
    }
    if let Some(blend) = overrides.blend {
        settings.blend = blend;
    }
    if let Some(shadows) = overrides.shadows {
        settings.environment.shadows = shadows;
    }
    if overrides.sky {
        settings.environment.background = Background::sky();
    }
}

fn run_render(scene: Option<&Path>, output: &Path, overrides: &RenderOverrides) -> Result<()> {
    let mut engine = load_engine(scene, overrides)?;
    let settings = engine.orchestrator().settings();
    println!(
        "Rendering to {} ({}x{})...",
        output.display(),
        settings.width,
        settings.height
    );

    let stats = engine.render_to(output)?;
    println!(
        "Saved to: {} ({} primitives, {} operations)",
        output.display(),
        stats.primitives,
        stats.operations
    );
    Ok(())
}

fn run_animate(
    scene: Option<&Path>,
    output: &Path,
    frames: u64,
    fps: f32,
    overrides: &RenderOverrides,
) -> Result<()> {
    let mut engine = load_engine(scene, overrides)?;
    println!("Rendering {} frames at {} fps into {}...", frames, fps, output.display());

    let written = engine.animate(frames, fps, output)?;
    println!("Wrote {} frames", written.len());
    Ok(())
}

fn run_check(scene: &Path) -> Result<()> {
    let engine = Engine::load(scene)?;
    let buffers = engine.check()?;
    println!(
        "OK - {} primitives, {} operations, root {:?}",
        buffers.primitives().len(),
        buffers.operations().len(),
        buffers.root()
    );
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn overrides(args: &[&str]) -> RenderOverrides {
        let mut argv = vec!["sdfmarch", "render"];
        argv.extend_from_slice(args);
        let cli = Cli::try_parse_from(argv).unwrap();
        match cli.command {
            Commands::Render { overrides, .. } => overrides,
            _ => unreachable!(),
        }
    }

    #[test]
    fn blend_can_be_switched_off() {
        let mut settings = RenderSettings::default().with_blend(true);
        apply_overrides(&mut settings, &overrides(&["--blend", "false"]));
        assert!(!settings.blend);

        apply_overrides(&mut settings, &overrides(&["--blend", "true"]));
        assert!(settings.blend);
    }

    #[test]
    fn absent_flags_keep_document_settings() {
        let mut settings = RenderSettings::default().with_blend(true);
        settings.environment.shadows = true;
        apply_overrides(&mut settings, &overrides(&["--width", "64"]));
        assert!(settings.blend);
        assert!(settings.environment.shadows);
        assert_eq!(settings.width, 64);
        assert_eq!(settings.height, RenderSettings::default().height);
    }

    #[test]
    fn shadows_follow_the_flag_value() {
        let mut settings = RenderSettings::default();
        apply_overrides(&mut settings, &overrides(&["--shadows", "true"]));
        assert!(settings.environment.shadows);
        apply_overrides(&mut settings, &overrides(&["--shadows", "false"]));
        assert!(!settings.environment.shadows);
    }
}
