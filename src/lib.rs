//! # Brushkit
//!
//! Turns raster artwork into a motion program for a brush-dipping painting
//! machine. Each color layer is:
//! - thresholded into an ink mask
//! - covered with brush strokes (parallel lines or concentric shells)
//! - ordered to keep travel short
//! - painted with periodic trips to the layer's paint station
//!
//! ## Architecture
//!
//! Brushkit is organized as a workspace with multiple crates:
//!
//! 1. **brushkit-core** - Geometry, instructions, error types
//! 2. **brushkit-settings** - Painter configuration and persistence
//! 3. **brushkit-camtools** - Rasterizer, infill, sequencing, motion synthesis
//! 4. **brushkit** - Command line binary that integrates all crates

use anyhow::Context;
use std::io::Write;
use std::path::Path;

pub use brushkit_camtools as camtools;
pub use brushkit_settings as settings;

pub use brushkit_core::{
    ConfigError, Error, GeometryDegenerate, ImageLoadError, Instruction, InstructionStream, Move,
    PathSet, Point, Result, StreamStats,
};

pub use brushkit_settings::{
    GlobalSettings, InfillStrategy, LayerSettings, PainterConfig, StateHandoff,
};

pub use brushkit_camtools::{
    CompositeOutput, FileImageSource, LayerCompositor, LayerImageSource, LayerSummary,
    MemoryImageSource,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Output on stderr, leaving stdout for the program text
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(())
}

/// Compose the program for `config`, reading layer artwork from disk
pub fn generate(config: &PainterConfig) -> anyhow::Result<CompositeOutput> {
    let output = LayerCompositor::new(config)
        .compose(&FileImageSource)
        .context("Failed to generate paint program")?;
    Ok(output)
}

/// Write the rendered program to `path`, or to stdout when `None`
pub fn write_program(stream: &InstructionStream, path: Option<&Path>) -> anyhow::Result<()> {
    let text = stream.render();
    match path {
        Some(path) => std::fs::write(path, text)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(text.as_bytes())
                .context("Failed to write program to stdout")?;
            stdout.flush()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GrayImage, Luma};

    fn write_config(dir: &Path) -> std::path::PathBuf {
        let art = GrayImage::from_fn(40, 20, |x, _| Luma([if x < 20 { 0 } else { 255 }]));
        DynamicImage::ImageLuma8(art)
            .save(dir.join("left_half.png"))
            .unwrap();

        let mut config = PainterConfig::default();
        config.global.target_width = 80.0;
        config.global.seed = Some(5);
        config.layers = vec![LayerSettings::new("Ink", 66.0, 862.0).with_image("left_half.png")];

        let path = dir.join("painter.toml");
        config.save_to_file(&path).unwrap();
        path
    }

    #[test]
    fn test_generate_from_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = PainterConfig::load_from_file(&write_config(dir.path())).unwrap();

        let output = generate(&config).unwrap();
        assert_eq!(output.layers.len(), 1);
        assert!(output.layers[0].paint_distance > 0.0);

        // strokes stay on the inked half of the canvas: x in [263, 303]
        for instruction in output.stream.iter() {
            if let Instruction::Linear(m) = instruction {
                if m.feed.is_none() {
                    if let Some(x) = m.x {
                        assert!((263.0..=303.0).contains(&x), "stroke at x={x}");
                    }
                }
            }
        }

        let out_path = dir.path().join("out.gcode");
        write_program(&output.stream, Some(&out_path)).unwrap();
        let text = std::fs::read_to_string(&out_path).unwrap();
        assert!(text.starts_with("G90\nG21\n"));
        assert!(text.contains("; LAYER 1: Ink\n"));
        assert!(text.ends_with("M2\n"));
    }

    #[test]
    fn test_generate_reports_missing_art() {
        let mut config = PainterConfig::default();
        config.layers[0].image = Some("/nonexistent/brushkit/art.png".into());

        let err = generate(&config).unwrap_err();
        let root = err.root_cause().to_string();
        assert!(root.contains("Failed to load image for layer 1"), "{root}");
    }
}
