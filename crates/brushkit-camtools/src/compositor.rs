//! Multi-layer program assembly
//!
//! Each enabled layer with artwork runs the full pipeline (rasterize, infill,
//! sequence, synthesize) and the resulting streams are concatenated in
//! configured order between a common header and trailer.
//!
//! Every layer gets its own random source seeded from the run seed plus the
//! layer index, so a layer's output does not depend on the layers before it.

use crate::infill::InfillExtractor;
use crate::rasterizer::Rasterizer;
use crate::sequencer::PathSequencer;
use crate::synthesizer::{LayerSummary, MachineState, MotionSynthesizer};
use brushkit_core::{
    GeometryDegenerate, ImageLoadError, Instruction, InstructionStream, Move, Result, LAYER_RULE,
};
use brushkit_settings::{
    LayerConfig, LayerConfigBuilder, LayerSettings, PainterConfig, StateHandoff,
};
use image::DynamicImage;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

/// Title comment written after the program header
pub const PROGRAM_TITLE: &str = "BRUSHKIT MULTI-COLOR PAINT PROGRAM";

/// Supplies layer artwork
pub trait LayerImageSource {
    /// Artwork for the layer at `index`, or `None` when it has none
    fn load(
        &self,
        index: usize,
        layer: &LayerSettings,
    ) -> std::result::Result<Option<DynamicImage>, ImageLoadError>;
}

/// Reads each layer's `image` path from disk
#[derive(Debug, Clone, Copy, Default)]
pub struct FileImageSource;

impl LayerImageSource for FileImageSource {
    fn load(
        &self,
        index: usize,
        layer: &LayerSettings,
    ) -> std::result::Result<Option<DynamicImage>, ImageLoadError> {
        match &layer.image {
            Some(path) => Rasterizer::load_image(path, &layer.label(index)).map(Some),
            None => Ok(None),
        }
    }
}

/// Artwork held in memory, keyed by layer index
#[derive(Debug, Clone, Default)]
pub struct MemoryImageSource {
    images: HashMap<usize, DynamicImage>,
}

impl MemoryImageSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, index: usize, image: DynamicImage) {
        self.images.insert(index, image);
    }

    pub fn with_image(mut self, index: usize, image: DynamicImage) -> Self {
        self.insert(index, image);
        self
    }
}

impl LayerImageSource for MemoryImageSource {
    fn load(
        &self,
        index: usize,
        _layer: &LayerSettings,
    ) -> std::result::Result<Option<DynamicImage>, ImageLoadError> {
        Ok(self.images.get(&index).cloned())
    }
}

/// Instructions and report for a single layer
#[derive(Debug, Clone)]
pub struct LayerOutput {
    pub stream: InstructionStream,
    pub summary: LayerSummary,
}

/// Run the pipeline for one layer.
///
/// Layers share nothing but `state`, so independent layers may be processed
/// concurrently as long as each gets its own state.
pub fn paint_layer<R: Rng>(
    config: &LayerConfig,
    image: &DynamicImage,
    state: &mut MachineState<R>,
) -> LayerOutput {
    let mut stream = InstructionStream::new();
    let mask = Rasterizer::from_layer(config).rasterize(image);
    tracing::debug!(
        "{}: mask {}x{}, {:.1}% ink",
        config.label(),
        mask.width(),
        mask.height(),
        mask.coverage_percent()
    );

    if !mask.has_ink() {
        tracing::warn!("{}: no ink after thresholding", config.label());
        let mut summary = LayerSummary::new(config.label());
        summary.note(GeometryDegenerate::EmptyMask);
        return LayerOutput { stream, summary };
    }

    let (paths, shells) = InfillExtractor::from_layer(config).extract(&mask);
    let ordered = PathSequencer::from_layer(config).sequence(paths, config.station);

    let mut summary = MotionSynthesizer::new(config).synthesize(ordered, state, &mut stream);
    summary.coverage_percent = mask.coverage_percent();
    summary.shells = shells;
    LayerOutput { stream, summary }
}

/// The assembled program and per-layer reports
#[derive(Debug, Clone)]
pub struct CompositeOutput {
    pub stream: InstructionStream,
    pub layers: Vec<LayerSummary>,
    /// Seed the per-layer random sources were derived from
    pub seed: u64,
}

/// Builds the full multi-layer program
#[derive(Debug, Clone, Copy)]
pub struct LayerCompositor<'a> {
    config: &'a PainterConfig,
}

impl<'a> LayerCompositor<'a> {
    pub fn new(config: &'a PainterConfig) -> Self {
        Self { config }
    }

    /// Compose the program.
    ///
    /// Configuration is validated and all artwork is loaded before any layer
    /// is processed; a failure in either aborts with no output. Disabled
    /// layers and layers without artwork are skipped.
    pub fn compose(&self, source: &dyn LayerImageSource) -> Result<CompositeOutput> {
        let global = &self.config.global;
        self.config.validate()?;

        let mut jobs = Vec::new();
        for (index, layer) in self.config.enabled_layers() {
            let layer_config = LayerConfigBuilder::new(global).layer(index, layer).build()?;
            match source.load(index, layer)? {
                Some(image) => jobs.push((layer_config, image)),
                None => tracing::info!("{}: no image, skipping", layer_config.label()),
            }
        }

        let seed = global.seed.unwrap_or_else(|| rand::thread_rng().gen());
        tracing::info!("Compositing {} layers (seed {})", jobs.len(), seed);

        let mut stream = InstructionStream::new();
        stream.push(Instruction::AbsolutePositioning);
        stream.push(Instruction::Millimeters);
        stream.comment(format!("=== {} ===", PROGRAM_TITLE));
        stream.comment(format!("Layers: {}", jobs.len()));

        let mut layers = Vec::with_capacity(jobs.len());
        let mut carried: Option<MachineState<StdRng>> = None;

        for (layer_config, image) in &jobs {
            stream.blank();
            stream.comment(LAYER_RULE);
            stream.comment(format!(
                "LAYER {}: {}",
                layer_config.index + 1,
                layer_config.name
            ));
            stream.comment(LAYER_RULE);

            let rng = StdRng::seed_from_u64(seed.wrapping_add(layer_config.index as u64));
            let mut state = match (layer_config.state_handoff, carried.take()) {
                (StateHandoff::Carry, Some(previous)) => previous.with_rng(rng),
                _ => MachineState::new(layer_config.station, &layer_config.dip, rng),
            };

            let output = paint_layer(layer_config, image, &mut state);
            tracing::info!(
                "{}: {} strokes, {:.0} mm painted, {} replenishments",
                output.summary.label,
                output.summary.path_count,
                output.summary.paint_distance,
                output.summary.replenishment_count()
            );

            stream.append(output.stream);
            layers.push(output.summary);
            carried = Some(state);
        }

        stream.blank();
        stream.push(Instruction::FinishMoves);
        stream.push(Instruction::Rapid(Move::z(global.z_high).with_feed(global.z_feed)));
        stream.push(Instruction::ProgramEnd);

        Ok(CompositeOutput {
            stream,
            layers,
            seed,
        })
    }
}
