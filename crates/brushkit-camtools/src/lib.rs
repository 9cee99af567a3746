//! # Brushkit CAM Tools
//!
//! This crate turns raster artwork into a brush-painting motion program.
//!
//! ## Pipeline
//!
//! - **Rasterizer**: binarizes an image into an ink [`Mask`] at working resolution
//! - **Infill Extractor**: covers the ink with strokes (parallel lines or concentric shells)
//! - **Path Sequencer**: orders strokes to cut down non-painting travel
//! - **Motion Synthesizer**: emits moves, dipping the brush whenever its paint runs out
//! - **Layer Compositor**: runs the pipeline once per color layer and frames the program

pub mod compositor;
pub mod infill;
pub mod mask;
pub mod rasterizer;
pub mod sequencer;
pub mod synthesizer;

pub use compositor::{
    paint_layer, CompositeOutput, FileImageSource, LayerCompositor, LayerImageSource, LayerOutput,
    MemoryImageSource,
};
pub use infill::{InfillExtractor, ShellStats};
pub use mask::Mask;
pub use rasterizer::Rasterizer;
pub use sequencer::{travel_distance, PathSequencer};
pub use synthesizer::{
    LayerSummary, MachineState, MotionSynthesizer, ReplenishmentRecord, SynthesisPhase,
};
