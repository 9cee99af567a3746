//! # Brushkit Core
//!
//! Core types shared by every brushkit crate.
//! Provides the physical geometry vocabulary (points, strokes, stroke sets),
//! the typed motion instruction set and its text rendering, and the error
//! types raised by the painting pipeline.

pub mod error;
pub mod geometry;
pub mod instruction;

pub use error::{ConfigError, Error, GeometryDegenerate, ImageLoadError, Result};
pub use geometry::{Path, PathSet, Point};
pub use instruction::{
    Instruction, InstructionStream, Move, StreamStats, LAYER_RULE, REPLENISHMENT_MARKER,
};
