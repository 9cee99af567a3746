//! Brushkit Settings Crate
//!
//! Handles painter configuration: the global machine record, per-layer
//! overrides, JSON/TOML persistence and the resolution of both into a typed
//! [`LayerConfig`] for each layer.

pub mod config;
pub mod layer;

pub use config::{GlobalSettings, InfillStrategy, LayerSettings, PainterConfig, StateHandoff};
pub use layer::{Accelerations, DipSettings, Feeds, LayerConfig, LayerConfigBuilder, ZHeights};
