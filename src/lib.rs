//! Frame-differencing change visualizer: a live capture is pixelated to a working
//! grid and every pixel that changed recently is painted red, fading out after a
//! configurable number of frames.

#[cfg(feature = "camera")]
pub mod camera;
pub mod config;
pub mod draw;
pub mod error;
pub mod gamma;
pub mod history;
pub mod params;
pub mod pattern;
pub mod types;
pub mod vision;
pub mod visualizer;

pub use error::{Error, Result};
pub use params::{ParameterProvider, Parameters};
pub use types::Frame;
pub use visualizer::{CaptureSource, ChangeVisualizer, DisplaySink, TickOutcome};
