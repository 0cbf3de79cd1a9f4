pub mod chart;
pub mod config;
pub mod diff;
pub mod error;
pub mod results;
pub mod utils;
#[cfg(feature = "render")]
pub mod visualization;

// Re-export main types
pub use crate::chart::Chart;
pub use crate::config::Configuration;
pub use crate::diff::{frame_deltas, sequence_deltas, DeltaSeries, FrameDeltas};
pub use crate::error::{Error, Result};
pub use crate::results::{BoxSeries, Dimension, PerformanceReport, SequenceScores};
