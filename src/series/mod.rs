//! Simulation time series and the abbreviated-magnitude volume format

pub mod types;
pub mod volume;

pub use types::{Column, ColumnCategory, Samples, TimeSeries, COUNT_PREFIX, VOLUME_PREFIX};
pub use volume::VolumeValue;
