//! Map query engine
//!
//! Filters a loaded set of ancient-DNA sample records, computes cascading
//! filter options and date statistics, and assigns display colors.
//!
//! Structure:
//! - `record.rs`: Sample records and absent-value normalization
//! - `request.rs`: Filter request (wire shape) and coloring mode
//! - `filters.rs`: Per-dimension constraints and filter composition
//! - `statistics.rs`: Available values, date statistics, legends
//! - `colors.rs` / `palettes.rs`: Ramp registry and color mapping
//! - `color_processor.rs`: Per-feature display colors
//! - `scale.rs`: Three-segment range-slider scale
//! - `dataset.rs`: GeoJSON loading and feature serialization
//! - `properties.rs`: Settings property reader
//! - `context.rs`: Injected dataset + configuration
//! - `error.rs`: Error types

pub mod error;

pub mod color_processor;
pub mod colors;
pub mod context;
pub mod dataset;
pub mod filters;
pub mod palettes;
pub mod properties;
pub mod record;
pub mod request;
pub mod scale;
pub mod statistics;

// Re-exports for convenience
pub use context::{DatasetContext, MapContext};
pub use error::{MapError, Result};
pub use record::{Category, Position, Record};
pub use request::{CategoryFilter, ColorBy, FilterRequest};
pub use scale::{PiecewiseScale, SliderConfig};
pub use statistics::{DateRange, DateStatistics, LegendEntry};
