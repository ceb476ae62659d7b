//! Overlapping Wave Function Collapse.
//!
//! - `PatternCatalog`: Extracts NxN patterns from example grids, with weights
//!   and directional compatibility
//! - `Wave`: Packed per-cell pattern domains and entropy bookkeeping
//! - `WaveModel`: Minimum-entropy selection, weighted collapse, propagation
//! - `generator`: Example grids in, generated tile grid out

pub mod direction;
pub mod generator;
pub mod pattern_catalog;
pub mod wave;
pub mod wave_model;

pub use direction::Direction;
pub use generator::{build_catalog, generate, generate_with_catalog, GenerateError, Generation};
pub use pattern_catalog::{CatalogError, PatternCatalog};
pub use wave::Wave;
pub use wave_model::{PatternGrid, WaveModel, WfcError, WfcState};
