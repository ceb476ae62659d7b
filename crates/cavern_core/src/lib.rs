//! Core library for the cavern map generator.
//!
//! This crate provides:
//! - Tile grids and CSV map loading/export
//! - Overlapping Wave Function Collapse (pattern catalog + wave model)
//! - .NET-compatible and std random sources
//! - Difficulty labeling of generated maps
//! - PNG previews
//! - JSON pipeline configuration
//!
//! ## Example
//!
//! ```ignore
//! use cavern_core::{generate, parse_csv_map, GeneratorConfig};
//!
//! let input = parse_csv_map("0,1\n1,0\n").unwrap();
//! let config = GeneratorConfig { pattern_size: 2, ..Default::default() };
//! let result = generate(&[input], &config).unwrap();
//! println!("{}x{}", result.tiles.width(), result.tiles.height());
//! ```

pub mod config;
pub mod labeler;
pub mod map_io;
pub mod render;
pub mod rng;
pub mod tile_grid;
pub mod wfc;

pub use config::{ConfigError, GeneratorConfig, InputConfig, OutputConfig, PipelineConfig};
pub use labeler::{difficulty, Difficulty};
pub use map_io::{
    load_all_maps, load_csv_map, parse_csv_map, save_grid_csv, save_labeled, MapIoError,
};
pub use render::{render_tiles, render_to_png, save_png, TilePalette};
pub use rng::{DotNetRandom, RngKind, StdRandom, WfcRng};
pub use tile_grid::{GridError, TileGrid, TileId};
pub use wfc::{
    build_catalog, generate, generate_with_catalog, CatalogError, Direction, GenerateError,
    Generation, PatternCatalog, PatternGrid, WaveModel, WfcError, WfcState,
};
