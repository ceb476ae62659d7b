//! Generation pipeline: example grids in, generated tile grid out.
//!
//! Builds one catalog from every input, runs a fresh `WaveModel` per attempt
//! and stamps the solved pattern grid back into tiles. The solver itself
//! never retries; `GeneratorConfig::attempts` is the caller's explicit
//! budget and defaults to a single attempt.

use super::pattern_catalog::{CatalogError, PatternCatalog};
use super::wave_model::{PatternGrid, WaveModel, WfcError};
use crate::config::GeneratorConfig;
use crate::rng::{entropy_seed, WfcRng};
use crate::tile_grid::TileGrid;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    #[error("no input maps given")]
    NoInputs,
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("generation failed after {attempts} attempt(s): {last}")]
    Exhausted { attempts: usize, last: WfcError },
}

/// A successful generation.
#[derive(Debug, Clone)]
pub struct Generation {
    /// Output tiles, `(out_width + n - 1) x (out_height + n - 1)`
    pub tiles: TileGrid,
    /// Chosen pattern per output cell
    pub patterns: PatternGrid,
    pub pattern_count: usize,
    /// Seed of the attempt that succeeded
    pub seed: i32,
    /// Attempts used, including the successful one
    pub attempts: usize,
}

/// Build a catalog from the inputs using the config's pattern settings.
pub fn build_catalog(
    inputs: &[TileGrid],
    config: &GeneratorConfig,
) -> Result<PatternCatalog, GenerateError> {
    if inputs.is_empty() {
        return Err(GenerateError::NoInputs);
    }
    let mut catalog = PatternCatalog::new(config.pattern_size, config.periodic_input);
    catalog.build_from_inputs(inputs)?;
    Ok(catalog)
}

/// Generate a tile grid from example inputs.
pub fn generate(inputs: &[TileGrid], config: &GeneratorConfig) -> Result<Generation, GenerateError> {
    let catalog = build_catalog(inputs, config)?;
    info!(
        inputs = inputs.len(),
        patterns = catalog.pattern_count(),
        n = catalog.n(),
        "catalog ready"
    );
    generate_with_catalog(&catalog, config)
}

/// Run attempts against an existing catalog.
///
/// Attempt 0 uses `config.seed` (or a fresh random seed); later attempts
/// take seeds from a sequence derived from it, so seeded generations stay
/// reproducible.
pub fn generate_with_catalog(
    catalog: &PatternCatalog,
    config: &GeneratorConfig,
) -> Result<Generation, GenerateError> {
    let attempts = config.attempts.max(1);
    let base_seed = config.seed.unwrap_or_else(entropy_seed);
    let mut seeds = config.rng.seeded(base_seed);

    let mut last = WfcError::EmptyCatalog;
    for attempt in 0..attempts {
        let seed = if attempt == 0 {
            base_seed
        } else {
            seeds.next_int()
        };

        let model = WaveModel::with_rng(
            catalog,
            config.out_width,
            config.out_height,
            config.rng.seeded(seed),
        )
        .map_err(|e| GenerateError::Exhausted {
            attempts: attempt + 1,
            last: e,
        })?;

        match model.run() {
            Ok(patterns) => {
                let tiles = catalog.reconstruct_from_pattern_grid(&patterns)?;
                info!(
                    seed,
                    attempt = attempt + 1,
                    width = tiles.width(),
                    height = tiles.height(),
                    "generation complete"
                );
                return Ok(Generation {
                    tiles,
                    patterns,
                    pattern_count: catalog.pattern_count(),
                    seed,
                    attempts: attempt + 1,
                });
            }
            Err(e) => {
                debug!(seed, attempt = attempt + 1, error = %e, "attempt failed");
                last = e;
            }
        }
    }

    warn!(attempts, error = %last, "generation failed");
    Err(GenerateError::Exhausted { attempts, last })
}
