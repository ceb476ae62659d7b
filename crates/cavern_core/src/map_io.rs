//! CSV map loading and export.
//!
//! Maps are plain text: one row per line, tile IDs separated by commas,
//! row `y = 0` first. Blank lines are ignored and tokens may carry
//! surrounding whitespace.
//!
//! ```text
//! 1,1,1,1
//! 1,0,2,1
//! 1,1,1,1
//! ```

use crate::labeler::difficulty;
use crate::tile_grid::{TileGrid, TileId};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur during map I/O.
#[derive(Debug, Error)]
pub enum MapIoError {
    #[error("{path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    /// Token that is not a non-negative integer
    #[error("line {line}, column {column}: invalid tile id {token:?}")]
    Parse {
        line: usize,
        column: usize,
        token: String,
    },
    #[error("line {line} has {found} tiles, expected {expected}")]
    Ragged {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("map has no rows")]
    Empty,
    #[error("map directory not found: {0}")]
    MissingDir(String),
    #[error("invalid map glob: {0}")]
    Glob(#[from] glob::PatternError),
}

pub type MapIoResult<T> = Result<T, MapIoError>;

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> MapIoError + '_ {
    move |source| MapIoError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Parse CSV text into a grid.
pub fn parse_csv_map(text: &str) -> MapIoResult<TileGrid> {
    let mut rows: Vec<Vec<TileId>> = Vec::new();
    let mut width = 0;

    for (i, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        let row = line
            .split(',')
            .enumerate()
            .map(|(column, token)| {
                let token = token.trim();
                token.parse::<TileId>().map_err(|_| MapIoError::Parse {
                    line: i + 1,
                    column: column + 1,
                    token: token.to_string(),
                })
            })
            .collect::<MapIoResult<Vec<TileId>>>()?;

        if rows.is_empty() {
            width = row.len();
        } else if row.len() != width {
            return Err(MapIoError::Ragged {
                line: i + 1,
                expected: width,
                found: row.len(),
            });
        }
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(MapIoError::Empty);
    }

    let height = rows.len();
    let tiles = rows.into_iter().flatten().collect();
    // Row lengths were checked above
    TileGrid::from_vec(width, height, tiles).map_err(|_| MapIoError::Empty)
}

/// Load a single CSV map.
pub fn load_csv_map(path: &Path) -> MapIoResult<TileGrid> {
    let text = fs::read_to_string(path).map_err(io_error(path))?;
    parse_csv_map(&text)
}

/// Load every `*.csv` map directly inside `dir`, in path order.
///
/// Files that fail to load are logged and skipped.
pub fn load_all_maps(dir: &Path) -> MapIoResult<Vec<TileGrid>> {
    if !dir.is_dir() {
        return Err(MapIoError::MissingDir(dir.display().to_string()));
    }

    let pattern = format!(
        "{}/*.csv",
        glob::Pattern::escape(&dir.to_string_lossy())
    );
    let mut paths: Vec<PathBuf> = glob::glob(&pattern)?
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(error = %e, "unreadable map entry");
                None
            }
        })
        .filter(|path| path.is_file())
        .collect();
    paths.sort();

    let mut maps = Vec::with_capacity(paths.len());
    for path in &paths {
        match load_csv_map(path) {
            Ok(map) => {
                debug!(path = %path.display(), width = map.width(), height = map.height(), "loaded map");
                maps.push(map);
            }
            Err(e) => warn!(path = %path.display(), error = %e, "skipping map"),
        }
    }

    info!(dir = %dir.display(), loaded = maps.len(), found = paths.len(), "maps loaded");
    Ok(maps)
}

/// Render a grid as CSV lines.
pub fn grid_to_csv(grid: &TileGrid) -> String {
    let mut out = String::new();
    for row in grid.rows() {
        let line: Vec<String> = row.iter().map(|t| t.to_string()).collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }
    out
}

fn write_text(path: &Path, text: &str) -> MapIoResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(io_error(parent))?;
        }
    }
    fs::write(path, text).map_err(io_error(path))
}

/// Write a grid as CSV, creating parent directories.
pub fn save_grid_csv(grid: &TileGrid, path: &Path) -> MapIoResult<()> {
    write_text(path, &grid_to_csv(grid))?;
    info!(path = %path.display(), "grid saved");
    Ok(())
}

/// Write a grid as CSV preceded by its difficulty label line.
pub fn save_labeled(grid: &TileGrid, path: &Path) -> MapIoResult<()> {
    let label = difficulty(grid);
    let text = format!("{}\n{}", label.label(), grid_to_csv(grid));
    write_text(path, &text)?;
    info!(path = %path.display(), difficulty = ?label, "labeled grid saved");
    Ok(())
}
