//! Pseudo-random sources for the WFC solver.
//!
//! Every `WaveModel` owns exactly one source; nothing is shared between
//! runs. Two implementations sit behind the `WfcRng` trait:
//!
//! - `DotNetRandom`: wraps `clr_random::CLRRandom`, which reproduces the
//!   sequence of `System.Random(seed)`.
//! - `StdRandom`: wraps `rand::rngs::StdRng`.
//!
//! # Example
//!
//! ```
//! use cavern_core::rng::{DotNetRandom, WfcRng};
//!
//! let mut rng = DotNetRandom::from_seed(42);
//! let noise = rng.next_double(); // 0.0..1.0
//! let seed = rng.next_int(); // 0..i32::MAX
//! assert!((0.0..1.0).contains(&noise));
//! assert!(seed >= 0);
//! ```

use clr_random::CLRRandom;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_core::SeedableRng as RandCoreSeedableRng;
use serde::{Deserialize, Serialize};

/// Random source used by the solver.
///
/// Mirrors the subset of `System.Random` the generator needs:
/// - `Next()` -> `next_int()`
/// - `Next(maxValue)` -> `next_int_max(max)`
/// - `NextDouble()` -> `next_double()`
pub trait WfcRng {
    /// Returns a non-negative integer in [0, i32::MAX).
    fn next_int(&mut self) -> i32;

    /// Returns an integer in [0, max). Returns 0 when `max <= 0`.
    fn next_int_max(&mut self, max: i32) -> i32;

    /// Returns a double in [0.0, 1.0).
    fn next_double(&mut self) -> f64;
}

/// Which random source a generation uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RngKind {
    /// .NET `System.Random` compatible sequence.
    #[default]
    Dotnet,
    /// `rand::rngs::StdRng`.
    Std,
}

impl RngKind {
    /// Build a boxed source of this kind from a seed.
    pub fn seeded(self, seed: i32) -> Box<dyn WfcRng> {
        match self {
            RngKind::Dotnet => Box::new(DotNetRandom::from_seed(seed)),
            RngKind::Std => Box::new(StdRandom::from_seed(seed)),
        }
    }
}

/// Draw a fresh non-reproducible seed from the thread-local generator.
///
/// Used when the caller leaves the seed unset, like `new System.Random()`.
pub fn entropy_seed() -> i32 {
    rand::thread_rng().gen_range(0..i32::MAX)
}

/// `rand::rngs::StdRng` wrapper.
#[derive(Clone)]
pub struct StdRandom {
    rng: StdRng,
}

impl StdRandom {
    /// Create from an i32 seed.
    pub fn from_seed(seed: i32) -> Self {
        // Absolute value like .NET, widened to u64
        let abs_seed = if seed == i32::MIN {
            i32::MAX as u64
        } else {
            seed.unsigned_abs() as u64
        };
        Self {
            rng: StdRng::seed_from_u64(abs_seed),
        }
    }
}

impl WfcRng for StdRandom {
    fn next_int(&mut self) -> i32 {
        self.rng.gen_range(0..i32::MAX)
    }

    fn next_int_max(&mut self, max: i32) -> i32 {
        if max <= 0 {
            return 0;
        }
        self.rng.gen_range(0..max)
    }

    fn next_double(&mut self) -> f64 {
        self.rng.gen()
    }
}

/// .NET-compatible source wrapping `clr_random::CLRRandom`.
pub struct DotNetRandom {
    rng: CLRRandom,
}

impl DotNetRandom {
    /// Matches `new System.Random(seed)`.
    pub fn from_seed(seed: i32) -> Self {
        Self {
            rng: CLRRandom::from_seed(clr_random::Seed::from(seed)),
        }
    }
}

impl WfcRng for DotNetRandom {
    fn next_int(&mut self) -> i32 {
        self.rng.next_i32()
    }

    fn next_int_max(&mut self, max: i32) -> i32 {
        if max <= 0 {
            return 0;
        }
        // (int)(Sample() * maxValue)
        let sample = self.rng.next_f64();
        (sample * max as f64) as i32
    }

    fn next_double(&mut self) -> f64 {
        self.rng.next_f64()
    }
}
