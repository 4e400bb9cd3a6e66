//! Prescribed sound speed of an isothermal run.

use std::fmt;
use std::sync::Arc;

use rayon::prelude::*;

use corona_core::{Array3, ConfigError, Dir, VarVec, PRS, RHO};
use corona_grid::Grid;

/// User profile `position -> c_s`.
pub type SoundSpeedFn = Arc<dyn Fn([f64; 3]) -> f64 + Send + Sync>;

/// Isothermal sound speed.
#[derive(Clone)]
pub enum SoundSpeed {
    /// The same value everywhere.
    Constant(f64),
    /// Evaluated at each cell center, ghosts included.
    Function(SoundSpeedFn),
}

impl SoundSpeed {
    /// Sound speed at `x`.
    #[inline]
    pub fn at(&self, x: [f64; 3]) -> f64 {
        match self {
            SoundSpeed::Constant(c) => *c,
            SoundSpeed::Function(f) => f(x),
        }
    }

    /// Reject a non-positive or non-finite constant. Profiles are trusted.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            SoundSpeed::Constant(c) if !c.is_finite() || *c <= 0.0 => {
                Err(ConfigError::InvalidCoefficient {
                    term: "isothermal sound speed",
                    value: *c,
                })
            }
            _ => Ok(()),
        }
    }

    /// Overwrite the pressure slot of every cell with `rho * c_s^2`.
    pub fn fill_pressure(&self, grid: &Grid, prim: &mut Array3<VarVec>) {
        let [_, nj, ni] = grid.shape();
        prim.as_mut_slice()
            .par_chunks_mut(ni)
            .enumerate()
            .for_each(|(row, line)| {
                let (k, j) = (row / nj, row % nj);
                let (y, z) = (grid.center(Dir::X2, j), grid.center(Dir::X3, k));
                for (i, w) in line.iter_mut().enumerate() {
                    let cs = self.at([grid.center(Dir::X1, i), y, z]);
                    w[PRS] = w[RHO] * cs * cs;
                }
            });
    }
}

impl fmt::Debug for SoundSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SoundSpeed::Constant(c) => f.debug_tuple("Constant").field(c).finish(),
            SoundSpeed::Function(_) => f.write_str("Function(..)"),
        }
    }
}

impl From<f64> for SoundSpeed {
    fn from(c: f64) -> Self {
        SoundSpeed::Constant(c)
    }
}
