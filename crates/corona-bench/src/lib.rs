//! Benchmark profiles for the Corona flux core.
//!
//! Provides pre-built problems on a single periodic block:
//!
//! - [`orszag_tang`]: 2-D Orszag-Tang vortex, smooth but quickly steepening
//! - [`blast`]: 3-D magnetized blast wave with a strong pressure jump
//!
//! Each [`Profile`] carries a primitive field consistent with its
//! divergence-free staggered field.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::f64::consts::PI;

use corona_core::{Array3, Dir, VarVec};
use corona_ct::{average_to_cells, Staggered};
use corona_engine::{RunConfig, StageInput};
use corona_flux::{donor_cell, FaceStates, Physics};
use corona_grid::{Grid, GridSpec};
use corona_test_utils::{fill_global, staggered_from_potential, state};

/// A benchmark problem on one block.
pub struct Profile {
    /// The block, ghosts included.
    pub grid: Grid,
    /// Physics of the problem.
    pub physics: Physics,
    /// Cell-centered primitive field.
    pub prim: Array3<VarVec>,
    /// Face-centered magnetic field.
    pub staggered: Staggered,
}

impl Profile {
    /// Run configuration for this profile with default scheme settings.
    pub fn config(&self) -> RunConfig {
        RunConfig::default().with_physics(self.physics)
    }

    /// Stage input borrowing this profile's fields.
    pub fn input(&mut self) -> StageInput<'_> {
        StageInput::new(&mut self.prim).with_staggered(&self.staggered)
    }

    /// Donor-cell states of every active direction.
    pub fn face_states(&self) -> Vec<FaceStates> {
        self.grid
            .active_dirs()
            .into_iter()
            .map(|d| {
                let mut states = FaceStates::new(&self.grid);
                donor_cell(
                    &self.prim,
                    &self.grid,
                    d,
                    Some(&self.staggered[d.index()]),
                    &mut states,
                );
                states
            })
            .collect()
    }
}

/// Orszag-Tang vortex on `n x n` cells of the unit square.
///
/// `gamma = 5/3`, `rho = 25 / (36 pi)`, `p = 5 / (12 pi)`,
/// `v = (-sin 2 pi y, sin 2 pi x)` and `A_z = B0 (cos 4 pi x / 4 pi + cos 2 pi y / 2 pi)`
/// with `B0 = 1 / sqrt(4 pi)`.
pub fn orszag_tang(n: usize) -> Profile {
    let grid = single(GridSpec::new(2, [n, n, 1]));
    let b0 = 1.0 / (4.0 * PI).sqrt();
    let staggered = staggered_from_potential(&grid, |x| {
        [
            0.0,
            0.0,
            b0 * ((4.0 * PI * x[0]).cos() / (4.0 * PI) + (2.0 * PI * x[1]).cos() / (2.0 * PI)),
        ]
    });
    let mut prim = fill_global(&grid, |x| {
        state(
            25.0 / (36.0 * PI),
            [-(2.0 * PI * x[1]).sin(), (2.0 * PI * x[0]).sin(), 0.0],
            [0.0; 3],
            5.0 / (12.0 * PI),
        )
    });
    average_to_cells(&staggered, &grid, &mut prim);
    Profile {
        grid,
        physics: Physics::mhd(5.0 / 3.0),
        prim,
        staggered,
    }
}

/// Magnetized blast wave on `n^3` cells of the unit cube.
///
/// Pressure 10 inside radius 0.1 around the center, 0.1 outside, unit
/// density at rest, uniform field `(1, 1, 0) / sqrt 2`.
pub fn blast(n: usize) -> Profile {
    let grid = single(GridSpec::new(3, [n, n, n]));
    let b = [0.5f64.sqrt(), 0.5f64.sqrt(), 0.0];
    let staggered: Staggered = std::array::from_fn(|d| Array3::new(grid.shape(), b[d]));
    let prim = fill_global(&grid, |x| {
        let r2: f64 = x.iter().map(|c| (c - 0.5).powi(2)).sum();
        let p = if r2 < 0.01 { 10.0 } else { 0.1 };
        state(1.0, [0.0; 3], b, p)
    });
    Profile {
        grid,
        physics: Physics::mhd(5.0 / 3.0),
        prim,
        staggered,
    }
}

/// Number of faces swept along `dir` in one pass over `grid`.
pub fn face_count(grid: &Grid, dir: Dir) -> usize {
    Dir::ALL
        .iter()
        .map(|&d| grid.n_int(d) + usize::from(d == dir && grid.is_active(d)))
        .product()
}

fn single(spec: GridSpec) -> Grid {
    match Grid::single(&spec) {
        Ok(grid) => grid,
        Err(e) => panic!("benchmark grid {spec:?}: {e}"),
    }
}
