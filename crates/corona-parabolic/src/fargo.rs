//! Frame shift for shearing or rotating backgrounds.
//!
//! With the frame shift active the stored velocity excludes the
//! background profile `w(x)` carried along X2. Viscous stresses need the
//! full velocity, so the profile is added back for the duration of the
//! viscous computation by a [`ShiftedFrame`] guard, which removes it again
//! when dropped.

use std::ops::Deref;

use corona_core::{Array3, ConfigError, Dir, VarVec, VX2};
use corona_grid::Grid;

/// Background velocity along X2 as a function of X1.
#[derive(Clone, Debug, PartialEq)]
pub enum FrameShift {
    /// Linear shear `w(x) = -q Omega x`.
    Shear {
        /// Shear parameter (3/2 for a Keplerian disc).
        q: f64,
        /// Rotation rate.
        omega: f64,
    },
    /// Tabulated profile, one value per local X1 cell including ghosts.
    Profile(Vec<f64>),
}

impl FrameShift {
    /// Sample the profile on the X1 cells of `grid`.
    ///
    /// Returns `Err(ConfigError::FrameShiftMismatch)` if a tabulated
    /// profile does not have `grid.n_tot(Dir::X1)` entries.
    pub fn sample(&self, grid: &Grid) -> Result<Vec<f64>, ConfigError> {
        let n = grid.n_tot(Dir::X1);
        match self {
            FrameShift::Shear { q, omega } => Ok((0..n)
                .map(|i| -q * omega * grid.center(Dir::X1, i))
                .collect()),
            FrameShift::Profile(values) if values.len() == n => Ok(values.clone()),
            FrameShift::Profile(values) => Err(ConfigError::FrameShiftMismatch {
                expected: n,
                got: values.len(),
            }),
        }
    }
}

/// The primitive field seen in the lab frame.
///
/// Adds the background profile to `VX2` on construction and subtracts
/// it on drop, so the shift is undone on every exit path.
pub struct ShiftedFrame<'a> {
    prim: &'a mut Array3<VarVec>,
    profile: &'a [f64],
}

impl<'a> ShiftedFrame<'a> {
    /// Shift `prim` by `profile`, indexed by local X1 cell.
    pub fn new(prim: &'a mut Array3<VarVec>, profile: &'a [f64]) -> Self {
        debug_assert_eq!(prim.shape()[2], profile.len());
        apply(prim, profile, 1.0);
        Self { prim, profile }
    }
}

impl Deref for ShiftedFrame<'_> {
    type Target = Array3<VarVec>;

    fn deref(&self) -> &Self::Target {
        self.prim
    }
}

impl Drop for ShiftedFrame<'_> {
    fn drop(&mut self) {
        apply(self.prim, self.profile, -1.0);
    }
}

fn apply(prim: &mut Array3<VarVec>, profile: &[f64], sign: f64) {
    let ni = prim.shape()[2];
    for (n, w) in prim.as_mut_slice().iter_mut().enumerate() {
        w[VX2] += sign * profile[n % ni];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corona_core::NVAR;
    use corona_grid::GridSpec;

    #[test]
    fn shear_profile_samples_centers() {
        let g = Grid::single(&GridSpec::new(2, [4, 4, 1]).with_bounds(
            [-0.5, -0.5, 0.0],
            [0.5, 0.5, 1.0],
        ))
        .unwrap();
        let p = FrameShift::Shear { q: 1.5, omega: 2.0 }.sample(&g).unwrap();
        assert_eq!(p.len(), 8);
        assert!((p[2] - 3.0 * 0.375).abs() < 1e-15);
    }

    #[test]
    fn tabulated_profile_must_fit() {
        let g = Grid::single(&GridSpec::new(1, [4, 1, 1])).unwrap();
        assert_eq!(
            FrameShift::Profile(vec![0.0; 3]).sample(&g),
            Err(ConfigError::FrameShiftMismatch {
                expected: 8,
                got: 3
            })
        );
    }

    #[test]
    fn guard_shifts_and_restores() {
        let g = Grid::single(&GridSpec::new(2, [4, 4, 1])).unwrap();
        let mut prim = Array3::from_fn(g.shape(), |_, j, i| {
            let mut w = [0.0; NVAR];
            w[VX2] = 0.1 * (i + 3 * j) as f64;
            w
        });
        let before = prim.clone();
        let profile: Vec<f64> = (0..8).map(|i| 0.7 * i as f64 - 1.3).collect();
        {
            let shifted = ShiftedFrame::new(&mut prim, &profile);
            assert!((shifted[(0, 2, 5)][VX2] - (before[(0, 2, 5)][VX2] + profile[5])).abs() < 1e-15);
        }
        for (a, b) in prim.as_slice().iter().zip(before.as_slice()) {
            assert!((a[VX2] - b[VX2]).abs() < 1e-14);
        }
    }
}
