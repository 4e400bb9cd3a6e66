//! Cell-centered source terms: gravity from a potential and a user term.

use std::fmt;
use std::sync::Arc;

use rayon::prelude::*;

use corona_core::{Array3, Dir, VarVec, ENG, NVAR, RHO, VX1};
use corona_flux::Physics;
use corona_grid::Grid;

/// Gravitational potential `position -> phi`.
pub type PotentialFn = Arc<dyn Fn([f64; 3]) -> f64 + Send + Sync>;

/// User source term `(position, primitive state, dt) -> increment of the
/// conserved state`.
pub type UserSourceFn = Arc<dyn Fn([f64; 3], &VarVec, f64) -> VarVec + Send + Sync>;

// ── Configuration ───────────────────────────────────────────────────

/// Source terms requested by a run. Default: none.
#[derive(Clone, Default)]
pub struct SourceTerms {
    /// Gravitational potential.
    pub potential: Option<PotentialFn>,
    /// User source term.
    pub user: Option<UserSourceFn>,
}

impl SourceTerms {
    /// Add gravity from `potential`.
    pub fn with_potential(mut self, potential: PotentialFn) -> Self {
        self.potential = Some(potential);
        self
    }

    /// Add a user source term.
    pub fn with_user(mut self, user: UserSourceFn) -> Self {
        self.user = Some(user);
        self
    }

    /// Names of the requested terms, for logging.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.potential.is_some() {
            names.push("gravity");
        }
        if self.user.is_some() {
            names.push("user");
        }
        names
    }
}

impl fmt::Debug for SourceTerms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

// ── Per-block sources ───────────────────────────────────────────────

/// Source terms of one block, with the gravitational acceleration
/// evaluated once at construction.
pub struct Sources {
    /// `-grad phi` at each cell center, zero along inactive axes.
    accel: Option<Array3<[f64; 3]>>,
    user: Option<UserSourceFn>,
    energy: bool,
}

impl Sources {
    /// Evaluate the acceleration of `terms` on `grid`.
    ///
    /// Each component is the potential difference across the cell faces,
    /// `-(phi(x + dx/2) - phi(x - dx/2)) / dx`.
    pub fn new(terms: SourceTerms, physics: &Physics, grid: &Grid) -> Self {
        let SourceTerms { potential, user } = terms;
        let accel = potential.map(|phi| {
            let dirs = grid.active_dirs();
            Array3::from_fn(grid.shape(), |k, j, i| {
                let idx = [i, j, k];
                let x = Dir::ALL.map(|d| grid.center(d, idx[d.index()]));
                let mut g = [0.0; 3];
                for &d in &dirs {
                    let n = d.index();
                    let (mut lo, mut hi) = (x, x);
                    lo[n] = grid.face(d, idx[n]);
                    hi[n] = grid.face(d, idx[n] + 1);
                    g[n] = -(phi(hi) - phi(lo)) / grid.dx(d);
                }
                g
            })
        });
        Self {
            accel,
            user,
            energy: !physics.isothermal,
        }
    }

    /// `true` when there is nothing to apply.
    pub fn is_empty(&self) -> bool {
        self.accel.is_none() && self.user.is_none()
    }

    /// Gravitational acceleration per cell, when gravity is on.
    pub fn acceleration(&self) -> Option<&Array3<[f64; 3]>> {
        self.accel.as_ref()
    }

    /// `u += dt * S(prim)` over the interior cells of `grid`.
    ///
    /// Gravity adds `rho * g` to the momentum and, unless the gas is
    /// isothermal, `rho * v . g` to the energy. The user term is added
    /// as returned.
    pub fn apply(&self, u: &mut Array3<VarVec>, prim: &Array3<VarVec>, grid: &Grid, dt: f64) {
        if self.is_empty() {
            return;
        }
        let [_, nj, ni] = grid.shape();
        let (ks, ke) = (grid.beg(Dir::X3), grid.end(Dir::X3));
        let (js, je) = (grid.beg(Dir::X2), grid.end(Dir::X2));
        let (is, ie) = (grid.beg(Dir::X1), grid.end(Dir::X1));

        u.as_mut_slice()
            .par_chunks_mut(ni)
            .enumerate()
            .filter(|(row, _)| (ks..ke).contains(&(row / nj)) && (js..je).contains(&(row % nj)))
            .for_each(|(row, line)| {
                let (k, j) = (row / nj, row % nj);
                for (i, cell) in line.iter_mut().enumerate().take(ie).skip(is) {
                    let w = &prim[(k, j, i)];
                    if let Some(accel) = &self.accel {
                        let g = accel[(k, j, i)];
                        let mut work = 0.0;
                        for n in 0..3 {
                            cell[VX1 + n] += dt * w[RHO] * g[n];
                            work += w[VX1 + n] * g[n];
                        }
                        if self.energy {
                            cell[ENG] += dt * w[RHO] * work;
                        }
                    }
                    if let Some(user) = &self.user {
                        let x = [
                            grid.center(Dir::X1, i),
                            grid.center(Dir::X2, j),
                            grid.center(Dir::X3, k),
                        ];
                        let du = user(x, w, dt);
                        for v in 0..NVAR {
                            cell[v] += du[v];
                        }
                    }
                }
            });
    }
}

impl fmt::Debug for Sources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sources")
            .field("gravity", &self.accel.is_some())
            .field("user", &self.user.is_some())
            .field("energy", &self.energy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corona_core::{VX2, VX3};
    use corona_grid::GridSpec;

    fn prim(grid: &Grid, rho: f64, v: [f64; 3]) -> Array3<VarVec> {
        let mut w = [0.0; NVAR];
        w[RHO] = rho;
        w[VX1..VX1 + 3].copy_from_slice(&v);
        Array3::new(grid.shape(), w)
    }

    #[test]
    fn linear_potential_gives_uniform_acceleration() {
        let grid = Grid::single(&GridSpec::new(2, [8, 8, 1])).unwrap();
        let terms = SourceTerms::default()
            .with_potential(Arc::new(|x: [f64; 3]| 0.5 * x[0] - 2.0 * x[1]));
        let sources = Sources::new(terms, &Physics::hydro(1.4), &grid);
        for g in sources.acceleration().unwrap().as_slice() {
            assert!((g[0] + 0.5).abs() < 1e-12);
            assert!((g[1] - 2.0).abs() < 1e-12);
            // X3 is inactive.
            assert_eq!(g[2], 0.0);
        }

        let (rho, v) = (2.0, [0.3, -0.1, 0.7]);
        let prim = prim(&grid, rho, v);
        let mut u = Array3::new(grid.shape(), [0.0; NVAR]);
        let dt = 0.01;
        sources.apply(&mut u, &prim, &grid, dt);

        let c = u[(0, 4, 4)];
        assert!((c[VX1] - dt * rho * -0.5).abs() < 1e-14);
        assert!((c[VX2] - dt * rho * 2.0).abs() < 1e-14);
        assert_eq!(c[VX3], 0.0);
        let work = dt * rho * (v[0] * -0.5 + v[1] * 2.0);
        assert!((c[ENG] - work).abs() < 1e-14);
        assert_eq!(c[RHO], 0.0);
        // Ghosts are untouched.
        assert_eq!(u[(0, 0, 0)], [0.0; NVAR]);
    }

    #[test]
    fn isothermal_gravity_leaves_energy_alone() {
        let grid = Grid::single(&GridSpec::new(1, [8, 1, 1])).unwrap();
        let terms = SourceTerms::default().with_potential(Arc::new(|x: [f64; 3]| x[0] * x[0]));
        let sources = Sources::new(terms, &Physics::isothermal(false), &grid);
        let prim = prim(&grid, 1.0, [1.0, 0.0, 0.0]);
        let mut u = Array3::new(grid.shape(), [0.0; NVAR]);
        sources.apply(&mut u, &prim, &grid, 0.1);
        let i = grid.beg(Dir::X1) + 2;
        // g = -2x exactly for a quadratic potential.
        let g = -2.0 * grid.center(Dir::X1, i);
        assert!((u[(0, 0, i)][VX1] - 0.1 * g).abs() < 1e-14);
        assert_eq!(u[(0, 0, i)][ENG], 0.0);
    }

    #[test]
    fn user_term_sees_position_and_state() {
        let grid = Grid::single(&GridSpec::new(1, [4, 1, 1])).unwrap();
        let terms = SourceTerms::default().with_user(Arc::new(|x: [f64; 3], w: &VarVec, dt: f64| {
            let mut du = [0.0; NVAR];
            du[RHO] = dt * x[0] * w[RHO];
            du
        }));
        assert_eq!(format!("{terms:?}"), "[\"user\"]");
        let sources = Sources::new(terms, &Physics::hydro(1.4), &grid);
        assert!(sources.acceleration().is_none());
        let prim = prim(&grid, 3.0, [0.0; 3]);
        let mut u = Array3::new(grid.shape(), [1.0; NVAR]);
        sources.apply(&mut u, &prim, &grid, 0.5);
        for i in grid.beg(Dir::X1)..grid.end(Dir::X1) {
            let expected = 1.0 + 0.5 * grid.center(Dir::X1, i) * 3.0;
            assert!((u[(0, 0, i)][RHO] - expected).abs() < 1e-15);
        }
    }

    #[test]
    fn nothing_to_apply() {
        let grid = Grid::single(&GridSpec::new(1, [4, 1, 1])).unwrap();
        let sources = Sources::new(SourceTerms::default(), &Physics::hydro(1.4), &grid);
        assert!(sources.is_empty());
        let prim = prim(&grid, 1.0, [0.0; 3]);
        let mut u = Array3::new(grid.shape(), [1.0; NVAR]);
        let before = u.clone();
        sources.apply(&mut u, &prim, &grid, 1.0);
        assert_eq!(u, before);
    }
}
