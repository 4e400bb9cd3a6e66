//! Edge EMFs from directional fluxes: the upwind contact reduction.

use rayon::prelude::*;
use smallvec::SmallVec;

use corona_comm::Communicator;
use corona_core::var::{mag, vel};
use corona_core::{Array3, ConfigError, Dir, ExchangeError, StageError, VarVec, RHO};
use corona_grid::Grid;

use crate::exchange::EmfExchange;

/// Tunables of the EMF reduction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EmfConfig {
    /// Weight of the positive-side gradient when the mass flux through a
    /// face is exactly zero. `0.5` takes the plain average of both sides.
    pub tie_weight: f64,
}

impl Default for EmfConfig {
    fn default() -> Self {
        Self { tie_weight: 0.5 }
    }
}

impl EmfConfig {
    /// Set the tie weight.
    pub fn with_tie_weight(mut self, tie_weight: f64) -> Self {
        self.tie_weight = tie_weight;
        self
    }

    /// Reject a tie weight outside `[0, 1]`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.tie_weight) {
            return Err(ConfigError::InvalidTieWeight {
                value: self.tie_weight,
            });
        }
        Ok(())
    }
}

/// Edge-centered electric field components.
///
/// `ez(k, j, i)` sits at `(x[i-1/2], y[j-1/2], z[k])`, `ex(k, j, i)` at
/// `(x[i], y[j-1/2], z[k-1/2])` and `ey(k, j, i)` at
/// `(x[i-1/2], y[j], z[k-1/2])`. In 2-D only `ez` is computed.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeEmf {
    /// Component along X1.
    pub ex: Array3<f64>,
    /// Component along X2.
    pub ey: Array3<f64>,
    /// Component along X3.
    pub ez: Array3<f64>,
}

impl EdgeEmf {
    /// Zeroed components for blocks shaped like `grid`.
    pub fn new(grid: &Grid) -> Self {
        let shape = grid.shape();
        Self {
            ex: Array3::new(shape, 0.0),
            ey: Array3::new(shape, 0.0),
            ez: Array3::new(shape, 0.0),
        }
    }

    /// The component along `dir`.
    pub fn get(&self, dir: Dir) -> &Array3<f64> {
        match dir {
            Dir::X1 => &self.ex,
            Dir::X2 => &self.ey,
            Dir::X3 => &self.ez,
        }
    }

    /// Mutable access to the component along `dir`.
    pub fn get_mut(&mut self, dir: Dir) -> &mut Array3<f64> {
        match dir {
            Dir::X1 => &mut self.ex,
            Dir::X2 => &mut self.ey,
            Dir::X3 => &mut self.ez,
        }
    }
}

/// Edge components carried by a run with `dims` active axes.
pub(crate) fn edge_components(dims: usize) -> SmallVec<[Dir; 3]> {
    match dims {
        0 | 1 => SmallVec::new(),
        2 => SmallVec::from_slice(&[Dir::X3]),
        _ => SmallVec::from_slice(&Dir::ALL),
    }
}

/// Work arrays of one edge component `c` with transverse axes `(a, b)`.
///
/// For `ez` these are `ezi`, `ezj` and the cell reference `Ez`.
#[derive(Clone, Debug)]
struct ComponentWork {
    /// `E_c` on faces normal to `a`, `-F_a[B_b]`.
    on_a: Array3<f64>,
    /// `E_c` on faces normal to `b`, `F_b[B_a]`.
    on_b: Array3<f64>,
    /// `E_c = -(v x B)_c` at cell centers.
    cell: Array3<f64>,
}

/// The constrained-transport EMF stage of one rank.
///
/// Built once per run: all work arrays are allocated and, with a
/// communicator, the rank-boundary channels are opened here and released
/// when the stage is dropped.
#[derive(Debug)]
pub struct EmfStage {
    config: EmfConfig,
    components: SmallVec<[Dir; 3]>,
    edges: EdgeEmf,
    work: [Option<ComponentWork>; 3],
    /// Sign of the mass flux per face, by face normal.
    upwind: [Array3<i8>; 3],
    exchange: Option<EmfExchange>,
}

impl EmfStage {
    /// Stage for blocks shaped like `grid`.
    ///
    /// Fails on an invalid `config`, a grid with fewer than two active
    /// axes, or a channel that cannot be opened.
    pub fn new(
        config: EmfConfig,
        grid: &Grid,
        comm: Option<&mut dyn Communicator>,
    ) -> Result<Self, StageError> {
        config.validate()?;
        if grid.dims() < 2 {
            return Err(ConfigError::Topology {
                reason: format!(
                    "constrained transport needs at least 2 active axes, grid has {}",
                    grid.dims()
                ),
            }
            .into());
        }
        let shape = grid.shape();
        let components = edge_components(grid.dims());
        let mut work: [Option<ComponentWork>; 3] = Default::default();
        for &c in &components {
            work[c.index()] = Some(ComponentWork {
                on_a: Array3::new(shape, 0.0),
                on_b: Array3::new(shape, 0.0),
                cell: Array3::new(shape, 0.0),
            });
        }
        let exchange = comm.map(|c| EmfExchange::new(c, grid)).transpose()?;
        log::info!(
            "EMF stage: {} edge component(s), tie weight {}, {} exchange channel(s)",
            components.len(),
            config.tie_weight,
            exchange.as_ref().map_or(0, EmfExchange::channel_count)
        );
        Ok(Self {
            config,
            components,
            edges: EdgeEmf::new(grid),
            work,
            upwind: [
                Array3::new(shape, 0),
                Array3::new(shape, 0),
                Array3::new(shape, 0),
            ],
            exchange,
        })
    }

    /// Configuration in use.
    pub fn config(&self) -> &EmfConfig {
        &self.config
    }

    /// Edge components this stage computes.
    pub fn components(&self) -> &[Dir] {
        &self.components
    }

    /// Edge EMFs of the last reduction.
    pub fn edges(&self) -> &EdgeEmf {
        &self.edges
    }

    /// Number of open exchange channels.
    pub fn channel_count(&self) -> usize {
        self.exchange.as_ref().map_or(0, EmfExchange::channel_count)
    }

    /// Reduce and exchange: the full per-step EMF computation.
    pub fn calc(
        &mut self,
        grid: &Grid,
        prim: &Array3<VarVec>,
        fluxes: &[Array3<VarVec>],
    ) -> Result<&EdgeEmf, ExchangeError> {
        self.reduce(grid, prim, fluxes);
        self.exchange(grid)?;
        Ok(&self.edges)
    }

    /// Compute the edge EMFs of this block from the directional fluxes
    /// (`fluxes[d]` for every active axis `d`) and the primitive field.
    ///
    /// Every edge with a cell on both sides along each transverse axis is
    /// written; the others are left untouched.
    pub fn reduce(&mut self, grid: &Grid, prim: &Array3<VarVec>, fluxes: &[Array3<VarVec>]) {
        debug_assert!(fluxes.len() >= grid.dims());

        for d in grid.active_dirs() {
            self.upwind[d.index()]
                .as_mut_slice()
                .par_iter_mut()
                .zip(fluxes[d.index()].as_slice().par_iter())
                .for_each(|(s, f)| *s = mass_sign(f[RHO]));
        }

        let tie = self.config.tie_weight;
        for &c in &self.components {
            let Some(work) = self.work[c.index()].as_mut() else {
                continue;
            };
            let (a, b) = c.transverse();
            let (fa, fb) = (&fluxes[a.index()], &fluxes[b.index()]);
            work.on_a
                .as_mut_slice()
                .par_iter_mut()
                .zip(fa.as_slice().par_iter())
                .for_each(|(e, f)| *e = -f[mag(b)]);
            work.on_b
                .as_mut_slice()
                .par_iter_mut()
                .zip(fb.as_slice().par_iter())
                .for_each(|(e, f)| *e = f[mag(a)]);
            work.cell
                .as_mut_slice()
                .par_iter_mut()
                .zip(prim.as_slice().par_iter())
                .for_each(|(e, w)| *e = w[vel(b)] * w[mag(a)] - w[vel(a)] * w[mag(b)]);

            reduce_corners(
                c,
                work,
                &self.upwind[a.index()],
                &self.upwind[b.index()],
                tie,
                self.edges.get_mut(c),
            );
        }
    }

    /// Average the edges on rank boundaries with the neighbours. A stage
    /// built without a communicator skips this.
    pub fn exchange(&mut self, grid: &Grid) -> Result<(), ExchangeError> {
        match self.exchange.as_mut() {
            Some(x) => x.run(grid, &mut self.edges),
            None => Ok(()),
        }
    }
}

#[inline]
fn mass_sign(x: f64) -> i8 {
    if x > 0.0 {
        1
    } else if x < 0.0 {
        -1
    } else {
        0
    }
}

/// Pick the upstream value for the flux sign `sv`: `pos` when the flow
/// runs toward increasing index, `neg` against it, and the `tie`-weighted
/// mix when it vanishes.
#[inline]
pub(crate) fn upwind(sv: i8, pos: f64, neg: f64, tie: f64) -> f64 {
    match sv {
        1 => pos,
        -1 => neg,
        _ => tie * pos + (1.0 - tie) * neg,
    }
}

#[inline]
fn back(p: (usize, usize, usize), o: (usize, usize, usize)) -> Option<(usize, usize, usize)> {
    Some((p.0.checked_sub(o.0)?, p.1.checked_sub(o.1)?, p.2.checked_sub(o.2)?))
}

/// Upwind contact reduction (Gardiner and Stone 2005) of component `c`.
///
/// The edge at `p` is the lower corner of cell `p` in the `(a, b)` plane.
/// `pa` and `pb` step back one cell along `a` and `b`.
///
/// The corner is the average of its four face EMFs plus four half-cell
/// gradient corrections. Each correction sits on one of the faces that
/// meet at the edge and takes its cell value from the upstream side of
/// that face alone. Along `a` these are the faces at `p` and `pb`:
///
/// - both fluxes positive: both corrections come from the `pa` column, so
///   the corner follows the upstream side;
/// - opposite signs: one correction comes from each column, so the two
///   sides carry equal weight, as in the centered average (identical to
///   it when the cell EMF does not vary along `b`);
/// - a zero flux on a face: that correction mixes both sides with
///   `tie` on the positive side.
///
/// The same holds along `b` with the faces at `p` and `pa`.
fn reduce_corners(
    c: Dir,
    work: &ComponentWork,
    sva: &Array3<i8>,
    svb: &Array3<i8>,
    tie: f64,
    out: &mut Array3<f64>,
) {
    let (a, b) = c.transverse();
    let (oa, ob) = (a.offset(), b.offset());
    let [_, nj, ni] = out.shape();
    let (ea, eb, ec) = (&work.on_a, &work.on_b, &work.cell);

    out.as_mut_slice()
        .par_chunks_mut(ni)
        .enumerate()
        .for_each(|(row, line)| {
            let (k, j) = (row / nj, row % nj);
            for (i, e) in line.iter_mut().enumerate() {
                let p = (k, j, i);
                let (Some(pa), Some(pb)) = (back(p, oa), back(p, ob)) else {
                    continue;
                };
                let Some(pab) = back(pa, ob) else {
                    continue;
                };

                let average = 0.25 * (ea[p] + ea[pb] + eb[p] + eb[pa]);
                // d/db above and below the corner, upwinded along a.
                let above = upwind(sva[p], ec[pa] - eb[pa], ec[p] - eb[p], tie);
                let below = upwind(sva[pb], eb[pa] - ec[pab], eb[p] - ec[pb], tie);
                // d/da right and left of the corner, upwinded along b.
                let right = upwind(svb[p], ec[pb] - ea[pb], ec[p] - ea[p], tie);
                let left = upwind(svb[pa], ea[pb] - ec[pab], ea[p] - ec[pa], tie);

                *e = average + 0.25 * (above - below + right - left);
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use corona_core::{BX2, NVAR, VX2};
    use corona_flux::Physics;
    use corona_grid::GridSpec;
    use corona_test_utils::{state, uniform};
    use proptest::prelude::*;

    fn analytic_fluxes(grid: &Grid, w: VarVec) -> Vec<Array3<VarVec>> {
        let phys = Physics::mhd(5.0 / 3.0);
        grid.active_dirs()
            .into_iter()
            .map(|d| Array3::new(grid.shape(), phys.physical_flux(&w, d)))
            .collect()
    }

    fn edge_range(grid: &Grid, c: Dir) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        let range = move |d: Dir| {
            let hi = if d == c {
                grid.end(d)
            } else {
                grid.end(d) + grid.face_offset(d)
            };
            grid.beg(d)..hi
        };
        let (rk, rj, ri) = (range(Dir::X3), range(Dir::X2), range(Dir::X1));
        rk.flat_map(move |k| {
            let ri = ri.clone();
            rj.clone().flat_map(move |j| ri.clone().map(move |i| (k, j, i)))
        })
    }

    #[test]
    fn config_validation() {
        assert!(EmfConfig::default().validate().is_ok());
        assert!(EmfConfig::default().with_tie_weight(1.0).validate().is_ok());
        assert_eq!(
            EmfConfig::default().with_tie_weight(-0.1).validate(),
            Err(ConfigError::InvalidTieWeight { value: -0.1 })
        );
        assert!(EmfConfig::default()
            .with_tie_weight(f64::NAN)
            .validate()
            .is_err());
    }

    #[test]
    fn one_dimensional_grid_rejected() {
        let grid = Grid::single(&GridSpec::new(1, [16, 1, 1])).unwrap();
        let err = EmfStage::new(EmfConfig::default(), &grid, None).unwrap_err();
        assert!(matches!(err, StageError::Config(ConfigError::Topology { .. })));
    }

    #[test]
    fn tie_weight_mixes_both_sides() {
        assert_eq!(upwind(1, 1.0, 3.0, 0.25), 1.0);
        assert_eq!(upwind(-1, 1.0, 3.0, 0.25), 3.0);
        assert_eq!(upwind(0, 1.0, 3.0, 0.25), 2.5);
        assert_eq!(upwind(0, 1.0, 3.0, 0.5), 2.0);
    }

    #[test]
    fn components_follow_dims() {
        let g2 = Grid::single(&GridSpec::new(2, [8, 8, 1])).unwrap();
        let s2 = EmfStage::new(EmfConfig::default(), &g2, None).unwrap();
        assert_eq!(s2.components(), &[Dir::X3]);
        assert_eq!(s2.channel_count(), 0);
        let g3 = Grid::single(&GridSpec::new(3, [4, 4, 4])).unwrap();
        let s3 = EmfStage::new(EmfConfig::default(), &g3, None).unwrap();
        assert_eq!(s3.components(), &Dir::ALL);
    }

    #[test]
    fn stationary_field_has_no_emf() {
        let grid = Grid::single(&GridSpec::new(3, [4, 4, 4])).unwrap();
        let w = state(1.0, [0.0; 3], [0.3, -0.2, 0.5], 1.0);
        let prim = uniform(&grid, w);
        let fluxes = analytic_fluxes(&grid, w);
        let mut stage = EmfStage::new(EmfConfig::default(), &grid, None).unwrap();
        let edges = stage.calc(&grid, &prim, &fluxes).unwrap();
        for c in Dir::ALL {
            assert!(edges.get(c).as_slice().iter().all(|&e| e == 0.0), "{c}");
        }
    }

    proptest! {
        #[test]
        fn uniform_flow_edges_match_cell_emf(
            v in prop::array::uniform3(-2.0f64..2.0),
            b in prop::array::uniform3(-2.0f64..2.0),
            rho in 0.1f64..5.0,
            tie in 0.0f64..=1.0,
        ) {
            let grid = Grid::single(&GridSpec::new(3, [4, 4, 4]).with_ghosts(1)).unwrap();
            let w = state(rho, v, b, 1.0);
            let prim = uniform(&grid, w);
            let fluxes = analytic_fluxes(&grid, w);
            let config = EmfConfig::default().with_tie_weight(tie);
            let mut stage = EmfStage::new(config, &grid, None).unwrap();
            stage.reduce(&grid, &prim, &fluxes);

            // E = -v x B
            let expected = [
                v[2] * b[1] - v[1] * b[2],
                v[0] * b[2] - v[2] * b[0],
                v[1] * b[0] - v[0] * b[1],
            ];
            for c in Dir::ALL {
                for p in edge_range(&grid, c) {
                    let e = stage.edges().get(c)[p];
                    prop_assert!((e - expected[c.index()]).abs() < 1e-12, "{c} at {p:?}: {e}");
                }
            }
        }
    }

    #[test]
    fn opposing_faces_weight_both_sides_equally() {
        // Cell EMF varies along x only; no face EMFs, no flow along y.
        let grid = Grid::single(&GridSpec::new(2, [4, 4, 1]).with_ghosts(1)).unwrap();
        let prim = Array3::from_fn(grid.shape(), |_, _, i| {
            let mut w = state(1.0, [0.0; 3], [1.0, 0.0, 0.0], 1.0);
            w[VX2] = (i * i) as f64;
            w
        });
        let (j0, i0) = (2, 2);
        let corner = |above: f64, below: f64| {
            let mut fx = Array3::new(grid.shape(), [0.0; NVAR]);
            fx[(0, j0, i0)][RHO] = above;
            fx[(0, j0 - 1, i0)][RHO] = below;
            let fy = Array3::new(grid.shape(), [0.0; NVAR]);
            let mut stage = EmfStage::new(EmfConfig::default(), &grid, None).unwrap();
            stage.reduce(&grid, &prim, &[fx, fy]);
            stage.edges().ez[(0, j0, i0)]
        };
        let centered = corner(0.0, 0.0);
        assert_eq!(centered, 2.5);
        assert_eq!(corner(1.0, -1.0), centered);
        assert_eq!(corner(-1.0, 1.0), centered);
        // Agreeing faces pick the upstream column.
        assert_eq!(corner(1.0, 1.0), 1.75);
        assert_eq!(corner(-1.0, -1.0), 3.25);
    }

    #[test]
    fn upwind_side_weighted_by_mass_flux() {
        // Flow along +x, none along y. One cell's reference EMF is lowered
        // by one; its two downstream corners feel three times as much of
        // it as its two upstream corners.
        let grid = Grid::single(&GridSpec::new(2, [4, 4, 1]).with_ghosts(1)).unwrap();
        let w = state(1.0, [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], 1.0);
        let mut prim = uniform(&grid, w);
        let (j0, i0) = (2, 2);
        prim[(0, j0, i0)][BX2] = 2.0;
        let fluxes = analytic_fluxes(&grid, w);
        let mut stage = EmfStage::new(EmfConfig::default(), &grid, None).unwrap();
        stage.reduce(&grid, &prim, &fluxes);

        let ez = &stage.edges().ez;
        assert_eq!(ez[(0, j0, i0)], -1.125);
        assert_eq!(ez[(0, j0 + 1, i0)], -1.125);
        assert_eq!(ez[(0, j0, i0 + 1)], -1.375);
        assert_eq!(ez[(0, j0 + 1, i0 + 1)], -1.375);
        assert_eq!(ez[(0, 1, 1)], -1.0);
        assert_eq!(ez[(0, j0, i0 + 2)], -1.0);
    }
}
