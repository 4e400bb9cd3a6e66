//! Field builders.

use std::f64::consts::PI;

use corona_core::{Array3, Dir, VarVec, BX1, NVAR, PRS, RHO, VX1, VX2, VX3};
use corona_grid::{Grid, GridSpec};
use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Primitive state from density, velocity, field and pressure.
pub fn state(rho: f64, v: [f64; 3], b: [f64; 3], p: f64) -> VarVec {
    let mut w = [0.0; NVAR];
    w[RHO] = rho;
    w[VX1..VX1 + 3].copy_from_slice(&v);
    w[BX1..BX1 + 3].copy_from_slice(&b);
    w[PRS] = p;
    w
}

/// The same state in every cell.
pub fn uniform(grid: &Grid, w: VarVec) -> Array3<VarVec> {
    Array3::new(grid.shape(), w)
}

/// `left` below `x0` along `dir`, `right` above, by cell center.
pub fn discontinuity(grid: &Grid, dir: Dir, x0: f64, left: VarVec, right: VarVec) -> Array3<VarVec> {
    Array3::from_fn(grid.shape(), |k, j, i| {
        let idx = [i, j, k][dir.index()];
        if grid.center(dir, idx) < x0 {
            left
        } else {
            right
        }
    })
}

/// Evaluate `f` at every cell center, ghosts included.
///
/// With `f` periodic over the domain, the ghost zones match the
/// periodic images of the interior.
pub fn fill_global(grid: &Grid, f: impl Fn([f64; 3]) -> VarVec) -> Array3<VarVec> {
    Array3::from_fn(grid.shape(), |k, j, i| f(position(grid, [i, j, k], [false; 3])))
}

/// Face-centered field `B = curl A` from a vector potential sampled on
/// cell edges.
///
/// Differences of the same edge samples make the discrete divergence of
/// the result vanish to rounding. Components along inactive axes are
/// cell-centered.
pub fn staggered_from_potential(grid: &Grid, a: impl Fn([f64; 3]) -> [f64; 3]) -> [Array3<f64>; 3] {
    let shape = grid.shape();
    let comp = |d: Dir| {
        let (t1, t2) = d.transverse();
        Array3::from_fn(shape, |k, j, i| {
            let idx = [i, j, k];
            // B_d = dA_t2/dt1 - dA_t1/dt2 on the lower face along d.
            let mut stagger = [false; 3];
            stagger[d.index()] = grid.is_active(d);
            derivative(grid, &a, idx, stagger, t2, t1) - derivative(grid, &a, idx, stagger, t1, t2)
        })
    };
    [comp(Dir::X1), comp(Dir::X2), comp(Dir::X3)]
}

/// `(A_c(upper face along d) - A_c(lower face along d)) / dx_d` at the
/// position of `idx` with the given staggering, zero along inactive axes.
///
/// Samples sit exactly on the face coordinates of the grid, so the edge
/// values shared by neighbouring faces are bit-identical.
fn derivative(
    grid: &Grid,
    a: &impl Fn([f64; 3]) -> [f64; 3],
    idx: [usize; 3],
    stagger: [bool; 3],
    c: Dir,
    d: Dir,
) -> f64 {
    if !grid.is_active(d) {
        return 0.0;
    }
    let n = d.index();
    let mut lo = position(grid, idx, stagger);
    let mut hi = lo;
    lo[n] = grid.face(d, idx[n]);
    hi[n] = grid.face(d, idx[n] + 1);
    (a(hi)[c.index()] - a(lo)[c.index()]) / grid.dx(d)
}

fn position(grid: &Grid, idx: [usize; 3], stagger: [bool; 3]) -> [f64; 3] {
    let mut x = [0.0; 3];
    for d in Dir::ALL {
        let n = d.index();
        x[n] = if stagger[n] {
            grid.face(d, idx[n])
        } else {
            grid.center(d, idx[n])
        };
    }
    x
}

/// Parameters of a perturbed shearing box.
#[derive(Clone, Copy, Debug)]
pub struct ShearingBox {
    /// Rotation rate.
    pub omega: f64,
    /// Shear parameter, 3/2 for a Keplerian disc.
    pub q: f64,
    /// Background pressure.
    pub pressure: f64,
    /// Vertical field strength.
    pub bz: f64,
    /// Velocity noise amplitude.
    pub amplitude: f64,
    /// Noise seed.
    pub seed: u64,
}

impl Default for ShearingBox {
    fn default() -> Self {
        Self {
            omega: 1.0,
            q: 1.5,
            pressure: 1.0,
            bz: 0.05,
            amplitude: 1e-3,
            seed: 0x5eed,
        }
    }
}

/// Shear flow `v_y = -q Omega x` with seeded velocity noise and a weak
/// vertical field, plus the shear profile itself.
///
/// The noise of each cell is drawn from a ChaCha8 stream keyed by the
/// global cell index (wrapped periodically), so every decomposition and
/// every ghost copy sees the same value.
pub fn shearing_box(spec: &GridSpec, grid: &Grid, sb: &ShearingBox) -> Array3<VarVec> {
    Array3::from_fn(grid.shape(), |k, j, i| {
        let idx = [i, j, k];
        let mut global = [0usize; 3];
        for d in Dir::ALL {
            let n = d.index();
            let g = grid.global_index(d, idx[n]);
            global[n] = g.rem_euclid(spec.cells[n] as isize) as usize;
        }
        let key = (global[2] * spec.cells[1] + global[1]) * spec.cells[0] + global[0];
        let mut rng = ChaCha8Rng::seed_from_u64(sb.seed);
        rng.set_stream(key as u64);
        let mut noise = || sb.amplitude * (2.0 * unit(&mut rng) - 1.0);

        let x = grid.center(Dir::X1, i);
        let mut w = [0.0; NVAR];
        w[RHO] = 1.0;
        w[VX1] = noise();
        w[VX2] = -sb.q * sb.omega * x + noise();
        w[VX3] = noise();
        w[BX1 + 2] = sb.bz;
        w[PRS] = sb.pressure;
        w
    })
}

/// Uniform sample in `[0, 1)` from the top 53 bits.
fn unit(rng: &mut ChaCha8Rng) -> f64 {
    (rng.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
}

/// Smooth periodic potential for divergence tests on the unit box.
pub fn wavy_potential(x: [f64; 3]) -> [f64; 3] {
    let (s, c) = ((2.0 * PI * x[0]).sin(), (2.0 * PI * x[1]).cos());
    [
        0.05 * (2.0 * PI * x[1]).sin() * (2.0 * PI * x[2]).cos(),
        0.07 * (2.0 * PI * x[2]).sin() + 0.02 * s,
        0.1 * s * c + 0.3 * x[1] - 0.2 * x[0],
    ]
}
