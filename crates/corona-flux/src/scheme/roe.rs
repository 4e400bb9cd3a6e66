//! Roe-type linearised solver for hydrodynamics and MHD.
//!
//! The flux is `(F_L + F_R) / 2 - R |Lambda| L (U_R - U_L) / 2`, with the
//! characteristic decomposition taken at an averaged interface state.
//! Hydrodynamics uses Roe's average, for which the decomposition of the
//! jump is exact. MHD uses the seven-wave primitive eigensystem with the
//! Roe-Balsara normalisation, which stays well conditioned through the
//! magnetosonic degeneracies; the wave strengths come from a direct solve
//! of `R alpha = W_R - W_L`.

use corona_core::var::{mag, vel};
use corona_core::{Dir, VarVec, ENG, NVAR, PRS, RHO};

use super::{aligned, FaceFlux};
use crate::physics::{dot, Physics};

/// Harten entropy-fix width, as a fraction of the interface sound speed.
const ENTROPY_RATIO: f64 = 0.1;

/// Roe flux through a face normal to `dir`.
pub fn roe(left: &VarVec, right: &VarVec, dir: Dir, physics: &Physics) -> FaceFlux {
    if physics.mhd {
        roe_mhd(left, right, dir, physics)
    } else {
        roe_hydro(left, right, dir, physics)
    }
}

fn frame_slots(dir: Dir) -> [usize; 3] {
    let (t1, t2) = dir.transverse();
    [vel(dir), vel(t1), vel(t2)]
}

#[inline]
fn entropy_fix(lambda: f64, delta: f64) -> f64 {
    let a = lambda.abs();
    if a < delta {
        0.5 * (lambda * lambda + delta * delta) / delta
    } else {
        a
    }
}

fn outer_speed(l: &VarVec, r: &VarVec, dir: Dir, physics: &Physics) -> f64 {
    let n = vel(dir);
    (l[n].abs() + physics.fast_speed(l, dir)).max(r[n].abs() + physics.fast_speed(r, dir))
}

// ── Hydrodynamics ───────────────────────────────────────────────

fn roe_hydro(l: &VarVec, r: &VarVec, dir: Dir, physics: &Physics) -> FaceFlux {
    let slots = frame_slots(dir);
    let (sl, sr) = (l[RHO].sqrt(), r[RHO].sqrt());
    let (wl, wr) = (sl / (sl + sr), sr / (sl + sr));

    let vl = slots.map(|s| l[s]);
    let vr = slots.map(|s| r[s]);
    let u = [
        wl * vl[0] + wr * vr[0],
        wl * vl[1] + wr * vr[1],
        wl * vl[2] + wr * vr[2],
    ];
    let hl = (physics.total_energy(l) + l[PRS]) / l[RHO];
    let hr = (physics.total_energy(r) + r[PRS]) / r[RHO];
    let h = wl * hl + wr * hr;
    let q2 = dot(&u, &u);
    let a2 = ((physics.gamma - 1.0) * (h - 0.5 * q2)).max(f64::MIN_POSITIVE);
    let a = a2.sqrt();
    let rho = sl * sr;

    let drho = r[RHO] - l[RHO];
    let dp = r[PRS] - l[PRS];
    let dv = [vr[0] - vl[0], vr[1] - vl[1], vr[2] - vl[2]];

    let alpha = [
        (dp - rho * a * dv[0]) / (2.0 * a2),
        drho - dp / a2,
        rho * dv[1],
        rho * dv[2],
        (dp + rho * a * dv[0]) / (2.0 * a2),
    ];
    let delta = ENTROPY_RATIO * a;
    let lambda = [
        entropy_fix(u[0] - a, delta),
        u[0].abs(),
        u[0].abs(),
        u[0].abs(),
        entropy_fix(u[0] + a, delta),
    ];

    // Right eigenvectors in (rho, m_n, m_t1, m_t2, E).
    let vectors: [[f64; 5]; 5] = [
        [1.0, u[0] - a, u[1], u[2], h - u[0] * a],
        [1.0, u[0], u[1], u[2], 0.5 * q2],
        [0.0, 0.0, 1.0, 0.0, u[1]],
        [0.0, 0.0, 0.0, 1.0, u[2]],
        [1.0, u[0] + a, u[1], u[2], h + u[0] * a],
    ];
    let mut diss = [0.0; 5];
    for k in 0..5 {
        let w = lambda[k] * alpha[k];
        for (d, rk) in diss.iter_mut().zip(vectors[k]) {
            *d += w * rk;
        }
    }

    let fl = physics.physical_flux(l, dir);
    let fr = physics.physical_flux(r, dir);
    let mut flux = [0.0; NVAR];
    for v in 0..NVAR {
        flux[v] = 0.5 * (fl[v] + fr[v]);
    }
    flux[RHO] -= 0.5 * diss[0];
    for (a, &s) in slots.iter().enumerate() {
        flux[s] -= 0.5 * diss[1 + a];
    }
    flux[ENG] -= 0.5 * diss[4];

    FaceFlux {
        flux,
        max_speed: outer_speed(l, r, dir, physics).max(u[0].abs() + a),
    }
}

// ── MHD ─────────────────────────────────────────────────────────

/// Seven-wave primitive system: (rho, v_n, v_t1, v_t2, B_t1, B_t2, p).
const NWAVE: usize = 7;

type Mat7 = [[f64; NWAVE]; NWAVE];

fn roe_mhd(left: &VarVec, right: &VarVec, dir: Dir, physics: &Physics) -> FaceFlux {
    let (l, r) = aligned(left, right, dir, physics);
    let (t1, t2) = dir.transverse();
    let slots = [RHO, vel(dir), vel(t1), vel(t2), mag(t1), mag(t2), PRS];
    let bn = l[mag(dir)];

    // Interface state.
    let (sl, sr) = (l[RHO].sqrt(), r[RHO].sqrt());
    let (wl, wr) = (sl / (sl + sr), sr / (sl + sr));
    let mut w = [0.0; NWAVE];
    w[0] = sl * sr;
    for a in 1..4 {
        w[a] = wl * l[slots[a]] + wr * r[slots[a]];
    }
    for a in 4..6 {
        w[a] = wr * l[slots[a]] + wl * r[slots[a]];
    }
    w[6] = wl * l[PRS] + wr * r[PRS];

    let (rem, lambda) = eigensystem(&w, bn, physics.gamma);

    let mut dw = [0.0; NWAVE];
    for a in 0..NWAVE {
        dw[a] = r[slots[a]] - l[slots[a]];
    }
    let alpha = solve(rem, dw);

    let mut dprim = [0.0; NWAVE];
    for k in 0..NWAVE {
        let s = lambda[k].abs() * alpha[k];
        for (i, d) in dprim.iter_mut().enumerate() {
            *d += s * rem[i][k];
        }
    }

    // Primitive to conserved increments at the interface state.
    let v = [w[1], w[2], w[3]];
    let dv = [dprim[1], dprim[2], dprim[3]];
    let mut du = [0.0; NVAR];
    du[RHO] = dprim[0];
    for a in 0..3 {
        du[slots[1 + a]] = v[a] * dprim[0] + w[0] * dv[a];
    }
    du[slots[4]] = dprim[4];
    du[slots[5]] = dprim[5];
    du[ENG] = 0.5 * dot(&v, &v) * dprim[0]
        + w[0] * dot(&v, &dv)
        + w[4] * dprim[4]
        + w[5] * dprim[5]
        + dprim[6] / (physics.gamma - 1.0);

    let fl = physics.physical_flux(&l, dir);
    let fr = physics.physical_flux(&r, dir);
    let mut flux = [0.0; NVAR];
    for n in 0..NVAR {
        flux[n] = 0.5 * (fl[n] + fr[n]) - 0.5 * du[n];
    }
    flux[mag(dir)] = 0.0;

    let fast = lambda[6] - w[1];
    FaceFlux {
        flux,
        max_speed: outer_speed(&l, &r, dir, physics).max(w[1].abs() + fast),
    }
}

/// Right eigenvectors (as columns) and eigenvalues of the primitive MHD
/// system at state `w`, ordered from `v - c_f` up to `v + c_f`.
fn eigensystem(w: &[f64; NWAVE], bn: f64, gamma: f64) -> (Mat7, [f64; NWAVE]) {
    let d = w[0];
    let sqrtd = d.sqrt();
    let (by, bz) = (w[4], w[5]);
    let btsq = by * by + bz * bz;
    let vaxsq = bn * bn / d;
    let asq = gamma * w[6] / d;
    let ct2 = btsq / d;
    let tdif = vaxsq + ct2 - asq;
    let cf2_cs2 = (tdif * tdif + 4.0 * asq * ct2).sqrt();
    let cfsq = 0.5 * (vaxsq + ct2 + asq + cf2_cs2);
    let cf = cfsq.sqrt();
    let cssq = asq * vaxsq / cfsq;
    let cs = cssq.sqrt();

    let bt = btsq.sqrt();
    let (bet2, bet3) = if bt == 0.0 { (1.0, 0.0) } else { (by / bt, bz / bt) };
    let (alpha_f, alpha_s) = if cf2_cs2 == 0.0 || cfsq - asq <= 0.0 {
        (1.0, 0.0)
    } else if asq - cssq <= 0.0 {
        (0.0, 1.0)
    } else {
        (
            ((asq - cssq) / cf2_cs2).sqrt(),
            ((cfsq - asq) / cf2_cs2).sqrt(),
        )
    };

    let s = if bn < 0.0 { -1.0 } else { 1.0 };
    let a = asq.sqrt();
    let qf = cf * alpha_f * s;
    let qs = cs * alpha_s * s;
    let af = a * alpha_f * sqrtd;
    let as_ = a * alpha_s * sqrtd;
    let va = vaxsq.sqrt();
    let v1 = w[1];

    let mut rem = [[0.0; NWAVE]; NWAVE];
    // Fast, v - c_f.
    rem[0][0] = d * alpha_f;
    rem[1][0] = -cf * alpha_f;
    rem[2][0] = qs * bet2;
    rem[3][0] = qs * bet3;
    rem[4][0] = as_ * bet2;
    rem[5][0] = as_ * bet3;
    rem[6][0] = d * asq * alpha_f;
    // Alfven, v - c_a.
    rem[2][1] = -bet3;
    rem[3][1] = bet2;
    rem[4][1] = -bet3 * s * sqrtd;
    rem[5][1] = bet2 * s * sqrtd;
    // Slow, v - c_s.
    rem[0][2] = d * alpha_s;
    rem[1][2] = -cs * alpha_s;
    rem[2][2] = -qf * bet2;
    rem[3][2] = -qf * bet3;
    rem[4][2] = -af * bet2;
    rem[5][2] = -af * bet3;
    rem[6][2] = d * asq * alpha_s;
    // Entropy.
    rem[0][3] = 1.0;
    // The forward family mirrors the backward one.
    for (fwd, bwd) in [(4, 2), (5, 1), (6, 0)] {
        for i in 0..NWAVE {
            let flip = matches!(i, 1..=3);
            rem[i][fwd] = if flip { -rem[i][bwd] } else { rem[i][bwd] };
        }
    }

    let lambda = [v1 - cf, v1 - va, v1 - cs, v1, v1 + cs, v1 + va, v1 + cf];
    (rem, lambda)
}

/// Solve `m x = b` by Gaussian elimination with partial pivoting.
///
/// A vanishing pivot leaves its unknown at zero.
fn solve(mut m: Mat7, mut b: [f64; NWAVE]) -> [f64; NWAVE] {
    for col in 0..NWAVE {
        let pivot = (col..NWAVE)
            .max_by(|&x, &y| m[x][col].abs().total_cmp(&m[y][col].abs()))
            .unwrap_or(col);
        m.swap(col, pivot);
        b.swap(col, pivot);
        let p = m[col][col];
        if p.abs() < f64::MIN_POSITIVE {
            continue;
        }
        for row in col + 1..NWAVE {
            let f = m[row][col] / p;
            if f == 0.0 {
                continue;
            }
            for c in col..NWAVE {
                m[row][c] -= f * m[col][c];
            }
            b[row] -= f * b[col];
        }
    }
    let mut x = [0.0; NWAVE];
    for row in (0..NWAVE).rev() {
        let p = m[row][row];
        if p.abs() < f64::MIN_POSITIVE {
            continue;
        }
        let mut acc = b[row];
        for c in row + 1..NWAVE {
            acc -= m[row][c] * x[c];
        }
        x[row] = acc / p;
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;
    use corona_core::{BX1, BX2, BX3, VX2};

    fn state(rho: f64, p: f64) -> VarVec {
        let mut w = [0.0; NVAR];
        w[RHO] = rho;
        w[PRS] = p;
        w
    }

    #[test]
    fn hydro_contact_at_rest_is_exact() {
        let phys = Physics::hydro(1.4);
        let f = roe(&state(1.0, 1.0), &state(0.125, 1.0), Dir::X2, &phys);
        assert!(f.flux[RHO].abs() < 1e-14);
        assert!((f.flux[VX2] - 1.0).abs() < 1e-14);
        assert!(f.flux[ENG].abs() < 1e-14);
    }

    #[test]
    fn mhd_contact_at_rest_is_exact() {
        let phys = Physics::mhd(5.0 / 3.0);
        let mut l = state(1.0, 1.0);
        l[BX1] = 0.5;
        l[BX2] = 0.3;
        l[BX3] = -0.4;
        let mut r = l;
        r[RHO] = 0.2;
        let f = roe(&l, &r, Dir::X1, &phys);
        let exact = phys.physical_flux(&l, Dir::X1);
        for n in 0..NVAR {
            assert!((f.flux[n] - exact[n]).abs() < 1e-13, "slot {n}");
        }
    }

    #[test]
    fn eigenvectors_are_independent_when_field_is_normal() {
        let w = [1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.6];
        let (rem, lambda) = eigensystem(&w, 1.0, 5.0 / 3.0);
        assert!(lambda.windows(2).all(|p| p[0] <= p[1]));
        // Each unit jump is recovered through the eigenbasis.
        for i in 0..NWAVE {
            let mut e = [0.0; NWAVE];
            e[i] = 1.0;
            let x = solve(rem, e);
            for (row, want) in e.iter().enumerate() {
                let got: f64 = (0..NWAVE).map(|k| rem[row][k] * x[k]).sum();
                assert!((got - want).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn solve_handles_permuted_system() {
        let mut m = [[0.0; NWAVE]; NWAVE];
        for i in 0..NWAVE {
            m[i][(i + 3) % NWAVE] = (i + 1) as f64;
        }
        let b = [1.0; NWAVE];
        let x = solve(m, b);
        for i in 0..NWAVE {
            assert!((x[(i + 3) % NWAVE] - 1.0 / (i + 1) as f64).abs() < 1e-15);
        }
    }
}
