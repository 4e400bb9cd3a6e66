//! HLLD flux for ideal MHD (Miyoshi and Kusano, 2005).
//!
//! Resolves the fast waves, the two rotational discontinuities and the
//! contact, with the total pressure continuous across the Riemann fan.
//! Intermediate states are built in the face frame: normal, first and
//! second transverse axes.

use corona_core::var::{mag, vel};
use corona_core::{Dir, VarVec, ENG, NVAR, RHO};

use super::{aligned, sign, FaceFlux};
use crate::physics::{dot, Physics};

/// Relative size below which the single-star transverse update is singular.
const DEGENERATE: f64 = 1e-10;

/// Slot indices of the face frame.
#[derive(Clone, Copy)]
struct Frame {
    v: [usize; 3],
    b: [usize; 3],
}

impl Frame {
    fn new(dir: Dir) -> Self {
        let (t1, t2) = dir.transverse();
        Self {
            v: [vel(dir), vel(t1), vel(t2)],
            b: [mag(dir), mag(t1), mag(t2)],
        }
    }
}

/// One side of the fan: its state and the outer-star state.
struct Side {
    u: VarVec,
    flux: VarVec,
    star: VarVec,
    rho_star: f64,
    v_star: [f64; 3],
    b_star: [f64; 3],
}

/// HLLD flux through a face normal to `dir`.
pub fn hlld(left: &VarVec, right: &VarVec, dir: Dir, physics: &Physics) -> FaceFlux {
    let (l, r) = aligned(left, right, dir, physics);
    let fr = Frame::new(dir);
    let bn = l[fr.b[0]];

    let cfl = physics.fast_speed(&l, dir);
    let cfr = physics.fast_speed(&r, dir);
    let cmax = cfl.max(cfr);
    let (vnl, vnr) = (l[fr.v[0]], r[fr.v[0]]);
    let sl = vnl.min(vnr) - cmax;
    let sr = vnl.max(vnr) + cmax;
    let max_speed = sl.abs().max(sr.abs());

    if sl > 0.0 {
        return FaceFlux {
            flux: physics.physical_flux(&l, dir),
            max_speed,
        };
    }
    if sr < 0.0 {
        return FaceFlux {
            flux: physics.physical_flux(&r, dir),
            max_speed,
        };
    }

    let ptl = physics.total_pressure(&l);
    let ptr = physics.total_pressure(&r);
    let ml = l[RHO] * (sl - vnl);
    let mr = r[RHO] * (sr - vnr);
    let denom = mr - ml;
    let sm = (mr * vnr - ml * vnl - ptr + ptl) / denom;
    let pt_star = (mr * ptl - ml * ptr + ml * mr * (vnr - vnl)) / denom;

    let left_side = outer_star(&l, sl, sm, pt_star, bn, fr, physics, dir);
    let right_side = outer_star(&r, sr, sm, pt_star, bn, fr, physics, dir);

    let sql = left_side.rho_star.sqrt();
    let sqr = right_side.rho_star.sqrt();
    let ssl = sm - bn.abs() / sql;
    let ssr = sm + bn.abs() / sqr;

    let flux = if ssl >= 0.0 {
        side_flux(&left_side, sl)
    } else if ssr <= 0.0 {
        side_flux(&right_side, sr)
    } else {
        // Inner states, shared transverse velocity and field.
        let sb = sign(bn);
        let inv = 1.0 / (sql + sqr);
        let mut v2 = [sm, 0.0, 0.0];
        let mut b2 = [bn, 0.0, 0.0];
        for t in 1..3 {
            let (vl, vr) = (left_side.v_star[t], right_side.v_star[t]);
            let (bl, br) = (left_side.b_star[t], right_side.b_star[t]);
            v2[t] = (sql * vl + sqr * vr + (br - bl) * sb) * inv;
            b2[t] = (sql * br + sqr * bl + sql * sqr * (vr - vl) * sb) * inv;
        }
        let vb2 = dot(&v2, &b2);
        let (side, s_outer, s_inner, sq, sgn) = if sm >= 0.0 {
            (&left_side, sl, ssl, sql, -1.0)
        } else {
            (&right_side, sr, ssr, sqr, 1.0)
        };
        let vb_star = dot(&side.v_star, &side.b_star);
        let mut inner = [0.0; NVAR];
        inner[RHO] = side.rho_star;
        for a in 0..3 {
            inner[fr.v[a]] = side.rho_star * v2[a];
            inner[fr.b[a]] = b2[a];
        }
        inner[ENG] = side.star[ENG] + sgn * sq * (vb_star - vb2) * sb;

        let outer = side_flux(side, s_outer);
        let mut f = [0.0; NVAR];
        for v in 0..NVAR {
            f[v] = outer[v] + s_inner * (inner[v] - side.star[v]);
        }
        f
    };

    let mut flux = flux;
    flux[fr.b[0]] = 0.0;
    FaceFlux { flux, max_speed }
}

/// Flux of the outer-star region on one side: `F + S (U* - U)`.
fn side_flux(side: &Side, s: f64) -> VarVec {
    let mut f = [0.0; NVAR];
    for v in 0..NVAR {
        f[v] = side.flux[v] + s * (side.star[v] - side.u[v]);
    }
    f
}

#[allow(clippy::too_many_arguments)]
fn outer_star(
    w: &VarVec,
    s: f64,
    sm: f64,
    pt_star: f64,
    bn: f64,
    fr: Frame,
    physics: &Physics,
    dir: Dir,
) -> Side {
    let u = physics.prim_to_cons(w);
    let flux = physics.physical_flux(w, dir);
    let vn = w[fr.v[0]];
    let v = [w[fr.v[0]], w[fr.v[1]], w[fr.v[2]]];
    let b = [bn, w[fr.b[1]], w[fr.b[2]]];

    let rho_star = w[RHO] * (s - vn) / (s - sm);
    let scrh = w[RHO] * (s - vn) * (s - sm) - bn * bn;
    let mut v_star = [sm, v[1], v[2]];
    let mut b_star = b;
    let tiny = DEGENERATE * (w[RHO] * (s - vn) * (s - vn)).max(bn * bn);
    if scrh.abs() > tiny {
        let vfac = bn * (sm - vn) / scrh;
        let bfac = (w[RHO] * (s - vn) * (s - vn) - bn * bn) / scrh;
        for t in 1..3 {
            v_star[t] = v[t] - b[t] * vfac;
            b_star[t] = b[t] * bfac;
        }
    }

    let pt = physics.total_pressure(w);
    let e_star = ((s - vn) * u[ENG] - pt * vn + pt_star * sm
        + bn * (dot(&v, &b) - dot(&v_star, &b_star)))
        / (s - sm);

    let mut star = [0.0; NVAR];
    star[RHO] = rho_star;
    for a in 0..3 {
        star[fr.v[a]] = rho_star * v_star[a];
        star[fr.b[a]] = b_star[a];
    }
    star[ENG] = e_star;

    Side {
        u,
        flux,
        star,
        rho_star,
        v_star,
        b_star,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corona_core::{BX1, BX2, PRS, VX1, VX3};

    #[test]
    fn isolated_contact_is_exact() {
        // Field normal to the face, no pressure jump: a pure contact.
        let phys = Physics::mhd(5.0 / 3.0);
        let mut l = [0.0; NVAR];
        l[RHO] = 2.0;
        l[BX1] = 0.8;
        l[PRS] = 1.0;
        let mut r = l;
        r[RHO] = 0.4;
        let f = hlld(&l, &r, Dir::X1, &phys);
        assert!(f.flux[RHO].abs() < 1e-14);
        assert!((f.flux[VX1] - phys.physical_flux(&l, Dir::X1)[VX1]).abs() < 1e-14);
        assert!(f.flux[ENG].abs() < 1e-14);
    }

    #[test]
    fn vanishing_normal_field_is_finite() {
        let phys = Physics::mhd(5.0 / 3.0);
        let mut l = [0.0; NVAR];
        l[RHO] = 1.0;
        l[BX2] = 1.0;
        l[PRS] = 1.0;
        l[VX3] = 0.2;
        let mut r = l;
        r[RHO] = 0.125;
        r[BX2] = -1.0;
        r[PRS] = 0.1;
        let f = hlld(&l, &r, Dir::X1, &phys);
        assert!(f.flux.iter().all(|x| x.is_finite()));
        assert!(f.flux[RHO] > 0.0);
    }
}
