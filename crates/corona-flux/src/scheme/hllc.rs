//! HLLC flux for hydrodynamics (Toro, Spruce and Speares).
//!
//! Restores the contact wave that HLL smears, using the pressure-based
//! contact speed estimate `S*`.

use corona_core::var::vel;
use corona_core::{Dir, VarVec, ENG, NVAR, PRS, RHO};

use super::FaceFlux;
use crate::physics::Physics;

/// HLLC flux through a face normal to `dir`.
pub fn hllc(left: &VarVec, right: &VarVec, dir: Dir, physics: &Physics) -> FaceFlux {
    let n = vel(dir);
    let (l, r) = (left, right);
    let cl = physics.fast_speed(l, dir);
    let cr = physics.fast_speed(r, dir);
    let sl = (l[n] - cl).min(r[n] - cr);
    let sr = (l[n] + cl).max(r[n] + cr);
    let max_speed = sl.abs().max(sr.abs());

    if sl >= 0.0 {
        return FaceFlux {
            flux: physics.physical_flux(l, dir),
            max_speed,
        };
    }
    if sr <= 0.0 {
        return FaceFlux {
            flux: physics.physical_flux(r, dir),
            max_speed,
        };
    }

    let ml = l[RHO] * (sl - l[n]);
    let mr = r[RHO] * (sr - r[n]);
    let s_star = (r[PRS] - l[PRS] + ml * l[n] - mr * r[n]) / (ml - mr);

    let (w, s) = if s_star >= 0.0 { (l, sl) } else { (r, sr) };
    let f = physics.physical_flux(w, dir);
    let u = physics.prim_to_cons(w);
    let u_star = star_state(w, &u, s, s_star, n);

    let mut flux = [0.0; NVAR];
    for v in 0..NVAR {
        flux[v] = f[v] + s * (u_star[v] - u[v]);
    }
    FaceFlux { flux, max_speed }
}

/// Conserved state between the outer wave `s` and the contact.
fn star_state(w: &VarVec, u: &VarVec, s: f64, s_star: f64, n: usize) -> VarVec {
    let vn = w[n];
    let factor = w[RHO] * (s - vn) / (s - s_star);
    let mut star = [0.0; NVAR];
    star[RHO] = factor;
    for slot in 1..4 {
        star[slot] = factor * w[slot];
    }
    star[n] = factor * s_star;
    star[ENG] =
        factor * (u[ENG] / w[RHO] + (s_star - vn) * (s_star + w[PRS] / (w[RHO] * (s - vn))));
    star
}
