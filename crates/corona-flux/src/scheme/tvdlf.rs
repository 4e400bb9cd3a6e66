//! Local Lax-Friedrichs (Rusanov) flux.
//!
//! ```text
//! F = (F_L + F_R) / 2 - c_max (U_R - U_L) / 2
//! c_max = max(|v_L| + c_f,L, |v_R| + c_f,R)
//! ```
//!
//! The most diffusive scheme of the family, and the one the dispatcher
//! falls back to at flagged shocks.

use corona_core::var::{mag, vel};
use corona_core::{Dir, VarVec, NVAR};

use super::{aligned, FaceFlux};
use crate::physics::Physics;

/// Rusanov flux through a face normal to `dir`.
pub fn tvdlf(left: &VarVec, right: &VarVec, dir: Dir, physics: &Physics) -> FaceFlux {
    let (l, r) = aligned(left, right, dir, physics);
    let n = vel(dir);
    let cl = l[n].abs() + physics.fast_speed(&l, dir);
    let cr = r[n].abs() + physics.fast_speed(&r, dir);
    let cmax = cl.max(cr);

    let fl = physics.physical_flux(&l, dir);
    let fr = physics.physical_flux(&r, dir);
    let ul = physics.prim_to_cons(&l);
    let ur = physics.prim_to_cons(&r);

    let mut flux = [0.0; NVAR];
    for v in 0..NVAR {
        flux[v] = 0.5 * (fl[v] + fr[v]) - 0.5 * cmax * (ur[v] - ul[v]);
    }
    if physics.mhd {
        flux[mag(dir)] = 0.0;
    }
    FaceFlux {
        flux,
        max_speed: cmax,
    }
}
