//! Two-wave HLL flux with Davis wave-speed estimates.

use corona_core::var::{mag, vel};
use corona_core::{Dir, VarVec, NVAR};

use super::{aligned, FaceFlux};
use crate::physics::Physics;

/// HLL flux through a face normal to `dir`.
pub fn hll(left: &VarVec, right: &VarVec, dir: Dir, physics: &Physics) -> FaceFlux {
    let (l, r) = aligned(left, right, dir, physics);
    let n = vel(dir);
    let cfl = physics.fast_speed(&l, dir);
    let cfr = physics.fast_speed(&r, dir);
    let sl = (l[n] - cfl).min(r[n] - cfr);
    let sr = (l[n] + cfl).max(r[n] + cfr);
    let max_speed = sl.abs().max(sr.abs());

    let fl = physics.physical_flux(&l, dir);
    if sl >= 0.0 {
        return FaceFlux {
            flux: fl,
            max_speed,
        };
    }
    let fr = physics.physical_flux(&r, dir);
    if sr <= 0.0 {
        return FaceFlux {
            flux: fr,
            max_speed,
        };
    }

    let ul = physics.prim_to_cons(&l);
    let ur = physics.prim_to_cons(&r);
    let inv = 1.0 / (sr - sl);
    let mut flux = [0.0; NVAR];
    for v in 0..NVAR {
        flux[v] = (sr * fl[v] - sl * fr[v] + sl * sr * (ur[v] - ul[v])) * inv;
    }
    if physics.mhd {
        flux[mag(dir)] = 0.0;
    }
    FaceFlux { flux, max_speed }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corona_core::{PRS, RHO, VX2};

    #[test]
    fn supersonic_flow_is_upwinded() {
        let phys = Physics::hydro(5.0 / 3.0);
        let mut l = [0.0; NVAR];
        l[RHO] = 1.0;
        l[VX2] = 10.0;
        l[PRS] = 0.1;
        let mut r = l;
        r[RHO] = 3.0;
        let f = hll(&l, &r, Dir::X2, &phys);
        assert_eq!(f.flux, phys.physical_flux(&l, Dir::X2));

        let (mut ml, mut mr) = (r, l);
        ml[VX2] = -10.0;
        mr[VX2] = -10.0;
        let g = hll(&ml, &mr, Dir::X2, &phys);
        assert_eq!(g.flux, phys.physical_flux(&mr, Dir::X2));
    }
}
