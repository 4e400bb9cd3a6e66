//! Viscous stress fluxes.

use corona_core::var::vel;
use corona_core::{Array3, Dir, VarVec, ENG, RHO, VX1};
use corona_grid::Grid;

use crate::stencil::par_faces;
use crate::term::Viscosity;

/// Subtract the viscous stress `tau` from the momentum fluxes along `dir`
/// and `tau . v` from the energy flux.
///
/// ```text
/// tau_ab = rho nu (d_a v_b + d_b v_a - 2/3 delta_ab div v) + rho nu_b delta_ab div v
/// ```
pub(crate) fn add_viscous(
    dir: Dir,
    grid: &Grid,
    prim: &Array3<VarVec>,
    flux: &mut Array3<VarVec>,
    dmax: &mut Array3<f64>,
    visc: &Viscosity,
) {
    let n = dir.index();
    par_faces(prim, grid, dir, flux, dmax, |st, (k, j, i), f, d| {
        let avg = st.average(k, j, i);
        let x = st.position(k, j, i);
        let nu = visc.shear.coefficient.at(x, &avg);
        let nu_b = visc.bulk.as_ref().map_or(0.0, |b| b.at(x, &avg));

        // grad[a][b] = d_a v_b
        let mut grad = [[0.0; 3]; 3];
        for a in Dir::ALL {
            for b in Dir::ALL {
                grad[a.index()][b.index()] = st.gradient(k, j, i, vel(b), a);
            }
        }
        let div = grad[0][0] + grad[1][1] + grad[2][2];

        let rho = avg[RHO];
        let mut work = 0.0;
        for b in 0..3 {
            let mut tau = rho * nu * (grad[n][b] + grad[b][n]);
            if b == n {
                tau += rho * (nu_b - 2.0 / 3.0 * nu) * div;
            }
            f[VX1 + b] -= tau;
            work += tau * avg[VX1 + b];
        }
        f[ENG] -= work;
        *d = d.max(nu.max(nu_b));
    });
}
