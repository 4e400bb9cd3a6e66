//! Equation of state, conversions, and the analytic flux function.
//!
//! Units are such that the magnetic pressure is `B^2 / 2`. A
//! hydrodynamic [`Physics`] ignores the magnetic slots entirely.
//!
//! An isothermal [`Physics`] has no energy equation. Its pressure slot
//! holds `rho * c_s^2`, filled from a [`SoundSpeed`](crate::SoundSpeed)
//! before the fluxes are computed, and the energy slot of every conserved
//! state and flux is zero.

use corona_core::var::{mag, vel};
use corona_core::{ConfigError, Dir, VarVec, BX1, ENG, NVAR, PRS, RHO, VX1};

/// Physics module of a run: ideal gas, with or without a magnetic field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Physics {
    /// `true` for magnetohydrodynamics.
    pub mhd: bool,
    /// Adiabatic index; one for an isothermal gas.
    pub gamma: f64,
    /// `true` when the pressure follows a prescribed sound speed.
    pub isothermal: bool,
}

impl Physics {
    /// Hydrodynamics with adiabatic index `gamma`.
    pub fn hydro(gamma: f64) -> Self {
        Self {
            mhd: false,
            gamma,
            isothermal: false,
        }
    }

    /// Ideal MHD with adiabatic index `gamma`.
    pub fn mhd(gamma: f64) -> Self {
        Self {
            mhd: true,
            gamma,
            isothermal: false,
        }
    }

    /// Isothermal gas, magnetized when `mhd` is set.
    pub fn isothermal(mhd: bool) -> Self {
        Self {
            mhd,
            gamma: 1.0,
            isothermal: true,
        }
    }

    /// Short name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match (self.isothermal, self.mhd) {
            (false, true) => "MHD",
            (false, false) => "HD",
            (true, true) => "isothermal MHD",
            (true, false) => "isothermal HD",
        }
    }

    /// Reject a non-finite adiabatic index or one not above one. The
    /// index of an isothermal gas must be exactly one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.isothermal {
            if self.gamma != 1.0 {
                return Err(ConfigError::InvalidGamma { value: self.gamma });
            }
            return Ok(());
        }
        if !self.gamma.is_finite() || self.gamma <= 1.0 {
            return Err(ConfigError::InvalidGamma { value: self.gamma });
        }
        Ok(())
    }

    /// Magnetic field of a state, zero for hydrodynamics.
    #[inline]
    pub fn field(&self, w: &VarVec) -> [f64; 3] {
        if self.mhd {
            [w[BX1], w[BX1 + 1], w[BX1 + 2]]
        } else {
            [0.0; 3]
        }
    }

    /// Total energy density of a primitive state, zero when isothermal.
    #[inline]
    pub fn total_energy(&self, w: &VarVec) -> f64 {
        if self.isothermal {
            return 0.0;
        }
        let v = [w[VX1], w[VX1 + 1], w[VX1 + 2]];
        let b = self.field(w);
        w[PRS] / (self.gamma - 1.0) + 0.5 * w[RHO] * dot(&v, &v) + 0.5 * dot(&b, &b)
    }

    /// Primitive to conserved.
    pub fn prim_to_cons(&self, w: &VarVec) -> VarVec {
        let mut u = [0.0; NVAR];
        u[RHO] = w[RHO];
        for d in 0..3 {
            u[VX1 + d] = w[RHO] * w[VX1 + d];
        }
        let b = self.field(w);
        u[BX1..BX1 + 3].copy_from_slice(&b);
        u[ENG] = self.total_energy(w);
        u
    }

    /// Conserved to primitive. The pressure of an isothermal state cannot
    /// be recovered from `u` and is left zero.
    pub fn cons_to_prim(&self, u: &VarVec) -> VarVec {
        let mut w = [0.0; NVAR];
        w[RHO] = u[RHO];
        for d in 0..3 {
            w[VX1 + d] = u[VX1 + d] / u[RHO];
        }
        let b = self.field(u);
        w[BX1..BX1 + 3].copy_from_slice(&b);
        if self.isothermal {
            return w;
        }
        let m = [u[VX1], u[VX1 + 1], u[VX1 + 2]];
        let kinetic = 0.5 * dot(&m, &m) / u[RHO];
        w[PRS] = (self.gamma - 1.0) * (u[ENG] - kinetic - 0.5 * dot(&b, &b));
        w
    }

    /// Thermal plus magnetic pressure.
    #[inline]
    pub fn total_pressure(&self, w: &VarVec) -> f64 {
        let b = self.field(w);
        w[PRS] + 0.5 * dot(&b, &b)
    }

    /// Squared sound speed; `p / rho` for an isothermal gas.
    #[inline]
    pub fn sound_speed2(&self, w: &VarVec) -> f64 {
        self.gamma * w[PRS] / w[RHO]
    }

    /// Fast magnetosonic speed along `dir` (the sound speed for hydrodynamics).
    pub fn fast_speed(&self, w: &VarVec, dir: Dir) -> f64 {
        let a2 = self.sound_speed2(w);
        if !self.mhd {
            return a2.sqrt();
        }
        let b = self.field(w);
        let b2 = dot(&b, &b) / w[RHO];
        let bn2 = w[mag(dir)] * w[mag(dir)] / w[RHO];
        let sum = a2 + b2;
        let disc = (sum * sum - 4.0 * a2 * bn2).max(0.0);
        (0.5 * (sum + disc.sqrt())).sqrt()
    }

    /// Analytic flux of primitive state `w` through a face normal to `dir`.
    pub fn physical_flux(&self, w: &VarVec, dir: Dir) -> VarVec {
        let n = vel(dir);
        let vn = w[n];
        let b = self.field(w);
        let bn = b[dir.index()];
        let v = [w[VX1], w[VX1 + 1], w[VX1 + 2]];
        let pt = w[PRS] + 0.5 * dot(&b, &b);

        let mut f = [0.0; NVAR];
        f[RHO] = w[RHO] * vn;
        for d in 0..3 {
            f[VX1 + d] = w[RHO] * v[d] * vn - b[d] * bn;
            if self.mhd {
                f[BX1 + d] = vn * b[d] - v[d] * bn;
            }
        }
        f[n] += pt;
        if !self.isothermal {
            f[ENG] = (self.total_energy(w) + pt) * vn - bn * dot(&v, &b);
        }
        f
    }
}

#[inline]
pub(crate) fn dot(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[cfg(test)]
mod tests {
    use super::*;
    use corona_core::{BX2, BX3, VX2, VX3};

    fn state() -> VarVec {
        let mut w = [0.0; NVAR];
        w[RHO] = 1.3;
        w[VX1] = 0.4;
        w[VX2] = -0.2;
        w[VX3] = 0.1;
        w[BX1] = 0.7;
        w[BX2] = -0.3;
        w[BX3] = 0.5;
        w[PRS] = 0.9;
        w
    }

    #[test]
    fn gamma_validation() {
        assert!(Physics::mhd(5.0 / 3.0).validate().is_ok());
        assert_eq!(
            Physics::hydro(1.0).validate(),
            Err(ConfigError::InvalidGamma { value: 1.0 })
        );
        assert!(Physics::hydro(f64::NAN).validate().is_err());
    }

    #[test]
    fn conversions_invert() {
        let phys = Physics::mhd(5.0 / 3.0);
        let w = state();
        let back = phys.cons_to_prim(&phys.prim_to_cons(&w));
        for n in 0..NVAR {
            assert!((back[n] - w[n]).abs() < 1e-14, "slot {n}");
        }
    }

    #[test]
    fn hydro_ignores_field() {
        let phys = Physics::hydro(1.4);
        let w = state();
        let u = phys.prim_to_cons(&w);
        assert_eq!(u[BX1], 0.0);
        let f = phys.physical_flux(&w, Dir::X2);
        assert_eq!(f[BX3], 0.0);
        assert!((phys.fast_speed(&w, Dir::X1) - phys.sound_speed2(&w).sqrt()).abs() < 1e-15);
    }

    #[test]
    fn isothermal_gas_has_no_energy() {
        let phys = Physics::isothermal(true);
        assert!(phys.validate().is_ok());
        assert_eq!(phys.name(), "isothermal MHD");
        let mut w = state();
        // c_s = 0.5
        w[PRS] = 0.25 * w[RHO];
        assert!((phys.sound_speed2(&w) - 0.25).abs() < 1e-15);
        let u = phys.prim_to_cons(&w);
        assert_eq!(u[ENG], 0.0);
        for d in Dir::ALL {
            let f = phys.physical_flux(&w, d);
            assert_eq!(f[ENG], 0.0);
            // Momentum still carries the isothermal pressure.
            let b = phys.field(&w);
            let expected = w[RHO] * w[vel(d)] * w[vel(d)] - b[d.index()] * b[d.index()]
                + w[PRS]
                + 0.5 * dot(&b, &b);
            assert!((f[vel(d)] - expected).abs() < 1e-14);
        }
        let back = phys.cons_to_prim(&u);
        assert_eq!(back[PRS], 0.0);
        assert!((back[VX1] - w[VX1]).abs() < 1e-15);
    }

    #[test]
    fn isothermal_gamma_is_fixed() {
        let phys = Physics {
            gamma: 1.4,
            ..Physics::isothermal(false)
        };
        assert_eq!(phys.validate(), Err(ConfigError::InvalidGamma { value: 1.4 }));
    }

    #[test]
    fn normal_field_has_no_flux() {
        let phys = Physics::mhd(5.0 / 3.0);
        let w = state();
        for d in Dir::ALL {
            assert_eq!(phys.physical_flux(&w, d)[mag(d)], 0.0);
        }
    }

    #[test]
    fn fast_speed_bounds() {
        let phys = Physics::mhd(5.0 / 3.0);
        let w = state();
        let a = phys.sound_speed2(&w).sqrt();
        let b = phys.field(&w);
        let va = (dot(&b, &b) / w[RHO]).sqrt();
        let cf = phys.fast_speed(&w, Dir::X1);
        assert!(cf >= a.max(va) - 1e-14);
        assert!(cf <= (a * a + va * va).sqrt() + 1e-14);
    }
}
