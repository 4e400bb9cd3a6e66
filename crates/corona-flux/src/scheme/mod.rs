//! The flux scheme family.
//!
//! Every scheme is a pure function of the two primitive states on either
//! side of a face, the face normal, and the [`Physics`] module. Schemes never
//! allocate and never fail: a scheme/physics pairing that makes no sense is
//! rejected by [`Scheme::check`] before any face is visited.
//!
//! | Scheme | HD | MHD |
//! |--------|----|-----|
//! | [`Scheme::Tvdlf`] | yes | yes |
//! | [`Scheme::Hll`]   | yes | yes |
//! | [`Scheme::Hllc`]  | yes | no  |
//! | [`Scheme::Hlld`]  | no  | yes |
//! | [`Scheme::Roe`]   | yes | yes |
//!
//! Isothermal physics is handled by [`Scheme::Tvdlf`] and [`Scheme::Hll`]
//! only; the others resolve waves of the energy equation.

use std::fmt;
use std::str::FromStr;

use corona_core::var::mag;
use corona_core::{ConfigError, Dir, VarVec};

use crate::physics::Physics;

mod hll;
mod hllc;
mod hlld;
mod roe;
mod tvdlf;

pub use hll::hll;
pub use hllc::hllc;
pub use hlld::hlld;
pub use roe::roe;
pub use tvdlf::tvdlf;

/// Flux through one face together with the fastest signal speed the
/// scheme used to build it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceFlux {
    /// Numerical flux, conserved variable order.
    pub flux: VarVec,
    /// Largest absolute wave speed at the face.
    pub max_speed: f64,
}

/// Signature shared by every scheme.
pub type SolverFn = fn(&VarVec, &VarVec, Dir, &Physics) -> FaceFlux;

/// Selector of the approximate Riemann solver used for a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scheme {
    /// Local Lax-Friedrichs (Rusanov).
    Tvdlf,
    /// Two-wave Harten-Lax-van Leer.
    Hll,
    /// Three-wave HLL with a restored contact, hydrodynamics only.
    Hllc,
    /// Five-wave Miyoshi-Kusano solver, MHD only.
    Hlld,
    /// Linearised eigen-decomposition solver.
    Roe,
}

impl Scheme {
    /// Every scheme, in declaration order.
    pub const ALL: [Scheme; 5] = [
        Scheme::Tvdlf,
        Scheme::Hll,
        Scheme::Hllc,
        Scheme::Hlld,
        Scheme::Roe,
    ];

    /// Lower-case name, as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            Scheme::Tvdlf => "tvdlf",
            Scheme::Hll => "hll",
            Scheme::Hllc => "hllc",
            Scheme::Hlld => "hlld",
            Scheme::Roe => "roe",
        }
    }

    /// Whether this scheme is defined for `physics`.
    pub fn supports(self, physics: &Physics) -> bool {
        if physics.isothermal {
            return matches!(self, Scheme::Tvdlf | Scheme::Hll);
        }
        match self {
            Scheme::Hllc => !physics.mhd,
            Scheme::Hlld => physics.mhd,
            Scheme::Tvdlf | Scheme::Hll | Scheme::Roe => true,
        }
    }

    /// [`supports`](Self::supports) as a configuration check.
    pub fn check(self, physics: &Physics) -> Result<(), ConfigError> {
        if self.supports(physics) {
            Ok(())
        } else {
            Err(ConfigError::UnsupportedScheme {
                scheme: self.name(),
                physics: physics.name(),
            })
        }
    }

    /// Resolve the solver function once, after [`check`](Self::check).
    pub fn solver(self) -> SolverFn {
        match self {
            Scheme::Tvdlf => tvdlf,
            Scheme::Hll => hll,
            Scheme::Hllc => hllc,
            Scheme::Hlld => hlld,
            Scheme::Roe => roe,
        }
    }

    /// Solve one face with this scheme.
    pub fn solve(self, left: &VarVec, right: &VarVec, dir: Dir, physics: &Physics) -> FaceFlux {
        (self.solver())(left, right, dir, physics)
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scheme {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Scheme::ALL
            .into_iter()
            .find(|scheme| scheme.name() == lower)
            .ok_or_else(|| ConfigError::UnknownScheme {
                name: s.to_string(),
            })
    }
}

// ── Shared helpers ──────────────────────────────────────────────

/// Copies of the two states sharing one normal field component.
///
/// The face-normal field is continuous across a face; reconstructed states
/// that disagree are reconciled by their mean.
#[inline]
pub(crate) fn aligned(
    left: &VarVec,
    right: &VarVec,
    dir: Dir,
    physics: &Physics,
) -> (VarVec, VarVec) {
    let (mut l, mut r) = (*left, *right);
    if physics.mhd {
        let b = mag(dir);
        let bn = 0.5 * (l[b] + r[b]);
        l[b] = bn;
        r[b] = bn;
    }
    (l, r)
}

/// `sign(x)` with `sign(0) == 0`.
#[inline]
pub(crate) fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Mirror helpers shared by the per-scheme tests.

    use corona_core::var::{mag, vel};
    use corona_core::{Dir, VarVec, BX1, ENG, NVAR, RHO, VX1};

    use super::FaceFlux;

    /// Rotate a state by pi about the second transverse axis of `dir`:
    /// the normal and first transverse vector components change sign.
    pub fn mirror_state(w: &VarVec, dir: Dir) -> VarVec {
        let (t1, _) = dir.transverse();
        let mut m = *w;
        for slot in [vel(dir), vel(t1), mag(dir), mag(t1)] {
            m[slot] = -m[slot];
        }
        m
    }

    /// Flux of the mirrored problem predicted from the original flux.
    ///
    /// Scalar fluxes flip sign with the normal. A vector component `a`
    /// carried through the face flips once for the normal and once more
    /// if `a` itself flips under the rotation.
    pub fn mirror_flux(f: &VarVec, dir: Dir) -> VarVec {
        let (t1, _) = dir.transverse();
        let mut g = [0.0; NVAR];
        g[RHO] = -f[RHO];
        g[ENG] = -f[ENG];
        for d in Dir::ALL {
            let flips = d == dir || d == t1;
            let s = if flips { 1.0 } else { -1.0 };
            g[VX1 + d.index()] = s * f[VX1 + d.index()];
            g[BX1 + d.index()] = s * f[BX1 + d.index()];
        }
        g
    }

    pub fn close(a: &FaceFlux, b: &VarVec, scale: f64) -> bool {
        (0..NVAR).all(|n| (a.flux[n] - b[n]).abs() <= 1e-10 * scale.max(1.0))
    }

    pub fn scale(f: &VarVec) -> f64 {
        f.iter().fold(0.0_f64, |m, x| m.max(x.abs()))
    }
}
