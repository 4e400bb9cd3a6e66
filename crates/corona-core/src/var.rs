//! Variable layout shared by primitive and conserved states.
//!
//! Primitive and conserved vectors use the same slots: velocities share
//! indices with momenta and pressure shares its index with total energy.
//! Hydrodynamic runs keep the magnetic slots at zero.

use crate::dir::Dir;

/// Number of variables per cell.
pub const NVAR: usize = 8;

/// Density (primitive and conserved).
pub const RHO: usize = 0;
/// Velocity along X1 (primitive).
pub const VX1: usize = 1;
/// Velocity along X2 (primitive).
pub const VX2: usize = 2;
/// Velocity along X3 (primitive).
pub const VX3: usize = 3;
/// Magnetic field along X1.
pub const BX1: usize = 4;
/// Magnetic field along X2.
pub const BX2: usize = 5;
/// Magnetic field along X3.
pub const BX3: usize = 6;
/// Thermal pressure (primitive).
pub const PRS: usize = 7;

/// Momentum along X1 (conserved).
pub const MX1: usize = VX1;
/// Momentum along X2 (conserved).
pub const MX2: usize = VX2;
/// Momentum along X3 (conserved).
pub const MX3: usize = VX3;
/// Total energy density (conserved).
pub const ENG: usize = PRS;

/// All variables of one cell or face.
pub type VarVec = [f64; NVAR];

/// Velocity (or momentum) slot along `dir`.
#[inline]
pub fn vel(dir: Dir) -> usize {
    VX1 + dir.index()
}

/// Magnetic field slot along `dir`.
#[inline]
pub fn mag(dir: Dir) -> usize {
    BX1 + dir.index()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_are_distinct_and_in_range() {
        let slots = [RHO, VX1, VX2, VX3, BX1, BX2, BX3, PRS];
        for (n, s) in slots.iter().enumerate() {
            assert_eq!(*s, n);
        }
        assert_eq!(slots.len(), NVAR);
    }

    #[test]
    fn directional_slots() {
        assert_eq!(vel(Dir::X2), VX2);
        assert_eq!(mag(Dir::X3), BX3);
        assert_eq!(vel(Dir::X1), MX1);
    }
}
