//! The per-direction diffusive flux pass.

use corona_core::{Array3, ConfigError, Dir, VarVec};
use corona_grid::Grid;

use crate::fargo::{FrameShift, ShiftedFrame};
use crate::nonideal::add_nonideal;
use crate::term::{DiffusiveTerm, SubStep, Treatment, Viscosity};
use crate::viscosity::add_viscous;

// ── ParabolicConfig ─────────────────────────────────────────────

/// Which diffusive terms a run carries.
#[derive(Clone, Debug, Default)]
pub struct ParabolicConfig {
    /// Ohmic resistivity (MHD only).
    pub resistivity: Option<DiffusiveTerm>,
    /// Ambipolar diffusion (MHD only).
    pub ambipolar: Option<DiffusiveTerm>,
    /// Viscous stress.
    pub viscosity: Option<Viscosity>,
    /// Background shear removed from the stored velocity.
    pub frame_shift: Option<FrameShift>,
}

impl ParabolicConfig {
    /// Add Ohmic resistivity.
    pub fn with_resistivity(mut self, term: DiffusiveTerm) -> Self {
        self.resistivity = Some(term);
        self
    }

    /// Add ambipolar diffusion.
    pub fn with_ambipolar(mut self, term: DiffusiveTerm) -> Self {
        self.ambipolar = Some(term);
        self
    }

    /// Add viscosity.
    pub fn with_viscosity(mut self, visc: Viscosity) -> Self {
        self.viscosity = Some(visc);
        self
    }

    /// Enable the frame shift.
    pub fn with_frame_shift(mut self, shift: FrameShift) -> Self {
        self.frame_shift = Some(shift);
        self
    }

    /// `true` when no term is configured.
    pub fn is_empty(&self) -> bool {
        self.resistivity.is_none() && self.ambipolar.is_none() && self.viscosity.is_none()
    }

    /// Check terms against the physics and constant coefficients.
    ///
    /// The frame-shift profile is checked against the grid by
    /// [`DiffusiveFluxAccumulator::new`].
    pub fn validate(&self, mhd: bool) -> Result<(), ConfigError> {
        for (term, name) in [
            (&self.resistivity, "resistivity"),
            (&self.ambipolar, "ambipolar diffusion"),
        ] {
            if let Some(t) = term {
                if !mhd {
                    return Err(ConfigError::NonIdealWithoutMhd { term: name });
                }
                t.coefficient.validate(name)?;
            }
        }
        if let Some(v) = &self.viscosity {
            v.shear.coefficient.validate("viscosity")?;
            if let Some(b) = &v.bulk {
                b.validate("bulk viscosity")?;
            }
        }
        Ok(())
    }

    /// Names of the configured terms, for logging.
    pub fn term_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.resistivity.is_some() {
            names.push("resistivity");
        }
        if self.ambipolar.is_some() {
            names.push("ambipolar");
        }
        if self.viscosity.is_some() {
            names.push("viscosity");
        }
        if self.frame_shift.is_some() {
            names.push("frame-shift");
        }
        names
    }
}

// ── DiffusiveFluxAccumulator ────────────────────────────────────

/// Adds the active diffusive terms to one direction's flux field and
/// tracks the largest diffusion coefficient per cell.
///
/// `dMax` is reset at the start of every [`add_fluxes`](Self::add_fluxes)
/// call and only raised within it, at the cell above each face that
/// received a contribution.
#[derive(Debug)]
pub struct DiffusiveFluxAccumulator {
    config: ParabolicConfig,
    profile: Option<Vec<f64>>,
    dmax: Array3<f64>,
}

impl DiffusiveFluxAccumulator {
    /// Accumulator for blocks shaped like `grid`.
    pub fn new(config: ParabolicConfig, mhd: bool, grid: &Grid) -> Result<Self, ConfigError> {
        config.validate(mhd)?;
        let profile = config
            .frame_shift
            .as_ref()
            .map(|f| f.sample(grid))
            .transpose()?;
        if profile.is_some() && config.viscosity.is_none() {
            log::warn!("frame shift configured without viscosity; diffusive fluxes ignore it");
        }
        Ok(Self {
            config,
            profile,
            dmax: Array3::new(grid.shape(), 0.0),
        })
    }

    /// The configuration.
    pub fn config(&self) -> &ParabolicConfig {
        &self.config
    }

    /// Whether any term contributes during `substep`.
    pub fn is_active(&self, substep: SubStep) -> bool {
        let c = &self.config;
        c.resistivity.as_ref().is_some_and(|t| t.active_in(substep))
            || c.ambipolar.as_ref().is_some_and(|t| t.active_in(substep))
            || c.viscosity.as_ref().is_some_and(|v| v.shear.active_in(substep))
    }

    /// Per-cell maximum diffusion coefficient of the last pass.
    pub fn dmax(&self) -> &Array3<f64> {
        &self.dmax
    }

    /// Add every term active in `substep` to `flux`, the flux field along
    /// `dir`. Returns `true` if any term contributed.
    ///
    /// `prim` is shifted into the lab frame around the viscous part when
    /// the frame shift is on and viscosity is explicit, and is restored
    /// before returning.
    pub fn add_fluxes(
        &mut self,
        dir: Dir,
        grid: &Grid,
        prim: &mut Array3<VarVec>,
        flux: &mut Array3<VarVec>,
        substep: SubStep,
    ) -> bool {
        self.dmax.fill(0.0);
        let c = &self.config;
        let resistivity = c
            .resistivity
            .as_ref()
            .filter(|t| t.active_in(substep))
            .map(|t| &t.coefficient);
        let ambipolar = c
            .ambipolar
            .as_ref()
            .filter(|t| t.active_in(substep))
            .map(|t| &t.coefficient);
        let viscosity = c.viscosity.as_ref().filter(|v| v.shear.active_in(substep));

        let mut touched = false;
        if resistivity.is_some() || ambipolar.is_some() {
            add_nonideal(dir, grid, prim, flux, &mut self.dmax, resistivity, ambipolar);
            touched = true;
        }
        if let Some(visc) = viscosity {
            match (&self.profile, visc.shear.treatment) {
                (Some(profile), Treatment::Explicit) => {
                    let lab = ShiftedFrame::new(prim, profile);
                    add_viscous(dir, grid, &lab, flux, &mut self.dmax, visc);
                }
                _ => add_viscous(dir, grid, prim, flux, &mut self.dmax, visc),
            }
            touched = true;
        }
        touched
    }
}
