//! Diffusive term configuration.

use std::fmt;
use std::sync::Arc;

use corona_core::{ConfigError, VarVec};

// ── Treatment ───────────────────────────────────────────────────

/// How a diffusive term is integrated in time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Treatment {
    /// Added to the flux of every ordinary sub-step.
    #[default]
    Explicit,
    /// Integrated by the relaxation (super-time-stepping) cycle only.
    Relaxation,
}

/// Kind of sub-step the flux is being computed for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SubStep {
    /// An ordinary explicit sub-step.
    #[default]
    Explicit,
    /// A stage of the relaxation cycle.
    Relaxation,
}

impl Treatment {
    /// Whether a term with this treatment contributes during `substep`.
    #[inline]
    pub fn active_in(self, substep: SubStep) -> bool {
        matches!(
            (self, substep),
            (Treatment::Explicit, SubStep::Explicit) | (Treatment::Relaxation, SubStep::Relaxation)
        )
    }
}

// ── Diffusivity ─────────────────────────────────────────────────

/// User profile `(position, primitive state) -> coefficient`.
pub type DiffusivityFn = Arc<dyn Fn([f64; 3], &VarVec) -> f64 + Send + Sync>;

/// A diffusion coefficient.
#[derive(Clone)]
pub enum Diffusivity {
    /// The same value everywhere.
    Constant(f64),
    /// Evaluated at each face from its position and the face-averaged
    /// primitive state.
    Function(DiffusivityFn),
}

impl Diffusivity {
    /// Coefficient at `x` for state `w`.
    #[inline]
    pub fn at(&self, x: [f64; 3], w: &VarVec) -> f64 {
        match self {
            Diffusivity::Constant(c) => *c,
            Diffusivity::Function(f) => f(x, w),
        }
    }

    /// Reject a negative or non-finite constant. Profiles are trusted.
    pub fn validate(&self, term: &'static str) -> Result<(), ConfigError> {
        match self {
            Diffusivity::Constant(c) if !c.is_finite() || *c < 0.0 => {
                Err(ConfigError::InvalidCoefficient { term, value: *c })
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Debug for Diffusivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diffusivity::Constant(c) => f.debug_tuple("Constant").field(c).finish(),
            Diffusivity::Function(_) => f.write_str("Function(..)"),
        }
    }
}

impl From<f64> for Diffusivity {
    fn from(c: f64) -> Self {
        Diffusivity::Constant(c)
    }
}

// ── Terms ───────────────────────────────────────────────────────

/// One diffusive term: coefficient plus time treatment.
#[derive(Clone, Debug)]
pub struct DiffusiveTerm {
    /// Diffusion coefficient.
    pub coefficient: Diffusivity,
    /// Time treatment.
    pub treatment: Treatment,
}

impl DiffusiveTerm {
    /// An explicitly integrated term.
    pub fn explicit(coefficient: impl Into<Diffusivity>) -> Self {
        Self {
            coefficient: coefficient.into(),
            treatment: Treatment::Explicit,
        }
    }

    /// A term integrated by the relaxation cycle.
    pub fn relaxation(coefficient: impl Into<Diffusivity>) -> Self {
        Self {
            coefficient: coefficient.into(),
            treatment: Treatment::Relaxation,
        }
    }

    /// Whether the term contributes during `substep`.
    #[inline]
    pub fn active_in(&self, substep: SubStep) -> bool {
        self.treatment.active_in(substep)
    }
}

/// Viscous stress: kinematic shear viscosity plus optional bulk viscosity.
#[derive(Clone, Debug)]
pub struct Viscosity {
    /// Shear viscosity and the treatment shared by both parts.
    pub shear: DiffusiveTerm,
    /// Kinematic bulk viscosity.
    pub bulk: Option<Diffusivity>,
}

impl Viscosity {
    /// Shear viscosity only.
    pub fn new(shear: DiffusiveTerm) -> Self {
        Self { shear, bulk: None }
    }

    /// Add a bulk part.
    pub fn with_bulk(mut self, bulk: impl Into<Diffusivity>) -> Self {
        self.bulk = Some(bulk.into());
        self
    }
}
