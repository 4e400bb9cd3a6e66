//! Run configuration and validation.
//!
//! [`RunConfig`] gathers every choice a run makes once: physics and its
//! sound speed, flux scheme, shock flattening, diffusive terms, source
//! terms and the EMF tie weight. Position-dependent inputs (isothermal
//! sound speed, gravitational potential, user source term) are closures
//! owned by the configuration.
//! [`validate()`](RunConfig::validate) rejects every illegal combination
//! before any buffer is allocated; the only checks left for
//! [`FluxStage::new`](crate::FluxStage::new) are those that need the grid.

use corona_core::ConfigError;
use corona_ct::EmfConfig;
use corona_flux::{Physics, Scheme, ShockDetector, SoundSpeed};
use corona_parabolic::ParabolicConfig;

use crate::source::{PotentialFn, SourceTerms, UserSourceFn};

// ── RunConfig ──────────────────────────────────────────────────────

/// Complete configuration of a flux stage.
#[derive(Clone, Debug)]
pub struct RunConfig {
    /// Physics module. Default: MHD with `gamma = 5/3`.
    pub physics: Physics,
    /// Sound speed of an isothermal run. Default: none.
    pub sound_speed: Option<SoundSpeed>,
    /// Riemann solver. Default: HLL.
    pub scheme: Scheme,
    /// Shock-flattening threshold; `None` disables flattening. Default: off.
    pub shock_threshold: Option<f64>,
    /// Diffusive terms. Default: none.
    pub parabolic: ParabolicConfig,
    /// Gravity and user source terms. Default: none.
    pub sources: SourceTerms,
    /// EMF reduction settings.
    pub emf: EmfConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            physics: Physics::mhd(5.0 / 3.0),
            sound_speed: None,
            scheme: Scheme::Hll,
            shock_threshold: None,
            parabolic: ParabolicConfig::default(),
            sources: SourceTerms::default(),
            emf: EmfConfig::default(),
        }
    }
}

impl RunConfig {
    /// Set the physics module.
    pub fn with_physics(mut self, physics: Physics) -> Self {
        self.physics = physics;
        self
    }

    /// Set the isothermal sound speed.
    pub fn with_sound_speed(mut self, sound_speed: impl Into<SoundSpeed>) -> Self {
        self.sound_speed = Some(sound_speed.into());
        self
    }

    /// Set the Riemann solver.
    pub fn with_scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Set the Riemann solver by name, case-insensitively.
    pub fn with_scheme_name(mut self, name: &str) -> Result<Self, ConfigError> {
        self.scheme = name.parse()?;
        Ok(self)
    }

    /// Enable shock flattening with the default threshold.
    pub fn with_shock_flattening(self) -> Self {
        self.with_shock_threshold(ShockDetector::DEFAULT_THRESHOLD)
    }

    /// Enable shock flattening with `threshold`.
    pub fn with_shock_threshold(mut self, threshold: f64) -> Self {
        self.shock_threshold = Some(threshold);
        self
    }

    /// Set the diffusive terms.
    pub fn with_parabolic(mut self, parabolic: ParabolicConfig) -> Self {
        self.parabolic = parabolic;
        self
    }

    /// Set the source terms.
    pub fn with_sources(mut self, sources: SourceTerms) -> Self {
        self.sources = sources;
        self
    }

    /// Add gravity from a potential.
    pub fn with_potential(mut self, potential: PotentialFn) -> Self {
        self.sources = self.sources.with_potential(potential);
        self
    }

    /// Add a user source term.
    pub fn with_source_term(mut self, user: UserSourceFn) -> Self {
        self.sources = self.sources.with_user(user);
        self
    }

    /// Set the EMF reduction settings.
    pub fn with_emf(mut self, emf: EmfConfig) -> Self {
        self.emf = emf;
        self
    }

    /// Validate every grid-independent invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 1. Equation of state, and the sound speed of an isothermal gas.
        self.physics.validate()?;
        match (&self.sound_speed, self.physics.isothermal) {
            (Some(cs), true) => cs.validate()?,
            (None, true) => return Err(ConfigError::MissingSoundSpeed),
            (Some(_), false) => log::warn!("sound speed ignored by adiabatic physics"),
            (None, false) => {}
        }
        // 2. Scheme must handle the physics.
        self.scheme.check(&self.physics)?;
        // 3. Shock threshold, when enabled.
        if let Some(t) = self.shock_threshold {
            if !t.is_finite() || t <= 0.0 {
                return Err(ConfigError::InvalidThreshold { value: t });
            }
        }
        // 4. Diffusive terms against the physics.
        self.parabolic.validate(self.physics.mhd)?;
        // 5. EMF tie weight.
        self.emf.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use corona_core::{VarVec, NVAR};
    use corona_parabolic::{DiffusiveTerm, Viscosity};

    #[test]
    fn default_config_is_valid() {
        assert!(RunConfig::default().validate().is_ok());
        assert!(RunConfig::default()
            .with_scheme(Scheme::Hlld)
            .with_shock_flattening()
            .validate()
            .is_ok());
    }

    #[test]
    fn unsupported_scheme_fails() {
        let cfg = RunConfig::default().with_scheme(Scheme::Hllc);
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::UnsupportedScheme {
                scheme: "hllc",
                physics: "MHD"
            })
        );
        let cfg = RunConfig::default()
            .with_physics(Physics::hydro(1.4))
            .with_scheme(Scheme::Hlld);
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::UnsupportedScheme { .. })
        ));
    }

    #[test]
    fn unknown_scheme_name_fails() {
        let err = RunConfig::default().with_scheme_name("hlle").unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnknownScheme {
                name: "hlle".to_string()
            }
        );
        let cfg = RunConfig::default().with_scheme_name(" ROE ").unwrap();
        assert_eq!(cfg.scheme, Scheme::Roe);
    }

    #[test]
    fn invalid_gamma_fails() {
        let cfg = RunConfig::default().with_physics(Physics::mhd(0.9));
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidGamma { value: 0.9 }));
    }

    #[test]
    fn invalid_threshold_fails() {
        for t in [0.0, -1.0, f64::INFINITY] {
            let cfg = RunConfig::default().with_shock_threshold(t);
            assert!(matches!(
                cfg.validate(),
                Err(ConfigError::InvalidThreshold { .. })
            ));
        }
    }

    #[test]
    fn nonideal_without_mhd_fails() {
        let cfg = RunConfig::default()
            .with_physics(Physics::hydro(1.4))
            .with_parabolic(ParabolicConfig::default().with_ambipolar(DiffusiveTerm::explicit(0.1)));
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::NonIdealWithoutMhd {
                term: "ambipolar diffusion"
            })
        );
    }

    #[test]
    fn negative_viscosity_fails() {
        let cfg = RunConfig::default().with_parabolic(
            ParabolicConfig::default().with_viscosity(Viscosity::new(DiffusiveTerm::explicit(-1.0))),
        );
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::InvalidCoefficient {
                term: "viscosity",
                value: -1.0
            })
        );
    }

    #[test]
    fn invalid_tie_weight_fails() {
        let cfg = RunConfig::default().with_emf(EmfConfig::default().with_tie_weight(2.0));
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::InvalidTieWeight { value: 2.0 })
        );
    }

    #[test]
    fn isothermal_needs_a_sound_speed() {
        let cfg = RunConfig::default().with_physics(Physics::isothermal(true));
        assert_eq!(cfg.validate(), Err(ConfigError::MissingSoundSpeed));
        assert!(cfg.clone().with_sound_speed(0.1).validate().is_ok());
        assert!(matches!(
            cfg.clone().with_sound_speed(-0.1).validate(),
            Err(ConfigError::InvalidCoefficient {
                term: "isothermal sound speed",
                ..
            })
        ));
        let profile = SoundSpeed::Function(Arc::new(|x: [f64; 3]| 0.05 / x[0].sqrt()));
        assert!(cfg.with_sound_speed(profile).validate().is_ok());
    }

    #[test]
    fn isothermal_rejects_energy_schemes() {
        for scheme in [Scheme::Hllc, Scheme::Hlld, Scheme::Roe] {
            let cfg = RunConfig::default()
                .with_physics(Physics::isothermal(false))
                .with_sound_speed(1.0)
                .with_scheme(scheme);
            assert!(matches!(
                cfg.validate(),
                Err(ConfigError::UnsupportedScheme { .. })
            ));
        }
    }

    #[test]
    fn source_terms_show_in_debug() {
        let cfg = RunConfig::default()
            .with_potential(Arc::new(|x: [f64; 3]| -1.0 / x[0]))
            .with_source_term(Arc::new(|_: [f64; 3], _: &VarVec, _: f64| [0.0; NVAR]));
        assert!(cfg.validate().is_ok());
        assert!(format!("{cfg:?}").contains("[\"gravity\", \"user\"]"));
    }

    #[test]
    fn hydro_viscosity_is_valid() {
        let cfg = RunConfig::default()
            .with_physics(Physics::hydro(1.4))
            .with_scheme(Scheme::Hllc)
            .with_parabolic(
                ParabolicConfig::default()
                    .with_viscosity(Viscosity::new(DiffusiveTerm::relaxation(1e-3)).with_bulk(1e-4)),
            );
        assert!(cfg.validate().is_ok());
    }
}
