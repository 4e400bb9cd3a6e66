//! The per-sub-step flux stage.

use std::time::Instant;

use rayon::prelude::*;

use corona_comm::Communicator;
use corona_core::{Array3, StageError, VarVec, ENG, NVAR};
use corona_ct::{EdgeEmf, EmfStage, Staggered};
use corona_flux::{donor_cell, FaceStates, RiemannDispatcher, SoundSpeed};
use corona_grid::Grid;
use corona_parabolic::{DiffusiveFluxAccumulator, SubStep};

use crate::config::RunConfig;
use crate::metrics::{
    StageMetrics, PHASE_EMF, PHASE_PARABOLIC, PHASE_RECONSTRUCT, PHASE_RIEMANN,
};
use crate::source::Sources;
use crate::update::conservative_update;

/// Inputs of one sub-step.
pub struct StageInput<'a> {
    /// Cell-centered primitive field, ghost zones filled. Temporarily
    /// modified by the frame shift and restored before `run` returns. For
    /// an isothermal run the pressure slot is overwritten with
    /// `rho * c_s^2`.
    pub prim: &'a mut Array3<VarVec>,
    /// Face-centered field; replaces the normal field of donor-cell states.
    pub staggered: Option<&'a Staggered>,
    /// Externally reconstructed face states, one per active direction.
    /// Donor-cell reconstruction is used when absent.
    pub states: Option<&'a [FaceStates]>,
}

impl<'a> StageInput<'a> {
    /// Input with donor-cell reconstruction and no staggered field.
    pub fn new(prim: &'a mut Array3<VarVec>) -> Self {
        Self {
            prim,
            staggered: None,
            states: None,
        }
    }

    /// Use the face-centered field for the normal component.
    pub fn with_staggered(mut self, bs: &'a Staggered) -> Self {
        self.staggered = Some(bs);
        self
    }

    /// Use externally reconstructed states.
    pub fn with_states(mut self, states: &'a [FaceStates]) -> Self {
        self.states = Some(states);
        self
    }
}

/// Results of one sub-step, borrowed from the stage.
#[derive(Debug)]
pub struct StageOutput<'a> {
    /// Flux field of each active direction, in sweep order.
    pub fluxes: &'a [Array3<VarVec>],
    /// Edge EMFs, when constrained transport is active.
    pub edges: Option<&'a EdgeEmf>,
    /// Largest diffusion coefficient per cell over all directions.
    pub dmax: &'a Array3<f64>,
    /// Metrics of the sub-step.
    pub metrics: &'a StageMetrics,
}

/// Everything one rank needs to turn a primitive field into fluxes and
/// edge EMFs, built once per run.
///
/// # Lifecycle
///
/// [`new`](Self::new) validates the configuration, allocates all buffers
/// and opens the EMF exchange channels. [`run`](Self::run) executes one
/// sub-step and may be called any number of times;
/// [`update`](Self::update) then advances the conserved state with its
/// fluxes and the source terms. Dropping the stage releases the channels.
#[derive(Debug)]
pub struct FluxStage {
    grid: Grid,
    sound_speed: Option<SoundSpeed>,
    dispatcher: RiemannDispatcher,
    accumulator: DiffusiveFluxAccumulator,
    sources: Sources,
    emf: Option<EmfStage>,
    states: FaceStates,
    fluxes: Vec<Array3<VarVec>>,
    dmax: Array3<f64>,
    metrics: StageMetrics,
}

impl FluxStage {
    /// Build the stage of one rank.
    ///
    /// Constrained transport is enabled for MHD with at least two active
    /// axes; `comm` is then used to open the EMF exchange channels.
    pub fn new(
        config: RunConfig,
        grid: &Grid,
        comm: Option<&mut dyn Communicator>,
    ) -> Result<Self, StageError> {
        config.validate()?;
        let RunConfig {
            physics,
            sound_speed,
            scheme,
            shock_threshold,
            parabolic,
            sources,
            emf,
        } = config;

        let terms = parabolic.term_names();
        let source_names = sources.names();
        let sound_speed = sound_speed.filter(|_| physics.isothermal);
        let sources = Sources::new(sources, &physics, grid);
        let dispatcher = RiemannDispatcher::new(scheme, physics, grid, shock_threshold)?;
        let accumulator = DiffusiveFluxAccumulator::new(parabolic, physics.mhd, grid)?;
        let emf = if physics.mhd && grid.dims() >= 2 {
            Some(EmfStage::new(emf, grid, comm)?)
        } else {
            if comm.is_some() {
                log::debug!("no constrained transport; communicator unused");
            }
            None
        };

        let shape = grid.shape();
        log::info!(
            "flux stage: {} physics, scheme {scheme}, {}-D block {:?}, shock flattening {}, \
             diffusive terms [{}], source terms [{}], constrained transport {}",
            physics.name(),
            grid.dims(),
            shape,
            shock_threshold.map_or("off".to_string(), |t| format!("at {t}")),
            terms.join(", "),
            source_names.join(", "),
            if emf.is_some() { "on" } else { "off" },
        );

        Ok(Self {
            grid: grid.clone(),
            sound_speed,
            dispatcher,
            accumulator,
            sources,
            emf,
            states: FaceStates::new(grid),
            fluxes: grid
                .active_dirs()
                .iter()
                .map(|_| Array3::new(shape, [0.0; NVAR]))
                .collect(),
            dmax: Array3::new(shape, 0.0),
            metrics: StageMetrics::default(),
        })
    }

    /// The block this stage was built for.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The Riemann dispatcher.
    pub fn dispatcher(&self) -> &RiemannDispatcher {
        &self.dispatcher
    }

    /// The diffusive flux accumulator.
    pub fn accumulator(&self) -> &DiffusiveFluxAccumulator {
        &self.accumulator
    }

    /// Source terms of this block.
    pub fn sources(&self) -> &Sources {
        &self.sources
    }

    /// The EMF stage, when constrained transport is active.
    pub fn emf(&self) -> Option<&EmfStage> {
        self.emf.as_ref()
    }

    /// Metrics of the last sub-step.
    pub fn metrics(&self) -> &StageMetrics {
        &self.metrics
    }

    /// Execute one sub-step.
    ///
    /// For an isothermal run the pressure is first set from the sound
    /// speed. Then for every active direction: reconstruct, solve, and add
    /// the diffusive terms active in `substep`, folding the direction's
    /// `dMax` into the stage maximum. Then, with constrained transport,
    /// reduce and exchange the edge EMFs. An exchange failure is fatal.
    pub fn run(
        &mut self,
        input: StageInput<'_>,
        substep: SubStep,
    ) -> Result<StageOutput<'_>, StageError> {
        let start = Instant::now();
        let StageInput {
            prim,
            staggered,
            states,
        } = input;
        let grid = &self.grid;
        let metrics = &mut self.metrics;
        metrics.reset();
        self.dmax.fill(0.0);
        if let Some(s) = states {
            debug_assert!(s.len() >= grid.dims());
        }
        if let Some(cs) = &self.sound_speed {
            cs.fill_pressure(grid, prim);
        }

        for (n, d) in grid.active_dirs().into_iter().enumerate() {
            let t = Instant::now();
            let face_states = match states {
                Some(s) => &s[n],
                None => {
                    let bn = staggered.map(|bs| &bs[d.index()]);
                    donor_cell(prim, grid, d, bn, &mut self.states);
                    &self.states
                }
            };
            metrics.record(PHASE_RECONSTRUCT, elapsed_us(t));

            let t = Instant::now();
            let sweep = self
                .dispatcher
                .calc_flux(d, grid, face_states, prim, &mut self.fluxes[n]);
            metrics.max_speed = metrics.max_speed.max(sweep.max_speed);
            metrics.fallback_faces += sweep.fallback_faces;
            metrics.record(PHASE_RIEMANN, elapsed_us(t));

            let t = Instant::now();
            if self
                .accumulator
                .add_fluxes(d, grid, prim, &mut self.fluxes[n], substep)
            {
                metrics.parabolic_sweeps += 1;
                self.dmax
                    .as_mut_slice()
                    .par_iter_mut()
                    .zip(self.accumulator.dmax().as_slice().par_iter())
                    .for_each(|(m, &c)| *m = m.max(c));
            }
            if self.sound_speed.is_some() {
                // No energy equation.
                self.fluxes[n]
                    .as_mut_slice()
                    .par_iter_mut()
                    .for_each(|f| f[ENG] = 0.0);
            }
            metrics.record(PHASE_PARABOLIC, elapsed_us(t));
        }
        metrics.flagged_cells = self
            .dispatcher
            .shock_detector()
            .map_or(0, |s| s.flagged());

        if let Some(emf) = self.emf.as_mut() {
            let t = Instant::now();
            emf.calc(grid, prim, &self.fluxes)?;
            metrics.record(PHASE_EMF, elapsed_us(t));
        }

        metrics.total_us = elapsed_us(start);
        log::debug!(
            "sub-step {substep:?}: {} us, max speed {:.3e}, {} flagged cells, {} fallback faces, \
             phases {:?}",
            metrics.total_us,
            metrics.max_speed,
            metrics.flagged_cells,
            metrics.fallback_faces,
            metrics.phase_us
        );

        Ok(StageOutput {
            fluxes: &self.fluxes,
            edges: self.emf.as_ref().map(EmfStage::edges),
            dmax: &self.dmax,
            metrics: &self.metrics,
        })
    }

    /// Advance `u` by `dt` with the fluxes of the last [`run`](Self::run)
    /// and the source terms evaluated on `prim`.
    ///
    /// With constrained transport the staggered field components are left
    /// to the caller's induction update.
    pub fn update(&self, u: &mut Array3<VarVec>, prim: &Array3<VarVec>, dt: f64) {
        conservative_update(u, &self.fluxes, &self.grid, dt, self.emf.is_some());
        self.sources.apply(u, prim, &self.grid, dt);
    }
}

fn elapsed_us(t: Instant) -> u64 {
    t.elapsed().as_micros() as u64
}
