//! Per-sub-step metrics of the flux stage.
//!
//! [`StageMetrics`] captures phase timings and solver statistics for a
//! single sub-step, for CFL estimation, profiling and logging.

use indexmap::IndexMap;

/// Reconstruction of face states.
pub const PHASE_RECONSTRUCT: &str = "reconstruct";
/// Riemann solves.
pub const PHASE_RIEMANN: &str = "riemann";
/// Diffusive flux pass.
pub const PHASE_PARABOLIC: &str = "parabolic";
/// EMF reduction and exchange.
pub const PHASE_EMF: &str = "emf";

/// Timing and solver metrics collected during a single sub-step.
///
/// All durations are in microseconds. [`FluxStage::run`](crate::FluxStage::run)
/// resets and repopulates these fields; consumers read them from the most
/// recent sub-step.
#[derive(Clone, Debug, Default)]
pub struct StageMetrics {
    /// Wall-clock time for the entire sub-step, in microseconds.
    pub total_us: u64,
    /// Time per phase, summed over directions, in execution order.
    pub phase_us: IndexMap<&'static str, u64>,
    /// Largest signal speed over every sweep.
    pub max_speed: f64,
    /// Cells flagged by the shock detector.
    pub flagged_cells: usize,
    /// Faces solved with the fallback scheme.
    pub fallback_faces: usize,
    /// Directions that received diffusive contributions.
    pub parabolic_sweeps: usize,
}

impl StageMetrics {
    /// Clear every field, keeping the map's allocation.
    pub fn reset(&mut self) {
        self.total_us = 0;
        self.phase_us.clear();
        self.max_speed = 0.0;
        self.flagged_cells = 0;
        self.fallback_faces = 0;
        self.parabolic_sweeps = 0;
    }

    /// Add `us` microseconds to `phase`.
    pub fn record(&mut self, phase: &'static str, us: u64) {
        *self.phase_us.entry(phase).or_insert(0) += us;
    }

    /// Time spent in `phase`, zero if it did not run.
    pub fn phase(&self, phase: &str) -> u64 {
        self.phase_us.get(phase).copied().unwrap_or(0)
    }
}
