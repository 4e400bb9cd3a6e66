//! Hyperbolic fluxes for Corona.
//!
//! The pieces a sub-step needs to turn primitive cell averages into the
//! flux through every face:
//!
//! - [`Physics`]: the equation of state and the analytic flux.
//! - [`SoundSpeed`]: the prescribed sound speed of an isothermal run.
//! - [`reconstruct`]: [`FaceStates`] and donor-cell reconstruction.
//! - [`scheme`]: the approximate Riemann solvers, selected by [`Scheme`].
//! - [`ShockDetector`]: flags compressive cells with a strong pressure jump.
//! - [`RiemannDispatcher`]: runs the selected scheme over one direction,
//!   dropping to the Tvdlf flux at flagged shocks.
//!
//! Face loops run on the rayon pool, one `(k, j)` row of faces per task.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod dispatcher;
pub mod isothermal;
pub mod physics;
pub mod reconstruct;
pub mod scheme;
pub mod shock;

pub use dispatcher::{RiemannDispatcher, SweepStats};
pub use isothermal::{SoundSpeed, SoundSpeedFn};
pub use physics::Physics;
pub use reconstruct::{donor_cell, FaceStates};
pub use scheme::{FaceFlux, Scheme, SolverFn};
pub use shock::ShockDetector;
