//! Diffusive (parabolic) fluxes for Corona.
//!
//! [`DiffusiveFluxAccumulator`] augments a directional flux field with
//! Ohmic resistivity, ambipolar diffusion and viscous stress, and records
//! the per-cell maximum diffusion coefficient `dMax` for time-step
//! control. Each [`DiffusiveTerm`] carries a [`Treatment`]; a term
//! contributes to a sub-step only when the sub-step kind matches.
//!
//! Gradients at faces use the two cells on either side of the face for
//! the normal derivative and the average of their centered differences
//! for transverse derivatives.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod accumulator;
pub mod fargo;
mod nonideal;
mod stencil;
pub mod term;
mod viscosity;

pub use accumulator::{DiffusiveFluxAccumulator, ParabolicConfig};
pub use fargo::{FrameShift, ShiftedFrame};
pub use term::{DiffusiveTerm, Diffusivity, DiffusivityFn, SubStep, Treatment, Viscosity};
