//! Sub-step orchestration for the Corona flux core.
//!
//! A [`RunConfig`] is validated once and turned into a [`FluxStage`],
//! which owns every reusable buffer of one rank: face states, the flux
//! field of each direction, the diffusion-coefficient maximum, and the
//! constrained-transport EMF stage with its persistent channels.
//! [`FluxStage::run`] executes one sub-step; [`FluxStage::update`]
//! applies the resulting flux divergence ([`conservative_update`]) and the
//! gravity and user [`SourceTerms`] to the conserved state.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod metrics;
pub mod source;
pub mod stage;
pub mod update;

pub use config::RunConfig;
pub use metrics::StageMetrics;
pub use source::{PotentialFn, SourceTerms, Sources, UserSourceFn};
pub use stage::{FluxStage, StageInput, StageOutput};
pub use update::conservative_update;
